//! File-backed page store
//!
//! Each page lives in `<root>/<title>.txt` holding the raw body bytes.
//! Saves go through a temporary sibling file and an atomic rename, so a
//! reader sees either the old body or the new one, never a torn write.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{Page, Title};

/// Sequence for temporary file names, unique within the process
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Page store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("page '{title}' not found")]
    NotFound { title: Title },
    #[error("page '{title}': {source}")]
    Io {
        title: Title,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Stateless store rooted at a single flat directory
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage root if it does not exist yet
    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.root.join(title.file_name())
    }

    /// Read the page stored under `title`
    pub async fn load(&self, title: &Title) -> Result<Page, StoreError> {
        match fs::read(self.path_for(title)).await {
            Ok(body) => Ok(Page::new(title.clone(), body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                title: title.clone(),
            }),
            Err(source) => Err(StoreError::Io {
                title: title.clone(),
                source,
            }),
        }
    }

    /// Replace the stored body of `page.title` in full
    pub async fn save(&self, page: &Page) -> Result<(), StoreError> {
        let target = self.path_for(&page.title);
        let tmp = self.tmp_path_for(&page.title);

        if let Err(source) = write_new_file(&tmp, &page.body).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io {
                title: page.title.clone(),
                source,
            });
        }

        if let Err(source) = fs::rename(&tmp, &target).await {
            // The target keeps its previous content
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io {
                title: page.title.clone(),
                source,
            });
        }
        Ok(())
    }

    fn tmp_path_for(&self, title: &Title) -> PathBuf {
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            ".{}.{}.{seq}.tmp",
            title.file_name(),
            std::process::id()
        ))
    }
}

/// Write `data` to a freshly created owner-only file and flush it to disk
async fn write_new_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}
