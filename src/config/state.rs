// Application state module
// Everything a request needs, built once at startup and shared read-only

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::handler;
use crate::page::PageStore;
use crate::routing::{RouteTable, TitleValidator};
use crate::templates::TemplateEngine;

/// Faults that abort startup
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid route grammar: {0}")]
    Grammar(#[from] regex::Error),
    #[error("failed to compile templates: {0}")]
    Templates(#[from] minijinja::Error),
    #[error("{0}")]
    Config(String),
    #[error("cannot prepare data directory '{path}': {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: PageStore,
    pub validator: TitleValidator,
    pub templates: Arc<dyn TemplateEngine>,
    pub routes: RouteTable,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, templates: Arc<dyn TemplateEngine>) -> Result<Self, StartupError> {
        let front_page = config.front_page().map_err(StartupError::Config)?;
        let validator = TitleValidator::new()?;
        let store = PageStore::new(&config.wiki.data_dir);

        Ok(Self {
            routes: handler::page_routes(&front_page),
            config,
            store,
            validator,
            templates,
            active_connections: AtomicUsize::new(0),
        })
    }

    /// Create the storage root so the first save does not fail
    pub async fn prepare_storage(&self) -> Result<(), StartupError> {
        self.store
            .ensure_root()
            .await
            .map_err(|source| StartupError::DataDir {
                path: self.store.root().display().to_string(),
                source,
            })
    }
}

/// State over a temporary storage root with the embedded templates
#[cfg(test)]
pub fn test_state(root: &std::path::Path) -> AppState {
    let templates = crate::templates::MiniJinjaEngine::new().unwrap();
    test_state_with(root, Config::default(), Arc::new(templates))
}

#[cfg(test)]
pub fn test_state_with(
    root: &std::path::Path,
    mut config: Config,
    templates: Arc<dyn TemplateEngine>,
) -> AppState {
    config.wiki.data_dir = root.to_string_lossy().into_owned();
    AppState::new(config, templates).unwrap()
}
