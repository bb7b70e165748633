//! Page module
//!
//! The page entity and its file-backed store.

mod store;
mod title;

pub use store::{PageStore, StoreError};
pub use title::Title;

use std::borrow::Cow;

/// A wiki page: a title and its raw body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title,
            body: body.into(),
        }
    }

    /// Blank page used when editing a title that has no file yet
    pub const fn empty(title: Title) -> Self {
        Self {
            title,
            body: Vec::new(),
        }
    }

    /// Body as text for rendering (invalid UTF-8 is replaced)
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
