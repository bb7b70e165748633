//! Title validator
//!
//! The only gate between request paths and the page store. A path is
//! routable when it is exactly `/<action>/<title>` with the action one of
//! `edit`, `save`, `view` and the title one or more ASCII letters or digits.

use hyper::Method;
use regex::Regex;
use std::fmt;

use crate::page::Title;

/// Full routable path grammar
pub const ROUTE_PATTERN: &str = r"^/(edit|save|view)/([A-Za-z0-9]+)$";

/// Page action named by the first path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Edit,
    Save,
    View,
}

impl Action {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "edit" => Some(Self::Edit),
            "save" => Some(Self::Save),
            "view" => Some(Self::View),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Save => "save",
            Self::View => "view",
        }
    }

    /// Literal route prefix, e.g. `/view/`
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Edit => "/edit/",
            Self::Save => "/save/",
            Self::View => "/view/",
        }
    }

    /// Path for this action on `title`
    pub fn path(self, title: &Title) -> String {
        format!("{}{title}", self.prefix())
    }

    pub fn allows(self, method: &Method) -> bool {
        match self {
            Self::View | Self::Edit => method == Method::GET || method == Method::HEAD,
            Self::Save => method == Method::POST,
        }
    }

    /// Value for the `Allow` header on 405 responses
    pub const fn allow_header(self) -> &'static str {
        match self {
            Self::View | Self::Edit => "GET, HEAD",
            Self::Save => "POST",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled route grammar, built once at startup
#[derive(Debug, Clone)]
pub struct TitleValidator {
    pattern: Regex,
}

impl TitleValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(ROUTE_PATTERN)?,
        })
    }

    /// Split a raw request path into its action and title
    ///
    /// Returns `None` for anything outside the grammar; callers answer that
    /// with "not found".
    pub fn validate(&self, raw_path: &str) -> Option<(Action, Title)> {
        let caps = self.pattern.captures(raw_path)?;
        let action = Action::from_segment(caps.get(1)?.as_str())?;
        let title = Title::parse(caps.get(2)?.as_str())?;
        Some((action, title))
    }
}
