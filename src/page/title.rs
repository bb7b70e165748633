//! Page title type
//!
//! A `Title` is the only key the page store accepts. It can only be built from
//! a string of one or more ASCII letters or digits, so it never carries path
//! separators, dots or anything else that could escape the storage root.

use std::fmt;

/// Validated, path-safe page title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// Parse a raw string as a title (`^[A-Za-z0-9]+$`)
    pub fn parse(raw: &str) -> Option<Self> {
        if is_title(raw) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name backing this title inside the storage root
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.0)
    }
}

/// Check the title grammar without allocating
fn is_title(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_alphanumeric() {
        assert!(Title::parse("FrontPage").is_some());
        assert!(Title::parse("Page2").is_some());
        assert!(Title::parse("42").is_some());
    }

    #[test]
    fn test_rejects_unsafe_titles() {
        for raw in ["", "..", "a/b", "../etc", "with space", "dash-ed", "dot.txt", "ünïcode"] {
            assert!(Title::parse(raw).is_none(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_file_name() {
        let title = Title::parse("FrontPage").unwrap();
        assert_eq!(title.file_name(), "FrontPage.txt");
        assert_eq!(title.to_string(), "FrontPage");
    }
}
