//! Access log format module
//!
//! Supports three formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)

use chrono::{DateTime, Local};
use hyper::http::request::Parts;
use hyper::Version;
use std::net::SocketAddr;

/// Access log entry containing all request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: &'static str,
    pub status: u16,
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Start an entry for an incoming request, timestamped now
    pub fn from_parts(remote_addr: SocketAddr, parts: &Parts) -> Self {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            remote_addr: remote_addr.ip().to_string(),
            time: Local::now(),
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(ToString::to_string),
            http_version: version_str(parts.version),
            status: 0,
            body_bytes: 0,
            referer: header("referer"),
            user_agent: header("user-agent"),
            request_time_us: 0,
        }
    }

    /// Format the log entry; unknown format names fall back to `combined`
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    fn request_line(&self) -> String {
        let query = self
            .query
            .as_ref()
            .map(|q| format!("?{q}"))
            .unwrap_or_default();
        format!("{} {}{query} HTTP/{}", self.method, self.path, self.http_version)
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    /// Common format followed by `"$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}

const fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Request;

    fn create_test_entry() -> AccessLogEntry {
        let (parts, ()) = Request::builder()
            .method("POST")
            .uri("/save/FrontPage?draft=1")
            .header("referer", "http://localhost/edit/FrontPage")
            .header("user-agent", "Mozilla/5.0")
            .body(())
            .unwrap()
            .into_parts();
        let mut entry = AccessLogEntry::from_parts("192.168.1.1:51000".parse().unwrap(), &parts);
        entry.status = 302;
        entry.body_bytes = 14;
        entry.request_time_us = 1500;
        entry
    }

    #[test]
    fn test_from_parts() {
        let entry = create_test_entry();
        assert_eq!(entry.remote_addr, "192.168.1.1");
        assert_eq!(entry.path, "/save/FrontPage");
        assert_eq!(entry.query.as_deref(), Some("draft=1"));
        assert_eq!(entry.http_version, "1.1");
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format("combined");
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"POST /save/FrontPage?draft=1 HTTP/1.1\" 302 14"));
        assert!(log.contains("\"http://localhost/edit/FrontPage\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format("common");
        assert!(log.ends_with("\"POST /save/FrontPage?draft=1 HTTP/1.1\" 302 14"));
        assert!(!log.contains("Mozilla"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["method"], "POST");
        assert_eq!(value["status"], 302);
        assert_eq!(value["query"], "draft=1");
        assert_eq!(value["request_time_us"], 1500);
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let entry = create_test_entry();
        assert_eq!(entry.format("fancy"), entry.format("combined"));
    }
}
