//! HTTP response building module
//!
//! Builders for every status the wiki answers with. A builder never panics:
//! if hyper rejects the parts, the failure is logged and a bare response with
//! the same body is returned instead.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Build a `text/plain` response with the given status
fn build_text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let fallback = body.clone();
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::from(fallback)))
        })
}

/// Build 200 OK HTML response
pub fn build_html_response(content: String) -> Response<Full<Bytes>> {
    let content_length = content.len();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .header("Cache-Control", "no-cache")
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::OK, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 302 Found redirect response
pub fn build_redirect_response(target: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", target)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from("Redirecting...")))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::FOUND, &e);
            Response::new(Full::new(Bytes::from("Redirecting...")))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_REQUEST, format!("400 Bad Request: {message}"))
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found".to_string())
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    let mut resp = build_text_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed".to_string(),
    );
    match hyper::header::HeaderValue::from_str(allow) {
        Ok(value) => {
            resp.headers_mut().insert(hyper::header::ALLOW, value);
        }
        Err(e) => crate::logger::log_error(&format!("Invalid Allow header '{allow}': {e}")),
    }
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "413 Payload Too Large".to_string(),
    )
}

/// Build 500 Internal Server Error response carrying the failure text
pub fn build_500_response(message: &str) -> Response<Full<Bytes>> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_redirect_has_location() {
        let resp = build_redirect_response("/edit/NewPage");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["location"], "/edit/NewPage");
    }

    #[test]
    fn test_405_has_allow() {
        let resp = build_405_response("GET, HEAD");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_500_carries_message() {
        let resp = build_500_response("page 'A': permission denied");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(resp).await, "page 'A': permission denied");
    }

    #[tokio::test]
    async fn test_html_response() {
        let resp = build_html_response("<p>hi</p>".to_string());
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(resp.headers()["content-length"], "9");
        assert_eq!(body_string(resp).await, "<p>hi</p>");
    }
}
