//! Request entry module
//!
//! Entry point for HTTP request processing. The path is resolved first, so
//! unroutable requests get 404 without their body being looked at; only an
//! allowed `POST /save/<title>` has its body size checked and collected.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::http::request::Parts;
use hyper::{header, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Action, Route};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let mut entry = AccessLogEntry::from_parts(remote_addr, &parts);
    let is_head = parts.method == Method::HEAD;

    let response = match state.routes.resolve(parts.uri.path(), &state.validator) {
        None => {
            logger::log_debug(&format!("No route for {}", parts.uri.path()));
            http::build_404_response()
        }
        Some(route) => {
            let bytes = if takes_body(route, &parts.method) {
                read_body(&parts, body, state.config.http.max_body_size).await
            } else {
                Ok(Bytes::new())
            };
            match bytes {
                Ok(bytes) => {
                    let req = Request::from_parts(parts, bytes);
                    state.routes.dispatch(&req, &state).await
                }
                Err(resp) => resp,
            }
        }
    };
    let response = finish_response(response, is_head, &state.config.http.server_name);

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Only a save that will actually run consumes the request body
fn takes_body(route: Route, method: &Method) -> bool {
    route == Route::Page(Action::Save) && Action::Save.allows(method)
}

/// Collect the request body, refusing anything above `max_body_size`
async fn read_body<B>(
    parts: &Parts,
    body: B,
    max_body_size: u64,
) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(resp) = check_body_size(parts, max_body_size) {
        return Err(resp);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!(
                "Request body exceeded {max_body_size} bytes on {}",
                parts.uri.path()
            ));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response("unreadable request body"))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(parts: &Parts, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = parts.headers.get(header::CONTENT_LENGTH)?;
    match content_length.to_str().ok()?.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => Some(http::build_400_response("invalid Content-Length")),
    }
}

/// Add the `Server` header and drop the body of HEAD responses
fn finish_response(
    response: Response<Full<Bytes>>,
    is_head: bool,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let mut response = if is_head {
        response.map(|_| Full::new(Bytes::new()))
    } else {
        response
    };
    if let Ok(value) = header::HeaderValue::from_str(server_name) {
        response.headers_mut().insert(header::SERVER, value);
    }
    response
}
