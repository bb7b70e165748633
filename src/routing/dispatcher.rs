//! Route dispatcher
//!
//! Page handlers are written against a validated `Title` and never look at
//! the request path. `RequireTitle` adapts such a handler into a plain
//! request handler by running the title validator first; the `RouteTable`
//! maps the literal action prefixes to those adapters.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;

use super::validator::{Action, TitleValidator};
use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::page::Title;

/// Boxed response future returned by every handler
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Response<Full<Bytes>>> + Send + 'a>>;

/// Everything a page handler may use besides its title
#[derive(Clone, Copy)]
pub struct PageRequest<'a> {
    pub req: &'a Request<Bytes>,
    pub state: &'a AppState,
}

/// Handler that expects an already validated title
pub trait TitleHandler: Send + Sync {
    fn handle<'a>(&'a self, ctx: PageRequest<'a>, title: Title) -> HandlerFuture<'a>;
}

/// Handler for a raw, unvalidated request
pub trait RequestHandler: Send + Sync {
    fn call<'a>(&'a self, req: &'a Request<Bytes>, state: &'a AppState) -> HandlerFuture<'a>;
}

/// Adapter validating the path before delegating to a `TitleHandler`
pub struct RequireTitle<H> {
    action: Action,
    inner: H,
}

/// Wrap `inner` so it is only reached with a path valid for `action`
pub const fn wrap<H: TitleHandler>(action: Action, inner: H) -> RequireTitle<H> {
    RequireTitle { action, inner }
}

impl<H> RequireTitle<H> {
    pub const fn action(&self) -> Action {
        self.action
    }
}

impl<H: TitleHandler> RequestHandler for RequireTitle<H> {
    fn call<'a>(&'a self, req: &'a Request<Bytes>, state: &'a AppState) -> HandlerFuture<'a> {
        let path = req.uri().path();
        let title = match state.validator.validate(path) {
            Some((action, title)) if action == self.action => title,
            _ => {
                logger::log_debug(&format!("No route for {path}"));
                return Box::pin(async { http::build_404_response() });
            }
        };

        if !self.action.allows(req.method()) {
            logger::log_debug(&format!("{} not allowed on {path}", req.method()));
            let allow = self.action.allow_header();
            return Box::pin(async move { http::build_405_response(allow) });
        }

        self.inner.handle(PageRequest { req, state }, title)
    }
}

/// Destination of a request path, known before its body is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Page(Action),
}

/// Prefix routes plus the root redirect
pub struct RouteTable {
    routes: Vec<(&'static str, Box<dyn RequestHandler>)>,
    root_target: String,
}

impl RouteTable {
    /// Empty table whose root route redirects to `front_page`
    pub fn new(front_page: &Title) -> Self {
        Self {
            routes: Vec::new(),
            root_target: Action::View.path(front_page),
        }
    }

    /// Register a wrapped handler under its action prefix
    pub fn register<H: TitleHandler + 'static>(&mut self, route: RequireTitle<H>) -> &mut Self {
        self.routes.push((route.action().prefix(), Box::new(route)));
        self
    }

    /// Match `path` against the root route and the registered actions
    ///
    /// `None` means the request can only be answered with 404.
    pub fn resolve(&self, path: &str, validator: &TitleValidator) -> Option<Route> {
        if path == "/" {
            return Some(Route::Root);
        }
        let (action, _) = validator.validate(path)?;
        self.routes
            .iter()
            .any(|(prefix, _)| *prefix == action.prefix())
            .then_some(Route::Page(action))
    }

    pub async fn dispatch(&self, req: &Request<Bytes>, state: &AppState) -> Response<Full<Bytes>> {
        let path = req.uri().path();
        if path == "/" {
            return http::build_redirect_response(&self.root_target);
        }

        match self.routes.iter().find(|(prefix, _)| path.starts_with(prefix)) {
            Some((_, handler)) => handler.call(req, state).await,
            None => {
                logger::log_debug(&format!("No route for {path}"));
                http::build_404_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_state;
    use hyper::{Method, StatusCode};
    use std::sync::{Arc, Mutex};

    /// Records every title it is invoked with
    #[derive(Clone, Default)]
    struct Spy {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl TitleHandler for Spy {
        fn handle<'a>(&'a self, _ctx: PageRequest<'a>, title: Title) -> HandlerFuture<'a> {
            self.calls.lock().unwrap().push(title.to_string());
            Box::pin(async { http::build_html_response("ok".to_string()) })
        }
    }

    fn request(method: Method, path: &str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    fn table(spy: &Spy) -> RouteTable {
        let mut table = RouteTable::new(&Title::parse("FrontPage").unwrap());
        table
            .register(wrap(Action::View, spy.clone()))
            .register(wrap(Action::Save, spy.clone()));
        table
    }

    #[tokio::test]
    async fn test_valid_path_reaches_handler() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let spy = Spy::default();

        let resp = table(&spy)
            .dispatch(&request(Method::GET, "/view/FrontPage"), &state)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(*spy.calls.lock().unwrap(), vec!["FrontPage".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_paths_never_reach_handler() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let spy = Spy::default();
        let table = table(&spy);

        for path in [
            "/view/../etc/passwd",
            "/view/",
            "/view/a/b",
            "/view/a.txt",
            "/save/a-b",
            "/delete/FrontPage",
            "/edit/FrontPage",
            "/viewFrontPage",
            "/index.html",
        ] {
            let resp = table.dispatch(&request(Method::GET, path), &state).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "path {path}");
        }
        assert!(spy.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let spy = Spy::default();
        let table = table(&spy);

        let resp = table.dispatch(&request(Method::GET, "/save/Page"), &state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "POST");

        let resp = table.dispatch(&request(Method::POST, "/view/Page"), &state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, HEAD");

        assert!(spy.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_resolve() {
        let spy = Spy::default();
        let table = table(&spy);
        let validator = TitleValidator::new().unwrap();

        assert_eq!(table.resolve("/", &validator), Some(Route::Root));
        assert_eq!(
            table.resolve("/save/Page", &validator),
            Some(Route::Page(Action::Save))
        );
        // valid grammar but no handler registered for edit
        assert_eq!(table.resolve("/edit/Page", &validator), None);
        for path in ["/view/../etc/passwd", "/nope/x", "/view/", ""] {
            assert_eq!(table.resolve(path, &validator), None, "path {path:?}");
        }
    }

    #[tokio::test]
    async fn test_root_redirects_to_front_page() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let spy = Spy::default();

        for method in [Method::GET, Method::POST] {
            let resp = table(&spy).dispatch(&request(method, "/"), &state).await;
            assert_eq!(resp.status(), StatusCode::FOUND);
            assert_eq!(resp.headers()["location"], "/view/FrontPage");
        }
    }
}
