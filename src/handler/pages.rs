//! Page handlers
//!
//! View, edit and save workflows. Each receives a title that already passed
//! the validator and composes the page store with the template engine:
//! - view of a missing page redirects to its edit form
//! - edit of a missing page renders a blank form
//! - save writes the submitted `body` field verbatim and redirects to the view

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode;

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::page::{Page, StoreError, Title};
use crate::routing::{wrap, Action, HandlerFuture, PageRequest, RouteTable, TitleHandler};
use crate::templates;

pub struct ViewPage;
pub struct EditPage;
pub struct SavePage;

/// Route table with the three page handlers registered
pub fn page_routes(front_page: &Title) -> RouteTable {
    let mut routes = RouteTable::new(front_page);
    routes
        .register(wrap(Action::View, ViewPage))
        .register(wrap(Action::Edit, EditPage))
        .register(wrap(Action::Save, SavePage));
    routes
}

impl TitleHandler for ViewPage {
    fn handle<'a>(&'a self, ctx: PageRequest<'a>, title: Title) -> HandlerFuture<'a> {
        Box::pin(view(ctx.state, title))
    }
}

impl TitleHandler for EditPage {
    fn handle<'a>(&'a self, ctx: PageRequest<'a>, title: Title) -> HandlerFuture<'a> {
        Box::pin(edit(ctx.state, title))
    }
}

impl TitleHandler for SavePage {
    fn handle<'a>(&'a self, ctx: PageRequest<'a>, title: Title) -> HandlerFuture<'a> {
        Box::pin(save(ctx.state, title, ctx.req.body()))
    }
}

async fn view(state: &AppState, title: Title) -> Response<Full<Bytes>> {
    match state.store.load(&title).await {
        Ok(page) => render(state, templates::VIEW, &page),
        Err(e) if e.is_not_found() => {
            logger::log_page_missing(&title);
            http::build_redirect_response(&Action::Edit.path(&title))
        }
        Err(e) => store_failure(&e),
    }
}

async fn edit(state: &AppState, title: Title) -> Response<Full<Bytes>> {
    let page = match state.store.load(&title).await {
        Ok(page) => page,
        Err(e) if e.is_not_found() => Page::empty(title),
        Err(e) => return store_failure(&e),
    };
    render(state, templates::EDIT, &page)
}

/// Raw value of the first `body` field in an urlencoded form
///
/// Values are percent-decoded to bytes without any UTF-8 interpretation, so
/// the stored page is exactly what the client encoded. A missing field reads
/// as an empty body.
fn form_body(form: &[u8]) -> Vec<u8> {
    form.split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.iter().position(|&b| b == b'=') {
            Some(eq) => (&pair[..eq], &pair[eq + 1..]),
            None => (pair, &[][..]),
        })
        .find(|(key, _)| form_decode(key) == b"body")
        .map(|(_, value)| form_decode(value))
        .unwrap_or_default()
}

/// `application/x-www-form-urlencoded` decoding: `+` is a space, then `%XX`
fn form_decode(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}

async fn save(state: &AppState, title: Title, form: &Bytes) -> Response<Full<Bytes>> {
    let page = Page::new(title, form_body(form));
    match state.store.save(&page).await {
        Ok(()) => {
            logger::log_page_saved(&page.title, page.body.len());
            http::build_redirect_response(&Action::View.path(&page.title))
        }
        Err(e) => store_failure(&e),
    }
}

fn render(state: &AppState, template: &str, page: &Page) -> Response<Full<Bytes>> {
    match state.templates.render(template, page) {
        Ok(html) => http::build_html_response(html),
        Err(e) => {
            logger::log_render_error(template, &e);
            http::build_500_response(&e.to_string())
        }
    }
}

fn store_failure(err: &StoreError) -> Response<Full<Bytes>> {
    logger::log_store_error(err);
    http::build_500_response(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_decoding() {
        assert_eq!(form_body(b"body=Hello+world%21"), b"Hello world!");
        assert_eq!(form_body(b"other=1&body=a%26b%3Dc"), b"a&b=c");
        assert_eq!(form_body(b"bo%64y=encoded+key"), b"encoded key");
        assert_eq!(form_body(b"body"), b"");
        assert_eq!(form_body(b""), b"");
        assert_eq!(form_body(b"bodyx=1&xbody=2"), b"");
    }

    #[test]
    fn test_form_body_keeps_raw_bytes() {
        assert_eq!(form_body(b"body=%FFab"), [0xFF, b'a', b'b']);
        assert_eq!(form_body(b"body=100%25+%zz"), b"100% %zz");
    }

    #[test]
    fn test_form_body_first_field_wins() {
        assert_eq!(form_body(b"body=first&body=second"), b"first");
        assert_eq!(form_body(b"&&body=&body=later"), b"");
    }
}
