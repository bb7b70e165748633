//! Template rendering module
//!
//! Page HTML is produced by a `TemplateEngine`. The default engine compiles the
//! embedded `view` and `edit` templates once at startup and is shared
//! read-only by every request afterwards.

use minijinja::{context, AutoEscape, Environment};

use crate::page::Page;

/// Template shown for an existing page
pub const VIEW: &str = "view";
/// Edit form, pre-filled with the current body
pub const EDIT: &str = "edit";

/// Rendering failure
#[derive(Debug, thiserror::Error)]
#[error("failed to render template: {0}")]
pub struct RenderError(#[from] minijinja::Error);

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_name: &str, page: &Page) -> Result<String, RenderError>;
}

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Compile the embedded templates; an error here is a startup fault
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template(VIEW, include_str!("view.html"))?;
        env.add_template(EDIT, include_str!("edit.html"))?;
        Ok(Self { env })
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template_name: &str, page: &Page) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(template_name)?;
        let html = tmpl.render(context! {
            title => page.title.as_str(),
            body => page.body_text(),
        })?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Title;

    fn page(title: &str, body: &str) -> Page {
        Page::new(Title::parse(title).unwrap(), body)
    }

    #[test]
    fn test_render_view() {
        let engine = MiniJinjaEngine::new().unwrap();
        let html = engine.render(VIEW, &page("FrontPage", "Hello")).unwrap();
        assert!(html.contains("<h1>FrontPage</h1>"));
        assert!(html.contains("<div>Hello</div>"));
        assert!(html.contains(r#"href="/edit/FrontPage""#));
    }

    #[test]
    fn test_render_edit_form() {
        let engine = MiniJinjaEngine::new().unwrap();
        let html = engine.render(EDIT, &page("Notes", "draft")).unwrap();
        assert!(html.contains(r#"action="/save/Notes""#));
        assert!(html.contains(r#"name="body""#));
        assert!(html.contains(">draft</textarea>"));
    }

    #[test]
    fn test_body_is_escaped() {
        let engine = MiniJinjaEngine::new().unwrap();
        let html = engine
            .render(VIEW, &page("Xss", "<script>alert(1)</script>"))
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unknown_template_is_error() {
        let engine = MiniJinjaEngine::new().unwrap();
        assert!(engine.render("missing", &page("A", "")).is_err());
    }
}
