//! View inheritance and overridable sections for html templates.
//!
//! A template can declare that it extends a parent template, and
//! define named sections that the parent shows.
//! Rendering a view that extends another renders the parent instead,
//! with the sections of the child available to it.
//!
//! A layout, `views/layout.html`:
//!
//! ```text
//! <html>
//!   <head><title>@show("title")</title></head>
//!   <body>@section("body")<p>Nothing here.</p>@close</body>
//! </html>
//! ```
//!
//! And a page extending it, `views/index.html`:
//!
//! ```text
//! @extend("layout")
//! @section("title")@title@close
//! @section("body")<h1>@title</h1>@close
//! ```
//!
//! The page is rendered by name, with the fields it uses:
//!
//! ```no_run
//! use layouts::Views;
//!
//! let views = Views::from_dir("views");
//! let html = views.view("index").set("title", "Welcome").render();
//! println!("{html}");
//! ```
//!
//! The template syntax is described in the
//! [`Template_syntax`](Template_syntax) chapter.
//! Templates can also be written as rust closures, see
//! [`MemorySource::add_fn`].
//!
//! # Sections
//!
//! The first close of a section stores its content.
//! Closing a section that already has content replaces every `@parent`
//! in the stored content with the new content.
//! Sections are resolved in the order templates execute them, and a
//! child runs before the parent it extends.
//! So a section defined by a child is kept as is when the parent
//! closes the same section, unless the child wrote `@parent`.
//!
//! # Errors
//!
//! [`View::render`] never fails.
//! If any template is missing or misbehaves, the output is a
//! diagnostic message instead of the page.
//! Use [`View::try_render`] to get the error.
#![forbid(unsafe_code)]

mod context;
mod directive;
mod error;
mod parseresult;
mod source;
mod spacelike;
mod template;
mod value;

#[allow(non_snake_case)]
pub mod Template_syntax;

pub use crate::context::Context;
pub use crate::directive::{Node, PARENT_MARKER};
pub use crate::error::{Result, SectionStateError, ViewError};
pub use crate::source::{FileSource, MemorySource, Template, TemplateSource};
pub use crate::template::ParsedTemplate;
pub use crate::value::{Fields, Value};

use itertools::Itertools;
use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug_span, warn};

/// Where views are found, and how they are rendered.
///
/// This is cheap to clone, and can be shared between threads.
#[derive(Clone)]
pub struct Views {
    source: Arc<dyn TemplateSource>,
    max_depth: usize,
}

impl Views {
    /// The default limit for nested template loads.
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    /// Views from a template source.
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Views {
            source: Arc::new(source),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Views from template files in `root`.
    pub fn from_dir(root: impl Into<std::path::PathBuf>) -> Self {
        Views::new(FileSource::new(root))
    }

    /// Views from the directory named by the environment.
    ///
    /// The directory is `VIEW_PATH`, or `views` if unset.
    /// The template file extension is `VIEW_EXTENSION`, or `html` if
    /// unset.
    pub fn from_env() -> Result<Self> {
        let root = env_or("VIEW_PATH", "views")?;
        let extension = env_or("VIEW_EXTENSION", FileSource::DEFAULT_EXTENSION)?;
        Ok(Views::new(FileSource::new(root).with_extension(extension)))
    }

    /// Set the limit for nested template loads.
    ///
    /// Loading a template deeper than this fails with
    /// [`ViewError::RecursionLimit`].
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// A view to render, starting with the template `name`.
    pub fn view(&self, name: impl Into<String>) -> View {
        View {
            source: self.source.clone(),
            max_depth: self.max_depth,
            name: name.into(),
            fields: Fields::new(),
        }
    }
}

impl std::fmt::Debug for Views {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        out.debug_struct("Views")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

fn env_or(var: &'static str, default: &str) -> Result<String> {
    match env::var(var) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.into()),
        Err(env::VarError::NotUnicode(_)) => Err(ViewError::Env { var }),
    }
}

/// A view to render: a template name and fields for its templates.
#[derive(Clone)]
pub struct View {
    source: Arc<dyn TemplateSource>,
    max_depth: usize,
    name: String,
    fields: Fields,
}

impl View {
    /// Set the field `name`, replacing any previous value.
    ///
    /// ```
    /// # use layouts::{MemorySource, Value, Views};
    /// # let views = Views::new(MemorySource::new());
    /// let view = views.view("page").set("title", "A").set("count", 3);
    /// assert_eq!(view.field("title"), Some(&Value::from("A")));
    /// ```
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The value of field `name`, if it is set.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The name of the template this view starts with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the view, or a diagnostic message if rendering fails.
    pub fn render(&self) -> String {
        match self.try_render() {
            Ok(output) => output,
            Err(err) => {
                warn!(view = %self.name, error = %err, "render failed");
                err.diagnostic()
            }
        }
    }

    /// Render the view to `out`.
    ///
    /// As for [`render`](Self::render), a failure to render is written
    /// as a diagnostic message; only a failure to write is returned.
    pub fn render_to(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.render().as_bytes())
    }

    /// Render the view.
    ///
    /// If the template calls `extend`, the template it extends is
    /// rendered instead, and so on.
    pub fn try_render(&self) -> Result<String> {
        let _span = debug_span!("render", view = %self.name).entered();
        let mut ctx = Context::new(&*self.source, &self.fields, self.max_depth);
        let mut output = ctx.load(&self.name)?;
        let mut chain = vec![self.name.clone()];
        while let Some(parent) = ctx.take_extended() {
            let cycle = chain.contains(&parent);
            chain.push(parent);
            if cycle {
                return Err(ViewError::ExtendCycle {
                    chain: chain.iter().join(" -> "),
                });
            }
            output = ctx.load(&chain[chain.len() - 1])?;
        }
        let (opened, closed) = ctx.scope_counts();
        debug_assert_eq!(opened, closed, "unbalanced buffer scopes");
        Ok(output)
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        out.debug_struct("View")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn views(templates: &[(&str, &str)]) -> Views {
        let mut source = MemorySource::new();
        for (name, body) in templates {
            source.add_str(*name, body).unwrap();
        }
        Views::new(source)
    }

    #[test]
    fn plain_view_is_its_template() {
        let views = views(&[("page", "<p>@title</p>\n")]);
        assert_eq!(views.view("page").set("title", "A").render(), "<p>A</p>\n");
    }

    #[test]
    fn fields_chain() {
        let views = views(&[("page", "@title/@subtitle")]);
        let view = views.view("page").set("title", "A").set("subtitle", "B");
        assert_eq!(view.name(), "page");
        assert_eq!(view.field("title"), Some(&Value::from("A")));
        assert_eq!(view.field("subtitle"), Some(&Value::from("B")));
        assert_eq!(view.render(), "A/B");
    }

    #[test]
    fn last_set_wins() {
        let views = views(&[("page", "@title")]);
        assert_eq!(views.view("page").set("title", "A").set("title", 2).render(), "2");
    }

    #[test]
    fn unknown_field_is_empty() {
        let views = views(&[("page", "[@nothing]")]);
        assert_eq!(views.view("page").render(), "[]");
    }

    #[test]
    fn at_sign_before_name_is_a_field() {
        let views = views(&[
            ("mail", "mail a@b.com"),
            ("escaped", "mail a@@b.com <style>@@media print { }</style>"),
        ]);
        assert_eq!(views.view("mail").render(), "mail a.com");
        assert_eq!(views.view("mail").set("b", "B").render(), "mail aB.com");
        assert_eq!(
            views.view("escaped").render(),
            "mail a@b.com <style>@media print { }</style>"
        );
    }

    #[test]
    fn extending_view_renders_parent() {
        let views = views(&[
            ("child", "lost @extend(\"base\")lost too@section(\"s\")S@close"),
            ("base", "<b>@show(\"s\")</b>"),
        ]);
        assert_eq!(views.view("child").render(), "<b>S</b>");
    }

    #[test]
    fn show_undefined_is_empty() {
        let views = views(&[("page", "<b>@show(\"nothing\")</b>")]);
        assert_eq!(views.view("page").render(), "<b></b>");
    }

    #[test]
    fn child_section_is_kept_by_parent_close() {
        let views = views(&[
            ("child", "@extend(\"base\")@section(\"s\")CHILD@close"),
            ("base", "<b>@section(\"s\")default@close</b>"),
        ]);
        assert_eq!(views.view("child").render(), "<b>CHILD</b>");
    }

    #[test]
    fn child_parent_marker_takes_later_parent_content() {
        // The child closes first, so its @parent stays in the stored
        // content and the parent content replaces it.
        let views = views(&[
            ("child", "@extend(\"base\")@section(\"s\")[@parent]@close"),
            ("base", "<b>@section(\"s\")default@close</b>"),
        ]);
        assert_eq!(views.view("child").render(), "<b>[default]</b>");
    }

    #[test]
    fn parent_section_with_marker_closed_first() {
        let views = views(&[(
            "page",
            "@section(\"x\")before @parent after@close|@section(\"x\")CHILD@close",
        )]);
        assert_eq!(
            views.view("page").render(),
            "before @parent after|before CHILD after"
        );
    }

    #[test]
    fn multi_level_extend() {
        let views = views(&[
            ("page", "@extend(\"two-col\")@section(\"main\")M@close"),
            (
                "two-col",
                "@extend(\"base\")@section(\"body\")<main>@show(\"main\")</main>@close",
            ),
            ("base", "<body>@show(\"body\")</body>"),
        ]);
        assert_eq!(views.view("page").render(), "<body><main>M</main></body>");
    }

    #[test]
    fn extend_cycle() {
        let views = views(&[("a", "@extend(\"b\")"), ("b", "@extend(\"a\")")]);
        match views.view("a").try_render() {
            Err(ViewError::ExtendCycle { chain }) => assert_eq!(chain, "a -> b -> a"),
            other => panic!("Expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn missing_template() {
        let views = views(&[]);
        assert!(matches!(
            views.view("nope").try_render(),
            Err(ViewError::TemplateNotFound { .. })
        ));
        assert_eq!(
            views.view("nope").render(),
            "template `nope` not found (in memory)"
        );
    }

    #[test]
    fn missing_parent_replaces_page() {
        let views = views(&[("child", "page text@extend(\"gone\")")]);
        let out = views.view("child").render();
        assert_eq!(out, "template `gone` not found (in memory)");
    }

    #[test]
    fn section_error_replaces_page() {
        let views = views(&[("page", "text@close")]);
        assert_eq!(views.view("page").render(), "close called with no open section");
    }

    #[test]
    fn render_to_writer() {
        let views = views(&[("page", "hello")]);
        let mut buf = Vec::new();
        views.view("page").render_to(&mut buf).unwrap();
        assert_eq!(buf, b"hello");
    }

    #[test]
    fn closure_and_parsed_templates_mix() {
        let mut source = MemorySource::new();
        source
            .add_str("layout", "<title>@show(\"title\")</title>")
            .unwrap();
        source.add_fn("page", |ctx| {
            ctx.extend("layout")?;
            ctx.section("title")?;
            let title = ctx
                .field("title")
                .and_then(|t| t.as_str())
                .unwrap_or_default();
            ctx.write_str(&title.to_uppercase());
            ctx.close()?;
            Ok(())
        });
        let views = Views::new(source);
        assert_eq!(
            views.view("page").set("title", "hi").render(),
            "<title>HI</title>"
        );
    }

    #[test]
    fn renders_in_parallel() {
        let views = views(&[("page", "<p>@n</p>")]);
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let views = views.clone();
                std::thread::spawn(move || views.view("page").set("n", n).render())
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("<p>{n}</p>"));
        }
    }
}
