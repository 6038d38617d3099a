use std::error::Error as StdError;
use std::fmt::Write;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that can go wrong while rendering a view.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The [source](crate::TemplateSource) has no template by that name.
    #[error("template `{name}` not found ({location})")]
    TemplateNotFound { name: String, location: String },
    /// The template file exists but could not be read.
    #[error("failed to read template {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The template source is not valid directive syntax.
    #[error("failed to parse template `{name}`:\n{message}")]
    Parse { name: String, message: String },
    #[error(transparent)]
    Section(#[from] SectionStateError),
    #[error("templates nested more than {limit} levels deep when loading `{name}`")]
    RecursionLimit { name: String, limit: usize },
    #[error("views extend each other in a cycle: {chain}")]
    ExtendCycle { chain: String },
    #[error("environment variable {var} is not valid unicode")]
    Env { var: &'static str },
    /// Failure reported by a closure template.
    #[error("{0}")]
    Message(String),
}

impl ViewError {
    /// Create an error with a plain message, for use in closure templates.
    pub fn msg(message: impl Into<String>) -> Self {
        ViewError::Message(message.into())
    }

    /// The error message followed by every underlying cause.
    ///
    /// This is what [`View::render`](crate::View::render) emits in place
    /// of the page.
    pub fn diagnostic(&self) -> String {
        let mut out = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            let _ = write!(out, ": {err}");
            cause = err.source();
        }
        out
    }
}

/// A section helper was called in a state where it is not allowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SectionStateError {
    #[error("cannot open section `{requested}` while section `{open}` is open")]
    AlreadyOpen { open: String, requested: String },
    #[error("close called with no open section")]
    NotOpen,
    #[error("section `{name}` opened by an enclosing template cannot be closed here")]
    ForeignClose { name: String },
    #[error("section `{name}` is never closed in template `{template}`")]
    Unclosed { name: String, template: String },
    #[error("cannot extend `{parent}` while section `{open}` is open")]
    ExtendInSection { parent: String, open: String },
}

/// A Result where the error type is a [`ViewError`].
pub type Result<T, E = ViewError> = std::result::Result<T, E>;
