use crate::context::Context;
use crate::error::{Result, ViewError};
use crate::template::ParsedTemplate;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Something that can be executed against a render [`Context`].
///
/// Any `Fn(&mut Context) -> Result<()>` closure is a template, as is a
/// [`ParsedTemplate`].
pub trait Template: Send + Sync {
    fn execute(&self, ctx: &mut Context<'_>) -> Result<()>;
}

impl<F> Template for F
where
    F: Fn(&mut Context<'_>) -> Result<()> + Send + Sync,
{
    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        self(ctx)
    }
}

/// Finds templates by name.
pub trait TemplateSource: Send + Sync {
    /// Get the template called `name`.
    ///
    /// Fails with [`ViewError::TemplateNotFound`] if there is none.
    fn find(&self, name: &str) -> Result<Arc<dyn Template>>;
}

/// Templates read from files in a view directory.
///
/// The template `name` is the file `<root>/<name>.<extension>`.
/// Files are read and parsed each time they are loaded.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    extension: String,
}

impl FileSource {
    /// The default extension of template files.
    pub const DEFAULT_EXTENSION: &'static str = "html";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSource {
            root: root.into(),
            extension: Self::DEFAULT_EXTENSION.into(),
        }
    }

    /// Use `extension` (without the dot) for template files.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// The file a template name resolves to.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{}", self.extension))
    }
}

impl TemplateSource for FileSource {
    fn find(&self, name: &str) -> Result<Arc<dyn Template>> {
        let path = self.path_of(name);
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ViewError::TemplateNotFound {
                    name: name.to_owned(),
                    location: path.display().to_string(),
                })
            }
            Err(source) => return Err(ViewError::Io { path, source }),
        };
        Ok(Arc::new(ParsedTemplate::parse(name, &source)?))
    }
}

/// Templates held in memory, by name.
///
/// Useful for tests, and for templates written as rust closures.
#[derive(Default, Clone)]
pub struct MemorySource {
    templates: HashMap<String, Arc<dyn Template>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, template: impl Template + 'static) {
        self.templates.insert(name.into(), Arc::new(template));
    }

    /// Add a closure as a template.
    pub fn add_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut Context<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.add(name, f);
    }

    /// Parse `source` in the directive syntax and add it.
    pub fn add_str(&mut self, name: impl Into<String>, source: &str) -> Result<()> {
        let name = name.into();
        let template = ParsedTemplate::parse(&name, source)?;
        self.add(name, template);
        Ok(())
    }

    /// Builder version of [`add_str`](Self::add_str).
    pub fn with_str(mut self, name: impl Into<String>, source: &str) -> Result<Self> {
        self.add_str(name, source)?;
        Ok(self)
    }
}

impl TemplateSource for MemorySource {
    fn find(&self, name: &str) -> Result<Arc<dyn Template>> {
        self.templates.get(name).cloned().ok_or_else(|| {
            ViewError::TemplateNotFound {
                name: name.to_owned(),
                location: "in memory".into(),
            }
        })
    }
}

impl std::fmt::Debug for MemorySource {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut names: Vec<_> = self.templates.keys().collect();
        names.sort();
        out.debug_struct("MemorySource").field("templates", &names).finish()
    }
}
