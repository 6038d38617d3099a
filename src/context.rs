//! The state of one render.
use crate::directive::PARENT_MARKER;
use crate::error::{Result, SectionStateError, ViewError};
use crate::source::TemplateSource;
use crate::value::{Fields, Value};
use std::collections::HashMap;
use std::fmt::Write;
use tracing::{debug, trace};

/// The render context passed to every executing template.
///
/// A context is created for each render of a [`View`](crate::View).
/// It owns the stack of output buffer scopes, the sections defined so
/// far, and the name of the view being extended, if any.
/// Text written by a template goes to the innermost open scope.
pub struct Context<'v> {
    source: &'v dyn TemplateSource,
    fields: &'v Fields,
    max_depth: usize,
    /// Output buffer scopes.  The first one belongs to the context and
    /// is never returned.
    buffers: Vec<String>,
    sections: HashMap<String, String>,
    open_section: Option<OpenSection>,
    extended: Option<String>,
    /// Names of the templates currently executing, outermost first.
    loading: Vec<String>,
    opened: usize,
    closed: usize,
}

struct OpenSection {
    name: String,
    /// Index of the buffer scope capturing this section.
    scope: usize,
}

impl<'v> Context<'v> {
    pub(crate) fn new(
        source: &'v dyn TemplateSource,
        fields: &'v Fields,
        max_depth: usize,
    ) -> Self {
        Context {
            source,
            fields,
            max_depth,
            buffers: vec![String::new()],
            sections: HashMap::new(),
            open_section: None,
            extended: None,
            loading: Vec::new(),
            opened: 0,
            closed: 0,
        }
    }

    /// Load and execute the template `name`, returning its output.
    ///
    /// The template runs in a buffer scope of its own, but shares the
    /// sections and extended view of this context.
    /// If the template fails, every scope it opened is closed before
    /// the error is returned.
    pub fn load(&mut self, name: &str) -> Result<String> {
        if self.loading.len() >= self.max_depth {
            return Err(ViewError::RecursionLimit {
                name: name.to_owned(),
                limit: self.max_depth,
            });
        }
        let template = self.source.find(name)?;
        debug!(template = name, depth = self.loading.len(), "loading template");
        let entry = self.buffers.len();
        self.push_scope();
        self.loading.push(name.to_owned());
        let result = template
            .execute(self)
            .and_then(|()| self.check_closed(entry, name));
        self.loading.pop();
        match result {
            Ok(()) => Ok(self.pop_scope()),
            Err(err) => {
                self.unwind(entry);
                Err(err)
            }
        }
    }

    /// Load the template `name` and write its output here.
    pub fn partial(&mut self, name: &str) -> Result<()> {
        let text = self.load(name)?;
        self.write_str(&text);
        Ok(())
    }

    /// Declare that the current view extends `parent`.
    ///
    /// Everything written by the current template so far is discarded,
    /// and so is everything it writes later.
    /// Its sections are kept for the parent to show.
    ///
    /// Fails if a section is open in the current template, since its
    /// scope is the one that would be discarded.
    pub fn extend(&mut self, parent: &str) -> Result<()> {
        let own_section = self
            .open_section
            .as_ref()
            .filter(|open| open.scope + 1 == self.buffers.len());
        if let Some(open) = own_section {
            return Err(SectionStateError::ExtendInSection {
                parent: parent.to_owned(),
                open: open.name.clone(),
            }
            .into());
        }
        debug!(parent, "extending view");
        self.extended = Some(parent.to_owned());
        if self.buffers.len() > 1 {
            self.pop_scope();
            self.push_scope();
        }
        Ok(())
    }

    /// Start capturing the section `name`.
    pub fn section(&mut self, name: &str) -> Result<()> {
        if let Some(open) = &self.open_section {
            return Err(SectionStateError::AlreadyOpen {
                open: open.name.clone(),
                requested: name.to_owned(),
            }
            .into());
        }
        trace!(section = name, "open section");
        self.push_scope();
        self.open_section = Some(OpenSection {
            name: name.to_owned(),
            scope: self.buffers.len() - 1,
        });
        Ok(())
    }

    /// Stop capturing the open section and store it.
    ///
    /// The first close of a name stores the captured text.
    /// A later close of the same name replaces each `@parent` in the
    /// stored text with the newly captured text.
    /// The resulting section content is written to the enclosing
    /// scope, and returned.
    pub fn close(&mut self) -> Result<String> {
        let open = match self.open_section.take() {
            Some(open) => open,
            None => return Err(SectionStateError::NotOpen.into()),
        };
        if open.scope + 1 != self.buffers.len() {
            let name = open.name.clone();
            self.open_section = Some(open);
            return Err(SectionStateError::ForeignClose { name }.into());
        }
        let captured = self.pop_scope();
        trace!(section = %open.name, "close section");
        let content = match self.sections.get(&open.name) {
            Some(existing) => existing.replace(PARENT_MARKER, &captured),
            None => captured,
        };
        self.write_str(&content);
        self.sections.insert(open.name, content.clone());
        Ok(content)
    }

    /// Write the content of section `name`, if it is defined.
    pub fn show(&mut self, name: &str) {
        if let Some(content) = self.sections.get(name) {
            if let Some(out) = self.buffers.last_mut() {
                out.push_str(content);
            }
        }
    }

    /// The content of section `name`, if it is defined.
    pub fn section_content(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    /// Write text to the current scope.
    pub fn write_str(&mut self, text: &str) {
        if let Some(out) = self.buffers.last_mut() {
            out.push_str(text);
        }
    }

    /// Write the value of field `name` to the current scope.
    ///
    /// An unknown field writes nothing.
    pub fn write_field(&mut self, name: &str) {
        if let Some(value) = self.fields.get(name) {
            if let Some(out) = self.buffers.last_mut() {
                let _ = write!(out, "{value}");
            }
        }
    }

    /// The value of field `name`, if it is set.
    pub fn field(&self, name: &str) -> Option<&'v Value> {
        self.fields.get(name)
    }

    /// All fields of the view being rendered.
    pub fn fields(&self) -> &'v Fields {
        self.fields
    }

    /// The name of the template currently executing.
    pub fn current_template(&self) -> Option<&str> {
        self.loading.last().map(String::as_str)
    }

    /// Number of buffer scopes opened and closed so far.
    ///
    /// Outside of a load, the two are equal.
    pub fn scope_counts(&self) -> (usize, usize) {
        (self.opened, self.closed)
    }

    pub(crate) fn take_extended(&mut self) -> Option<String> {
        self.extended.take()
    }

    fn check_closed(&self, entry: usize, template: &str) -> Result<()> {
        match &self.open_section {
            Some(open) if open.scope > entry => {
                Err(SectionStateError::Unclosed {
                    name: open.name.clone(),
                    template: template.to_owned(),
                }
                .into())
            }
            _ => Ok(()),
        }
    }

    fn push_scope(&mut self) {
        self.opened += 1;
        self.buffers.push(String::new());
    }

    fn pop_scope(&mut self) -> String {
        if self.buffers.len() > 1 {
            self.closed += 1;
            self.buffers.pop().unwrap_or_default()
        } else {
            String::new()
        }
    }

    /// Close every scope above `entry`, dropping their content.
    fn unwind(&mut self, entry: usize) {
        while self.buffers.len() > entry {
            self.pop_scope();
        }
        if matches!(&self.open_section, Some(open) if open.scope >= entry) {
            self.open_section = None;
        }
    }
}
