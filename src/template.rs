use crate::context::Context;
use crate::directive::{node, Node};
use crate::error::{Result, ViewError};
use crate::parseresult::{show_errors, PResult};
use crate::source::Template;
use nom::combinator::{eof, map};
use nom::multi::many_till;
use nom::Parser;

/// A template written in the directive syntax.
///
/// See the [`Template_syntax`](crate::Template_syntax) chapter for the
/// syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    body: Vec<Node>,
}

impl ParsedTemplate {
    /// Parse template `source`, using `name` in error messages.
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let buf = source.as_bytes();
        match template(buf) {
            Ok((_, body)) => Ok(ParsedTemplate { body }),
            Err(error) => Err(ViewError::Parse {
                name: name.to_owned(),
                message: show_errors(buf, &error),
            }),
        }
    }

    pub fn body(&self) -> &[Node] {
        &self.body
    }
}

impl Template for ParsedTemplate {
    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        for node in &self.body {
            node.execute(ctx)?;
        }
        Ok(())
    }
}

fn template(input: &[u8]) -> PResult<Vec<Node>> {
    map(many_till(node, eof), |(body, _)| body).parse(input)
}
