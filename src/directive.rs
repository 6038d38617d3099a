use crate::context::Context;
use crate::error::Result;
use crate::parseresult::PResult;
use crate::spacelike::comment;
use nom::branch::alt;
use nom::bytes::complete::{is_not, take_while, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::{cut, map, recognize, success, value};
use nom::error::context;
use nom::sequence::{delimited, preceded};
use nom::Parser;

/// The literal marker replaced by overriding content in a section.
pub const PARENT_MARKER: &str = "@parent";

/// One piece of a parsed template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Comment,
    Text(String),
    Field(String),
    Extend(String),
    Section(String),
    Close,
    Show(String),
    Partial(String),
}

impl Node {
    pub fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        match self {
            Node::Comment => {}
            Node::Text(text) => ctx.write_str(text),
            Node::Field(name) => ctx.write_field(name),
            Node::Extend(parent) => ctx.extend(parent)?,
            Node::Section(name) => ctx.section(name)?,
            Node::Close => {
                ctx.close()?;
            }
            Node::Show(name) => ctx.show(name),
            Node::Partial(name) => ctx.partial(name)?,
        }
        Ok(())
    }
}

pub fn node(input: &[u8]) -> PResult<Node> {
    alt((
        map(comment, |()| Node::Comment),
        map(is_not("@"), |text: &[u8]| Node::Text(utf8(text))),
        preceded(char('@'), directive),
    ))
    .parse(input)
}

/// Everything after an `@` that is not a comment.
fn directive(input: &[u8]) -> PResult<Node> {
    alt((
        value(Node::Text("@".into()), char('@')),
        named_directive,
        success(Node::Text("@".into())),
    ))
    .parse(input)
}

fn named_directive(input: &[u8]) -> PResult<Node> {
    let (rest, name) = identifier(input)?;
    match name {
        b"extend" => map(
            context("Expected (\"view\") after @extend", cut(name_argument)),
            Node::Extend,
        )
        .parse(rest),
        b"section" => map(
            context("Expected (\"name\") after @section", cut(name_argument)),
            Node::Section,
        )
        .parse(rest),
        b"show" => map(
            context("Expected (\"name\") after @show", cut(name_argument)),
            Node::Show,
        )
        .parse(rest),
        b"partial" => map(
            context("Expected (\"view\") after @partial", cut(name_argument)),
            Node::Partial,
        )
        .parse(rest),
        b"close" => Ok((rest, Node::Close)),
        b"parent" => Ok((rest, Node::Text(PARENT_MARKER.into()))),
        field => Ok((rest, Node::Field(utf8(field)))),
    }
}

fn identifier(input: &[u8]) -> PResult<&[u8]> {
    recognize((
        take_while1(|c: u8| c.is_ascii_alphabetic() || c == b'_'),
        take_while(|c: u8| c.is_ascii_alphanumeric() || c == b'_'),
    ))
    .parse(input)
}

/// A quoted, non-empty name in parentheses: `("name")`.
fn name_argument(input: &[u8]) -> PResult<String> {
    map(
        delimited(
            (char('('), multispace0, char('"')),
            is_not("\"\n"),
            (char('"'), multispace0, char(')')),
        ),
        utf8,
    )
    .parse(input)
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
