//! Moon template parser
//!
//! Builds a tree of typed nodes from the lexer's flat tag stream. Runs of
//! `if` / `else-if` / `else` tags collapse into one conditional node, `for`
//! tags become loops, and the remaining tags are classified as text, raw
//! elements, components or host elements.

pub mod ast;
pub mod parser;

pub use ast::{
    Branch, Children, Component, Conditional, Element, Loop, LoopMode, Node, RawElement, Template,
};
pub use parser::Parser;

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("Parse error at line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseErrorKind {
    #[error("`<for>` needs an `of` or an `in` attribute")]
    MissingLoopSource,

    #[error("`<for>` cannot have both `of` and `in` attributes")]
    AmbiguousLoopSource,

    #[error("`<{name}>` must directly follow an `<if>` or `<else-if>`")]
    DanglingBranch { name: String },

    #[error("unexpected closing tag `</{found}>`{}", closing_hint(.expected))]
    UnmatchedClosingTag {
        expected: Option<String>,
        found: String,
    },

    #[error("`<{tag}>` is missing its {attribute}")]
    MissingAttribute { tag: String, attribute: String },
}

fn closing_hint(expected: &Option<String>) -> String {
    match expected {
        Some(name) => format!(", expected `</{name}>`"),
        None => String::new(),
    }
}

/// Non-fatal parser finding: the template still compiles, but not as the
/// markup suggests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("Parse warning at line {line}, column {column}: {kind}")]
pub struct ParseWarning {
    pub kind: ParseWarningKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseWarningKind {
    #[error("`<{tag}>` renders only its first child, {ignored} more ignored")]
    IgnoredChildren { tag: String, ignored: usize },
}
