//! Moon template lexer
//!
//! Tokenizes view templates into a flat stream of opening and closing tags.
//! Text and inline `{expr}` runs are reported as self-closing `text` tags so
//! the parser only ever deals with tags.
//!
//! Lexing recovers instead of failing: malformed input yields the tokens
//! scanned so far plus a diagnostic.
//!
//! # Example
//!
//! ```
//! use moon_lexer::Scanner;
//!
//! let lexed = Scanner::tokenize("<p>Hello {name}</p>");
//! assert!(lexed.is_complete());
//! assert_eq!(lexed.tokens.len(), 4);
//! ```

pub mod scanner;
pub mod token;

pub use scanner::{Lexed, Scanner};
pub use token::{
    is_void_element, token_to_source, AttributeValue, Attributes, Span, Token, TokenKind,
};

/// Tokenize template source. Shorthand for [`Scanner::tokenize`].
pub fn lex(source: &str) -> Lexed {
    Scanner::tokenize(source)
}

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("Lexer error at line {line}, column {column}: {kind}")]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

/// What went wrong while lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LexErrorKind {
    #[error("unterminated opening tag")]
    UnterminatedTag,
    #[error("unterminated closing tag")]
    UnterminatedClosingTag,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated expression")]
    UnterminatedExpression,
}
