//! Template parser.
//!
//! Recursive descent over the token stream. Every opening tag is matched
//! with its closing tag; running out of tokens closes whatever is still
//! open, so a token stream cut short by a lexer error still parses.

use crate::ast::{
    Branch, Children, Component, Conditional, Element, Loop, LoopMode, Node, RawElement, Template,
};
use crate::{ParseError, ParseErrorKind, ParseWarning, ParseWarningKind};
use moon_lexer::token::TEXT_TAG;
use moon_lexer::{is_void_element, AttributeValue, Attributes, Span, Token, TokenKind};

/// An opening tag taken off the token stream.
struct OpenTag {
    name: String,
    attributes: Attributes,
    self_closing: bool,
    span: Span,
}

/// Template parser.
///
/// Converts the flat token stream from the lexer into a tree of [`Node`]s.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    warnings: Vec<ParseWarning>,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            warnings: Vec::new(),
        }
    }

    /// Lex and parse template source.
    ///
    /// Lexer diagnostics are not fatal: they are returned in
    /// [`Template::diagnostics`] alongside the nodes parsed from the tokens
    /// that were recovered.
    pub fn parse(source: &str) -> Result<Template, ParseError> {
        let lexed = moon_lexer::lex(source);
        let mut parser = Parser::new(lexed.tokens);
        let nodes = parser.parse_nodes()?;
        Ok(Template {
            nodes,
            diagnostics: lexed.errors,
            warnings: parser.warnings,
        })
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Parse all tokens into sibling root nodes.
    pub fn parse_nodes(&mut self) -> Result<Vec<Node>, ParseError> {
        self.parse_children(None)
    }

    /// Parse siblings until the closing tag of `parent` (or the end of
    /// input). The closing tag is consumed.
    fn parse_children(&mut self, parent: Option<&str>) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.get(self.pos) {
            if let TokenKind::TagClose { name } = &token.kind {
                if parent == Some(name.as_str()) {
                    self.pos += 1;
                    return Ok(nodes);
                }
                let kind = ParseErrorKind::UnmatchedClosingTag {
                    expected: parent.map(str::to_string),
                    found: name.clone(),
                };
                return Err(error_at(token.span, kind));
            }

            if let Some(tag) = self.take_open_tag() {
                nodes.push(self.parse_tag(tag)?);
            }
        }

        Ok(nodes)
    }

    /// Classify one opening tag and parse whatever belongs to it.
    fn parse_tag(&mut self, mut tag: OpenTag) -> Result<Node, ParseError> {
        match tag.name.as_str() {
            TEXT_TAG => {
                self.parse_structural_children(&tag)?;
                let content = tag
                    .attributes
                    .remove("")
                    .unwrap_or_else(|| AttributeValue::literal("\"\""));
                Ok(Node::Text(content))
            }
            "element" => self.parse_raw_element(tag),
            "if" => self.parse_conditional(tag),
            "else-if" | "else" => Err(error_at(
                tag.span,
                ParseErrorKind::DanglingBranch { name: tag.name },
            )),
            "for" => self.parse_loop(tag),
            name if name.starts_with(|c: char| c.is_uppercase()) => {
                let children = self.parse_element_children(&mut tag)?;
                Ok(Node::Component(Component {
                    name: tag.name,
                    attributes: tag.attributes,
                    children,
                }))
            }
            _ => {
                let children = self.parse_element_children(&mut tag)?;
                Ok(Node::Element(Element {
                    tag: tag.name,
                    attributes: tag.attributes,
                    children,
                }))
            }
        }
    }

    // =========================================================================
    // Directives
    // =========================================================================

    /// `<element name={...} data={...} children={...}/>`
    fn parse_raw_element(&mut self, mut tag: OpenTag) -> Result<Node, ParseError> {
        self.parse_structural_children(&tag)?;

        let name = tag
            .attributes
            .remove("name")
            .ok_or_else(|| missing_attribute(&tag, "name"))?;
        let data = tag
            .attributes
            .remove("data")
            .unwrap_or_else(|| AttributeValue::expression("{}"));
        let children = tag
            .attributes
            .remove("children")
            .unwrap_or_else(|| AttributeValue::expression("[]"));

        Ok(Node::RawElement(RawElement {
            name,
            data,
            children,
        }))
    }

    /// `<if={a}>..</if><else-if={b}>..</else-if><else>..</else>`
    ///
    /// Without an `<else>` the chain ends with an empty text branch.
    fn parse_conditional(&mut self, tag: OpenTag) -> Result<Node, ParseError> {
        let mut branches = vec![self.parse_branch(tag, true)?];

        loop {
            let next = self.peek_open_name().map(str::to_string);
            match next.as_deref() {
                Some("else-if") | Some("else") => {
                    let Some(tag) = self.take_open_tag() else {
                        break;
                    };
                    let has_condition = tag.name == "else-if";
                    branches.push(self.parse_branch(tag, has_condition)?);
                    if !has_condition {
                        return Ok(Node::Conditional(Conditional { branches }));
                    }
                }
                _ => break,
            }
        }

        branches.push(Branch {
            condition: None,
            body: Box::new(Node::empty_text()),
        });
        Ok(Node::Conditional(Conditional { branches }))
    }

    fn parse_branch(&mut self, mut tag: OpenTag, has_condition: bool) -> Result<Branch, ParseError> {
        let condition = if has_condition {
            let condition = tag
                .attributes
                .remove("")
                .ok_or_else(|| missing_attribute(&tag, "condition"))?;
            Some(condition)
        } else {
            None
        };

        Ok(Branch {
            condition,
            body: Box::new(self.parse_body(&tag)?),
        })
    }

    /// `<for={$item,$index} of={list} name='ul' data={{...}}>..</for>`
    fn parse_loop(&mut self, mut tag: OpenTag) -> Result<Node, ParseError> {
        let of = tag.attributes.remove("of");
        let within = tag.attributes.remove("in");
        let (mode, source) = match (of, within) {
            (Some(source), None) => (LoopMode::Of, source),
            (None, Some(source)) => (LoopMode::In, source),
            (None, None) => return Err(error_at(tag.span, ParseErrorKind::MissingLoopSource)),
            (Some(_), Some(_)) => {
                return Err(error_at(tag.span, ParseErrorKind::AmbiguousLoopSource))
            }
        };

        let bound = tag
            .attributes
            .remove("")
            .ok_or_else(|| missing_attribute(&tag, "bound variables"))?;
        let mut names = bound_names(&bound).into_iter();
        let item = names
            .next()
            .ok_or_else(|| missing_attribute(&tag, "bound variables"))?;
        let secondary = names.next();

        let wrapper_tag = tag.attributes.remove("name");
        let wrapper_data = tag.attributes.remove("data");
        let body = self.parse_body(&tag)?;

        Ok(Node::Loop(Loop {
            mode,
            item,
            secondary,
            source,
            wrapper_tag,
            wrapper_data,
            body: Box::new(body),
        }))
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Nested markup of a tag, or nothing for self-closing and void tags.
    /// A void tag may still be closed explicitly: `<input></input>`.
    fn parse_structural_children(&mut self, tag: &OpenTag) -> Result<Vec<Node>, ParseError> {
        if tag.self_closing {
            Ok(Vec::new())
        } else if is_void_element(&tag.name) {
            if self.peek_close_name() == Some(tag.name.as_str()) {
                self.pos += 1;
            }
            Ok(Vec::new())
        } else {
            self.parse_children(Some(&tag.name))
        }
    }

    /// Children of an element or component. A `children` attribute wins
    /// over nested markup, which is still consumed.
    fn parse_element_children(&mut self, tag: &mut OpenTag) -> Result<Children, ParseError> {
        let nested = self.parse_structural_children(tag)?;
        Ok(match tag.attributes.remove("children") {
            Some(value) => Children::Value(value),
            None => Children::Nodes(nested),
        })
    }

    /// Body of a branch or loop: the first nested node. Any further nodes
    /// are dropped with a warning.
    fn parse_body(&mut self, tag: &OpenTag) -> Result<Node, ParseError> {
        let mut children = self.parse_structural_children(tag)?.into_iter();
        let body = children.next().unwrap_or_else(Node::empty_text);

        let ignored = children.count();
        if ignored > 0 {
            self.warnings.push(ParseWarning {
                kind: ParseWarningKind::IgnoredChildren {
                    tag: tag.name.clone(),
                    ignored,
                },
                line: tag.span.line,
                column: tag.span.column,
            });
        }
        Ok(body)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn take_open_tag(&mut self) -> Option<OpenTag> {
        let token = self.tokens.get(self.pos)?;
        let TokenKind::TagOpen {
            name,
            attributes,
            self_closing,
        } = &token.kind
        else {
            return None;
        };

        let tag = OpenTag {
            name: name.clone(),
            attributes: attributes.clone(),
            self_closing: *self_closing,
            span: token.span,
        };
        self.pos += 1;
        Some(tag)
    }

    fn peek_close_name(&self) -> Option<&str> {
        match &self.tokens.get(self.pos)?.kind {
            TokenKind::TagClose { name } => Some(name),
            TokenKind::TagOpen { .. } => None,
        }
    }

    fn peek_open_name(&self) -> Option<&str> {
        match &self.tokens.get(self.pos)?.kind {
            TokenKind::TagOpen { name, .. } => Some(name),
            TokenKind::TagClose { .. } => None,
        }
    }
}

/// Split `{$item,$index}` into its names.
fn bound_names(bound: &AttributeValue) -> Vec<String> {
    let list = if bound.is_expression {
        bound.source.as_str()
    } else {
        bound.source.trim_matches(|c| c == '"' || c == '\'')
    };

    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn missing_attribute(tag: &OpenTag, attribute: &str) -> ParseError {
    error_at(
        tag.span,
        ParseErrorKind::MissingAttribute {
            tag: tag.name.clone(),
            attribute: attribute.to_string(),
        },
    )
}

fn error_at(span: Span, kind: ParseErrorKind) -> ParseError {
    ParseError {
        kind,
        line: span.line,
        column: span.column,
    }
}
