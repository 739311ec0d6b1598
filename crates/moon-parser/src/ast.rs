//! Abstract Syntax Tree for Moon view templates.
//!
//! Attribute values and expressions stay opaque [`AttributeValue`]s; the
//! tree only records structure.

use crate::ParseWarning;
use moon_lexer::{AttributeValue, Attributes, LexerError};

/// A parsed template: sibling root nodes plus any non-fatal lexer
/// diagnostics (the nodes then describe the input up to the lex failure)
/// and parser warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Template {
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<LexerError>,
    pub warnings: Vec<ParseWarning>,
}

/// A node in the template tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "node"))]
pub enum Node {
    /// A host element (`div`, `p`, ...).
    Element(Element),

    /// Text content: a quoted literal or an expression.
    Text(AttributeValue),

    /// A reference to a component (tag name starts with an uppercase letter).
    Component(Component),

    /// The `element` directive: name, data and children supplied directly.
    RawElement(RawElement),

    /// An `if` / `else-if` / `else` chain.
    Conditional(Conditional),

    /// A `for` loop.
    Loop(Loop),
}

impl Node {
    /// The empty text node used where a body is missing.
    pub fn empty_text() -> Self {
        Node::Text(AttributeValue::literal("\"\""))
    }
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Element {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Children,
}

/// A component reference.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Component {
    pub name: String,
    pub attributes: Attributes,
    pub children: Children,
}

/// Children of an element or component.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Children {
    /// Children nested in the markup.
    Nodes(Vec<Node>),

    /// A `children` attribute, which replaces nested markup entirely.
    Value(AttributeValue),
}

impl Default for Children {
    fn default() -> Self {
        Children::Nodes(Vec::new())
    }
}

/// `<element name=... data=... children=.../>`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawElement {
    pub name: AttributeValue,
    pub data: AttributeValue,
    pub children: AttributeValue,
}

/// A conditional chain. The last branch, and only the last, has no
/// condition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Conditional {
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Branch {
    pub condition: Option<AttributeValue>,
    pub body: Box<Node>,
}

/// Loop iteration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LoopMode {
    /// `of={list}`: indices `0..list.length`.
    Of,
    /// `in={object}`: enumerable keys.
    In,
}

/// `<for={$item,$index} of={list}>` / `<for={$key,$value} in={object}>`
///
/// In `Of` mode `secondary` names the index; in `In` mode `item` is the key
/// and `secondary` the looked-up value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Loop {
    pub mode: LoopMode,
    pub item: String,
    pub secondary: Option<String>,
    pub source: AttributeValue,
    pub wrapper_tag: Option<AttributeValue>,
    pub wrapper_data: Option<AttributeValue>,
    pub body: Box<Node>,
}
