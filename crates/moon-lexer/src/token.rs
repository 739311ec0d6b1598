/// A region of source text: byte offsets plus the line and column of `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// The value of an attribute, kept as the exact source text.
///
/// Literals keep their quotes (`'bar'`), expressions hold the code between
/// the outer braces (`count + 1`). The text is never evaluated here.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AttributeValue {
    pub source: String,
    pub is_expression: bool,
}

impl AttributeValue {
    pub fn literal(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            is_expression: false,
        }
    }

    pub fn expression(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            is_expression: true,
        }
    }
}

/// Insertion-ordered attribute map.
///
/// Output order matters both for `token_to_source` and for the generated
/// data objects, so this is a list rather than a hash map. Inserting an
/// existing name replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Attributes(Vec<(String, AttributeValue)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

/// Token classification for template source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum TokenKind {
    /// `<name ...>` or `<name .../>`. Text and `{expr}` runs are also
    /// reported as self-closing `text` tags.
    TagOpen {
        name: String,
        attributes: Attributes,
        self_closing: bool,
    },

    /// `</name>`
    TagClose { name: String },
}

/// A token produced by the template lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Tag name of either an opening or a closing tag.
    pub fn name(&self) -> &str {
        match &self.kind {
            TokenKind::TagOpen { name, .. } | TokenKind::TagClose { name } => name,
        }
    }
}

/// Reconstruct the source text of a single token.
///
/// Attribute order, quoting and the self-closing marker are reproduced;
/// bare boolean attributes come back as `name={true}`. Text tokens come back
/// as inline text, including those written as `<text=.../>`.
pub fn token_to_source(token: &Token) -> String {
    match &token.kind {
        TokenKind::TagClose { name } => format!("</{name}>"),
        TokenKind::TagOpen {
            name, attributes, ..
        } if name == TEXT_TAG => match attributes.get("") {
            Some(content) if content.is_expression => format!("{{{}}}", content.source),
            Some(content) => unquote_text(&content.source),
            None => String::new(),
        },
        TokenKind::TagOpen {
            name,
            attributes,
            self_closing,
        } => {
            let mut tag = format!("<{name}");
            for (attribute, value) in attributes.iter() {
                if !attribute.is_empty() {
                    tag.push(' ');
                    tag.push_str(attribute);
                }
                tag.push('=');
                if value.is_expression {
                    tag.push('{');
                    tag.push_str(&value.source);
                    tag.push('}');
                } else {
                    tag.push_str(&value.source);
                }
            }
            if *self_closing {
                tag.push('/');
            }
            tag.push('>');
            tag
        }
    }
}

/// Tag name used for implicit text tokens.
pub const TEXT_TAG: &str = "text";

/// HTML5 void elements (self-closing, no children).
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Check if a tag name is an HTML5 void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Wrap raw text in a double-quoted JavaScript string literal.
pub fn quote_text(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Inverse of [`quote_text`]. Input that is not a quoted literal is
/// returned unchanged.
pub fn unquote_text(literal: &str) -> String {
    let inner = match literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => return literal.to_string(),
    };

    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('r') => text.push('\r'),
            Some('t') => text.push('\t'),
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => text.push(decoded),
                    None => {
                        text.push_str("\\u");
                        text.push_str(&code);
                    }
                }
            }
            Some(other) => text.push(other),
            None => text.push('\\'),
        }
    }
    text
}
