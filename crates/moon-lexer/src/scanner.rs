use crate::token::{
    quote_text, AttributeValue, Attributes, Span, Token, TokenKind, TEXT_TAG,
};
use crate::{LexErrorKind, LexerError};

/// Result of scanning a template.
///
/// Lexing never aborts the caller: when the input is malformed, `errors`
/// describes the problem and `tokens` holds everything scanned before it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexerError>,
}

impl Lexed {
    /// `true` when the whole source was tokenized.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Template source scanner.
///
/// Works over a `Vec<char>` for index-based lookahead while tracking the byte
/// offset, line and column of the cursor for spans and diagnostics.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

/// Cursor snapshot taken at the start of a construct.
#[derive(Debug, Clone, Copy)]
struct Mark {
    offset: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    /// Create a new scanner for the given source.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            offset: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source, keeping a partial result on failure.
    pub fn tokenize(source: &str) -> Lexed {
        let mut scanner = Scanner::new(source);
        let errors = match scanner.scan_tokens() {
            Ok(()) => Vec::new(),
            Err(error) => vec![error],
        };
        Lexed {
            tokens: scanner.tokens,
            errors,
        }
    }

    fn scan_tokens(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }
        Ok(())
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        match self.peek() {
            '<' if self.starts_with("<!--") => self.scan_comment(),
            '<' if self.peek_next() == '/' => self.scan_closing_tag(),
            '<' => self.scan_opening_tag(),
            '{' => self.scan_expression_text(),
            _ => {
                self.scan_text();
                Ok(())
            }
        }
    }

    // --- Markup ---

    /// Skip `<!-- ... -->`. Comments never produce tokens.
    fn scan_comment(&mut self) -> Result<(), LexerError> {
        let start = self.mark();
        self.advance_by(4);

        while !self.starts_with("-->") {
            if self.is_at_end() {
                return Err(self.error_at(start, LexErrorKind::UnterminatedComment));
            }
            self.advance();
        }

        self.advance_by(3);
        Ok(())
    }

    /// Scan `</name>`.
    fn scan_closing_tag(&mut self) -> Result<(), LexerError> {
        let start = self.mark();
        self.advance_by(2);

        let mut name = String::new();
        while self.peek() != '>' {
            if self.is_at_end() {
                return Err(self.error_at(start, LexErrorKind::UnterminatedClosingTag));
            }
            name.push(self.advance());
        }
        self.advance(); // consume `>`

        let kind = TokenKind::TagClose {
            name: name.trim().to_string(),
        };
        self.push(kind, start);
        Ok(())
    }

    /// Scan `<name attr=value ...>` or the self-closing form.
    ///
    /// A value written directly after the tag name (`<if={cond}>`) is stored
    /// under the empty attribute name.
    fn scan_opening_tag(&mut self) -> Result<(), LexerError> {
        let start = self.mark();
        self.advance(); // consume `<`

        let name = self.take_while(|c, _| !(c.is_whitespace() || matches!(c, '/' | '>' | '=')));
        let mut attributes = Attributes::new();

        if self.peek() == '=' {
            self.advance();
            let value = self.scan_attribute_value(start)?;
            attributes.insert("", value);
        }

        let self_closing = loop {
            self.skip_whitespace();

            if self.is_at_end() {
                return Err(self.error_at(start, LexErrorKind::UnterminatedTag));
            }

            match self.peek() {
                '>' => {
                    self.advance();
                    break false;
                }
                '/' if self.peek_next() == '>' => {
                    self.advance_by(2);
                    break true;
                }
                '/' | '=' => {
                    // Stray punctuation between attributes.
                    self.advance();
                }
                _ => {
                    let (attribute, value) = self.scan_attribute(start)?;
                    attributes.insert(attribute, value);
                }
            }
        };

        let kind = TokenKind::TagOpen {
            name,
            attributes,
            self_closing,
        };
        self.push(kind, start);
        Ok(())
    }

    /// Scan a single `name`, `name=value` or `@event={handler}` attribute.
    fn scan_attribute(&mut self, tag: Mark) -> Result<(String, AttributeValue), LexerError> {
        let raw_name =
            self.take_while(|c, next| !(c.is_whitespace() || c == '=' || c == '>' || (c == '/' && next == '>')));

        let value = if self.peek() == '=' {
            self.advance();
            self.scan_attribute_value(tag)?
        } else {
            AttributeValue::expression("true")
        };

        if raw_name.starts_with('@') {
            return Ok((raw_name, event_handler(value)));
        }

        let name = match raw_name.as_str() {
            "class" => "className".to_string(),
            "for" => "htmlFor".to_string(),
            _ => raw_name,
        };
        Ok((name, value))
    }

    /// Scan a quoted literal, a `{...}` expression or a bare word.
    fn scan_attribute_value(&mut self, tag: Mark) -> Result<AttributeValue, LexerError> {
        match self.peek() {
            '"' | '\'' => {
                let mut source = String::new();
                if !self.copy_quoted(&mut source) {
                    return Err(self.error_at(tag, LexErrorKind::UnterminatedTag));
                }
                Ok(AttributeValue::literal(source))
            }
            '{' => match self.scan_braced() {
                Some(code) => Ok(AttributeValue::expression(code)),
                None => Err(self.error_at(tag, LexErrorKind::UnterminatedTag)),
            },
            _ => {
                let word = self.take_while(|c, next| {
                    !(c.is_whitespace() || c == '>' || (c == '/' && next == '>'))
                });
                Ok(AttributeValue::literal(quote_text(&word)))
            }
        }
    }

    // --- Text ---

    /// Scan an inline `{expr}` into an implicit text token.
    fn scan_expression_text(&mut self) -> Result<(), LexerError> {
        let start = self.mark();
        let code = match self.scan_braced() {
            Some(code) => code,
            None => return Err(self.error_at(start, LexErrorKind::UnterminatedExpression)),
        };
        self.push(text_kind(AttributeValue::expression(code)), start);
        Ok(())
    }

    /// Scan literal text up to the next tag or expression. Whitespace-only
    /// runs are layout and produce no token.
    fn scan_text(&mut self) {
        let start = self.mark();
        let text = self.take_while(|c, _| c != '<' && c != '{');
        if text.chars().all(char::is_whitespace) {
            return;
        }
        self.push(text_kind(AttributeValue::literal(quote_text(&text))), start);
    }

    // --- Shared sub-scanners ---

    /// Consume `{...}` with brace nesting and return the inner code, or
    /// `None` if the input ends first. Braces inside string literals do not
    /// count.
    fn scan_braced(&mut self) -> Option<String> {
        self.advance(); // consume `{`

        let mut code = String::new();
        let mut depth = 1;

        loop {
            match self.peek() {
                _ if self.is_at_end() => return None,
                '{' => {
                    depth += 1;
                    code.push(self.advance());
                }
                '}' => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return Some(code);
                    }
                    code.push('}');
                }
                '"' | '\'' | '`' => {
                    if !self.copy_quoted(&mut code) {
                        return None;
                    }
                }
                _ => code.push(self.advance()),
            }
        }
    }

    /// Copy a quoted string (quotes included) into `out`. Returns `false`
    /// if the closing quote is missing.
    fn copy_quoted(&mut self, out: &mut String) -> bool {
        let quote = self.advance();
        out.push(quote);

        loop {
            if self.is_at_end() {
                return false;
            }
            let c = self.advance();
            out.push(c);
            if c == '\\' {
                if self.is_at_end() {
                    return false;
                }
                out.push(self.advance());
            } else if c == quote {
                return true;
            }
        }
    }

    // --- Helpers ---

    fn push(&mut self, kind: TokenKind, start: Mark) {
        let span = Span::new(start.offset, self.offset, start.line, start.column);
        self.tokens.push(Token::new(kind, span));
    }

    fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Consume characters while `keep(current, next)` holds.
    fn take_while(&mut self, keep: impl Fn(char, char) -> bool) -> String {
        let mut taken = String::new();
        while !self.is_at_end() && keep(self.peek(), self.peek_next()) {
            taken.push(self.advance());
        }
        taken
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn peek_next(&self) -> char {
        if self.pos + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.pos + 1]
        }
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.is_at_end() {
            self.pos += 1;
            self.offset += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error_at(&self, at: Mark, kind: LexErrorKind) -> LexerError {
        LexerError {
            kind,
            line: at.line,
            column: at.column,
        }
    }
}

fn text_kind(content: AttributeValue) -> TokenKind {
    let mut attributes = Attributes::new();
    attributes.insert("", content);
    TokenKind::TagOpen {
        name: TEXT_TAG.to_string(),
        attributes,
        self_closing: true,
    }
}

/// Event handlers are always expressions; `@click="save"` means `{save}`.
fn event_handler(value: AttributeValue) -> AttributeValue {
    if value.is_expression {
        return value;
    }
    let mut chars = value.source.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'') => {
            AttributeValue::expression(chars.as_str())
        }
        _ => AttributeValue::expression(value.source),
    }
}
