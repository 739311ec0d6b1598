//! WASM bindings for the Moon template compiler.
//!
//! Exposes `compile()`, `lex()` and `tokenToSource()` to JavaScript via
//! wasm-bindgen. `compile()` returns `{ code, slots, diagnostics, warnings }`
//! or throws on parse errors.

use moon_lexer::{LexerError, Token};
use moon_parser::ParseWarning;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A lexer diagnostic or parser warning as seen from JavaScript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<&LexerError> for Diagnostic {
    fn from(error: &LexerError) -> Self {
        Self {
            message: error.to_string(),
            line: error.line,
            column: error.column,
        }
    }
}

impl From<&ParseWarning> for Diagnostic {
    fn from(warning: &ParseWarning) -> Self {
        Self {
            message: warning.to_string(),
            line: warning.line,
            column: warning.column,
        }
    }
}

/// Result of `lex()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

fn diagnostics<'a, T>(items: &'a [T]) -> Vec<Diagnostic>
where
    Diagnostic: From<&'a T>,
{
    items.iter().map(Diagnostic::from).collect()
}

fn lex_output(source: &str) -> LexOutput {
    let lexed = moon_lexer::lex(source);
    LexOutput {
        diagnostics: diagnostics(&lexed.errors),
        tokens: lexed.tokens,
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

/// Compile Moon template source to a render function body.
///
/// Returns a JS object with
/// `{ code: string, slots: number, diagnostics: [], warnings: [] }`.
/// Throws a JS error if the template cannot be parsed.
#[wasm_bindgen]
pub fn compile(source: &str) -> Result<JsValue, JsError> {
    let output = moon_generator::compile(source).map_err(|e| JsError::new(&e.to_string()))?;

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"code".into(), &output.code.into())
        .map_err(|_| JsError::new("Failed to set code property"))?;
    js_sys::Reflect::set(&js_obj, &"slots".into(), &(output.slots as f64).into())
        .map_err(|_| JsError::new("Failed to set slots property"))?;
    js_sys::Reflect::set(
        &js_obj,
        &"diagnostics".into(),
        &to_js(&diagnostics(&output.diagnostics))?,
    )
    .map_err(|_| JsError::new("Failed to set diagnostics property"))?;
    js_sys::Reflect::set(
        &js_obj,
        &"warnings".into(),
        &to_js(&diagnostics(&output.warnings))?,
    )
    .map_err(|_| JsError::new("Failed to set warnings property"))?;

    Ok(js_obj.into())
}

/// Tokenize template source. Returns `{ tokens, diagnostics }`; never throws
/// on malformed markup.
#[wasm_bindgen]
pub fn lex(source: &str) -> Result<JsValue, JsError> {
    to_js(&lex_output(source))
}

/// Reconstruct the source text of a token produced by `lex()`.
#[wasm_bindgen(js_name = tokenToSource)]
pub fn token_to_source(token: JsValue) -> Result<String, JsError> {
    let token: Token =
        serde_wasm_bindgen::from_value(token).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(moon_lexer::token_to_source(&token))
}

/// Get the compiler version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
