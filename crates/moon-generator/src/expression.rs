//! Identifier scan over embedded expressions.
//!
//! Expressions are opaque JavaScript. This pass only walks them token by
//! token to bind free names to the render context:
//!
//! - model names become `md.<name>`
//! - `children` becomes `mc`
//! - `$`-prefixed names are template locals and stay as written
//! - globals, keywords, object keys, member names and literals are copied
//! - arrow function parameters are copied where they are used
//! - `${...}` inside template literals is scanned like any other code
//!
//! An expression that references no model name, local or `children` is
//! static: it evaluates to the same value on every render.

use std::collections::HashSet;

/// Reserved words and standard built-ins, never looked up on the model.
/// Sorted for binary search.
const GLOBALS: &[&str] = &[
    "Array",
    "BigInt",
    "Boolean",
    "Date",
    "Error",
    "Infinity",
    "Intl",
    "JSON",
    "Map",
    "Math",
    "NaN",
    "Number",
    "Object",
    "Promise",
    "Reflect",
    "RegExp",
    "Set",
    "String",
    "Symbol",
    "WeakMap",
    "WeakSet",
    "arguments",
    "async",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "console",
    "const",
    "continue",
    "debugger",
    "decodeURI",
    "decodeURIComponent",
    "default",
    "delete",
    "do",
    "document",
    "else",
    "encodeURI",
    "encodeURIComponent",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "globalThis",
    "if",
    "import",
    "in",
    "instanceof",
    "isFinite",
    "isNaN",
    "let",
    "new",
    "null",
    "of",
    "parseFloat",
    "parseInt",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "window",
    "with",
    "yield",
];

/// Name of the children passed in by the caller.
pub const CHILDREN: &str = "children";

/// Marks an open `${` on the bracket stack.
const INTERPOLATION: char = '$';

/// A rewritten expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanned {
    pub code: String,
    pub is_static: bool,
}

/// Rewrite the free names of `source` and classify it.
pub fn scan(source: &str) -> Scanned {
    let mut scanner = ExprScanner::new(source);
    scanner.run();
    Scanned {
        code: scanner.out,
        is_static: !scanner.dynamic,
    }
}

struct ExprScanner {
    chars: Vec<char>,
    pos: usize,
    out: String,
    dynamic: bool,
    /// Open brackets, innermost last.
    brackets: Vec<char>,
    /// Arrow function parameters seen so far.
    params: HashSet<String>,
}

impl ExprScanner {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            out: String::with_capacity(source.len() + 8),
            dynamic: false,
            brackets: Vec::new(),
            params: HashSet::new(),
        }
    }

    /// Scan to the end of input, or to the `}` closing the innermost `${`.
    fn run(&mut self) {
        while let Some(c) = self.peek(0) {
            match c {
                '"' | '\'' => self.copy_string(c),
                '`' => self.copy_template(),
                '.' if self.peek(1) == Some('.') && self.peek(2) == Some('.') => {
                    self.copy(3);
                }
                '.' if self.peek(1).is_some_and(is_ident_start) => {
                    // Member access: `.length`, `?.name`
                    self.copy(1);
                    let name = self.take_ident();
                    self.out.push_str(&name);
                }
                c if c.is_ascii_digit() => {
                    let len = self.run_length(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
                    self.copy(len);
                }
                c if is_ident_start(c) => self.identifier(),
                '(' => {
                    self.collect_arrow_params();
                    self.brackets.push(c);
                    self.copy(1);
                }
                '{' | '[' => {
                    self.brackets.push(c);
                    self.copy(1);
                }
                '}' | ')' | ']' => {
                    let open = self.brackets.pop();
                    self.copy(1);
                    if open == Some(INTERPOLATION) {
                        return;
                    }
                }
                _ => self.copy(1),
            }
        }
    }

    fn identifier(&mut self) {
        let name = self.take_ident();
        let in_object = self.brackets.last() == Some(&'{')
            && matches!(self.previous_before(&name), Some('{') | Some(','));
        let next = self.next_significant();

        if in_object && next == Some(':') {
            // Object key.
            self.out.push_str(&name);
            return;
        }

        if GLOBALS.binary_search(&name.as_str()).is_ok() {
            self.out.push_str(&name);
            return;
        }

        if self.starts_arrow() {
            // `x => ...`
            self.params.insert(name.clone());
        }
        if self.params.contains(&name) {
            self.out.push_str(&name);
            return;
        }

        let bound = self.bind(&name);
        if in_object && matches!(next, Some(',') | Some('}')) && bound != name {
            // Shorthand property `{count}` keeps its key.
            self.out.push_str(&name);
            self.out.push_str(": ");
        }
        self.out.push_str(&bound);
    }

    /// Resolve a free name against the render context.
    fn bind(&mut self, name: &str) -> String {
        self.dynamic = true;
        if name.starts_with('$') {
            name.to_string()
        } else if name == CHILDREN {
            "mc".to_string()
        } else {
            format!("md.{name}")
        }
    }

    /// At `(`: when the group is an arrow parameter list, record its names.
    ///
    /// Parameters are the names directly after `(`, `,`, `{`, `[` or `...`;
    /// names inside default values stay free.
    fn collect_arrow_params(&mut self) {
        let Some(close) = self.matching_paren(self.pos) else {
            return;
        };
        let after: String = self.chars[close + 1..]
            .iter()
            .filter(|c| !c.is_whitespace())
            .take(2)
            .collect();
        if after != "=>" {
            return;
        }

        let mut i = self.pos + 1;
        let mut previous = '(';
        while i < close {
            let c = self.chars[i];
            if is_ident_start(c) {
                let len = self.chars[i..close]
                    .iter()
                    .take_while(|&&c| is_ident_part(c))
                    .count();
                if matches!(previous, '(' | ',' | '{' | '[' | '.') {
                    self.params.insert(self.chars[i..i + len].iter().collect());
                }
                previous = 'a';
                i += len;
            } else {
                if !c.is_whitespace() {
                    previous = c;
                }
                i += 1;
            }
        }
    }

    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut quote = None;
        let mut i = open;
        while let Some(&c) = self.chars.get(i) {
            match (quote, c) {
                (Some(_), '\\') => i += 1,
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'' | '`') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// The cursor (just past a name) sits before `=>`.
    fn starts_arrow(&self) -> bool {
        let rest = &self.chars[self.pos..];
        let start = rest.iter().take_while(|c| c.is_whitespace()).count();
        rest.get(start) == Some(&'=') && rest.get(start + 1) == Some(&'>')
    }

    /// Copy a quoted string verbatim.
    fn copy_string(&mut self, quote: char) {
        self.copy(1);
        while let Some(c) = self.peek(0) {
            if c == '\\' {
                self.copy(2);
            } else if c == quote {
                self.copy(1);
                return;
            } else {
                self.copy(1);
            }
        }
    }

    /// Copy a template literal, scanning each `${...}` as an expression.
    fn copy_template(&mut self) {
        self.copy(1);
        while let Some(c) = self.peek(0) {
            match c {
                '\\' => self.copy(2),
                '`' => {
                    self.copy(1);
                    return;
                }
                '$' if self.peek(1) == Some('{') => {
                    self.copy(2);
                    self.brackets.push(INTERPOLATION);
                    self.run();
                }
                _ => self.copy(1),
            }
        }
    }

    fn take_ident(&mut self) -> String {
        let len = self.run_length(is_ident_part);
        let name: String = self.chars[self.pos..self.pos + len].iter().collect();
        self.pos += len;
        name
    }

    fn copy(&mut self, count: usize) {
        for _ in 0..count {
            let Some(c) = self.peek(0) else {
                return;
            };
            self.out.push(c);
            self.pos += 1;
        }
    }

    fn run_length(&self, matches: impl Fn(char) -> bool) -> usize {
        self.chars[self.pos..]
            .iter()
            .take_while(|&&c| matches(c))
            .count()
    }

    /// Significant character before an identifier that was just taken.
    fn previous_before(&self, name: &str) -> Option<char> {
        let start = self.pos - name.chars().count();
        self.chars[..start]
            .iter()
            .rev()
            .find(|c| !c.is_whitespace())
            .copied()
    }

    fn next_significant(&self) -> Option<char> {
        self.chars[self.pos..]
            .iter()
            .find(|c| !c.is_whitespace())
            .copied()
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(source: &str) -> String {
        scan(source).code
    }

    #[test]
    fn test_model_name() {
        assert_eq!(scan("message"), Scanned { code: "md.message".into(), is_static: false });
    }

    #[test]
    fn test_member_access_is_not_bound() {
        assert_eq!(code("list.length"), "md.list.length");
        assert_eq!(code("user?.name"), "md.user?.name");
    }

    #[test]
    fn test_locals_stay_dynamic() {
        assert_eq!(scan("$item"), Scanned { code: "$item".into(), is_static: false });
        assert_eq!(code("$item[$key]"), "$item[$key]");
    }

    #[test]
    fn test_children_binding() {
        assert_eq!(code("children"), "mc");
        assert_eq!(code("children.length"), "mc.length");
    }

    #[test]
    fn test_literals_are_static() {
        for source in ["true", "[]", "{}", "42", "1.5e3", "'text'", "\"a b\"", "() => true", "null"] {
            let scanned = scan(source);
            assert!(scanned.is_static, "{source} should be static");
            assert_eq!(scanned.code, source);
        }
    }

    #[test]
    fn test_strings_are_copied() {
        assert_eq!(code("'count' + count"), "'count' + md.count");
        assert_eq!(code("\"it\\\"s\" + x"), "\"it\\\"s\" + md.x");
    }

    // =========================================================================
    // Template literals
    // =========================================================================

    #[test]
    fn test_template_literal_interpolation_is_bound() {
        assert_eq!(
            scan("`Hi ${name}`"),
            Scanned { code: "`Hi ${md.name}`".into(), is_static: false }
        );
        assert_eq!(code("`${a + b}px`"), "`${md.a + md.b}px`");
    }

    #[test]
    fn test_template_literal_without_names_is_static() {
        assert_eq!(scan("`plain`"), Scanned { code: "`plain`".into(), is_static: true });
        assert!(scan("`${1 + 2}`").is_static);
    }

    #[test]
    fn test_nested_template_and_object_in_interpolation() {
        assert_eq!(code("`${`in ${x}`}`"), "`${`in ${md.x}`}`");
        assert_eq!(code("`${f({a: b})}` + c"), "`${md.f({a: md.b})}` + md.c");
        assert_eq!(code(r"`\${x}`"), r"`\${x}`");
    }

    // =========================================================================
    // Keywords, built-ins and arrow parameters
    // =========================================================================

    #[test]
    fn test_keywords_are_not_bound() {
        assert_eq!(
            code("function () { return save() }"),
            "function () { return md.save() }"
        );
        assert_eq!(code("async () => await load()"), "async () => await md.load()");
        assert_eq!(code("x instanceof Date"), "md.x instanceof Date");
    }

    #[test]
    fn test_builtins_are_not_bound() {
        assert_eq!(scan("Array.isArray(xs)"), Scanned {
            code: "Array.isArray(md.xs)".into(),
            is_static: false,
        });
        assert!(scan("parseInt('7', 10)").is_static);
        assert_eq!(code("Object.keys(obj)"), "Object.keys(md.obj)");
    }

    #[test]
    fn test_globals_are_sorted() {
        assert!(GLOBALS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_arrow_parameters_are_locals() {
        assert_eq!(code("(x) => save(x)"), "(x) => md.save(x)");
        assert_eq!(code("(a, b) => a + b + c"), "(a, b) => a + b + md.c");
        assert_eq!(code("x => x * factor"), "x => x * md.factor");
        assert!(scan("(a, b) => a + b").is_static);
    }

    #[test]
    fn test_arrow_parameter_defaults_stay_free() {
        assert_eq!(code("(a = limit) => a"), "(a = md.limit) => a");
        assert_eq!(code("({id}, ...rest) => id"), "({id}, ...rest) => id");
    }

    #[test]
    fn test_call_arguments_are_not_parameters() {
        assert_eq!(code("save(x)"), "md.save(md.x)");
    }

    #[test]
    fn test_object_keys() {
        assert_eq!(scan("{static: true}"), Scanned { code: "{static: true}".into(), is_static: true });
        assert_eq!(code("{dynamic: dynamic}"), "{dynamic: md.dynamic}");
        assert_eq!(code("{ custom: dynamic }"), "{ custom: md.dynamic }");
        assert_eq!(
            code("{foo: {bar: baz}, qux: false}"),
            "{foo: {bar: md.baz}, qux: false}"
        );
    }

    #[test]
    fn test_ternary_is_not_object_key() {
        assert_eq!(code("a ? b : c"), "md.a ? md.b : md.c");
        assert_eq!(code("{x: a ? b : c}"), "{x: md.a ? md.b : md.c}");
    }

    #[test]
    fn test_shorthand_property() {
        assert_eq!(code("{count, $item}"), "{count: md.count, $item}");
    }

    #[test]
    fn test_spread() {
        assert_eq!(code("[...items, extra]"), "[...md.items, md.extra]");
    }

    #[test]
    fn test_calls_and_operators() {
        assert_eq!(code("format(total * 2)"), "md.format(md.total * 2)");
        assert_eq!(code("typeof x === 'string'"), "typeof md.x === 'string'");
        assert_eq!(code("Math.max(a, 1)"), "Math.max(md.a, 1)");
    }

    #[test]
    fn test_number_suffix_is_not_a_name() {
        assert_eq!(code("0x1f + 10px"), "0x1f + 10px");
    }
}
