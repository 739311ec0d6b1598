//! Moon Code Generator
//!
//! Turns a template tree into the body of a JavaScript render function.
//! The body reads four free names supplied by the runtime: `m` (node
//! constructor), `md` (model data), `mc` (children passed by the caller) and
//! `ms` (the per-view memo cache).
//!
//! ```text
//! Node → Generator::generate() → if(ms[0]===undefined){...}<statements>return <root>;
//! ```
//!
//! Everything that can never change between renders is computed once in the
//! leading guard block and stored in `ms`; the rest is rebuilt on every call.

pub mod expression;
mod template;

use std::collections::HashMap;

use moon_lexer::LexerError;
use moon_parser::{Node, ParseError, ParseWarning, Parser};

/// The result of compiling a template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOutput {
    /// Render function body.
    pub code: String,
    /// Number of `ms` slots the body fills.
    pub slots: usize,
    /// Non-fatal lexer diagnostics. The code covers the input up to the
    /// first of them.
    pub diagnostics: Vec<LexerError>,
    /// Markup the parser accepted but dropped.
    pub warnings: Vec<ParseWarning>,
}

/// Compilation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Compile error: template is empty")]
    EmptyTemplate,

    #[error("Compile error: template must have a single root node, found {count}")]
    MultipleRoots { count: usize },
}

/// Generated render function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub code: String,
    pub slots: usize,
}

/// Slot and local allocation for one render function.
///
/// Both counters start at zero for every generator, so generating the same
/// tree twice yields identical code.
#[derive(Debug, Default)]
pub struct Generator {
    stores: String,
    slots: HashMap<String, usize>,
    next_local: usize,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the render function body for `root`.
    pub fn generate(mut self, root: &Node) -> Generated {
        let (prelude, value) = template::generate_node(root, &mut self).settle(&mut self);
        Generated {
            code: format!(
                "if(ms[0]===undefined){{{}}}{prelude}return {value};",
                self.stores
            ),
            slots: self.slot_count(),
        }
    }

    /// Store `code` in the memo cache and return the reference to it.
    /// Identical code shares one slot.
    pub fn hoist(&mut self, code: &str) -> String {
        let slot = match self.slots.get(code) {
            Some(&slot) => slot,
            None => {
                let slot = self.slots.len();
                self.slots.insert(code.to_string(), slot);
                self.stores.push_str(&format!("ms[{slot}]={code};"));
                slot
            }
        };
        format!("ms[{slot}]")
    }

    /// Next render-local variable: `m0`, `m1`, ...
    pub fn local(&mut self) -> String {
        let name = format!("m{}", self.next_local);
        self.next_local += 1;
        name
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Hoist a scanned value if it is static, otherwise use it inline.
    pub(crate) fn inline(&mut self, value: expression::Scanned) -> String {
        if value.is_static {
            self.hoist(&value.code)
        } else {
            value.code
        }
    }
}

/// Generate the render function body for `root` with a fresh generator.
pub fn generate(root: &Node) -> String {
    Generator::new().generate(root).code
}

/// Compile a template source end to end.
///
/// A template must have exactly one root node.
pub fn compile(source: &str) -> Result<CompilerOutput, CompileError> {
    let template = Parser::parse(source)?;
    let root = match template.nodes.as_slice() {
        [] => return Err(CompileError::EmptyTemplate),
        [root] => root,
        nodes => return Err(CompileError::MultipleRoots { count: nodes.len() }),
    };
    let generated = Generator::new().generate(root);

    Ok(CompilerOutput {
        code: generated.code,
        slots: generated.slots,
        diagnostics: template.diagnostics,
        warnings: template.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use moon_parser::ParseErrorKind;
    use pretty_assertions::assert_eq;

    fn assert_generate(input: &str, output: &str) {
        let template = Parser::parse(input).unwrap();
        assert_eq!(template.nodes.len(), 1, "{input}");
        assert_eq!(generate(&template.nodes[0]), output);
    }

    // =========================================================================
    // Generator
    // =========================================================================

    #[test]
    fn test_hoist_deduplicates() {
        let mut gen = Generator::new();
        assert_eq!(gen.hoist("{}"), "ms[0]");
        assert_eq!(gen.hoist("[]"), "ms[1]");
        assert_eq!(gen.hoist("{}"), "ms[0]");
        assert_eq!(gen.slot_count(), 2);
    }

    #[test]
    fn test_locals_count_up() {
        let mut gen = Generator::new();
        assert_eq!(gen.local(), "m0");
        assert_eq!(gen.local(), "m1");
    }

    #[test]
    fn test_guard_is_emitted_without_slots() {
        let template = Parser::parse("<element name='a' data={d} children={c}/>").unwrap();
        let generated = Generator::new().generate(&template.nodes[0]);
        assert_eq!(generated.slots, 0);
        assert!(generated.code.starts_with("if(ms[0]===undefined){}"));
    }

    #[test]
    fn test_generation_is_repeatable() {
        let template = Parser::parse("<div><if={a}><p>{b}</p></if><for={$x} of={xs}><i/></for></div>").unwrap();
        assert_eq!(generate(&template.nodes[0]), generate(&template.nodes[0]));
    }

    #[test]
    fn test_identical_static_subtrees_share_a_slot() {
        assert_generate(
            "<div id={id}><p>same</p><p>same</p></div>",
            r#"if(ms[0]===undefined){ms[0]=[m(0,"p",{},[m(1,"text",{"":"same"},[])]),m(0,"p",{},[m(1,"text",{"":"same"},[])])];}return m(0,"div",{"id":md.id},ms[0]);"#,
        );
        assert_generate(
            "<div><b>{x}</b><p>same</p><p>same</p></div>",
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};ms[2]=m(0,"p",{},[m(1,"text",{"":"same"},[])]);}return m(0,"div",ms[1],[m(0,"b",ms[1],[m(1,"text",{"":md.x},ms[0])]),ms[2],ms[2]]);"#,
        );
    }

    #[test]
    fn test_sibling_loops_use_distinct_locals() {
        assert_generate(
            "<div><for={$a} of={as}><i/></for><for={$b} of={bs}><i/></for></div>",
            r#"if(ms[0]===undefined){ms[0]=m(0,"i",{},[]);ms[1]={};}var m0=[];for(var m1=0;m1<md.as.length;m1++){var $a=md.as[m1];m0.push(ms[0]);}var m2=[];for(var m3=0;m3<md.bs.length;m3++){var $b=md.bs[m3];m2.push(ms[0]);}return m(0,"div",ms[1],[m(0,"span",ms[1],m0),m(0,"span",ms[1],m2)]);"#,
        );
    }

    #[test]
    fn test_shorthand_and_globals_in_attributes() {
        assert_generate(
            "<p title={Math.max(a, 1)} style={{color}}/>",
            r#"if(ms[0]===undefined){ms[0]=[];}return m(0,"p",{"title":Math.max(md.a, 1),"style":{color: md.color}},ms[0]);"#,
        );
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    #[test]
    fn test_generate_static_element() {
        assert_generate(
            r#"<div><h1>Test</h1><p>test</p></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"div",{},[m(0,"h1",{},[m(1,"text",{"":"Test"},[])]),m(0,"p",{},[m(1,"text",{"":"test"},[])])]);}return ms[0];"#,
        );
    }

    #[test]
    fn test_generate_dynamic_element() {
        assert_generate(
            r#"<div><h1>Test</h1><p>test {message}</p></div>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]=m(1,"text",{"":"test "},[]);ms[2]={};ms[3]=m(0,"h1",{},[m(1,"text",{"":"Test"},[])]);}return m(0,"div",ms[2],[ms[3],m(0,"p",ms[2],[ms[1],m(1,"text",{"":md.message},ms[0])])]);"#,
        );
    }

    #[test]
    fn test_generate_static_attributes() {
        assert_generate(
            r#"<div><h1 id='bar' class='foo'>Test</h1><p>test {message}</p></div>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]=m(1,"text",{"":"test "},[]);ms[2]={};ms[3]=m(0,"h1",{"id":'bar',"className":'foo'},[m(1,"text",{"":"Test"},[])]);}return m(0,"div",ms[2],[ms[3],m(0,"p",ms[2],[ms[1],m(1,"text",{"":md.message},ms[0])])]);"#,
        );
    }

    #[test]
    fn test_generate_dynamic_attributes() {
        assert_generate(
            r#"<div><h1 id='bar' class={foo}>Test</h1><p>test {message}</p></div>"#,
            r#"if(ms[0]===undefined){ms[0]=[m(1,"text",{"":"Test"},[])];ms[1]=[];ms[2]=m(1,"text",{"":"test "},[]);ms[3]={};}return m(0,"div",ms[3],[m(0,"h1",{"id":'bar',"className":md.foo},ms[0]),m(0,"p",ms[3],[ms[2],m(1,"text",{"":md.message},ms[1])])]);"#,
        );
    }

    #[test]
    fn test_generate_static_children_attribute() {
        assert_generate(
            r#"<div foo={bar} children={[]}></div>"#,
            r#"if(ms[0]===undefined){ms[0]=[];}return m(0,"div",{"foo":md.bar},ms[0]);"#,
        );
    }

    #[test]
    fn test_generate_dynamic_children_attribute() {
        assert_generate(
            r#"<div children={children}></div>"#,
            r#"if(ms[0]===undefined){ms[0]={};}return m(0,"div",ms[0],mc);"#,
        );
    }

    #[test]
    fn test_generate_events() {
        assert_generate(
            r#"<div><h1 id='bar' class={foo} @click={doSomething}>Test</h1><p>test {message}</p></div>"#,
            r#"if(ms[0]===undefined){ms[0]=[m(1,"text",{"":"Test"},[])];ms[1]=[];ms[2]=m(1,"text",{"":"test "},[]);ms[3]={};}return m(0,"div",ms[3],[m(0,"h1",{"id":'bar',"className":md.foo,"@click":[md.doSomething,md,mc]},ms[0]),m(0,"p",ms[3],[ms[2],m(1,"text",{"":md.message},ms[1])])]);"#,
        );
    }

    #[test]
    fn test_generate_static_components() {
        assert_generate(
            r#"<div><Component/></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"div",{},[m(2,"Component",{},[])]);}return ms[0];"#,
        );
    }

    #[test]
    fn test_generate_static_components_with_data() {
        assert_generate(
            r#"<div><Component foo='bar' bar='baz'/></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"div",{},[m(2,"Component",{"foo":'bar',"bar":'baz'},[])]);}return ms[0];"#,
        );
    }

    #[test]
    fn test_generate_static_components_with_children() {
        assert_generate(
            r#"<div><Component foo='bar' bar='baz'><p>static</p></Component></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"div",{},[m(2,"Component",{"foo":'bar',"bar":'baz'},[m(0,"p",{},[m(1,"text",{"":"static"},[])])])]);}return ms[0];"#,
        );
    }

    #[test]
    fn test_generate_dynamic_components_with_data() {
        assert_generate(
            r#"<div><Component foo={bar} bar='baz'/></div>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}return m(0,"div",ms[1],[m(2,"Component",{"foo":md.bar,"bar":'baz'},ms[0])]);"#,
        );
    }

    #[test]
    fn test_generate_dynamic_components_with_children() {
        assert_generate(
            r#"<div><Component foo={bar} bar='baz'><p>{message}</p></Component></div>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}return m(0,"div",ms[1],[m(2,"Component",{"foo":md.bar,"bar":'baz'},[m(0,"p",ms[1],[m(1,"text",{"":md.message},ms[0])])])]);"#,
        );
    }

    #[test]
    fn test_generate_text_directly() {
        assert_generate(
            r#"<text={foo}/>"#,
            r#"if(ms[0]===undefined){ms[0]=[];}return m(1,"text",{"":md.foo},ms[0]);"#,
        );
    }

    #[test]
    fn test_generate_static_element_nodes() {
        assert_generate(
            r#"<element name='h1' data={{static: true}} children={[]}/>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,'h1',{static: true},[]);}return ms[0];"#,
        );
    }

    #[test]
    fn test_generate_static_data_element_nodes() {
        assert_generate(
            r#"<element name='h1' data={{static: true}} children={dynamic}/>"#,
            r#"if(ms[0]===undefined){ms[0]={static: true};}return m(0,'h1',ms[0],md.dynamic);"#,
        );
    }

    #[test]
    fn test_generate_static_children_element_nodes() {
        assert_generate(
            r#"<element name='h1' data={{dynamic: dynamic}} children={[]}/>"#,
            r#"if(ms[0]===undefined){ms[0]=[];}return m(0,'h1',{dynamic: md.dynamic},ms[0]);"#,
        );
    }

    #[test]
    fn test_generate_dynamic_element_nodes() {
        assert_generate(
            r#"<element name='h1' data={dynamic} children={dynamicChildren}/>"#,
            r#"if(ms[0]===undefined){}return m(0,'h1',md.dynamic,md.dynamicChildren);"#,
        );
    }

    #[test]
    fn test_generate_if_node() {
        assert_generate(
            r#"<div><if={condition}><p>test</p></if></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"p",{},[m(1,"text",{"":"test"},[])]);ms[1]=m(1,"text",{"":""},[]);ms[2]={};}var m0;if(md.condition){m0=ms[0];}else{m0=ms[1];}return m(0,"div",ms[2],[m0]);"#,
        );
    }

    #[test]
    fn test_generate_if_node_at_root() {
        assert_generate(
            r#"<if={condition}><p>test</p></if>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"p",{},[m(1,"text",{"":"test"},[])]);ms[1]=m(1,"text",{"":""},[]);}var m0;if(md.condition){m0=ms[0];}else{m0=ms[1];}return m0;"#,
        );
    }

    #[test]
    fn test_generate_if_else_node() {
        assert_generate(
            r#"<div><if={condition}><p>test</p></if><else>{dynamic}</else></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"p",{},[m(1,"text",{"":"test"},[])]);ms[1]=[];ms[2]={};}var m0;if(md.condition){m0=ms[0];}else{m0=m(1,"text",{"":md.dynamic},ms[1]);}return m(0,"div",ms[2],[m0]);"#,
        );
    }

    #[test]
    fn test_generate_if_else_if_node() {
        assert_generate(
            r#"<div><if={condition}><p>test</p></if><else-if={condition2}><h3>Dynamic: {dynamic}</h3></else-if></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"p",{},[m(1,"text",{"":"test"},[])]);ms[1]=[];ms[2]=m(1,"text",{"":"Dynamic: "},[]);ms[3]={};ms[4]=m(1,"text",{"":""},[]);}var m0;if(md.condition){m0=ms[0];}else if(md.condition2){m0=m(0,"h3",ms[3],[ms[2],m(1,"text",{"":md.dynamic},ms[1])]);}else{m0=ms[4];}return m(0,"div",ms[3],[m0]);"#,
        );
    }

    #[test]
    fn test_generate_if_else_if_else_node() {
        assert_generate(
            r#"<div><if={condition}><p>test</p></if><else-if={condition2}><h3>Dynamic: {dynamic}</h3></else-if><else>{dynamic}</else><h5>Ending</h5></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"p",{},[m(1,"text",{"":"test"},[])]);ms[1]=[];ms[2]=m(1,"text",{"":"Dynamic: "},[]);ms[3]={};ms[4]=m(0,"h5",{},[m(1,"text",{"":"Ending"},[])]);}var m0;if(md.condition){m0=ms[0];}else if(md.condition2){m0=m(0,"h3",ms[3],[ms[2],m(1,"text",{"":md.dynamic},ms[1])]);}else{m0=m(1,"text",{"":md.dynamic},ms[1]);}return m(0,"div",ms[3],[m0,ms[4]]);"#,
        );
    }

    #[test]
    fn test_generate_nested_if_else_if_else_node() {
        assert_generate(
            r#"<div><if={condition}><p><if={condition}><if={nested}><p>test</p></if></if><else-if={condition2}><h3>Dynamic: {dynamic}</h3></else-if><else>{dynamic}</else></p></if><else-if={condition2}><h3>Dynamic: {dynamic} <if={condition}><p>test</p></if><else-if={condition2}><h3>Dynamic: {dynamic}</h3></else-if><else>{dynamic}</else></h3></else-if><else>{dynamic} <if={condition}><p>test</p></if><else-if={condition2}><h3>Dynamic: {dynamic}</h3></else-if><else>{dynamic}</else></else></div>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"p",{},[m(1,"text",{"":"test"},[])]);ms[1]=m(1,"text",{"":""},[]);ms[2]=[];ms[3]=m(1,"text",{"":"Dynamic: "},[]);ms[4]={};}var m0;if(md.condition){var m1;if(md.condition){var m2;if(md.nested){m2=ms[0];}else{m2=ms[1];}m1=m2;}else if(md.condition2){m1=m(0,"h3",ms[4],[ms[3],m(1,"text",{"":md.dynamic},ms[2])]);}else{m1=m(1,"text",{"":md.dynamic},ms[2]);}m0=m(0,"p",ms[4],[m1]);}else if(md.condition2){var m3;if(md.condition){m3=ms[0];}else if(md.condition2){m3=m(0,"h3",ms[4],[ms[3],m(1,"text",{"":md.dynamic},ms[2])]);}else{m3=m(1,"text",{"":md.dynamic},ms[2]);}m0=m(0,"h3",ms[4],[ms[3],m(1,"text",{"":md.dynamic},ms[2]),m3]);}else{m0=m(1,"text",{"":md.dynamic},ms[2]);}return m(0,"div",ms[4],[m0]);"#,
        );
    }

    #[test]
    fn test_generate_static_for_of_node() {
        assert_generate(
            r#"<for={$item} of={list}><p>test</p></for>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"p",{},[m(1,"text",{"":"test"},[])]);ms[1]={};}var m0=[];for(var m1=0;m1<md.list.length;m1++){var $item=md.list[m1];m0.push(ms[0]);}return m(0,"span",ms[1],m0);"#,
        );
    }

    #[test]
    fn test_generate_for_of_node() {
        assert_generate(
            r#"<for={$item} of={list}><p>{$item}</p></for>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}var m0=[];for(var m1=0;m1<md.list.length;m1++){var $item=md.list[m1];m0.push(m(0,"p",ms[1],[m(1,"text",{"":$item},ms[0])]));}return m(0,"span",ms[1],m0);"#,
        );
    }

    #[test]
    fn test_generate_for_of_node_with_index() {
        assert_generate(
            r#"<for={$item,$index} of={list}><p>{$item} {$index}</p></for>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}var m0=[];for(var $index=0;$index<md.list.length;$index++){var $item=md.list[$index];m0.push(m(0,"p",ms[1],[m(1,"text",{"":$item},ms[0]),m(1,"text",{"":$index},ms[0])]));}return m(0,"span",ms[1],m0);"#,
        );
    }

    #[test]
    fn test_generate_static_for_in_node() {
        assert_generate(
            r#"<for={$key} in={obj}><p>test</p></for>"#,
            r#"if(ms[0]===undefined){ms[0]=m(0,"p",{},[m(1,"text",{"":"test"},[])]);ms[1]={};}var m0=[];for(var $key in md.obj){m0.push(ms[0]);}return m(0,"span",ms[1],m0);"#,
        );
    }

    #[test]
    fn test_generate_for_in_node() {
        assert_generate(
            r#"<for={$key} in={obj}><p>{$key}</p></for>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}var m0=[];for(var $key in md.obj){m0.push(m(0,"p",ms[1],[m(1,"text",{"":$key},ms[0])]));}return m(0,"span",ms[1],m0);"#,
        );
    }

    #[test]
    fn test_generate_for_in_node_with_value() {
        assert_generate(
            r#"<for={$key,$value} in={obj}><p>{$key} {$value}</p></for>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}var m0=[];for(var $key in md.obj){var $value=md.obj[$key];m0.push(m(0,"p",ms[1],[m(1,"text",{"":$key},ms[0]),m(1,"text",{"":$value},ms[0])]));}return m(0,"span",ms[1],m0);"#,
        );
    }

    #[test]
    fn test_generate_nested_for_nodes() {
        assert_generate(
            r#"<for={$item,$index} of={list}><for={$key,$value} in={$item}><p>{$item} {$index} {$key} {$value}</p></for></for>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}var m0=[];for(var $index=0;$index<md.list.length;$index++){var $item=md.list[$index];var m1=[];for(var $key in $item){var $value=$item[$key];m1.push(m(0,"p",ms[1],[m(1,"text",{"":$item},ms[0]),m(1,"text",{"":$index},ms[0]),m(1,"text",{"":$key},ms[0]),m(1,"text",{"":$value},ms[0])]));}m0.push(m(0,"span",ms[1],m1));}return m(0,"span",ms[1],m0);"#,
        );
    }

    #[test]
    fn test_generate_for_node_with_static_custom_element() {
        assert_generate(
            r#"<for={$item,$index} of={list} name='h1' data={{ custom: true }}><p>{$item} {$index}</p></for>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};ms[2]={ custom: true };}var m0=[];for(var $index=0;$index<md.list.length;$index++){var $item=md.list[$index];m0.push(m(0,"p",ms[1],[m(1,"text",{"":$item},ms[0]),m(1,"text",{"":$index},ms[0])]));}return m(0,'h1',ms[2],m0);"#,
        );
    }

    #[test]
    fn test_generate_for_node_with_dynamic_custom_element() {
        assert_generate(
            r#"<for={$item,$index} of={list} name='h1' data={{ custom: dynamic }}><p>{$item} {$index}</p></for>"#,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}var m0=[];for(var $index=0;$index<md.list.length;$index++){var $item=md.list[$index];m0.push(m(0,"p",ms[1],[m(1,"text",{"":$item},ms[0]),m(1,"text",{"":$index},ms[0])]));}return m(0,'h1',{ custom: md.dynamic },m0);"#,
        );
    }

    // =========================================================================
    // compile()
    // =========================================================================

    #[test]
    fn test_compile_reports_slots() {
        let output = compile("<div><p>{message}</p></div>").unwrap();
        assert_eq!(output.slots, 2);
        assert!(output.diagnostics.is_empty());
        assert_eq!(
            output.code,
            r#"if(ms[0]===undefined){ms[0]=[];ms[1]={};}return m(0,"div",ms[1],[m(0,"p",ms[1],[m(1,"text",{"":md.message},ms[0])])]);"#
        );
    }

    #[test]
    fn test_compile_keeps_lexer_diagnostics() {
        let output = compile("<div><p>text<").unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.slots, 1);
    }

    #[test]
    fn test_compile_keeps_parser_warnings() {
        let output = compile("<div><if={a}><p/><p/></if></div>").unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_compile_template_literal_is_dynamic() {
        let output = compile("<p title={`Hi ${name}`}></p>").unwrap();
        assert_eq!(
            output.code,
            r#"if(ms[0]===undefined){ms[0]=[];}return m(0,"p",{"title":`Hi ${md.name}`},ms[0]);"#
        );
    }

    #[test]
    fn test_compile_arrow_handler() {
        let output = compile("<button @click={(x) => save(x)}/>").unwrap();
        assert_eq!(
            output.code,
            r#"if(ms[0]===undefined){ms[0]=[];}return m(0,"button",{"@click":[(x) => md.save(x),md,mc]},ms[0]);"#
        );
    }

    #[test]
    fn test_compile_builtin_call_in_attribute() {
        let output = compile("<p hidden={Array.isArray(xs)}/>").unwrap();
        assert_eq!(
            output.code,
            r#"if(ms[0]===undefined){ms[0]=[];}return m(0,"p",{"hidden":Array.isArray(md.xs)},ms[0]);"#
        );
    }

    #[test]
    fn test_compile_explicitly_closed_void_element() {
        let output = compile("<div><input type='text'></input></div>").unwrap();
        assert_eq!(
            output.code,
            r#"if(ms[0]===undefined){ms[0]=m(0,"div",{},[m(0,"input",{"type":'text'},[])]);}return ms[0];"#
        );
    }

    #[test]
    fn test_compile_empty() {
        assert_eq!(compile(""), Err(CompileError::EmptyTemplate));
        assert_eq!(compile("  \n "), Err(CompileError::EmptyTemplate));
    }

    #[test]
    fn test_compile_multiple_roots() {
        let err = compile("<p/><p/>").unwrap_err();
        assert_eq!(err, CompileError::MultipleRoots { count: 2 });
        assert_eq!(
            err.to_string(),
            "Compile error: template must have a single root node, found 2"
        );
    }

    #[test]
    fn test_compile_parse_error() {
        let err = compile("<div><p></div>").unwrap_err();
        let CompileError::Parse(parse) = &err else {
            panic!("expected parse error, got {err:?}");
        };
        assert!(matches!(parse.kind, ParseErrorKind::UnmatchedClosingTag { .. }));
        assert_eq!(err.to_string(), parse.to_string());
    }
}
