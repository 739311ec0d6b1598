//! Node code generator.
//!
//! Walks the template tree once. Every node yields a [`Fragment`]: the
//! statements it needs (`var m0;if(...){...}`) and an expression for its
//! value. Static fragments carry no statements and are hoisted into the
//! memo cache by whichever dynamic parent ends up using them, so a fully
//! static subtree costs exactly one cache slot.

use crate::expression::{self, Scanned};
use crate::Generator;
use moon_lexer::{AttributeValue, Attributes};
use moon_parser::ast::{Children, Conditional, Loop, LoopMode, Node, RawElement};

/// Node kinds understood by the runtime's `m(kind, name, data, children)`.
#[derive(Debug, Clone, Copy)]
enum VNodeKind {
    Element = 0,
    Text = 1,
    Component = 2,
}

/// Generated code for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fragment {
    /// Statements that must run before `code` is evaluated.
    pub prelude: String,
    /// Expression producing the node.
    pub code: String,
    /// The node never changes between renders.
    pub is_static: bool,
}

impl Fragment {
    fn constant(code: String) -> Self {
        Self {
            prelude: String::new(),
            code,
            is_static: true,
        }
    }

    fn dynamic(prelude: String, code: String) -> Self {
        Self {
            prelude,
            code,
            is_static: false,
        }
    }

    /// Split into statements and a per-render expression, hoisting static
    /// fragments into the cache.
    pub fn settle(self, gen: &mut Generator) -> (String, String) {
        if self.is_static {
            (String::new(), gen.hoist(&self.code))
        } else {
            (self.prelude, self.code)
        }
    }
}

/// Generate code for a node and everything beneath it.
pub(crate) fn generate_node(node: &Node, gen: &mut Generator) -> Fragment {
    match node {
        Node::Text(content) => generate_text(content, gen),
        Node::Element(el) => {
            generate_tag(VNodeKind::Element, &el.tag, &el.attributes, &el.children, gen)
        }
        Node::Component(component) => generate_tag(
            VNodeKind::Component,
            &component.name,
            &component.attributes,
            &component.children,
            gen,
        ),
        Node::RawElement(raw) => generate_raw_element(raw, gen),
        Node::Conditional(conditional) => generate_conditional(conditional, gen),
        Node::Loop(l) => generate_loop(l, gen),
    }
}

// =========================================================================
// Nodes
// =========================================================================

fn generate_text(content: &AttributeValue, gen: &mut Generator) -> Fragment {
    let content = value_of(content);
    let kind = VNodeKind::Text as u8;
    if content.is_static {
        Fragment::constant(format!("m({kind},\"text\",{{\"\":{}}},[])", content.code))
    } else {
        let children = gen.hoist("[]");
        Fragment::dynamic(
            String::new(),
            format!("m({kind},\"text\",{{\"\":{}}},{children})", content.code),
        )
    }
}

/// Children of an element or component before hoisting.
enum ChildList {
    Nodes(Vec<Fragment>),
    Value(Scanned),
}

fn generate_tag(
    kind: VNodeKind,
    name: &str,
    attributes: &Attributes,
    children: &Children,
    gen: &mut Generator,
) -> Fragment {
    let kind = kind as u8;
    let name = quote_key(name);
    let data = generate_data(attributes);

    let children = match children {
        Children::Nodes(nodes) => {
            ChildList::Nodes(nodes.iter().map(|node| generate_node(node, gen)).collect())
        }
        Children::Value(value) => ChildList::Value(value_of(value)),
    };
    let children_static = match &children {
        ChildList::Nodes(fragments) => fragments.iter().all(|f| f.is_static),
        ChildList::Value(value) => value.is_static,
    };

    if data.is_static && children_static {
        let children = match children {
            ChildList::Nodes(fragments) => array(fragments.into_iter().map(|f| f.code)),
            ChildList::Value(value) => value.code,
        };
        return Fragment::constant(format!("m({kind},{name},{},{children})", data.code));
    }

    // Hoist children before data so slot order follows generation order.
    let mut prelude = String::new();
    let children = match children {
        ChildList::Nodes(fragments) if children_static => {
            gen.hoist(&array(fragments.into_iter().map(|f| f.code)))
        }
        ChildList::Nodes(fragments) => {
            let mut values = Vec::with_capacity(fragments.len());
            for fragment in fragments {
                let (statements, value) = fragment.settle(gen);
                prelude.push_str(&statements);
                values.push(value);
            }
            array(values.into_iter())
        }
        ChildList::Value(value) => gen.inline(value),
    };
    let data = gen.inline(data);

    Fragment::dynamic(prelude, format!("m({kind},{name},{data},{children})"))
}

/// `<element>`: name, data and children are used as written.
fn generate_raw_element(raw: &RawElement, gen: &mut Generator) -> Fragment {
    let kind = VNodeKind::Element as u8;
    let name = value_of(&raw.name);
    let data = value_of(&raw.data);
    let children = value_of(&raw.children);

    if name.is_static && data.is_static && children.is_static {
        return Fragment::constant(format!(
            "m({kind},{},{},{})",
            name.code, data.code, children.code
        ));
    }

    let children = gen.inline(children);
    let data = gen.inline(data);
    Fragment::dynamic(
        String::new(),
        format!("m({kind},{},{data},{children})", name.code),
    )
}

// =========================================================================
// Control flow
// =========================================================================

/// `var mN;if(a){mN=...;}else if(b){mN=...;}else{mN=...;}`
fn generate_conditional(conditional: &Conditional, gen: &mut Generator) -> Fragment {
    let local = gen.local();
    let mut prelude = format!("var {local};");

    for (index, branch) in conditional.branches.iter().enumerate() {
        match (&branch.condition, index) {
            (Some(condition), 0) => {
                prelude.push_str(&format!("if({}){{", value_of(condition).code));
            }
            (Some(condition), _) => {
                prelude.push_str(&format!("else if({}){{", value_of(condition).code));
            }
            (None, 0) => prelude.push('{'),
            (None, _) => prelude.push_str("else{"),
        }

        let (statements, value) = generate_node(&branch.body, gen).settle(gen);
        prelude.push_str(&statements);
        prelude.push_str(&format!("{local}={value};}}"));
    }

    Fragment::dynamic(prelude, local)
}

/// `var mN=[];for(...){...mN.push(...);}` wrapped in a host element.
fn generate_loop(l: &Loop, gen: &mut Generator) -> Fragment {
    let accumulator = gen.local();
    let source = value_of(&l.source).code;
    let item = &l.item;
    let mut prelude = format!("var {accumulator}=[];");

    match l.mode {
        LoopMode::Of => {
            let index = match &l.secondary {
                Some(index) => index.clone(),
                None => gen.local(),
            };
            prelude.push_str(&format!(
                "for(var {index}=0;{index}<{source}.length;{index}++){{var {item}={source}[{index}];"
            ));
        }
        LoopMode::In => {
            prelude.push_str(&format!("for(var {item} in {source}){{"));
            if let Some(value) = &l.secondary {
                prelude.push_str(&format!("var {value}={source}[{item}];"));
            }
        }
    }

    let (statements, value) = generate_node(&l.body, gen).settle(gen);
    prelude.push_str(&statements);
    prelude.push_str(&format!("{accumulator}.push({value});}}"));

    let name = match &l.wrapper_tag {
        Some(tag) => value_of(tag).code,
        None => quote_key("span"),
    };
    let data = match &l.wrapper_data {
        Some(data) => value_of(data),
        None => Scanned {
            code: "{}".to_string(),
            is_static: true,
        },
    };
    let data = gen.inline(data);

    let kind = VNodeKind::Element as u8;
    Fragment::dynamic(prelude, format!("m({kind},{name},{data},{accumulator})"))
}

// =========================================================================
// Values
// =========================================================================

/// The data object of an element or component.
///
/// Event handlers are passed as `[handler, md, mc]` and make the object
/// dynamic.
fn generate_data(attributes: &Attributes) -> Scanned {
    let mut is_static = true;
    let entries: Vec<String> = attributes
        .iter()
        .map(|(name, value)| {
            let value = value_of(value);
            if name.starts_with('@') {
                is_static = false;
                format!("{}:[{},md,mc]", quote_key(name), value.code)
            } else {
                is_static &= value.is_static;
                format!("{}:{}", quote_key(name), value.code)
            }
        })
        .collect();

    Scanned {
        code: format!("{{{}}}", entries.join(",")),
        is_static,
    }
}

/// Code for an attribute value. Literals are already valid code.
fn value_of(value: &AttributeValue) -> Scanned {
    if value.is_expression {
        expression::scan(&value.source)
    } else {
        Scanned {
            code: value.source.clone(),
            is_static: true,
        }
    }
}

fn array(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(","))
}

/// Double-quoted string literal for keys and tag names.
fn quote_key(key: &str) -> String {
    format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
}
