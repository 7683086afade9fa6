//! Markup node → literal-only [`TreeNode`].
//!
//! DESIGN
//! ======
//! This is the security boundary of the pipeline. The compiler copies values
//! out of literal tokens and nothing else: identifiers, calls, operators and
//! interpolated templates are never evaluated, they are dropped. It never
//! fails; malformed or unsupported input degrades by omission.
//!
//! Output size is bounded by [`CompileLimits`]. Children past the depth or
//! node budget are omitted and the result is flagged as truncated.

use tracing::warn;

use super::locate::Markup;
use super::syntax::{Expr, JsxAttrValue, JsxAttribute, JsxChild, JsxElement};
use super::tree::{PropValue, Props, TreeNode};

/// Bounds on the compiled tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileLimits {
    /// Deepest element or fragment level kept; the root is level 1.
    pub max_depth: usize,
    /// Total nodes emitted, text nodes included.
    pub max_nodes: usize,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self { max_depth: 64, max_nodes: 4096 }
    }
}

/// Compiler result.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub tree: TreeNode,
    /// Some children were omitted because a limit was reached.
    pub truncated: bool,
}

/// Compile a located markup node.
#[must_use]
pub fn compile_markup(markup: Markup<'_>, limits: &CompileLimits) -> Compiled {
    let mut compiler = Compiler { limits, emitted: 1, truncated: false };
    let tree = match markup {
        Markup::Element(element) => compiler.element(element, 1),
        Markup::Fragment(fragment) => TreeNode::Fragment { children: compiler.children(&fragment.children, 1) },
    };
    if compiler.truncated {
        warn!(
            max_depth = limits.max_depth,
            max_nodes = limits.max_nodes,
            emitted = compiler.emitted,
            "compile: tree truncated"
        );
    }
    Compiled { tree, truncated: compiler.truncated }
}

/// Literal-extraction rule: the value of a string, number, boolean or null
/// literal, or of a template without substitutions. Anything else is `None`.
#[must_use]
pub fn literal_value(expr: &Expr) -> Option<PropValue> {
    match expr {
        Expr::Str(s) => Some(PropValue::Str(s.clone())),
        Expr::Num(n) => Some(PropValue::Num(*n)),
        Expr::Bool(b) => Some(PropValue::Bool(*b)),
        Expr::Null => Some(PropValue::Null),
        Expr::Template(template) if template.exprs.is_empty() => match template.quasis.as_slice() {
            [Some(text)] => Some(PropValue::Str(text.clone())),
            _ => None,
        },
        _ => None,
    }
}

/// Collapse whitespace runs to single spaces and trim.
#[must_use]
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Compiler<'l> {
    limits: &'l CompileLimits,
    emitted: usize,
    truncated: bool,
}

impl Compiler<'_> {
    fn element(&mut self, element: &JsxElement, depth: usize) -> TreeNode {
        TreeNode::Element {
            name: element.name.to_string(),
            props: compile_props(&element.attributes),
            children: self.children(&element.children, depth),
        }
    }

    /// Reserve one node of budget; `false` once the budget is spent.
    fn reserve(&mut self) -> bool {
        if self.emitted >= self.limits.max_nodes {
            self.truncated = true;
            return false;
        }
        self.emitted += 1;
        true
    }

    fn children(&mut self, children: &[JsxChild], depth: usize) -> Vec<TreeNode> {
        let mut out = Vec::new();
        for child in children {
            let node = match child {
                JsxChild::Text(raw) => {
                    let text = collapse_whitespace(raw);
                    if text.is_empty() {
                        continue;
                    }
                    TextOrNested::Text(text)
                }
                JsxChild::Expr(expr) => match literal_value(expr) {
                    Some(value) => {
                        let text = value.to_text();
                        if text.trim().is_empty() {
                            continue;
                        }
                        TextOrNested::Text(text)
                    }
                    None => continue,
                },
                JsxChild::Element(element) => TextOrNested::Element(element),
                JsxChild::Fragment(fragment) => TextOrNested::Fragment(&fragment.children),
                JsxChild::Empty | JsxChild::Spread(_) => continue,
            };

            if !matches!(node, TextOrNested::Text(_)) && depth >= self.limits.max_depth {
                self.truncated = true;
                continue;
            }
            if !self.reserve() {
                break;
            }
            out.push(match node {
                TextOrNested::Text(value) => TreeNode::Text { value },
                TextOrNested::Element(element) => self.element(element, depth + 1),
                TextOrNested::Fragment(children) => TreeNode::Fragment { children: self.children(children, depth + 1) },
            });
        }
        out
    }
}

enum TextOrNested<'a> {
    Text(String),
    Element(&'a JsxElement),
    Fragment(&'a [JsxChild]),
}

fn compile_props(attributes: &[JsxAttribute]) -> Props {
    let mut props = Props::new();
    for attribute in attributes {
        let JsxAttribute::Attr { name, value } = attribute else {
            continue;
        };
        let literal = match value {
            None => Some(PropValue::Bool(true)),
            Some(JsxAttrValue::Str(s)) => Some(PropValue::Str(s.clone())),
            Some(JsxAttrValue::Expr(Some(expr))) => literal_value(expr),
            Some(JsxAttrValue::Expr(None) | JsxAttrValue::Element(_) | JsxAttrValue::Fragment(_)) => None,
        };
        match literal {
            Some(value) => {
                props.insert(name.clone(), value);
            }
            None => {
                props.remove(name);
            }
        }
    }
    props
}

#[cfg(test)]
#[path = "compile_test.rs"]
mod tests;
