//! Render: resolve a compiled tree against the component registry.
//!
//! DESIGN
//! ======
//! `name` is only ever a lookup key. A registry hit instantiates the
//! component with the literal props and the already-rendered children; a miss
//! renders a generic container carrying the name as a literal tag. The result
//! is a [`Rendered`] tree that [`to_html`] serializes with sanitization.

pub mod components;
pub mod html;
pub mod registry;

pub use html::to_html;
pub use registry::{Component, Registry};

use crate::markup::{Props, TreeNode};

/// Output of resolution. Tags here are either component output or literal
/// names from the compiled tree; [`to_html`] decides what is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Text(String),
    Element { tag: String, attrs: Props, children: Vec<Rendered> },
    Fragment(Vec<Keyed>),
}

/// A fragment child with its positional identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed {
    pub key: usize,
    pub node: Rendered,
}

impl Rendered {
    #[must_use]
    pub fn element(tag: impl Into<String>, attrs: Props, children: Vec<Rendered>) -> Self {
        Self::Element { tag: tag.into(), attrs, children }
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Render an optional tree. `None` stays `None` (the empty state).
#[must_use]
pub fn render(tree: Option<&TreeNode>, registry: &Registry) -> Option<Rendered> {
    tree.map(|node| resolve(node, registry))
}

/// Resolve one node and its subtree.
#[must_use]
pub fn resolve(node: &TreeNode, registry: &Registry) -> Rendered {
    match node {
        TreeNode::Text { value } => Rendered::Text(value.clone()),
        TreeNode::Fragment { children } => Rendered::Fragment(
            children
                .iter()
                .enumerate()
                .map(|(key, child)| Keyed { key, node: resolve(child, registry) })
                .collect(),
        ),
        TreeNode::Element { name, props, children } => {
            let children = children.iter().map(|child| resolve(child, registry)).collect();
            match registry.get(name) {
                Some(component) => component.render(props, children),
                None => Rendered::element(name.clone(), props.clone(), children),
            }
        }
    }
}

/// Resolve and serialize in one step; `None` for an absent tree.
#[must_use]
pub fn render_html(tree: Option<&TreeNode>, registry: &Registry) -> Option<String> {
    render(tree, registry).map(|rendered| to_html(&rendered))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
