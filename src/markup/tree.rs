//! Compiled preview tree: the closed, literal-only output of the compiler.
//!
//! Nothing in here can reference code: names are opaque strings and every
//! prop value is a scalar copied out of a literal token.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Literal attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

impl PropValue {
    /// String conversion with the same spelling the source language uses
    /// (`1` not `1.0`, `true`, `null`).
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Num(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::Null => "null".to_owned(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness for boolean-ish props like `disabled` or `checked`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::Num(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
            Self::Null => false,
        }
    }
}

/// Attribute map. Keys are unique; a repeated attribute keeps its last value.
pub type Props = BTreeMap<String, PropValue>;

/// A node of the compiled preview tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Text { value: String },
    Fragment { children: Vec<TreeNode> },
    Element { name: String, props: Props, children: Vec<TreeNode> },
}

impl TreeNode {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { value: value.into() }
    }

    #[must_use]
    pub fn element(name: impl Into<String>, props: Props, children: Vec<TreeNode>) -> Self {
        Self::Element { name: name.into(), props, children }
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Text { .. } => 1,
            Self::Fragment { children } | Self::Element { children, .. } => {
                1 + children.iter().map(TreeNode::node_count).sum::<usize>()
            }
        }
    }

    /// Depth of this subtree; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Text { .. } => 1,
            Self::Fragment { children } | Self::Element { children, .. } => {
                1 + children.iter().map(TreeNode::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Format a number the way `String(n)` does for the values a literal can
/// produce: integral values print without a fractional part.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return format!("{n:.0}");
    }
    format!("{n}")
}
