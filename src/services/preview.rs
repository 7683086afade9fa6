//! Preview service: run the pipeline on caller-supplied source.
//!
//! No model call: the source is treated exactly like a model reply. Shared by
//! `POST /api/preview` and the `compile` subcommand.

use serde::Serialize;

use crate::markup::{self, CompileLimits, TreeNode};
use crate::render::{self, Registry};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub tree: Option<TreeNode>,
    pub parse_error: Option<String>,
    pub html: Option<String>,
    pub truncated: bool,
}

#[must_use]
pub fn preview(source: &str, limits: &CompileLimits, registry: &Registry) -> Preview {
    let outcome = markup::compile_reply(source, limits);
    let html = render::render_html(outcome.tree(), registry);
    let parse_error = outcome.parse_error();
    let truncated = outcome.truncated();
    Preview { tree: outcome.into_tree(), parse_error, html, truncated }
}

#[cfg(test)]
#[path = "preview_test.rs"]
mod tests;
