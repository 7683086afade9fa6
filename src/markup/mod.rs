//! Untrusted model reply → bounded, literal-only preview tree.
//!
//! ARCHITECTURE
//! ============
//! Each stage is pure and synchronous:
//!
//! ```text
//! reply ─▶ extract ─▶ parse (strategies) ─▶ locate ─▶ compile ─▶ TreeNode
//! ```
//!
//! Only parsing can fail, and its failure is data (a diagnostic), not an
//! error for the caller. Finding no markup is a third, normal outcome.

pub mod compile;
pub mod extract;
pub mod lexer;
pub mod locate;
pub mod parse;
pub mod syntax;
pub mod tree;

use tracing::{debug, info};

pub use compile::{CompileLimits, Compiled};
pub use lexer::SyntaxError;
pub use tree::{PropValue, Props, TreeNode};

/// Result of running a reply through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A markup node was found and compiled.
    Compiled(Compiled),
    /// The code parsed but contains nothing renderable.
    NoMatch,
    /// Every parse strategy failed; carries the final diagnostic.
    ParseFailed(SyntaxError),
}

impl Outcome {
    #[must_use]
    pub fn tree(&self) -> Option<&TreeNode> {
        match self {
            Self::Compiled(compiled) => Some(&compiled.tree),
            Self::NoMatch | Self::ParseFailed(_) => None,
        }
    }

    #[must_use]
    pub fn into_tree(self) -> Option<TreeNode> {
        match self {
            Self::Compiled(compiled) => Some(compiled.tree),
            Self::NoMatch | Self::ParseFailed(_) => None,
        }
    }

    /// Diagnostic string for the response, present only on parse failure.
    #[must_use]
    pub fn parse_error(&self) -> Option<String> {
        match self {
            Self::ParseFailed(err) => Some(err.to_string()),
            Self::Compiled(_) | Self::NoMatch => None,
        }
    }

    #[must_use]
    pub fn truncated(&self) -> bool {
        matches!(self, Self::Compiled(Compiled { truncated: true, .. }))
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Compiled(_) => "compiled",
            Self::NoMatch => "no_match",
            Self::ParseFailed(_) => "parse_failed",
        }
    }
}

/// Run the whole pipeline on a raw model reply.
#[must_use]
pub fn compile_reply(reply: &str, limits: &CompileLimits) -> Outcome {
    let code = extract::extract_code(reply);
    debug!(
        language = extract::fenced_language(reply).unwrap_or("-"),
        code_len = code.len(),
        "markup: extracted code"
    );

    let program = match parse::parse_with_strategies(code) {
        Ok((program, strategy)) => {
            debug!(?strategy, statements = program.body.len(), "markup: parsed");
            program
        }
        Err(err) => {
            info!(error = %err, "markup: parse failed");
            return Outcome::ParseFailed(err);
        }
    };

    let Some(markup) = locate::locate_markup(&program) else {
        info!("markup: no renderable node");
        return Outcome::NoMatch;
    };

    let compiled = compile::compile_markup(markup, limits);
    info!(
        nodes = compiled.tree.node_count(),
        truncated = compiled.truncated,
        "markup: compiled"
    );
    Outcome::Compiled(compiled)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
