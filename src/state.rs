//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! component registry is built once and shared read-only; the turn tracker
//! is the only mutable piece and guards itself.

use std::sync::Arc;

use crate::config::ChatSettings;
use crate::llm::LlmChat;
use crate::render::Registry;
use crate::services::turns::TurnTracker;

/// Clone is required by Axum; every field is `Arc`-backed or `Copy`.
#[derive(Clone)]
pub struct AppState {
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub registry: Arc<Registry>,
    pub turns: TurnTracker,
    pub settings: ChatSettings,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, settings: ChatSettings) -> Self {
        Self { llm, registry: Arc::new(Registry::builtin()), turns: TurnTracker::new(), settings }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
