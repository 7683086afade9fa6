//! Chat service: conversation → model reply → preview tree.
//!
//! DESIGN
//! ======
//! One user submission is one turn:
//!
//! 1. Convert the client's turn history into model messages (trimmed to the
//!    most recent turns, images restricted to inline `data:image/` URIs).
//! 2. Ask the model for a component. A reply that is only the safety token
//!    gets one retry against the fallback model.
//! 3. Drop the result if a newer turn for the same session started meanwhile.
//! 4. Compile the reply into a tree and render it to inert HTML.
//!
//! Upstream failures are errors; parse failures and "no markup" are data in
//! the reply.

use std::fmt::Write;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{ChatRequest, Content, ContentBlock, ImageSource, LlmError, Message};
use crate::markup::{self, Outcome};
use crate::render::{self, Registry};
use crate::state::AppState;

/// Reply that triggers the fallback retry (compared trimmed, case-insensitive).
pub const SAFETY_TOKEN: &str = "safe";
pub const EMPTY_REPLY: &str = "No response generated.";
pub const IMAGE_ONLY_PROMPT: &str = "Analyze this image and create a UI component based on it.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("conversation has no messages")]
    EmptyConversation,
    #[error("unsupported message role: {0}")]
    InvalidRole(String),
    #[error("turn {turn} superseded by turn {latest}")]
    Superseded { turn: u64, latest: u64 },
    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::EmptyConversation => "E_EMPTY_CONVERSATION",
            Self::InvalidRole(_) => "E_INVALID_ROLE",
            Self::Superseded { .. } => "E_SUPERSEDED",
            Self::LlmError(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::LlmError(e) if e.retryable())
    }
}

/// One prior turn as sent by the client.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ChatTurn {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Result of a completed turn.
#[derive(Debug)]
pub struct ChatReply {
    pub message: String,
    pub outcome: Outcome,
    pub html: Option<String>,
    pub turn: u64,
    pub model: String,
    /// The fallback model produced `message`.
    pub retried: bool,
}

// =============================================================================
// HANDLER
// =============================================================================

/// Run one chat turn for `session`.
///
/// # Errors
///
/// [`ChatError::LlmNotConfigured`] without a model client (no request is made),
/// [`ChatError::EmptyConversation`] / [`ChatError::InvalidRole`] for bad input,
/// [`ChatError::LlmError`] when the primary upstream call fails, and
/// [`ChatError::Superseded`] when a newer turn started during the exchange.
pub async fn handle_chat(state: &AppState, session: Uuid, history: &[ChatTurn]) -> Result<ChatReply, ChatError> {
    let llm = state.llm.as_ref().ok_or(ChatError::LlmNotConfigured)?;
    let settings = state.settings;
    let messages = build_messages(history, settings.max_history, settings.max_images)?;

    let turn = state.turns.begin(session);
    info!(%session, turn, messages = messages.len(), "chat: turn started");

    let system = build_system_prompt(&state.registry);
    let request = ChatRequest {
        model: None,
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
        system: &system,
        messages: &messages,
    };

    let response = llm.chat(&request).await.inspect_err(|e| {
        warn!(%session, turn, error = %e, "chat: upstream call failed");
    })?;
    info!(
        %session,
        turn,
        model = %response.model,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "chat: reply received"
    );

    let mut message = response.text();
    let mut model = response.model;
    let mut retried = false;
    if is_safety_token(&message) {
        if let Some((text, fallback)) = guard_retry(llm.as_ref(), &request, session, turn).await {
            message = text;
            model = fallback;
            retried = true;
        }
    }
    if message.trim().is_empty() {
        message = EMPTY_REPLY.to_owned();
    }

    if let Some(latest) = state.turns.latest(session) {
        if latest != turn {
            info!(%session, turn, latest, "chat: turn superseded, discarding reply");
            return Err(ChatError::Superseded { turn, latest });
        }
    }

    let outcome = markup::compile_reply(&message, &settings.limits);
    let html = render::render_html(outcome.tree(), &state.registry);
    info!(
        %session,
        turn,
        %model,
        retried,
        outcome = outcome.label(),
        reply_len = message.len(),
        "chat: turn complete"
    );

    Ok(ChatReply { message, outcome, html, turn, model, retried })
}

/// Re-ask the fallback model. `None` keeps the original reply.
async fn guard_retry(
    llm: &dyn LlmChat,
    request: &ChatRequest<'_>,
    session: Uuid,
    turn: u64,
) -> Option<(String, String)> {
    let Some(fallback) = llm.fallback_model() else {
        warn!(%session, turn, "chat: safety-token reply and no fallback model configured");
        return None;
    };
    warn!(%session, turn, fallback, "chat: safety-token reply, retrying with fallback model");

    let retry = ChatRequest { model: Some(fallback), ..*request };
    match llm.chat(&retry).await {
        Ok(response) => {
            let text = response.text();
            if text.trim().is_empty() {
                warn!(%session, turn, "chat: fallback reply empty, keeping original");
                return None;
            }
            let model = if response.model.is_empty() { fallback.to_owned() } else { response.model };
            Some((text, model))
        }
        Err(e) => {
            warn!(%session, turn, error = %e, "chat: fallback call failed, keeping original");
            None
        }
    }
}

#[must_use]
pub fn is_safety_token(reply: &str) -> bool {
    reply.trim().eq_ignore_ascii_case(SAFETY_TOKEN)
}

// =============================================================================
// PROMPT + HISTORY
// =============================================================================

/// System instruction listing the components the preview can render.
pub(crate) fn build_system_prompt(registry: &Registry) -> String {
    let mut prompt = String::from(
        "You are a UI/UX expert assistant that generates React components using the shadcn/ui library and Tailwind CSS.\n\n\
         Available components:\n",
    );
    for name in registry.names() {
        let _ = writeln!(prompt, "- {name}");
    }
    prompt.push_str(
        "\nWhen the user describes a UI or provides a sketch or screenshot:\n\
         1. Analyze the request carefully.\n\
         2. Generate clean, modern React/TypeScript code using the components above.\n\
         3. Use Tailwind CSS classes for styling.\n\
         4. Use literal attribute values (strings, numbers, booleans) wherever possible; \
            the preview ignores computed values and event handlers.\n\
         5. Make the component responsive and accessible.\n\n\
         Reply with exactly one fenced code block:\n\
         ```tsx\n\
         // Component code here\n\
         ```\n",
    );
    prompt
}

/// Convert client turns into model messages.
pub(crate) fn build_messages(
    history: &[ChatTurn],
    max_history: usize,
    max_images: usize,
) -> Result<Vec<Message>, ChatError> {
    let start = history.len().saturating_sub(max_history);
    let messages = history[start..]
        .iter()
        .map(|turn| to_message(turn, max_images))
        .collect::<Result<Vec<_>, _>>()?;
    if messages.is_empty() {
        return Err(ChatError::EmptyConversation);
    }
    Ok(messages)
}

fn to_message(turn: &ChatTurn, max_images: usize) -> Result<Message, ChatError> {
    if turn.role != "user" && turn.role != "assistant" {
        return Err(ChatError::InvalidRole(turn.role.clone()));
    }

    let images: Vec<ImageSource> = turn
        .images
        .iter()
        .filter_map(|uri| ImageSource::from_data_uri(uri))
        .take(max_images)
        .collect();
    if images.len() < turn.images.len().min(max_images) {
        warn!(role = %turn.role, dropped = turn.images.len() - images.len(), "chat: non-inline images dropped");
    }

    let content = if images.is_empty() {
        Content::Text(turn.content.clone())
    } else {
        let text = if turn.content.trim().is_empty() { IMAGE_ONLY_PROMPT.to_owned() } else { turn.content.clone() };
        let mut blocks = vec![ContentBlock::Text { text }];
        blocks.extend(images.into_iter().map(|source| ContentBlock::Image { source }));
        Content::Blocks(blocks)
    };
    Ok(Message { role: turn.role.clone(), content })
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
