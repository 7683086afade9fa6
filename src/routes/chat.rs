//! `POST /api/chat`: one conversation turn.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::llm::types::LlmError;
use crate::markup::TreeNode;
use crate::services::chat::{self, ChatError, ChatReply, ChatTurn};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub messages: Vec<ChatTurn>,
    /// Omitted: the request is its own session.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseBody {
    pub message: String,
    pub tree: Option<TreeNode>,
    pub parse_error: Option<String>,
    pub html: Option<String>,
    pub truncated: bool,
    pub turn: u64,
    pub session_id: Uuid,
    /// Model that produced `message`.
    pub model: String,
    /// `message` came from the fallback model.
    pub retried: bool,
}

fn to_response(reply: ChatReply, session_id: Uuid) -> ChatResponseBody {
    let parse_error = reply.outcome.parse_error();
    let truncated = reply.outcome.truncated();
    ChatResponseBody {
        message: reply.message,
        tree: reply.outcome.into_tree(),
        parse_error,
        html: reply.html,
        truncated,
        turn: reply.turn,
        session_id,
        model: reply.model,
        retried: reply.retried,
    }
}

pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Result<Json<ChatResponseBody>, ApiError> {
    let session_id = body.session_id.unwrap_or_else(Uuid::new_v4);
    let reply = chat::handle_chat(&state, session_id, &body.messages)
        .await
        .map_err(|e| chat_error_to_api(&e))?;
    Ok(Json(to_response(reply, session_id)))
}

pub(crate) fn chat_error_to_api(err: &ChatError) -> ApiError {
    match err {
        ChatError::LlmNotConfigured | ChatError::LlmError(LlmError::MissingApiKey { .. } | LlmError::ConfigParse(_)) => {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err)
        }
        ChatError::EmptyConversation | ChatError::InvalidRole(_) => ApiError::new(StatusCode::BAD_REQUEST, err),
        ChatError::Superseded { .. } => ApiError::new(StatusCode::CONFLICT, err),
        ChatError::LlmError(LlmError::ApiResponse { status, body }) => {
            let status = StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            ApiError::new(status, err).with_details(body.clone())
        }
        ChatError::LlmError(_) => ApiError::new(StatusCode::BAD_GATEWAY, err),
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
