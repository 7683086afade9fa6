//! `POST /api/preview`: compile supplied source without a model call.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use crate::services::preview::{self, Preview};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewBody {
    pub source: String,
}

pub async fn preview(State(state): State<AppState>, Json(body): Json<PreviewBody>) -> Json<Preview> {
    Json(preview::preview(&body.source, &state.settings.limits, &state.registry))
}
