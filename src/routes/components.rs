//! `GET /api/components`: names the preview can render.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ComponentsResponse {
    pub components: Vec<String>,
}

pub async fn list_components(State(state): State<AppState>) -> Json<ComponentsResponse> {
    let components = state.registry.names().into_iter().map(str::to_owned).collect();
    Json(ComponentsResponse { components })
}
