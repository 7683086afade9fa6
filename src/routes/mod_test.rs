use axum::extract::State;
use axum::response::Json;

use super::*;
use crate::state::test_helpers::test_app_state;

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[test]
fn router_builds() {
    let _router = app(test_app_state(), 1024);
}

#[tokio::test]
async fn components_lists_registry() {
    let Json(resp) = components::list_components(State(test_app_state())).await;
    assert!(resp.components.iter().any(|name| name == "Accordion.Item"));
    assert_eq!(resp.components.len(), 18);
}

#[tokio::test]
async fn preview_compiles_without_model() {
    let body = preview::PreviewBody { source: "<Checkbox defaultChecked />".into() };
    let Json(resp) = preview::preview(State(test_app_state()), Json(body)).await;
    assert!(resp.tree.is_some());
    assert!(resp.html.unwrap().contains(r#"aria-checked="true""#));
}

#[tokio::test]
async fn preview_reports_parse_error() {
    let body = preview::PreviewBody { source: "<div>".into() };
    let Json(resp) = preview::preview(State(test_app_state()), Json(body)).await;
    assert!(resp.tree.is_none());
    assert!(resp.parse_error.is_some());
}
