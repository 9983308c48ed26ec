use axum::response::Json;
use serde_json::json;

/// Health check endpoint handler.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status": "pong"}`
///
/// Public under the default access policy, so load balancers and probes can
/// call it without a token.
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "pong" }))
}
