use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /protected
pub async fn protected(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({ "message": format!("Access granted to {}", user.username) }))
}
