// handlers/public/auth.rs - POST /signup and POST /login

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::extract::JsonOrQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::RowId;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub admin: bool,
    pub id: RowId,
}

/// POST /signup - create a user and receive a session token
///
/// Expected Input, as a JSON body or as `?username=alice&password=pw1`:
/// ```json
/// { "username": "alice", "password": "pw1" }
/// ```
///
/// Expected Output (201):
/// ```json
/// { "message": "User created successfully", "token": "<jwt>" }
/// ```
///
/// A username that already exists is rejected by the table service and the
/// remote message is returned as a 500.
pub async fn signup(State(state): State<AppState>, JsonOrQuery(credentials): JsonOrQuery<Credentials>) -> ApiResult<SignupResponse> {
    let token = state.auth.signup(&credentials.username, &credentials.password).await?;

    Ok(ApiResponse::created(SignupResponse {
        message: "User created successfully",
        token,
    }))
}

/// POST /login - exchange credentials for a session token
///
/// Expected Output:
/// ```json
/// { "message": "Login successful", "token": "<jwt>", "admin": false, "id": 1 }
/// ```
///
/// Unknown usernames and wrong passwords both answer 400
/// `"Invalid username or password"`.
pub async fn login(State(state): State<AppState>, JsonOrQuery(credentials): JsonOrQuery<Credentials>) -> ApiResult<LoginResponse> {
    let outcome = state.auth.login(&credentials.username, &credentials.password).await?;

    Ok(ApiResponse::success(LoginResponse {
        message: "Login successful",
        token: outcome.token,
        admin: outcome.admin,
        id: outcome.id,
    }))
}
