// handlers/data/users.rs - GET /users

use axum::extract::State;

use crate::database::models::{tables, UserSummary};
use crate::database::{from_rows, Query};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Lists users without their password hashes.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<UserSummary>> {
    let query = Query::all().columns(UserSummary::COLUMNS);
    let users = from_rows(state.store.select(tables::USERS, &query).await?)?;
    Ok(ApiResponse::success(users))
}
