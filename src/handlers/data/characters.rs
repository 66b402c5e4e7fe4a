// handlers/data/characters.rs - character profiles and seeded creation

use axum::extract::State;

use crate::database::models::{CharacterProfile, NewCharacter};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::RowId;

/// GET /personajes/:user_id - character of a user, with profession levels
pub async fn profile(State(state): State<AppState>, ApiPath(user_id): ApiPath<RowId>) -> ApiResult<CharacterProfile> {
    let profile = state.characters.profile_for_user(user_id).await?;
    Ok(ApiResponse::success(profile))
}

/// POST /personajes - create a character with every profession at level 1
pub async fn create(State(state): State<AppState>, ApiJson(payload): ApiJson<NewCharacter>) -> ApiResult<CharacterProfile> {
    let profile = state.characters.create(payload).await?;
    Ok(ApiResponse::created(profile))
}
