// handlers/data/profession_levels.rs - per-character profession levels

use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{tables, LevelChange, ProfessionLevel};
use crate::database::{Query, Row, SortDirection};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::RowId;

#[derive(Debug, Default, Deserialize)]
pub struct LevelFilter {
    pub id_personaje: Option<RowId>,
}

/// GET /oficioslevel[?id_personaje=N]
pub async fn list(State(state): State<AppState>, ApiQuery(filter): ApiQuery<LevelFilter>) -> ApiResult<Vec<Row>> {
    let mut query = Query::all().order_by("id", SortDirection::Asc);
    if let Some(character_id) = filter.id_personaje {
        query = query.eq("id_personaje", character_id);
    }

    let rows = state.store.select(tables::PROFESSION_LEVELS, &query).await?;
    Ok(ApiResponse::success(rows))
}

/// PATCH /oficioslevel
pub async fn update(State(state): State<AppState>, ApiJson(change): ApiJson<LevelChange>) -> ApiResult<ProfessionLevel> {
    let level = state.characters.set_profession_level(change).await?;
    Ok(ApiResponse::success(level))
}
