// handlers/data/resource.rs - generic CRUD passthrough shared by the catalog tables
//
// Each table is a zero-sized marker implementing `Resource`; the handlers below
// are instantiated per marker in the router, e.g. `get(resource::list::<Classes>)`.

use axum::extract::State;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::database::models::{tables, ClassChanges, NewClass, ProfessionChanges};
use crate::database::{to_row, Query, Row};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::RowId;

pub trait Resource: Send + Sync + 'static {
    const TABLE: &'static str;
    /// Singular name used in client-facing messages
    const LABEL: &'static str;
}

pub trait Creatable: Resource {
    type New: DeserializeOwned + Serialize + Send + 'static;
}

pub trait Updatable: Resource {
    /// Partial payload; fields left unset must not serialize
    type Changes: DeserializeOwned + Serialize + Send + 'static;
}

macro_rules! resource {
    ($name:ident, $table:expr, $label:literal) => {
        pub struct $name;

        impl Resource for $name {
            const TABLE: &'static str = $table;
            const LABEL: &'static str = $label;
        }
    };
}

resource!(Classes, tables::CLASSES, "Class");
resource!(Professions, tables::PROFESSIONS, "Profession");
resource!(Characters, tables::CHARACTERS, "Character");
resource!(Dungeons, tables::DUNGEONS, "Dungeon");
resource!(Equipment, tables::EQUIPMENT, "Equipment");
resource!(Resources, tables::RESOURCES, "Resource");
resource!(Bestiary, tables::BESTIARY, "Bestiary entry");

impl Creatable for Classes {
    type New = NewClass;
}

impl Updatable for Classes {
    type Changes = ClassChanges;
}

impl Updatable for Professions {
    type Changes = ProfessionChanges;
}

/// GET /<table>
pub async fn list<R: Resource>(State(state): State<AppState>) -> ApiResult<Vec<Row>> {
    let rows = state.store.select(R::TABLE, &Query::all()).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /<table>/:id
pub async fn get<R: Resource>(State(state): State<AppState>, ApiPath(id): ApiPath<RowId>) -> ApiResult<Row> {
    let row = find_by_id::<R>(&state, id).await?;
    Ok(ApiResponse::success(row))
}

/// POST /<table>
pub async fn create<R: Creatable>(State(state): State<AppState>, ApiJson(payload): ApiJson<R::New>) -> ApiResult<Row> {
    let inserted = state.store.insert(R::TABLE, vec![to_row(&payload)?]).await?;
    let row = inserted
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::internal_server_error(format!("Failed to create {}", R::LABEL.to_lowercase())))?;

    let id = row.get("id").cloned().unwrap_or(Value::Null);
    tracing::info!("Created {} {}", R::LABEL.to_lowercase(), id);
    Ok(ApiResponse::created(row))
}

/// PUT or PATCH /<table>/:id
pub async fn update<R: Updatable>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(payload): ApiJson<R::Changes>,
) -> ApiResult<Row> {
    let changes = to_row(&payload)?;
    if changes.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    find_by_id::<R>(&state, id).await?;

    let updated = state.store.update(R::TABLE, &Query::all().eq("id", id), changes).await?;
    let row = updated.into_iter().next().ok_or_else(|| not_found::<R>())?;
    Ok(ApiResponse::success(row))
}

/// DELETE /<table>/:id
pub async fn delete<R: Resource>(State(state): State<AppState>, ApiPath(id): ApiPath<RowId>) -> ApiResult<Value> {
    find_by_id::<R>(&state, id).await?;
    state.store.delete(R::TABLE, &Query::all().eq("id", id)).await?;

    tracing::info!("Deleted {} {}", R::LABEL.to_lowercase(), id);
    Ok(ApiResponse::success(json!({
        "message": format!("{} deleted successfully", R::LABEL),
        "id": id,
    })))
}

async fn find_by_id<R: Resource>(state: &AppState, id: RowId) -> Result<Row, ApiError> {
    let rows = state.store.select(R::TABLE, &Query::all().eq("id", id).limit(1)).await?;
    rows.into_iter().next().ok_or_else(not_found::<R>)
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::not_found(format!("{} not found", R::LABEL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, StoreBackend};
    use crate::database::{DataStore, MemoryStore, StoreResult};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Memory store that counts every call made through the trait
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DataStore for CountingStore {
        async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.select(table, query).await
        }

        async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(table, rows).await
        }

        async fn update(&self, table: &str, query: &Query, changes: Row) -> StoreResult<Vec<Row>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.update(table, query, changes).await
        }

        async fn delete(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(table, query).await
        }

        async fn health_check(&self) -> StoreResult<()> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    fn state(store: Arc<CountingStore>) -> AppState {
        let mut config = AppConfig::development();
        config.store.backend = StoreBackend::Memory;
        config.security.bcrypt_cost = 4;
        AppState::new(config, store)
    }

    #[tokio::test]
    async fn empty_update_is_rejected_before_the_store() {
        let store = Arc::new(CountingStore::default());
        let err = update::<Classes>(State(state(store.clone())), ApiPath(1), ApiJson(ClassChanges::default()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "No fields to update");
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let state = state(Arc::new(CountingStore::default()));

        let err = get::<Equipment>(State(state.clone()), ApiPath(9)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Equipment not found");

        let err = delete::<Classes>(State(state.clone()), ApiPath(9)).await.unwrap_err();
        assert_eq!(err.message(), "Class not found");

        let changes = ClassChanges {
            nombre: Some("Paladín".to_string()),
            descripcion: None,
        };
        let err = update::<Classes>(State(state), ApiPath(9), ApiJson(changes)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_update_delete_class() {
        let state = state(Arc::new(CountingStore::default()));

        let created = create::<Classes>(
            State(state.clone()),
            ApiJson(NewClass {
                nombre: "Guerrero".to_string(),
                descripcion: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(created.status_code, Some(StatusCode::CREATED));
        let id = created.data["id"].as_i64().unwrap();

        let changes = ClassChanges {
            nombre: None,
            descripcion: Some("Cuerpo a cuerpo".to_string()),
        };
        let updated = update::<Classes>(State(state.clone()), ApiPath(id), ApiJson(changes)).await.unwrap();
        assert_eq!(updated.data["nombre"], "Guerrero");
        assert_eq!(updated.data["descripcion"], "Cuerpo a cuerpo");

        let deleted = delete::<Classes>(State(state.clone()), ApiPath(id)).await.unwrap();
        assert_eq!(deleted.data["id"], id);

        let remaining = list::<Classes>(State(state)).await.unwrap();
        assert!(remaining.data.is_empty());
    }
}
