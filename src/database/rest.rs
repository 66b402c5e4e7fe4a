use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use crate::database::query::{validate_identifier, Query};
use crate::database::store::{DataStore, Row, StoreError, StoreResult};
use crate::types::Operation;

/// Error payload PostgREST returns on failed requests
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Client for the hosted PostgREST table service (`{project}/rest/v1/{table}`).
///
/// Holds one pooled `reqwest::Client` with the access key preset as both the
/// `apikey` header and the bearer credential.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base: Url,
}

impl RestStore {
    pub fn new(project_url: &str, access_key: &str) -> StoreResult<Self> {
        let base = Self::build_base_url(project_url)?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(access_key)
            .map_err(|_| StoreError::InvalidUrl("access key contains invalid header characters".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", access_key))
            .map_err(|_| StoreError::InvalidUrl("access key contains invalid header characters".to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, base })
    }

    /// Normalise the project URL and point it at the REST root, keeping any path prefix.
    fn build_base_url(project_url: &str) -> StoreResult<Url> {
        let mut url = Url::parse(project_url.trim()).map_err(|_| StoreError::InvalidUrl(project_url.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(project_url.to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.join("rest/v1/").map_err(|_| StoreError::InvalidUrl(project_url.to_string()))
    }

    fn table_url(&self, table: &str) -> StoreResult<Url> {
        validate_identifier(table)?;
        self.base
            .join(table)
            .map_err(|_| StoreError::InvalidUrl(format!("{}{}", self.base, table)))
    }

    async fn send(
        &self,
        operation: Operation,
        table: &str,
        method: Method,
        query: &Query,
        body: Option<serde_json::Value>,
    ) -> StoreResult<Vec<Row>> {
        query.validate()?;
        let url = self.table_url(table)?;
        let params = query.to_postgrest_params();

        debug!("store {} {} params={:?}", operation, table, params);

        let mut request = self.client.request(method, url).query(&params);
        if operation != Operation::Select {
            request = request.header("Prefer", "return=representation");
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        Self::read_rows(operation, table, response).await
    }

    async fn read_rows(operation: Operation, table: &str, response: Response) -> StoreResult<Vec<Row>> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Vec::new());
            }
            return serde_json::from_str::<Vec<Row>>(&text).map_err(|e| StoreError::Decode(e.to_string()));
        }

        let (code, message) = match serde_json::from_str::<PostgrestError>(&text) {
            Ok(payload) => {
                let mut message = payload.message.unwrap_or_else(|| status.to_string());
                if let Some(details) = payload.details.filter(|d| !d.is_empty()) {
                    message = format!("{} ({})", message, details);
                }
                if let Some(hint) = payload.hint.filter(|h| !h.is_empty()) {
                    debug!("store hint for {} {}: {}", operation, table, hint);
                }
                (payload.code, message)
            }
            Err(_) if !text.trim().is_empty() => (None, text.trim().to_string()),
            Err(_) => (None, status.to_string()),
        };

        error!("store {} on {} failed with {}: {}", operation, table, status.as_u16(), message);

        Err(StoreError::Remote {
            operation,
            table: table.to_string(),
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        self.send(Operation::Select, table, Method::GET, query, None).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let body = serde_json::Value::Array(rows.into_iter().map(serde_json::Value::Object).collect());
        self.send(Operation::Insert, table, Method::POST, &Query::all(), Some(body)).await
    }

    async fn update(&self, table: &str, query: &Query, changes: Row) -> StoreResult<Vec<Row>> {
        if !query.has_conditions() {
            return Err(StoreError::InvalidQuery(format!("refusing unfiltered update on {}", table)));
        }
        self.send(Operation::Update, table, Method::PATCH, query, Some(serde_json::Value::Object(changes)))
            .await
    }

    async fn delete(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        if !query.has_conditions() {
            return Err(StoreError::InvalidQuery(format!("refusing unfiltered delete on {}", table)));
        }
        self.send(Operation::Delete, table, Method::DELETE, query, None).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        let response = self.client.get(self.base.clone()).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Remote {
                operation: Operation::Select,
                table: String::new(),
                status: response.status().as_u16(),
                code: None,
                message: format!("health check returned {}", response.status()),
            })
        }
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::RawQuery,
        http::{HeaderMap as AxumHeaders, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};

    #[test]
    fn builds_rest_root_from_project_url() {
        let url = RestStore::build_base_url("https://abc.supabase.co").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/");

        let url = RestStore::build_base_url("http://localhost:54321/proxy").unwrap();
        assert_eq!(url.as_str(), "http://localhost:54321/proxy/rest/v1/");

        assert!(RestStore::build_base_url("not a url").is_err());
    }

    #[test]
    fn rejects_unsafe_table_names() {
        let store = RestStore::new("https://abc.supabase.co", "key").unwrap();
        assert_eq!(store.table_url("clases").unwrap().as_str(), "https://abc.supabase.co/rest/v1/clases");
        assert!(matches!(store.table_url("../auth"), Err(StoreError::InvalidIdentifier(_))));
    }

    /// Minimal stand-in for PostgREST that echoes what it received.
    async fn spawn_fake_postgrest() -> String {
        async fn clases(headers: AxumHeaders, RawQuery(query): RawQuery) -> (StatusCode, Json<Value>) {
            let apikey = headers.get("apikey").and_then(|v| v.to_str().ok()).unwrap_or_default();
            let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default();
            if apikey != "test-key" || auth != "Bearer test-key" {
                return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid API key"})));
            }
            (
                StatusCode::OK,
                Json(json!([{"id": 1, "nombre": "Guerrero", "query": query.unwrap_or_default()}])),
            )
        }

        async fn users() -> (StatusCode, Json<Value>) {
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "code": "23505",
                    "message": "duplicate key value violates unique constraint \"users_username_key\"",
                    "details": "Key (username)=(alice) already exists.",
                    "hint": null
                })),
            )
        }

        let app = Router::new()
            .route("/rest/v1/clases", get(clases))
            .route("/rest/v1/users", get(users).post(users));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn select_sends_credentials_and_filters() {
        let base = spawn_fake_postgrest().await;
        let store = RestStore::new(&base, "test-key").unwrap();

        let rows = store.select("clases", &Query::all().eq("id", 1)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["nombre"], json!("Guerrero"));
        assert_eq!(rows[0]["query"], json!("id=eq.1"));
    }

    #[tokio::test]
    async fn remote_errors_surface_message_and_status() {
        let base = spawn_fake_postgrest().await;
        let store = RestStore::new(&base, "test-key").unwrap();

        let mut row = Row::new();
        row.insert("username".to_string(), json!("alice"));
        let err = store.insert("users", vec![row]).await.unwrap_err();

        match &err {
            StoreError::Remote { status, code, message, operation, .. } => {
                assert_eq!(*status, 409);
                assert_eq!(code.as_deref(), Some("23505"));
                assert_eq!(*operation, Operation::Insert);
                assert!(message.contains("duplicate key value"));
                assert!(message.contains("already exists"));
            }
            other => panic!("expected remote error, got {:?}", other),
        }
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn unfiltered_writes_are_refused_locally() {
        let store = RestStore::new("http://127.0.0.1:9", "test-key").unwrap();
        assert!(matches!(
            store.delete("clases", &Query::all()).await,
            Err(StoreError::InvalidQuery(_))
        ));
        assert!(matches!(
            store.update("clases", &Query::all(), Row::new()).await,
            Err(StoreError::InvalidQuery(_))
        ));
    }
}
