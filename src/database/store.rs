use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::query::Query;
use crate::types::Operation;

/// A row as returned by the table service: column name to JSON value.
pub type Row = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Every failure a store backend can report. Backends never hand back a
/// half-populated response; callers get either rows or one of these.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The table service answered with an error payload
    #[error("{message}")]
    Remote {
        operation: Operation,
        table: String,
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Table service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from table service: {0}")]
    Decode(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid table service URL: {0}")]
    InvalidUrl(String),
}

impl StoreError {
    /// Remote constraint violation (PostgREST reports 409 / SQLSTATE 23505)
    pub fn is_conflict(&self) -> bool {
        match self {
            StoreError::Remote { status, code, .. } => *status == 409 || code.as_deref() == Some("23505"),
            _ => false,
        }
    }
}

/// Table-oriented data service used by every handler.
///
/// Implementations are injected into the router through `AppState`; nothing in
/// the crate reaches for a global client.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Rows matching the query, in backend order unless the query sets one
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>>;

    /// Insert one or more rows, returning their stored representation
    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>>;

    /// Apply `changes` to every matching row, returning the updated rows
    async fn update(&self, table: &str, query: &Query, changes: Row) -> StoreResult<Vec<Row>>;

    /// Remove every matching row, returning what was removed
    async fn delete(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>>;

    async fn health_check(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Serialize a typed payload into a row, dropping nothing but requiring an object.
pub fn to_row<T: Serialize>(value: &T) -> StoreResult<Row> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Decode(format!("expected an object, got {}", other))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> StoreResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}

pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> StoreResult<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        id: i64,
        nombre: String,
    }

    #[test]
    fn converts_typed_values_to_rows_and_back() {
        let row = to_row(&Sample { id: 3, nombre: "Guerrero".to_string() }).unwrap();
        assert_eq!(row.get("nombre"), Some(&json!("Guerrero")));

        let back: Sample = from_row(row).unwrap();
        assert_eq!(back, Sample { id: 3, nombre: "Guerrero".to_string() });
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(matches!(to_row(&vec![1, 2]), Err(StoreError::Decode(_))));
    }

    #[test]
    fn detects_remote_conflicts() {
        let err = StoreError::Remote {
            operation: Operation::Insert,
            table: "users".to_string(),
            status: 409,
            code: Some("23505".to_string()),
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "duplicate key value violates unique constraint");
        assert!(!StoreError::Decode("x".to_string()).is_conflict());
    }
}
