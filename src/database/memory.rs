use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::query::{compare_values, validate_identifier, values_equal, Query, SortDirection};
use crate::database::store::{DataStore, Row, StoreError, StoreResult};
use crate::types::{Operation, RowId};

#[derive(Debug, Default)]
struct Table {
    next_id: RowId,
    rows: Vec<Row>,
}

/// In-process table service with the same observable behaviour as the REST
/// backend: integer ids assigned on insert, representation returned from every
/// write, and optional unique columns reported as 409 conflicts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
    unique: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce uniqueness of `column` in `table`, like a database constraint.
    pub fn with_unique(mut self, table: &str, column: &str) -> Self {
        self.unique.push((table.to_string(), column.to_string()));
        self
    }

    /// Store with the constraints the hosted schema declares.
    pub fn with_default_constraints() -> Self {
        Self::new().with_unique("users", "username")
    }

    fn conflict(table: &str, column: &str, value: &Value) -> StoreError {
        StoreError::Remote {
            operation: Operation::Insert,
            table: table.to_string(),
            status: 409,
            code: Some("23505".to_string()),
            message: format!(
                "duplicate key value violates unique constraint \"{}_{}_key\" (Key ({})=({}) already exists.)",
                table,
                column,
                column,
                value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
            ),
        }
    }

    fn project(row: &Row, query: &Query) -> Row {
        match &query.columns {
            Some(columns) => columns
                .iter()
                .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                .collect(),
            None => row.clone(),
        }
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        validate_identifier(table)?;
        query.validate()?;

        let tables = self.tables.read().await;
        let mut rows: Vec<&Row> = tables
            .get(table)
            .map(|t| t.rows.iter().filter(|row| query.matches(row)).collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let left = a.get(&order.column).unwrap_or(&Value::Null);
                let right = b.get(&order.column).unwrap_or(&Value::Null);
                let ordering = compare_values(left, right).unwrap_or(std::cmp::Ordering::Equal);
                match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows.into_iter().take(limit).map(|row| Self::project(row, query)).collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        validate_identifier(table)?;
        for row in &rows {
            for column in row.keys() {
                validate_identifier(column)?;
            }
        }

        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();

        // Check the whole batch first so a failed insert leaves nothing behind.
        for column in self.unique.iter().filter(|(t, _)| t == table).map(|(_, c)| c) {
            let mut seen: Vec<&Value> = Vec::new();
            for row in &rows {
                let Some(value) = row.get(column).filter(|v| !v.is_null()) else { continue };
                let exists = entry
                    .rows
                    .iter()
                    .any(|existing| existing.get(column).map(|v| values_equal(v, value)).unwrap_or(false));
                if exists || seen.iter().any(|v| values_equal(v, value)) {
                    return Err(Self::conflict(table, column, value));
                }
                seen.push(value);
            }
        }

        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            match row.get("id").and_then(Value::as_i64) {
                Some(id) => entry.next_id = entry.next_id.max(id),
                None => {
                    entry.next_id += 1;
                    row.insert("id".to_string(), Value::from(entry.next_id));
                }
            }
            entry.rows.push(row.clone());
            inserted.push(row);
        }

        debug!("memory store inserted {} row(s) into {}", inserted.len(), table);
        Ok(inserted)
    }

    async fn update(&self, table: &str, query: &Query, changes: Row) -> StoreResult<Vec<Row>> {
        validate_identifier(table)?;
        query.validate()?;
        for column in changes.keys() {
            validate_identifier(column)?;
        }
        if !query.has_conditions() {
            return Err(StoreError::InvalidQuery(format!("refusing unfiltered update on {}", table)));
        }

        let mut tables = self.tables.write().await;
        let Some(entry) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in entry.rows.iter_mut().filter(|row| query.matches(row)) {
            for (column, value) in &changes {
                row.insert(column.clone(), value.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        validate_identifier(table)?;
        query.validate()?;
        if !query.has_conditions() {
            return Err(StoreError::InvalidQuery(format!("refusing unfiltered delete on {}", table)));
        }

        let mut tables = self.tables.write().await;
        let Some(entry) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let (removed, kept): (Vec<Row>, Vec<Row>) = entry.rows.drain(..).partition(|row| query.matches(row));
        entry.rows = kept;
        Ok(removed)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
