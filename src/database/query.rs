use serde_json::{Map, Value};

use super::store::StoreError;

/// Comparison operators understood by both store backends.
/// Names follow the PostgREST filter vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    pub fn as_postgrest(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: SortDirection,
}

/// Row selection shared by select, update and delete.
///
/// Built fluently by callers and translated by each backend: the REST
/// store turns it into PostgREST query parameters, the memory store
/// evaluates it directly against its rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub columns: Option<Vec<String>>,
    pub conditions: Vec<Condition>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn filter(mut self, column: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn in_list<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let list: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.filter(column, FilterOp::In, Value::Array(list))
    }

    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Reject identifiers that could escape the column position of a query.
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(columns) = &self.columns {
            for column in columns {
                validate_identifier(column)?;
            }
        }
        for condition in &self.conditions {
            validate_identifier(&condition.column)?;
            if condition.op == FilterOp::In && !condition.value.is_array() {
                return Err(StoreError::InvalidQuery(format!(
                    "'in' filter on {} requires a list",
                    condition.column
                )));
            }
        }
        if let Some(order) = &self.order {
            validate_identifier(&order.column)?;
        }
        Ok(())
    }

    /// PostgREST query string pairs, e.g. `select=id,nombre`, `id=eq.4`, `order=id.asc`.
    pub fn to_postgrest_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(columns) = &self.columns {
            params.push(("select".to_string(), columns.join(",")));
        }

        for condition in &self.conditions {
            let encoded = match (&condition.op, &condition.value) {
                (FilterOp::Eq, Value::Null) => "is.null".to_string(),
                (FilterOp::Neq, Value::Null) => "not.is.null".to_string(),
                (FilterOp::In, Value::Array(items)) => {
                    let inner: Vec<String> = items.iter().map(encode_list_item).collect();
                    format!("in.({})", inner.join(","))
                }
                (op, value) => format!("{}.{}", op.as_postgrest(), encode_scalar(value)),
            };
            params.push((condition.column.clone(), encoded));
        }

        if let Some(order) = &self.order {
            let direction = match order.direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    /// Evaluate the conditions against a row (all must hold).
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|condition| {
            let actual = row.get(&condition.column).unwrap_or(&Value::Null);
            match condition.op {
                FilterOp::Eq => values_equal(actual, &condition.value),
                FilterOp::Neq => !values_equal(actual, &condition.value),
                FilterOp::In => condition
                    .value
                    .as_array()
                    .map(|items| items.iter().any(|item| values_equal(actual, item)))
                    .unwrap_or(false),
                FilterOp::Gt => compare_values(actual, &condition.value) == Some(std::cmp::Ordering::Greater),
                FilterOp::Gte => matches!(
                    compare_values(actual, &condition.value),
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                ),
                FilterOp::Lt => compare_values(actual, &condition.value) == Some(std::cmp::Ordering::Less),
                FilterOp::Lte => matches!(
                    compare_values(actual, &condition.value),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                ),
            }
        })
    }
}

pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

fn encode_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// PostgREST reserves , ( ) inside in-lists; such items must be double-quoted.
fn encode_list_item(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains([',', '(', ')', '"', ' ']) => {
            format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
        }
        other => encode_scalar(other),
    }
}

pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
