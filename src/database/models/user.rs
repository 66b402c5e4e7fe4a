use serde::{Deserialize, Serialize};

use crate::types::RowId;

/// Stored user row; `password` holds the bcrypt hash, never the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: RowId,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub admin: bool,
}

/// Public view of a user, as listed by GET /users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: RowId,
    pub username: String,
    #[serde(default)]
    pub admin: bool,
}

impl UserSummary {
    pub const COLUMNS: &'static [&'static str] = &["id", "username", "admin"];
}
