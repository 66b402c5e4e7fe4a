use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::RowId;

/// Character row. Columns beyond the known ones are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: RowId,
    pub name: String,
    pub level: i32,
    pub clase: String,
    pub user_id: RowId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// POST /personajes body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCharacter {
    pub name: String,
    pub level: i32,
    pub clase: String,
    pub user_id: RowId,
}

/// One profession entry attached to a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfession {
    pub id_oficio: RowId,
    /// None when the level row points at a profession that no longer exists
    pub oficio: Option<String>,
    pub nivel: i32,
}

/// Character with its profession levels, as returned by GET /personajes/:user_id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterProfile {
    #[serde(flatten)]
    pub character: Character,
    pub oficios: Vec<CharacterProfession>,
}
