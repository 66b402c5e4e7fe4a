use serde::{Deserialize, Serialize};

use crate::types::RowId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profession {
    pub id: RowId,
    pub nombre: String,
}

/// PATCH /oficios/:id body; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfessionChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

/// Join row between a character and a profession
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionLevel {
    pub id: RowId,
    pub id_personaje: RowId,
    pub id_oficio: RowId,
    pub nivel: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfessionLevel {
    pub id_personaje: RowId,
    pub id_oficio: RowId,
    pub nivel: i32,
}

/// PATCH /oficioslevel body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelChange {
    pub id_personaje: RowId,
    pub id_oficio: RowId,
    pub nivel: i32,
}
