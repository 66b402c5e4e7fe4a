use serde::{Deserialize, Serialize};

/// POST /clases body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

/// PUT /clases/:id body; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}
