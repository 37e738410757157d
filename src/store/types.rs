use serde::{Deserialize, Serialize};

use super::timestamp::{convert_timestamp, RegisteredAt};

/// Fields submitted through the form; the backend assigns id and timestamp.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewUser {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "pais")]
    pub country: String,
}

/// Row of the `usuarios` table as the backend returns it.
#[derive(Debug, Clone, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub nombre: String,
    pub telefono: String,
    pub pais: String,
    pub fecha_registro: Option<String>,
}

/// User record handed to the web layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "fecha_registro")]
    pub registered_at: Option<RegisteredAt>,
}

impl From<UserRow> for UserRecord {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            name: r.nombre,
            phone: r.telefono,
            country: r.pais,
            registered_at: r.fecha_registro.map(|s| convert_timestamp(&s)),
        }
    }
}

/// Diagnostic snapshot of the table, logged at startup.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub count: i64,
    pub sample: Option<UserRecord>,
}
