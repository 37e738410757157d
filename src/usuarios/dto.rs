use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::flash::Flash;
use crate::store::{NewUser, UserRecord};

/// Body of `POST /registro`. Fields are optional so a missing one is
/// reported through a flash notice instead of a 422.
#[derive(Debug, Default, Deserialize)]
pub struct RegistroForm {
    #[serde(default, alias = "name")]
    pub nombre: Option<String>,
    #[serde(default, alias = "phone")]
    pub telefono: Option<String>,
    #[serde(default, alias = "country")]
    pub pais: Option<String>,
}

impl RegistroForm {
    /// Presence check only; values are kept verbatim.
    pub fn validate(self) -> Result<NewUser, RegistryError> {
        fn present(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }

        match (present(self.nombre), present(self.telefono), present(self.pais)) {
            (Some(name), Some(phone), Some(country)) => Ok(NewUser {
                name,
                phone,
                country,
            }),
            (name, phone, country) => {
                let missing: Vec<&str> = [
                    ("nombre", name.is_none()),
                    ("telefono", phone.is_none()),
                    ("pais", country.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                Err(RegistryError::ValidationFailed(format!(
                    "missing {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Row of the HTML table.
#[derive(Debug, Serialize)]
pub struct UsuarioView {
    pub id: i64,
    pub nombre: String,
    pub telefono: String,
    pub pais: String,
    pub fecha: String,
}

impl From<&UserRecord> for UsuarioView {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id,
            nombre: u.name.clone(),
            telefono: u.phone.clone(),
            pais: u.country.clone(),
            fecha: u
                .registered_at
                .as_ref()
                .map(|r| r.display())
                .unwrap_or_default(),
        }
    }
}

/// Context of the index template.
#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub usuarios: Vec<UsuarioView>,
    pub flash: Option<Flash>,
    pub load_error: Option<String>,
}
