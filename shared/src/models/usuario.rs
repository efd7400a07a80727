//! Usuario Models
//!
//! Identity mirror only. Credentials never touch this service; tokens are
//! issued elsewhere and validated at the HTTP layer.

use serde::{Deserialize, Serialize};

/// User role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Rol {
    Admin,
    Operador,
    #[default]
    Cliente,
}

impl Rol {
    /// Counter staff: operadores and admins
    #[inline]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Rol::Admin | Rol::Operador)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Rol::Admin => "admin",
            Rol::Operador => "operador",
            Rol::Cliente => "cliente",
        }
    }

    /// Wire-name lookup (token claims use the same names as serde)
    pub fn from_name(name: &str) -> Option<Rol> {
        match name {
            "admin" => Some(Rol::Admin),
            "operador" => Some(Rol::Operador),
            "cliente" => Some(Rol::Cliente),
            _ => None,
        }
    }
}

/// Usuario entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Usuario {
    pub id: i64,
    pub username: String,
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub rol: Rol,
    pub activo: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Client search hit (counter autocomplete)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClienteResumen {
    pub id: i64,
    pub username: String,
    pub nombre_completo: String,
    pub telefono: String,
}

impl From<&Usuario> for ClienteResumen {
    fn from(u: &Usuario) -> Self {
        let nombre_completo = if u.nombre.trim().is_empty() {
            u.username.clone()
        } else {
            u.nombre.trim().to_string()
        };
        Self {
            id: u.id,
            username: u.username.clone(),
            nombre_completo,
            telefono: u.telefono.clone().unwrap_or_else(|| "Sin telefono".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario(nombre: &str, telefono: Option<&str>) -> Usuario {
        Usuario {
            id: 1,
            username: "mgarcia".to_string(),
            nombre: nombre.to_string(),
            email: None,
            telefono: telefono.map(String::from),
            direccion: None,
            rol: Rol::Cliente,
            activo: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_is_staff() {
        assert!(Rol::Admin.is_staff());
        assert!(Rol::Operador.is_staff());
        assert!(!Rol::Cliente.is_staff());
    }

    #[test]
    fn test_serde_roles() {
        assert_eq!(serde_json::to_string(&Rol::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Rol::Operador).unwrap(), "\"operador\"");
        assert_eq!(serde_json::to_string(&Rol::Cliente).unwrap(), "\"cliente\"");
    }

    #[test]
    fn test_resumen_con_nombre() {
        let resumen = ClienteResumen::from(&usuario("Maria Garcia", Some("5512345678")));
        assert_eq!(resumen.nombre_completo, "Maria Garcia");
        assert_eq!(resumen.telefono, "5512345678");
    }

    #[test]
    fn test_resumen_fallbacks() {
        // Empty name falls back to username, missing phone to a placeholder
        let resumen = ClienteResumen::from(&usuario("  ", None));
        assert_eq!(resumen.nombre_completo, "mgarcia");
        assert_eq!(resumen.telefono, "Sin telefono");
    }
}
