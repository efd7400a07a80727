//! MovimientoOperador Models

use serde::{Deserialize, Serialize};

/// Staff action recorded in the audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Accion {
    CreoTicket,
    Entrego,
    CambioPrecio,
    Elimino,
    Actualizo,
    RegistroServicio,
}

/// Audit trail entry, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MovimientoOperador {
    pub id: i64,
    pub operador_id: i64,
    pub accion: Accion,
    pub detalles: String,
    /// Nullable so entries outlive order deletion
    pub pedido_id: Option<i64>,
    pub fecha: i64,
}

/// Audit entry with operator info joined in (admin history view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MovimientoView {
    pub id: i64,
    pub operador_id: i64,
    pub operador_username: String,
    pub accion: Accion,
    pub detalles: String,
    pub pedido_id: Option<i64>,
    pub pedido_folio: Option<String>,
    pub fecha: i64,
}
