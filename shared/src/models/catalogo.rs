//! Catalog Models (prendas and servicios)
//!
//! Read-only collaborators for the order flows; prices are maintained
//! outside this service.

use serde::{Deserialize, Serialize};

/// Service category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TipoServicio {
    Autoservicio,
    PorEncargo,
    ADomicilio,
    Tintoreria,
}

/// Garment catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Prenda {
    pub id: i64,
    pub nombre: String,
    pub precio: f64,
    pub activo: bool,
    pub fecha_actualizacion: i64,
}

/// Service catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Servicio {
    pub id: i64,
    pub nombre: String,
    pub tipo: TipoServicio,
    pub precio: f64,
    pub descripcion: Option<String>,
    pub activo: bool,
    pub fecha_actualizacion: i64,
}

/// Public price list (client-side calculators)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Precios {
    pub prendas: Vec<Prenda>,
    pub servicios: Vec<Servicio>,
}
