//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on:
//! - 80mm thermal ticket line width
//! - Reasonable UX limits for names and notes
//! - SQLite TEXT has no built-in length enforcement

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: machine names, service names, garment names
pub const MAX_NOMBRE_LEN: usize = 200;

/// Notes, observaciones, failure descriptions
pub const MAX_NOTA_LEN: usize = 500;

/// Short free text: tipo_servicio, cobija_tipo
pub const MAX_TEXTO_CORTO_LEN: usize = 100;

// ── Numeric limits ──────────────────────────────────────────────────

/// Maximum garment count per order or line
pub const MAX_CANTIDAD: i32 = 9999;

/// Maximum order weight in kg
pub const MAX_PESO_KG: f64 = 1000.0;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a garment count (0 allowed; aggregate orders may omit it).
pub fn validate_cantidad(cantidad: i32, field: &str) -> Result<(), AppError> {
    if cantidad < 0 {
        return Err(AppError::validation(format!("{field} must not be negative")));
    }
    if cantidad > MAX_CANTIDAD {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_CANTIDAD})"
        )));
    }
    Ok(())
}

/// Validate a weight in kg (finite, non-negative, bounded).
pub fn validate_peso(peso: f64, field: &str) -> Result<(), AppError> {
    if !peso.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number")));
    }
    if peso < 0.0 {
        return Err(AppError::validation(format!("{field} must not be negative")));
    }
    if peso > MAX_PESO_KG {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_PESO_KG} kg)"
        )));
    }
    Ok(())
}
