//! Money helpers using rust_decimal for precision
//!
//! Subtotals and totals compute in `Decimal`, then convert to `f64` for
//! storage/serialization.

use rust_decimal::prelude::*;

/// Monetary values round to centavos, half away from zero
const DECIMAL_PLACES: u32 = 2;

/// Upper bound for any single amount (MXN)
const MONTO_MAX: f64 = 1_000_000.0;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Line subtotal: unit price times quantity. The client may send its own
/// subtotal; the stored value is always this one.
pub fn subtotal_linea(precio_unitario: f64, cantidad: i32) -> f64 {
    to_f64(to_decimal(precio_unitario) * Decimal::from(cantidad))
}

/// Normalize an incoming amount to centavos before storage.
pub fn redondear(valor: f64) -> f64 {
    to_f64(to_decimal(valor))
}

/// Reject NaN/Infinity, negatives and absurd amounts before storage.
pub fn validar_monto(valor: f64, campo: &str) -> Result<(), String> {
    if !valor.is_finite() {
        return Err(format!("{campo} debe ser un numero valido"));
    }
    if valor < 0.0 {
        return Err(format!("{campo} no puede ser negativo"));
    }
    if valor > MONTO_MAX {
        return Err(format!("{campo} excede el maximo permitido"));
    }
    Ok(())
}
