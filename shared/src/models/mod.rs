//! Data models
//!
//! Shared between shop-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY); timestamps are Unix millis.

pub mod catalogo;
pub mod maquina;
pub mod movimiento;
pub mod pedido;
pub mod serde_helpers;
pub mod usuario;

// Re-exports
pub use catalogo::*;
pub use maquina::*;
pub use movimiento::*;
pub use pedido::*;
pub use usuario::*;
