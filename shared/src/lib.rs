//! Shared types for Punto Limpio
//!
//! Common types used across the shop server and its clients:
//! domain models, error codes, response envelope, and utility helpers.

pub mod error;
pub mod folio;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
