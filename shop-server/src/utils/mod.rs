//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] / [`ApiResponse`] - 统一错误和响应类型 (re-export from shared)
//! - [`logger`] - 日志初始化
//! - [`time`] - 业务时区和日期工具
//! - [`validation`] - 输入验证

pub mod logger;
pub mod time;
pub mod validation;

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
