//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`precios`] - 公共价目表
//! - [`clientes`] - 客户搜索 (柜台)
//! - [`pedidos`] - 订单接口 (创建/查询/更新/交付)
//! - [`maquinas`] - 洗衣机/烘干机状态板和登记
//! - [`movimientos`] - 操作员审计记录

pub mod clientes;
pub mod health;
pub mod maquinas;
pub mod movimientos;
pub mod pedidos;
pub mod precios;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
