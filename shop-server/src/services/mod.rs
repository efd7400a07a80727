//! 服务层 - 核心流程之外的边车服务
//!
//! # 服务列表
//!
//! - [`TicketNotifier`] - 电子票据发送 (默认实现只写日志)

pub mod ticket;

pub use ticket::{LogTicketNotifier, TicketError, TicketNotifier, ticket_url};
