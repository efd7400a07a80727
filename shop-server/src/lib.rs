//! Punto Limpio Shop Server - 洗衣店管理系统服务端
//!
//! # 架构概述
//!
//! 本模块是 Shop Server 的主入口，提供以下核心功能：
//!
//! - **订单生命周期** (`orders`): 登记 → 处理 → 机器分配 → 交付 的状态机
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx)
//! - **认证** (`auth`): JWT 角色认证 (admin / operador / cliente)
//! - **票据** (`services`): 凭折跟踪链接和可插拔的票据发送
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! shop-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色中间件
//! ├── services/      # 票据发送
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 工具函数
//! ├── db/            # 数据库层
//! └── orders/        # 订单业务流程
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, ModoMaquinas, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 工作目录, 日志)
///
/// 在加载配置和初始化状态之前调用一次。
pub fn setup_environment() -> Result<(), AppError> {
    // .env 可选; 没有也照常启动
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    config
        .ensure_work_dir()
        .map_err(|e| AppError::internal(format!("Failed to create work directory: {}", e)))?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = config.log_dir();
    init_logger_with_file(log_level.as_deref(), Some(&log_dir));

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____              __
   / __ \__  ______  / /_____
  / /_/ / / / / __ \/ __/ __ \
 / ____/ /_/ / / / / /_/ /_/ /
/_/    \__,_/_/ /_/\__/\____/
    __    _                 _
   / /   (_)___ ___  ____  (_)___
  / /   / / __ `__ \/ __ \/ / __ \
 / /___/ / / / / / / /_/ / / /_/ /
/_____/_/_/ /_/ /_/ .___/_/\____/
                 /_/
    "#
    );
}
