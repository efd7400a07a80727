use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::services::{LogTicketNotifier, TicketNotifier};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝；axum 的每个 handler 都拿到一个 Clone。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | jwt_service | JWT 认证服务 |
/// | tickets | 电子票据发送服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库服务
    pub db: DbService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 票据发送服务
    pub tickets: Arc<dyn TicketNotifier>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(
        config: Config,
        db: DbService,
        jwt_service: Arc<JwtService>,
        tickets: Arc<dyn TicketNotifier>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            tickets,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/punto_limpio.db, 自动跑迁移)
    /// 3. JWT 服务和票据服务
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir()
            .expect("Failed to create work directory structure");

        let db = DbService::new(&config.db_path())
            .await
            .expect("Failed to initialize database");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let tickets: Arc<dyn TicketNotifier> = Arc::new(LogTicketNotifier::new(
            config.ticket_base_url.clone(),
            config.zona_horaria,
        ));

        Self::new(config.clone(), db, jwt_service, tickets)
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
