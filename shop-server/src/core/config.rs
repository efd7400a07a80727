use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// 机器联动模式 - 订单更新要求的机器被占用时的行为
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModoMaquinas {
    /// 拒绝整个更新，订单不变 (默认)
    #[default]
    Estricto,
    /// 订单照常更新，机器不动，响应附带提示
    Flexible,
}

impl ModoMaquinas {
    fn from_env() -> Self {
        match std::env::var("MODO_MAQUINAS")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "estricto" => ModoMaquinas::Estricto,
            "flexible" => ModoMaquinas::Flexible,
            other => {
                tracing::warn!("Unknown MODO_MAQUINAS '{}', using estricto", other);
                ModoMaquinas::Estricto
            }
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/punto-limpio | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | MODO_MAQUINAS | estricto | 机器联动模式 (estricto/flexible) |
/// | TICKET_BASE_URL | http://localhost:8000 | 票据跟踪链接前缀 |
/// | TIMEZONE | America/Mexico_City | 门店业务时区 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/punto-limpio HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | production
    pub environment: String,
    /// 机器联动模式
    pub modo_maquinas: ModoMaquinas,
    /// 票据跟踪链接前缀
    pub ticket_base_url: String,
    /// 门店业务时区
    pub zona_horaria: Tz,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let zona_horaria = std::env::var("TIMEZONE")
            .unwrap_or_else(|_| "America/Mexico_City".to_string())
            .parse()
            .unwrap_or_else(|_| {
                tracing::warn!("Invalid TIMEZONE, falling back to America/Mexico_City");
                chrono_tz::America::Mexico_City
            });

        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/punto-limpio".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            modo_maquinas: ModoMaquinas::from_env(),
            ticket_base_url: std::env::var("TICKET_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            zona_horaria,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径
    pub fn db_path(&self) -> String {
        format!("{}/punto_limpio.db", self.work_dir)
    }

    /// 日志目录
    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
