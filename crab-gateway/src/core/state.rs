use std::path::Path;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::gateway::Gateway;
use crate::notify::DownstreamBus;

/// SQLite 连接池大小 (与请求并发上限无关)
const DB_POOL_SIZE: u32 = 8;

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | jwt | Arc<JwtService> | JWT 认证服务 |
/// | gateway | Gateway | 状态转换网关 |
///
/// 克隆成本极低，axum 每个请求克隆一次。
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub jwt: Arc<JwtService>,
    pub gateway: Gateway,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("environment", &self.config.environment)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// Assemble state over an already opened database
    pub fn new(config: Config, db: DbService) -> Self {
        let jwt = Arc::new(JwtService::new(config.jwt.clone()));
        let bus = DownstreamBus::new(config.notify_buffer);
        let gateway = Gateway::sqlite(db.pool.clone(), bus);
        Self {
            config,
            db,
            jwt,
            gateway,
        }
    }

    /// 初始化服务器状态
    ///
    /// 创建数据目录、打开数据库并执行迁移。
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = DbService::new(&config.database_path, DB_POOL_SIZE).await?;
        tracing::info!(path = %config.database_path, "Database ready");

        Ok(Self::new(config.clone(), db))
    }
}
