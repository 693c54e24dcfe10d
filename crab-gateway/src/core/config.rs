use crate::auth::JwtConfig;

/// 网关配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | ./work_dir/gateway.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 默认日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | JSON 日志格式 |
/// | LOG_DIR | - | 日志目录 (未设置时仅输出到控制台) |
/// | MAX_CONNECTIONS | 1000 | 最大并发请求数 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | NOTIFY_BUFFER | 256 | 下游通知缓冲区大小 |
/// | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE / JWT_EXPIRATION_MINUTES | | 见 [`JwtConfig`] |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub max_connections: usize,
    pub request_timeout_ms: u64,
    pub notify_buffer: usize,
    pub jwt: JwtConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// `JWT_SECRET` 在非开发环境下必须设置且不少于 32 字符
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let jwt = JwtConfig::from_env(environment == "development")?;

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./work_dir/gateway.db".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            max_connections: env_or("MAX_CONNECTIONS", 1000),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            notify_buffer: env_or("NOTIFY_BUFFER", 256),
            jwt,
        })
    }

    /// 测试用配置
    pub fn for_tests(jwt: JwtConfig) -> Self {
        Self {
            database_path: ":memory:".into(),
            http_port: 0,
            environment: "test".into(),
            log_level: "debug".into(),
            log_json: false,
            log_dir: None,
            max_connections: 64,
            request_timeout_ms: 5_000,
            notify_buffer: 16,
            jwt,
        }
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
