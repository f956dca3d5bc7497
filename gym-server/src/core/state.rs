use std::sync::Arc;
use std::time::Duration;

use shared::models::SystemSettings;
use sqlx::SqlitePool;

use crate::auth::{JwtService, RateLimiter};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::settings;
use crate::utils::{AppResult, time};

/// 限流表清理间隔
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// 服务器状态 - 持有所有共享服务的引用
///
/// 处理函数本身无状态；进程内唯一的可变共享状态是限流表。
/// Clone 只复制 Arc / 连接池句柄。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | rate_limiter | RateLimiter | 登录/注册限流 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub jwt_service: Arc<JwtService>,
    pub rate_limiter: RateLimiter,
}

impl ServerState {
    /// 手动构造 (测试可传入内存数据库)
    pub fn new(config: Config, db: DbService) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            db,
            jwt_service,
            rate_limiter: RateLimiter::new(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录存在
    /// 2. 打开数据库并执行迁移
    /// 3. 创建 JWT 服务和限流器
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            ServerError::Config(format!(
                "Failed to create work dir {}: {e}",
                config.work_dir
            ))
        })?;

        let db = DbService::new(&config.database_path).await?;
        Ok(Self::new(config.clone(), db))
    }

    /// 数据库连接池
    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    /// 业务时区的今天 (YYYY-MM-DD)
    pub fn today(&self) -> String {
        time::today_str(self.config.gym.timezone)
    }

    /// 当前系统设置 (容量上限缺省取配置值)
    pub async fn settings(&self) -> AppResult<SystemSettings> {
        Ok(settings::get(self.pool(), self.config.gym.max_capacity).await?)
    }

    /// 启动后台任务
    ///
    /// - 限流表清理 (每 5 分钟)
    pub fn start_background_tasks(&self) {
        let limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
            // 第一次 tick 立即返回
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup().await;
                tracing::debug!("Rate limiter entries cleaned up");
            }
        });
    }

    /// 打印启动信息 (日志)
    pub fn print_startup_summary(&self) {
        let gym = &self.config.gym;
        tracing::info!("  Environment  : {}", self.config.environment);
        tracing::info!("  HTTP Port    : {}", self.config.http_port);
        tracing::info!("  Database     : {}", self.config.database_path);
        tracing::info!("  Timezone     : {}", gym.timezone);
        tracing::info!(
            "  Opening hours: {}-{} ({} days/week)",
            gym.schedule.open.format("%H:%M"),
            gym.schedule.close.format("%H:%M"),
            gym.schedule.operating_days.len()
        );
        tracing::info!("  Max capacity : {}", gym.max_capacity);
    }
}
