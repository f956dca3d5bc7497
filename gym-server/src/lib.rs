//! Gym Server - 大学健身房会员与预约服务
//!
//! # 架构概述
//!
//! - **会员** (`api/auth`, `api/admin_users`): 注册 → 审批/拒绝 → 暂停/到期
//! - **课程** (`api/sessions`, `schedule`): 有容量上限的时段，营业时间校验
//! - **预约** (`api/bookings`): 原子化的容量检查与取消
//! - **账单** (`api/billing`): 只追加的交易流水
//! - **通知** (`api/notifications`): 定向或广播，按读者记录已读/删除
//! - **数据库** (`db`): SQLite (sqlx)，仓储层为自由函数
//! - **认证** (`auth`): JWT + Argon2，角色声明 student/admin
//!
//! # 模块结构
//!
//! ```text
//! gym-server/src/
//! ├── core/          # 配置、状态、错误、HTTP 服务器
//! ├── auth/          # JWT、密码、中间件、限流
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池、迁移、仓储
//! ├── schedule.rs    # 营业时间窗口校验
//! └── utils/         # 日志、时间、校验、参考号
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod schedule;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_router};
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

/// 设置运行环境: 加载 .env、创建工作目录、初始化日志
///
/// 日志级别和格式读取 `LOG_LEVEL` / `LOG_JSON`，文件日志写到 `<WORK_DIR>/logs`
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
    let log_dir = format!("{work_dir}/logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    init_logger_with_file(log_level.as_deref(), json, Some(&log_dir));
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______
  / ____/_  ______ ___
 / / __/ / / / __ `__ \
/ /_/ / /_/ / / / / / /
\____/\__, /_/ /_/ /_/
     /____/   membership & booking
    "#
    );
}
