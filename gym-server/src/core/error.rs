use thiserror::Error;

/// 启动/运行期错误 (配置、数据库、监听端口)
///
/// 请求级错误统一使用 [`crate::utils::AppError`]
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<crate::utils::AppError> for ServerError {
    fn from(err: crate::utils::AppError) -> Self {
        match err.code {
            crate::utils::ErrorCode::DatabaseError => ServerError::Database(err.message),
            crate::utils::ErrorCode::ConfigError => ServerError::Config(err.message),
            _ => ServerError::Internal(anyhow::anyhow!(err.message)),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
