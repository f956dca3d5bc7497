//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`logger`] - 日志初始化
//! - [`reference`] - 支付参考号
//! - [`time`] - 业务时区日期工具
//! - [`validation`] - 输入校验 (文本长度、邮箱域名、学号、银行卡)

pub mod logger;
pub mod reference;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
