//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、当前用户
//! - [`setup`] - 首个管理员初始化
//! - [`sessions`] - 课程时段
//! - [`bookings`] - 预约
//! - [`billing`] - 账单流水
//! - [`notifications`] - 通知
//! - [`admin_users`] - 会员管理 (管理员)
//! - [`stats`] - 仪表盘统计 (管理员)
//! - [`settings`] - 系统开关 (管理员)

pub mod auth;
pub mod health;
pub mod setup;

// Gym resources
pub mod bookings;
pub mod billing;
pub mod notifications;
pub mod sessions;

// Admin only
pub mod admin_users;
pub mod settings;
pub mod stats;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
