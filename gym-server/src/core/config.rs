use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;
use crate::schedule::{MAX_SESSION_CAPACITY, ScheduleWindow};

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DATABASE_PATH | {WORK_DIR}/gym.db | SQLite 数据库文件 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOGIN_RATE_LIMIT | 5 | 每 IP 每分钟登录次数 |
/// | REGISTER_RATE_LIMIT | 3 | 每 IP 每分钟注册次数 |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]，场馆相关变量见 [`GymConfig::from_env`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/gym HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// SQLite 数据库路径
    pub database_path: String,
    pub log_level: String,
    pub log_json: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 场馆业务规则
    pub gym: GymConfig,
    pub login_rate_limit: u32,
    pub register_rate_limit: u32,
    /// 限流是否信任 `X-Forwarded-For` (仅在反向代理后开启)
    pub trust_proxy_headers: bool,
}

/// 场馆业务规则
///
/// | 环境变量 | 默认值 |
/// |----------|--------|
/// | GYM_TIMEZONE | Asia/Singapore |
/// | GYM_OPERATING_DAYS | mon,tue,wed,thu,fri,sat |
/// | GYM_OPEN_TIME | 07:00 |
/// | GYM_CLOSE_TIME | 21:00 |
/// | GYM_MIN_DURATION_MINUTES | 30 |
/// | GYM_MAX_DURATION_MINUTES | 180 |
/// | GYM_MAX_CAPACITY | 50 |
/// | ALLOWED_EMAIL_DOMAIN | my.jcu.edu.au |
/// | BILLING_CURRENCY | SGD |
/// | ENFORCE_BOOKING_OVERLAP | true |
#[derive(Debug, Clone)]
pub struct GymConfig {
    /// 业务时区 (会员到期、课程日期)
    pub timezone: Tz,
    pub schedule: ScheduleWindow,
    /// 课程容量上限 (system_settings.max_session_capacity 不能超过它)
    pub max_capacity: i64,
    pub allowed_email_domain: String,
    pub billing_currency: String,
    /// 同一天时间重叠的预约是否拒绝
    pub enforce_booking_overlap: bool,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_clock(key: &str) -> Result<Option<NaiveTime>, ServerError> {
    match std::env::var(key) {
        Ok(v) => NaiveTime::parse_from_str(&v, "%H:%M")
            .map(Some)
            .map_err(|_| ServerError::Config(format!("{key} must be HH:MM, got '{v}'"))),
        Err(_) => Ok(None),
    }
}

impl GymConfig {
    pub fn from_env() -> Result<Self, ServerError> {
        let defaults = ScheduleWindow::default();

        let timezone = match std::env::var("GYM_TIMEZONE") {
            Ok(tz) => tz
                .parse::<Tz>()
                .map_err(|_| ServerError::Config(format!("Unknown GYM_TIMEZONE '{tz}'")))?,
            Err(_) => chrono_tz::Asia::Singapore,
        };

        let operating_days = match std::env::var("GYM_OPERATING_DAYS") {
            Ok(raw) => ScheduleWindow::parse_days(&raw).ok_or_else(|| {
                ServerError::Config(format!("Invalid GYM_OPERATING_DAYS '{raw}'"))
            })?,
            Err(_) => defaults.operating_days.clone(),
        };

        let schedule = ScheduleWindow {
            operating_days,
            open: env_clock("GYM_OPEN_TIME")?.unwrap_or(defaults.open),
            close: env_clock("GYM_CLOSE_TIME")?.unwrap_or(defaults.close),
            min_duration_minutes: env_parse("GYM_MIN_DURATION_MINUTES")
                .unwrap_or(defaults.min_duration_minutes),
            max_duration_minutes: env_parse("GYM_MAX_DURATION_MINUTES")
                .unwrap_or(defaults.max_duration_minutes),
        };
        if schedule.open >= schedule.close {
            return Err(ServerError::Config(
                "GYM_OPEN_TIME must be before GYM_CLOSE_TIME".into(),
            ));
        }

        let max_capacity = env_parse("GYM_MAX_CAPACITY").unwrap_or(MAX_SESSION_CAPACITY);
        if !(1..=MAX_SESSION_CAPACITY).contains(&max_capacity) {
            return Err(ServerError::Config(format!(
                "GYM_MAX_CAPACITY must be between 1 and {MAX_SESSION_CAPACITY}"
            )));
        }

        Ok(Self {
            timezone,
            schedule,
            max_capacity,
            allowed_email_domain: std::env::var("ALLOWED_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "my.jcu.edu.au".into()),
            billing_currency: std::env::var("BILLING_CURRENCY").unwrap_or_else(|_| "SGD".into()),
            enforce_booking_overlap: env_parse("ENFORCE_BOOKING_OVERLAP").unwrap_or(true),
        })
    }
}

impl Default for GymConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Singapore,
            schedule: ScheduleWindow::default(),
            max_capacity: MAX_SESSION_CAPACITY,
            allowed_email_domain: "my.jcu.edu.au".into(),
            billing_currency: "SGD".into(),
            enforce_booking_overlap: true,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的变量使用默认值；设置了但无法解析的场馆/JWT 变量返回错误
    pub fn from_env() -> Result<Self, ServerError> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| format!("{work_dir}/gym.db"));

        Ok(Self {
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            database_path,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON").unwrap_or(false),
            jwt: JwtConfig::from_env().map_err(|e| ServerError::Config(e.to_string()))?,
            gym: GymConfig::from_env()?,
            login_rate_limit: env_parse("LOGIN_RATE_LIMIT").unwrap_or(5),
            register_rate_limit: env_parse("REGISTER_RATE_LIMIT").unwrap_or(3),
            trust_proxy_headers: env_parse("TRUST_PROXY_HEADERS").unwrap_or(false),
            work_dir,
        })
    }

    /// 测试配置: 指定工作目录和 JWT 密钥，其余取默认值，限流放宽
    pub fn for_testing(work_dir: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_path: format!("{work_dir}/gym.db"),
            work_dir,
            http_port: 0,
            environment: "test".into(),
            log_level: "warn".into(),
            log_json: false,
            jwt: JwtConfig::with_secret(jwt_secret),
            gym: GymConfig::default(),
            login_rate_limit: 1000,
            register_rate_limit: 1000,
            trust_proxy_headers: false,
        }
    }

    /// 日志目录
    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testing_config_defaults() {
        let config = Config::for_testing("/tmp/gym", "x".repeat(32));
        assert_eq!(config.database_path, "/tmp/gym/gym.db");
        assert_eq!(config.gym.max_capacity, 50);
        assert_eq!(config.gym.billing_currency, "SGD");
        assert_eq!(config.gym.timezone, chrono_tz::Asia::Singapore);
        assert!(config.gym.enforce_booking_overlap);
        assert!(!config.trust_proxy_headers);
        assert!(!config.is_production());
        assert_eq!(config.log_dir(), "/tmp/gym/logs");
    }
}
