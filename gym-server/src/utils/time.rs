//! 时间工具函数: 业务时区日期
//!
//! 会员到期、课程是否已过期都按业务时区 (默认 Asia/Singapore) 的日历日判断。
//! 数据库里的日期是 `YYYY-MM-DD`，时刻是 `HH:MM`，都可以直接按字符串比较。

use chrono::{Months, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const CLOCK_FORMAT: &str = "%H:%M";

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    if date.len() != 10 {
        return Err(AppError::validation(format!("Invalid date format: {}", date)));
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析时刻字符串 (HH:MM)
pub fn parse_clock(time: &str) -> AppResult<NaiveTime> {
    // NaiveTime accepts "9:00"; require the zero-padded form used for lexical comparison
    if time.len() != 5 {
        return Err(AppError::validation(format!("Invalid time format: {}", time)));
    }
    NaiveTime::parse_from_str(time, CLOCK_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// 业务时区的今天
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 业务时区的今天 (YYYY-MM-DD)
pub fn today_str(tz: Tz) -> String {
    format_date(today(tz))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 日期 + N 个月 (月末自动截断，如 01-31 + 1 → 02-28)
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-03-03").is_ok());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("03/03/2025").is_err());
    }

    #[test]
    fn test_parse_clock_requires_padding() {
        assert_eq!(
            parse_clock("07:00").unwrap(),
            NaiveTime::from_hms_opt(7, 0, 0).unwrap()
        );
        assert!(parse_clock("7:00").is_err());
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("09:00:00").is_err());
    }

    #[test]
    fn test_add_months_clamps_month_end() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(
            add_months(d, 1),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            add_months(d, 12),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
    }
}
