//! Schedule window validation
//!
//! A session must fall on an operating weekday, lie entirely inside the
//! opening hours (both bounds inclusive) and last between the configured
//! minimum and maximum duration.

use chrono::{Datelike, NaiveTime, Weekday};

use crate::utils::time::{parse_clock, parse_date};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Operating days, hours and duration bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub operating_days: Vec<Weekday>,
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub min_duration_minutes: i64,
    pub max_duration_minutes: i64,
}

impl Default for ScheduleWindow {
    /// Monday to Saturday, 07:00–21:00, 30–180 minutes
    fn default() -> Self {
        Self {
            operating_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
            open: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
            min_duration_minutes: 30,
            max_duration_minutes: 180,
        }
    }
}

impl ScheduleWindow {
    /// Parse a comma separated weekday list such as `mon,tue,wed`
    pub fn parse_days(raw: &str) -> Option<Vec<Weekday>> {
        let days: Option<Vec<Weekday>> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Weekday>().ok())
            .collect();
        days.filter(|d| !d.is_empty())
    }

    /// Validate a slot given as `YYYY-MM-DD`, `HH:MM`, `HH:MM`
    pub fn validate_slot(&self, date: &str, start_time: &str, end_time: &str) -> AppResult<()> {
        let day = parse_date(date)?;
        if !self.operating_days.contains(&day.weekday()) {
            return Err(AppError::with_message(
                ErrorCode::OutsideOperatingDays,
                format!("The gym is closed on {}", day.weekday()),
            )
            .with_detail("date", date));
        }

        let start = parse_clock(start_time)?;
        let end = parse_clock(end_time)?;

        let within = |t: NaiveTime| t >= self.open && t <= self.close;
        if !within(start) || !within(end) {
            return Err(AppError::with_message(
                ErrorCode::OutsideOperatingHours,
                format!(
                    "Sessions must run between {} and {}",
                    self.open.format("%H:%M"),
                    self.close.format("%H:%M")
                ),
            ));
        }

        if end <= start {
            return Err(AppError::new(ErrorCode::InvalidTimeRange));
        }

        let minutes = (end - start).num_minutes();
        if minutes < self.min_duration_minutes || minutes > self.max_duration_minutes {
            return Err(AppError::with_message(
                ErrorCode::InvalidDuration,
                format!(
                    "Session length must be between {} and {} minutes",
                    self.min_duration_minutes, self.max_duration_minutes
                ),
            )
            .with_detail("minutes", minutes));
        }
        Ok(())
    }
}

/// Hard ceiling for a single session, whatever the configuration says
pub const MAX_SESSION_CAPACITY: i64 = 50;

/// Capacity must lie in `1..=min(max, MAX_SESSION_CAPACITY)`
pub fn validate_capacity(capacity: i64, max: i64) -> AppResult<()> {
    let max = max.min(MAX_SESSION_CAPACITY);
    if capacity < 1 || capacity > max {
        return Err(AppError::with_message(
            ErrorCode::InvalidCapacity,
            format!("Capacity must be between 1 and {max}"),
        )
        .with_detail("capacity", capacity));
    }
    Ok(())
}

/// Half-open interval overlap on `HH:MM` strings: `s1 < e2 && s2 < e1`
pub fn overlaps(s1: &str, e1: &str, s2: &str, e2: &str) -> bool {
    s1 < e2 && s2 < e1
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-03-03 is a Monday
    const MONDAY: &str = "2025-03-03";
    const SATURDAY: &str = "2025-03-08";
    const SUNDAY: &str = "2025-03-09";

    fn code(r: AppResult<()>) -> ErrorCode {
        r.unwrap_err().code
    }

    #[test]
    fn test_operating_days() {
        let w = ScheduleWindow::default();
        assert!(w.validate_slot(MONDAY, "09:00", "10:00").is_ok());
        assert!(w.validate_slot(SATURDAY, "09:00", "10:00").is_ok());
        assert_eq!(
            code(w.validate_slot(SUNDAY, "09:00", "10:00")),
            ErrorCode::OutsideOperatingDays
        );
    }

    #[test]
    fn test_opening_hours_inclusive() {
        let w = ScheduleWindow::default();
        assert!(w.validate_slot(MONDAY, "07:00", "08:00").is_ok());
        assert!(w.validate_slot(MONDAY, "20:00", "21:00").is_ok());
        assert_eq!(
            code(w.validate_slot(MONDAY, "06:59", "08:00")),
            ErrorCode::OutsideOperatingHours
        );
        assert_eq!(
            code(w.validate_slot(MONDAY, "20:30", "21:01")),
            ErrorCode::OutsideOperatingHours
        );
    }

    #[test]
    fn test_time_range() {
        let w = ScheduleWindow::default();
        assert_eq!(
            code(w.validate_slot(MONDAY, "10:00", "10:00")),
            ErrorCode::InvalidTimeRange
        );
        assert_eq!(
            code(w.validate_slot(MONDAY, "11:00", "10:00")),
            ErrorCode::InvalidTimeRange
        );
    }

    #[test]
    fn test_duration_bounds() {
        let w = ScheduleWindow::default();
        assert!(w.validate_slot(MONDAY, "09:00", "09:30").is_ok());
        assert!(w.validate_slot(MONDAY, "09:00", "12:00").is_ok());
        assert_eq!(
            code(w.validate_slot(MONDAY, "09:00", "09:29")),
            ErrorCode::InvalidDuration
        );
        assert_eq!(
            code(w.validate_slot(MONDAY, "09:00", "12:01")),
            ErrorCode::InvalidDuration
        );
    }

    #[test]
    fn test_malformed_input() {
        let w = ScheduleWindow::default();
        assert_eq!(
            code(w.validate_slot("2025-3-3", "09:00", "10:00")),
            ErrorCode::ValidationFailed
        );
        assert_eq!(
            code(w.validate_slot(MONDAY, "9:00", "10:00")),
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn test_capacity() {
        assert!(validate_capacity(1, 50).is_ok());
        assert!(validate_capacity(50, 50).is_ok());
        assert_eq!(validate_capacity(0, 50).unwrap_err().code, ErrorCode::InvalidCapacity);
        assert_eq!(validate_capacity(51, 50).unwrap_err().code, ErrorCode::InvalidCapacity);
        // a looser limit never lifts the ceiling
        assert_eq!(validate_capacity(51, 100).unwrap_err().code, ErrorCode::InvalidCapacity);
        assert!(validate_capacity(20, 20).is_ok());
        assert!(validate_capacity(21, 20).is_err());
    }

    #[test]
    fn test_overlaps() {
        assert!(overlaps("09:00", "10:00", "09:30", "10:30"));
        assert!(overlaps("09:00", "10:00", "08:00", "11:00"));
        assert!(!overlaps("09:00", "10:00", "10:00", "11:00"));
        assert!(!overlaps("09:00", "10:00", "07:00", "09:00"));
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(
            ScheduleWindow::parse_days("mon, wed,fri"),
            Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri])
        );
        assert_eq!(ScheduleWindow::parse_days("mon,funday"), None);
        assert_eq!(ScheduleWindow::parse_days(""), None);
    }
}
