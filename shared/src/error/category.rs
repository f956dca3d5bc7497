//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Member errors
/// - 4xxx: Schedule errors
/// - 5xxx: Booking errors
/// - 6xxx: Billing errors
/// - 7xxx: Notification errors
/// - 8xxx: Settings errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Member errors (3xxx)
    Member,
    /// Schedule errors (4xxx)
    Schedule,
    /// Booking errors (5xxx)
    Booking,
    /// Billing errors (6xxx)
    Billing,
    /// Notification errors (7xxx)
    Notification,
    /// Settings errors (8xxx)
    Settings,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Member,
            4000..5000 => Self::Schedule,
            5000..6000 => Self::Booking,
            6000..7000 => Self::Billing,
            7000..8000 => Self::Notification,
            8000..9000 => Self::Settings,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Member => "member",
            Self::Schedule => "schedule",
            Self::Booking => "booking",
            Self::Billing => "billing",
            Self::Notification => "notification",
            Self::Settings => "settings",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
