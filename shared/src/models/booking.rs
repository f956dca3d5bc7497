//! Booking Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Booking status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Cancelled,
    Completed,
    #[serde(rename = "no-show")]
    #[cfg_attr(feature = "db", sqlx(rename = "no-show"))]
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        Self::Confirmed,
        Self::Cancelled,
        Self::Completed,
        Self::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::NoShow => "no-show",
        }
    }

    /// Whether the booking holds one of the session's places
    pub fn is_occupying(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }

    /// Only confirmed bookings move, and only to a terminal state
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (
                Self::Confirmed,
                Self::Completed | Self::NoShow | Self::Cancelled
            )
        )
    }

    /// Like [`Self::can_transition_to`], but repeating the current status is a no-op
    pub fn accepts(&self, next: BookingStatus) -> bool {
        *self == next || self.can_transition_to(next)
    }
}

/// Booking entity (DB row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub session_id: i64,
    pub status: BookingStatus,
    pub booking_date: i64,
    pub check_in_time: Option<i64>,
    pub check_out_time: Option<i64>,
    pub notes: Option<String>,
    pub rating: Option<i64>,
    pub feedback: Option<String>,
    pub cancelled_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Booking joined with its session and member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BookingDetail {
    pub id: i64,
    pub user_id: i64,
    pub session_id: i64,
    pub status: BookingStatus,
    pub booking_date: i64,
    pub check_in_time: Option<i64>,
    pub check_out_time: Option<i64>,
    pub notes: Option<String>,
    pub rating: Option<i64>,
    pub feedback: Option<String>,
    pub cancelled_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    // Session
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub session_type: String,
    pub instructor: Option<String>,
    // Member
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_id: Option<String>,
}

/// Create booking payload
///
/// `user_id` is only honoured for admins; students always book for themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreate {
    pub session_id: i64,
    pub user_id: Option<i64>,
}

/// Update booking payload
///
/// Students may only send `status: cancelled`. The remaining fields are
/// admin-only attendance and feedback data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BookingUpdate {
    pub status: Option<BookingStatus>,
    pub check_in_time: Option<i64>,
    pub check_out_time: Option<i64>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub rating: Option<i64>,
    #[validate(length(max = 2000))]
    pub feedback: Option<String>,
}

impl BookingUpdate {
    /// True when the payload carries anything besides a status change
    pub fn has_admin_fields(&self) -> bool {
        self.check_in_time.is_some()
            || self.check_out_time.is_some()
            || self.notes.is_some()
            || self.rating.is_some()
            || self.feedback.is_some()
    }
}

/// Admin booking list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
    pub date: Option<String>,
    pub user_id: Option<i64>,
}

/// Per-member booking counters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserBookingStats {
    pub total: i64,
    pub confirmed: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_from_confirmed() {
        let s = BookingStatus::Confirmed;
        assert!(s.can_transition_to(BookingStatus::Cancelled));
        assert!(s.can_transition_to(BookingStatus::Completed));
        assert!(s.can_transition_to(BookingStatus::NoShow));
        assert!(!s.can_transition_to(BookingStatus::Confirmed));
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        for s in [
            BookingStatus::Cancelled,
            BookingStatus::Completed,
            BookingStatus::NoShow,
        ] {
            assert!(!s.can_transition_to(BookingStatus::Confirmed));
            assert!(!s.can_transition_to(BookingStatus::Cancelled));
        }
    }

    #[test]
    fn test_repeating_status_is_accepted() {
        for s in BookingStatus::ALL {
            assert!(s.accepts(s));
        }
        assert!(!BookingStatus::Completed.accepts(BookingStatus::NoShow));
        assert!(BookingStatus::Confirmed.accepts(BookingStatus::NoShow));
    }

    #[test]
    fn test_occupying() {
        assert!(BookingStatus::Confirmed.is_occupying());
        assert!(BookingStatus::Completed.is_occupying());
        assert!(!BookingStatus::Cancelled.is_occupying());
        assert!(!BookingStatus::NoShow.is_occupying());
    }

    #[test]
    fn test_no_show_serde() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::NoShow).unwrap(),
            "\"no-show\""
        );
        let s: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(s, BookingStatus::Cancelled);
    }
}
