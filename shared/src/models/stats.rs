//! Admin dashboard aggregates

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub suspended: i64,
    pub expired: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingCounts {
    pub total: i64,
    pub confirmed: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    pub users: UserCounts,
    pub bookings: BookingCounts,
    pub upcoming_sessions: i64,
    /// Completed payments minus completed refunds
    pub revenue: f64,
}
