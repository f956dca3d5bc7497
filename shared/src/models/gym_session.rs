//! Gym Session Model (bookable time slot)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Gym session with derived occupancy
///
/// `current_bookings` counts occupying bookings (`confirmed` or `completed`)
/// and is computed by every read query, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct GymSession {
    pub id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub capacity: i64,
    #[serde(rename = "type")]
    pub session_type: String,
    pub instructor: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub price: Option<f64>,
    pub is_active: bool,
    pub current_bookings: i64,
    pub available_spots: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_session_type() -> String {
    "general".to_string()
}

/// Create session payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GymSessionCreate {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i64,
    #[serde(rename = "type", default = "default_session_type")]
    #[validate(length(min = 1, max = 50))]
    pub session_type: String,
    #[validate(length(max = 100))]
    pub instructor: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub difficulty: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}

/// Update session payload (merged over the stored row before validation)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GymSessionUpdate {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i64>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub session_type: Option<String>,
    #[validate(length(max = 100))]
    pub instructor: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub difficulty: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}

/// Session list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionQuery {
    pub date: Option<String>,
    /// Include full sessions in a student listing
    pub show_all: Option<bool>,
}

/// Result of a session soft-delete
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDeleteResult {
    pub session_id: i64,
    pub cancelled_bookings: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_type_serializes_as_type() {
        let body = r#"{"date":"2025-03-03","start_time":"09:00","end_time":"10:00","capacity":10,"type":"yoga"}"#;
        let create: GymSessionCreate = serde_json::from_str(body).unwrap();
        assert_eq!(create.session_type, "yoga");
        assert!(create.validate().is_ok());

        let json = serde_json::to_value(&create).unwrap();
        assert_eq!(json["type"], "yoga");
    }

    #[test]
    fn test_empty_type_rejected() {
        let body = r#"{"date":"2025-03-03","start_time":"09:00","end_time":"10:00","capacity":10,"type":""}"#;
        let create: GymSessionCreate = serde_json::from_str(body).unwrap();
        assert!(create.validate().is_err());
    }

    #[test]
    fn test_type_defaults_to_general() {
        let body = r#"{"date":"2025-03-03","start_time":"09:00","end_time":"10:00","capacity":10}"#;
        let create: GymSessionCreate = serde_json::from_str(body).unwrap();
        assert_eq!(create.session_type, "general");
    }
}
