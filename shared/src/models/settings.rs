//! System Settings Model

use serde::{Deserialize, Serialize};

/// Persisted system switches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemSettings {
    pub system_maintenance: bool,
    pub allow_new_registrations: bool,
    pub max_session_capacity: i64,
}

/// Patch payload; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemSettingsUpdate {
    pub system_maintenance: Option<bool>,
    pub allow_new_registrations: Option<bool>,
    pub max_session_capacity: Option<i64>,
}
