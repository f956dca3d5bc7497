//! System Settings Repository (key/value)

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{SystemSettings, SystemSettingsUpdate};
use sqlx::SqlitePool;

const MAINTENANCE: &str = "system_maintenance";
const REGISTRATIONS: &str = "allow_new_registrations";
const MAX_CAPACITY: &str = "max_session_capacity";

/// Current settings; missing keys fall back to defaults
/// (`max_session_capacity` falls back to `config_max_capacity`)
pub async fn get(pool: &SqlitePool, config_max_capacity: i64) -> RepoResult<SystemSettings> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM system_settings")
        .fetch_all(pool)
        .await?;

    let mut settings = SystemSettings {
        system_maintenance: false,
        allow_new_registrations: true,
        max_session_capacity: config_max_capacity,
    };
    for (key, value) in rows {
        match key.as_str() {
            MAINTENANCE => settings.system_maintenance = value == "true",
            REGISTRATIONS => settings.allow_new_registrations = value == "true",
            MAX_CAPACITY => {
                if let Ok(v) = value.parse::<i64>() {
                    // A lowered config ceiling wins over an older stored value
                    settings.max_session_capacity = v.clamp(1, config_max_capacity);
                }
            }
            _ => {}
        }
    }
    Ok(settings)
}

/// Patch settings; `max_session_capacity` must lie in `1..=config_max_capacity`
pub async fn update(
    pool: &SqlitePool,
    patch: SystemSettingsUpdate,
    config_max_capacity: i64,
) -> RepoResult<SystemSettings> {
    if let Some(cap) = patch.max_session_capacity
        && !(1..=config_max_capacity).contains(&cap)
    {
        return Err(RepoError::Business(
            ErrorCode::InvalidSetting,
            format!("max_session_capacity must be between 1 and {config_max_capacity}"),
        ));
    }

    let mut values: Vec<(&str, String)> = Vec::new();
    if let Some(v) = patch.system_maintenance {
        values.push((MAINTENANCE, v.to_string()));
    }
    if let Some(v) = patch.allow_new_registrations {
        values.push((REGISTRATIONS, v.to_string()));
    }
    if let Some(v) = patch.max_session_capacity {
        values.push((MAX_CAPACITY, v.to_string()));
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    for (key, value) in values {
        sqlx::query(
            "INSERT INTO system_settings (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    get(pool, config_max_capacity).await
}
