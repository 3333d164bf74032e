//! Utility functions for the counter queue service

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::UserId;

/// Generate a new unique user ID
pub fn generate_user_id() -> UserId {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Human-readable uptime, e.g. `1h 2m 3s`
pub fn format_uptime(started_at: DateTime<Utc>) -> String {
    let elapsed = (current_timestamp() - started_at).num_seconds().max(0);
    let hours = elapsed / 3600;
    let minutes = (elapsed % 3600) / 60;
    let seconds = elapsed % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
