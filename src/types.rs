//! Common types used throughout the counter queue service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::QueueError;

/// Index of a service counter, always in `0..counter_count`
pub type CounterIndex = usize;

/// Stable identifier assigned to a user at enrollment
pub type UserId = Uuid;

/// Full snapshot of every counter queue, keyed by counter index
pub type CountersSnapshot = BTreeMap<CounterIndex, Vec<User>>;

/// Service status of a queued user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Freshly enrolled, not yet marked
    #[default]
    Unset,
    Green,
    Red,
}

impl UserStatus {
    /// Whether a user with this status counts toward a counter's load.
    ///
    /// Unset users are active: a user who has not been marked yet is still
    /// waiting to be served.
    pub fn is_active(self) -> bool {
        self != UserStatus::Red
    }

    /// Whether callers may move a user into this status
    pub fn is_settable(self) -> bool {
        matches!(self, UserStatus::Green | UserStatus::Red)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Unset => "unset",
            UserStatus::Green => "green",
            UserStatus::Red => "red",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a status supplied by a caller. Only `green` and `red` are accepted.
impl FromStr for UserStatus {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green" => Ok(UserStatus::Green),
            "red" => Ok(UserStatus::Red),
            other => Err(QueueError::validation(format!(
                "Invalid status '{}', expected 'green' or 'red'",
                other
            ))),
        }
    }
}

/// A user waiting at a counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub status: UserStatus,
    pub enrolled_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: crate::utils::generate_user_id(),
            name: name.into(),
            status: UserStatus::Unset,
            enrolled_at: crate::utils::current_timestamp(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Result of a successful enrollment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Counter the user was assigned to
    pub counter: CounterIndex,
    /// Position in that counter's queue right after the append.
    /// Later rotations move the user, so this is only a hint.
    pub position: usize,
    pub user: User,
}

/// Load summary for one counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterLoad {
    pub counter: CounterIndex,
    pub queued: usize,
    pub active: usize,
}
