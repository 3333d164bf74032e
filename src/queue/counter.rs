//! A single service counter and its FIFO queue of users

use crate::error::{QueueError, Result};
use crate::types::{CounterIndex, CounterLoad, User, UserId, UserStatus};
use std::collections::VecDeque;

/// Ordered queue of users waiting at one counter.
///
/// The front of the queue is the user currently being served. Positions are
/// zero-based offsets from the front and shift whenever the queue rotates.
#[derive(Debug, Clone)]
pub struct CounterQueue {
    index: CounterIndex,
    users: VecDeque<User>,
}

impl CounterQueue {
    pub fn new(index: CounterIndex) -> Self {
        Self {
            index,
            users: VecDeque::new(),
        }
    }

    pub fn index(&self) -> CounterIndex {
        self.index
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Number of users that count toward this counter's load
    pub fn active_count(&self) -> usize {
        self.users.iter().filter(|user| user.is_active()).count()
    }

    pub fn load(&self) -> CounterLoad {
        CounterLoad {
            counter: self.index,
            queued: self.len(),
            active: self.active_count(),
        }
    }

    /// Append a user at the tail and return its position
    pub fn enqueue(&mut self, user: User) -> usize {
        self.users.push_back(user);
        self.users.len() - 1
    }

    pub fn get(&self, position: usize) -> Option<&User> {
        self.users.get(position)
    }

    pub fn position_of(&self, user_id: UserId) -> Option<usize> {
        self.users.iter().position(|user| user.id == user_id)
    }

    /// Set the status of the user at `position`.
    ///
    /// Only `Green` and `Red` may be set. The position is checked against the
    /// queue as it is now, so a stale position fails instead of touching
    /// whichever user has moved into that slot past the end.
    pub fn set_status(&mut self, position: usize, status: UserStatus) -> Result<&User> {
        if !status.is_settable() {
            return Err(QueueError::validation(format!(
                "Status '{}' cannot be set, expected 'green' or 'red'",
                status
            )));
        }

        let index = self.index;
        let user = self.users.get_mut(position).ok_or_else(|| {
            QueueError::not_found(format!("user {} at counter {}", position, index))
        })?;
        user.status = status;
        Ok(user)
    }

    /// Move the user at the head of the queue to the tail
    pub fn rotate(&mut self) -> Result<&User> {
        if let Some(head) = self.users.pop_front() {
            self.users.push_back(head);
        }
        self.users
            .back()
            .ok_or_else(|| QueueError::not_found(format!("users in counter {}", self.index)))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    pub fn snapshot(&self) -> Vec<User> {
        self.users.iter().cloned().collect()
    }
}
