//! Counter queue engine
//!
//! The engine owns one [`CounterQueue`] per counter index, each behind its
//! own lock. Mutations on the same counter are serialized; mutations on
//! different counters run independently. Enrollment also holds an
//! enrollment guard across selection and append so that concurrent
//! enrollments see each other's load.

use crate::error::{QueueError, Result};
use crate::metrics::MetricsCollector;
use crate::queue::counter::CounterQueue;
use crate::queue::selection::{CounterSelector, LeastLoadedSelector};
use crate::types::{
    CounterIndex, CounterLoad, CountersSnapshot, Enrollment, User, UserId, UserStatus,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Statistics about engine operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStats {
    /// Total number of users enrolled
    pub users_enrolled: u64,
    /// Total number of status updates applied
    pub status_updates: u64,
    /// Total number of rotations applied
    pub rotations: u64,
    /// Total number of operations rejected with an error
    pub rejected_operations: u64,
    /// Users currently queued across all counters
    pub total_users: usize,
    /// Users currently counting toward load across all counters
    pub active_users: usize,
    /// Current per-counter load, by index
    pub counters: Vec<CounterLoad>,
}

#[derive(Debug, Default)]
struct OperationTotals {
    users_enrolled: u64,
    status_updates: u64,
    rotations: u64,
    rejected_operations: u64,
}

/// Every mutation is a single step on a `VecDeque`, so a guard recovered
/// from a poisoned lock still points at a consistent queue.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The counter assignment and queue-state engine
pub struct CounterQueueEngine {
    /// One queue per counter, indexed by counter index
    counters: Vec<Mutex<CounterQueue>>,
    /// Serializes selection + append across enrollments
    enrollment_guard: Mutex<()>,
    /// Rule for placing new users
    selector: Arc<dyn CounterSelector>,
    /// Cumulative operation counts
    totals: Mutex<OperationTotals>,
    /// Metrics collector for recording queue activity
    metrics_collector: Option<Arc<MetricsCollector>>,
}

impl CounterQueueEngine {
    /// Create an engine with `counter_count` empty counters
    pub fn new(counter_count: usize) -> Result<Self> {
        Self::with_selector(counter_count, Arc::new(LeastLoadedSelector::new()))
    }

    /// Create with a custom selection rule
    pub fn with_selector(
        counter_count: usize,
        selector: Arc<dyn CounterSelector>,
    ) -> Result<Self> {
        if counter_count == 0 {
            return Err(QueueError::validation(
                "At least one counter is required",
            ));
        }

        let counters = (0..counter_count)
            .map(|index| Mutex::new(CounterQueue::new(index)))
            .collect();

        info!("Counter queue engine created with {} counters", counter_count);

        Ok(Self {
            counters,
            enrollment_guard: Mutex::new(()),
            selector,
            totals: Mutex::new(OperationTotals::default()),
            metrics_collector: None,
        })
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics_collector: Arc<MetricsCollector>) -> Self {
        for counter in &self.counters {
            metrics_collector.update_counter_load(lock(counter).load());
        }
        self.metrics_collector = Some(metrics_collector);
        self
    }

    pub fn counter_count(&self) -> usize {
        self.counters.len()
    }

    /// Snapshot of every counter and its users in queue order
    pub fn list_counters(&self) -> CountersSnapshot {
        let snapshot: CountersSnapshot = self
            .counters
            .iter()
            .map(|counter| {
                let queue = lock(counter);
                (queue.index(), queue.snapshot())
            })
            .collect();

        debug!(
            "Listed {} counters with {} users",
            snapshot.len(),
            snapshot.values().map(Vec::len).sum::<usize>()
        );
        snapshot
    }

    /// Number of users at `index` whose status is not red
    pub fn active_count(&self, index: CounterIndex) -> Result<usize> {
        Ok(self.lock_counter(index)?.active_count())
    }

    /// Current load of every counter, ordered by index
    pub fn loads(&self) -> Vec<CounterLoad> {
        self.counters.iter().map(|counter| lock(counter).load()).collect()
    }

    /// Counter a new user would join right now
    pub fn select_least_loaded(&self) -> CounterIndex {
        self.selector.select(&self.loads())
    }

    /// Enroll a user into the least-loaded counter
    pub fn enroll(&self, name: &str) -> Result<Enrollment> {
        let timer = self.metrics_collector.as_ref().map(|m| m.start_timer());

        if name.is_empty() {
            return self.reject("enroll", QueueError::validation("Name required"));
        }

        let _enrollment = lock(&self.enrollment_guard);
        let counter = self.select_least_loaded();

        let user = User::new(name);
        let (position, load) = {
            let mut queue = match self.lock_counter(counter) {
                Ok(queue) => queue,
                Err(e) => return self.reject("enroll", e),
            };
            let position = queue.enqueue(user.clone());
            let load = queue.load();
            self.publish_load(load);
            (position, load)
        };

        lock(&self.totals).users_enrolled += 1;

        info!(
            "Enrolled user '{}' ({}) at counter {} position {} - queued: {}, active: {}",
            user.name, user.id, counter, position, load.queued, load.active
        );

        if let Some(metrics) = &self.metrics_collector {
            metrics.record_enrollment(counter);
            if let Some(timer) = timer {
                metrics.record_operation("enroll", timer.stop());
            }
        }

        Ok(Enrollment {
            counter,
            position,
            user,
        })
    }

    /// Set the status of the user at `position` in counter `counter`.
    ///
    /// `status` must be green or red. The position is checked while the
    /// counter is locked, so a position computed before a rotation either
    /// hits a user still in range or fails.
    pub fn set_status(
        &self,
        counter: CounterIndex,
        position: usize,
        status: UserStatus,
    ) -> Result<()> {
        let timer = self.metrics_collector.as_ref().map(|m| m.start_timer());

        if let Err(e) = Self::check_settable(status) {
            return self.reject("set_status", e);
        }

        let outcome = self.lock_counter(counter).and_then(|mut queue| {
            let user = queue.set_status(position, status)?;
            info!(
                "Set status of user '{}' ({}) at counter {} position {} to {}",
                user.name, user.id, counter, position, status
            );
            self.publish_load(queue.load());
            Ok(())
        });

        match outcome {
            Ok(()) => {
                self.record_status_update(status, timer);
                Ok(())
            }
            Err(e) => self.reject("set_status", e),
        }
    }

    /// Set the status of a user addressed by its stable id.
    ///
    /// The id is resolved to a position under the counter lock.
    pub fn set_status_by_id(
        &self,
        counter: CounterIndex,
        user_id: UserId,
        status: UserStatus,
    ) -> Result<()> {
        let timer = self.metrics_collector.as_ref().map(|m| m.start_timer());

        if let Err(e) = Self::check_settable(status) {
            return self.reject("set_status", e);
        }

        let outcome = self.lock_counter(counter).and_then(|mut queue| {
            let position = queue.position_of(user_id).ok_or_else(|| {
                QueueError::not_found(format!("user {} at counter {}", user_id, counter))
            })?;
            let user = queue.set_status(position, status)?;
            info!(
                "Set status of user '{}' ({}) at counter {} to {}",
                user.name, user.id, counter, status
            );
            self.publish_load(queue.load());
            Ok(())
        });

        match outcome {
            Ok(()) => {
                self.record_status_update(status, timer);
                Ok(())
            }
            Err(e) => self.reject("set_status", e),
        }
    }

    /// Move the user at the head of counter `counter` to its tail.
    ///
    /// Returns the moved user.
    pub fn rotate(&self, counter: CounterIndex) -> Result<User> {
        let timer = self.metrics_collector.as_ref().map(|m| m.start_timer());

        let outcome = self.lock_counter(counter).and_then(|mut queue| {
            let moved = queue.rotate()?.clone();
            let load = queue.load();
            self.publish_load(load);
            Ok((moved, load))
        });

        let (moved, load) = match outcome {
            Ok(result) => result,
            Err(e) => return self.reject("rotate", e),
        };

        lock(&self.totals).rotations += 1;

        info!(
            "Rotated counter {} - user '{}' ({}) moved to the back, queued: {}",
            counter, moved.name, moved.id, load.queued
        );

        if let Some(metrics) = &self.metrics_collector {
            metrics.record_rotation(counter);
            if let Some(timer) = timer {
                metrics.record_operation("rotate", timer.stop());
            }
        }

        Ok(moved)
    }

    /// Get engine statistics
    pub fn stats(&self) -> EngineStats {
        let counters = self.loads();
        let totals = lock(&self.totals);

        EngineStats {
            users_enrolled: totals.users_enrolled,
            status_updates: totals.status_updates,
            rotations: totals.rotations,
            rejected_operations: totals.rejected_operations,
            total_users: counters.iter().map(|load| load.queued).sum(),
            active_users: counters.iter().map(|load| load.active).sum(),
            counters,
        }
    }

    /// Counters whose lock was poisoned by a panic during a mutation
    pub fn poisoned_counters(&self) -> Vec<CounterIndex> {
        self.counters
            .iter()
            .enumerate()
            .filter(|(_, counter)| counter.is_poisoned())
            .map(|(index, _)| index)
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn poison_counter(&self, index: CounterIndex) {
        let counter = &self.counters[index];
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _queue = counter.lock();
            panic!("counter {} poisoned", index);
        }));
    }

    /// Must be called with the counter still locked so gauges follow queue order
    fn publish_load(&self, load: CounterLoad) {
        if let Some(metrics) = &self.metrics_collector {
            metrics.update_counter_load(load);
        }
    }

    fn lock_counter(&self, index: CounterIndex) -> Result<MutexGuard<'_, CounterQueue>> {
        self.counters
            .get(index)
            .map(lock)
            .ok_or_else(|| QueueError::not_found(format!("counter {}", index)))
    }

    fn check_settable(status: UserStatus) -> Result<()> {
        if status.is_settable() {
            Ok(())
        } else {
            Err(QueueError::validation(format!(
                "Invalid status '{}', expected 'green' or 'red'",
                status
            )))
        }
    }

    fn record_status_update(
        &self,
        status: UserStatus,
        timer: Option<crate::metrics::MetricsTimer>,
    ) {
        lock(&self.totals).status_updates += 1;

        if let Some(metrics) = &self.metrics_collector {
            metrics.record_status_update(status);
            if let Some(timer) = timer {
                metrics.record_operation("set_status", timer.stop());
            }
        }
    }

    fn reject<T>(&self, operation: &str, error: QueueError) -> Result<T> {
        warn!("Rejected {} operation: {}", operation, error);

        lock(&self.totals).rejected_operations += 1;
        if let Some(metrics) = &self.metrics_collector {
            metrics.record_rejection(operation, error.kind());
        }

        Err(error)
    }
}
