//! Fixed-interval polling of the alarm store.
//!
//! Each tick fires at most one due alarm, the earliest-inserted one. Anything
//! else that is overdue waits for the following ticks.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Interval, MissedTickBehavior};
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::state::AppState;
use crate::storage::KeyValueStore;

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Presentation side of a fired alarm.
pub trait Notifier {
    /// Show `message` and start the audible alert. Stays up until [`Notifier::dismiss`].
    fn notify(&mut self, message: &str);

    /// Silence and hide whatever is showing.
    fn dismiss(&mut self);
}

/// Record of one fired alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub note_id: Uuid,
    pub note_title: String,
    pub trigger_time: DateTime<Utc>,
    pub fired_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl Scheduler {
    /// A zero period falls back to [`DEFAULT_TICK`].
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() { DEFAULT_TICK } else { period };
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Timer driving [`Scheduler::tick`]. Late ticks are not made up in a burst.
    pub fn ticker(&self) -> Interval {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Fire the first due alarm, if any.
    pub fn tick<S, C, N>(&self, state: &mut AppState<S, C>, notifier: &mut N) -> Option<Notification>
    where
        S: KeyValueStore,
        C: Clock,
        N: Notifier + ?Sized,
    {
        let now = state.now();
        let alarm = state.due_alarms(now).into_iter().next()?.clone();

        let message = alarm.message();
        notifier.notify(&message);
        state.clear_alarm(alarm.note_id);
        log::info!("Fired alarm for note {}", alarm.note_id);

        Some(Notification {
            note_id: alarm.note_id,
            note_title: alarm.note_title,
            trigger_time: alarm.trigger_time,
            fired_at: now,
            message,
        })
    }
}
