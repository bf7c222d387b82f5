//! Bypass reminders.
//!
//! ## Flow
//!
//! ```text
//! tokio timer ──ReminderTick──▶ host TaskQueue ──(main loop)──▶ collect_reminders ──▶ (connection, message)
//! ```
//!
//! The timer task never touches connections. It only enqueues ticks; the
//! host drains them on its own serialized loop and runs the scan there.

pub mod scheduler;
pub mod notify;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::time::Duration;

pub use scheduler::{ReminderScheduler, ReminderTick, SchedulerState, TaskQueue, INITIAL_DELAY};
pub use notify::{collect_reminders, Reminder};

/// Interpreted `repeatBypassMessage` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderInterval {
    /// Negative: no reminders at all.
    Disabled,
    /// Zero: one reminder pass, never repeated.
    Once,
    /// Positive: a reminder pass every N seconds.
    Every(NonZeroU64),
}

impl ReminderInterval {
    /// Interpret a raw seconds value.
    pub fn from_seconds(seconds: i64) -> Self {
        match u64::try_from(seconds) {
            Err(_) => ReminderInterval::Disabled,
            Ok(secs) => match NonZeroU64::new(secs) {
                Some(period) => ReminderInterval::Every(period),
                None => ReminderInterval::Once,
            },
        }
    }

    /// Repeat period, when repeating.
    pub fn period(&self) -> Option<Duration> {
        match self {
            ReminderInterval::Every(secs) => Some(Duration::from_secs(secs.get())),
            ReminderInterval::Disabled | ReminderInterval::Once => None,
        }
    }

    /// Whether bypassing players get reminded at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ReminderInterval::Disabled)
    }
}

impl fmt::Display for ReminderInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderInterval::Disabled => f.write_str("disabled"),
            ReminderInterval::Once => f.write_str("once"),
            ReminderInterval::Every(secs) => write!(f, "every {}s", secs),
        }
    }
}
