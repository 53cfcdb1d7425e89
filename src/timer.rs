//! Timer records owned by the [`TimerEngine`](crate::engine::TimerEngine).
//!
//! The serialized form is the persisted blob: camelCase field names, seconds
//! for `duration`/`remaining`/lap `time`, epoch milliseconds for `startTime`
//! and lap `timestamp`.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::TIMER_ID_PREFIX;

/// Opaque timer identifier, unique within one engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    /// Build a fresh id from the creation timestamp plus 64 random bits, so
    /// ids created within the same millisecond still differ.
    pub fn generate(now_ms: f64) -> Self {
        let entropy: u64 = rand::rng().random();
        TimerId(format!(
            "{}-{}-{:016x}",
            TIMER_ID_PREFIX, now_ms as i64, entropy
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TimerId {
    fn from(value: String) -> Self {
        TimerId(value)
    }
}

impl From<&str> for TimerId {
    fn from(value: &str) -> Self {
        TimerId(value.to_string())
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    /// Elapsed seconds at the moment the lap was taken
    pub time: f64,
    /// Wall-clock milliseconds when the lap was taken
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub duration: f64,
    pub remaining: f64,
    #[serde(default)]
    pub label: String,
    pub is_running: bool,
    pub start_time: Option<f64>,
    #[serde(default)]
    pub laps: Vec<Lap>,
}

impl Timer {
    pub(crate) fn new(id: TimerId, duration: f64, label: String) -> Self {
        Self {
            id,
            duration,
            remaining: duration,
            label,
            is_running: false,
            start_time: None,
            laps: Vec::new(),
        }
    }

    /// Seconds consumed so far, according to the last snapshot of `remaining`.
    pub fn elapsed(&self) -> f64 {
        self.duration - self.remaining
    }

    pub fn is_finished(&self) -> bool {
        !self.is_running && self.remaining <= 0.0
    }

    /// Anchor the timer at `now` so that already-consumed time is preserved.
    pub(crate) fn begin(&mut self, now_ms: f64) {
        self.is_running = true;
        self.start_time = Some(now_ms - self.elapsed() * 1000.0);
    }

    /// Recompute `remaining` from the absolute start anchor.
    ///
    /// Returns `true` when this recomputation brought the timer to zero; the
    /// timer is then stopped with `remaining` clamped to `0`.
    pub(crate) fn refresh(&mut self, now_ms: f64) -> bool {
        let Some(start) = self.start_time else {
            return false;
        };
        if !self.is_running {
            return false;
        }

        let elapsed = (now_ms - start) / 1000.0;
        // min before max: a backwards clock must not push past `duration`
        self.remaining = (self.duration - elapsed).min(self.duration).max(0.0);

        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.is_running = false;
            true
        } else {
            false
        }
    }

    pub(crate) fn clear(&mut self) {
        self.remaining = self.duration;
        self.is_running = false;
        self.start_time = None;
        self.laps.clear();
    }
}
