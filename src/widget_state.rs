//! Per-instance state handlers backing the widgets' `getState` /
//! `setState` / `clearState` API endpoints.
//!
//! State is stored under `<kind>_<widgetId>` in the host's settings store,
//! which is also the persistence key the browser-side engine uses.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::config::{STOPWATCH_KEY_PREFIX, TIMER_KEY_PREFIX};
use crate::error::WidgetStateError;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Timer,
    Stopwatch,
}

impl WidgetKind {
    pub fn key_prefix(&self) -> &'static str {
        match self {
            WidgetKind::Timer => TIMER_KEY_PREFIX,
            WidgetKind::Stopwatch => STOPWATCH_KEY_PREFIX,
        }
    }

    pub fn state_key(&self, widget_id: &str) -> String {
        format!("{}_{}", self.key_prefix(), widget_id)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_prefix())
    }
}

impl FromStr for WidgetKind {
    type Err = WidgetStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TIMER_KEY_PREFIX => Ok(WidgetKind::Timer),
            STOPWATCH_KEY_PREFIX => Ok(WidgetKind::Stopwatch),
            other => Err(WidgetStateError::UnknownKind(other.to_string())),
        }
    }
}

/// Response body of the mutating endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    const OK: Ack = Ack { success: true };
}

pub struct WidgetStateHandler<S> {
    kind: WidgetKind,
    store: S,
}

impl<S: KeyValueStore> WidgetStateHandler<S> {
    pub fn new(kind: WidgetKind, store: S) -> Self {
        Self { kind, store }
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    fn key(&self, widget_id: Option<&str>) -> Result<String, WidgetStateError> {
        match widget_id {
            Some(id) if !id.is_empty() => Ok(self.kind.state_key(id)),
            _ => Err(WidgetStateError::MissingWidgetId),
        }
    }

    /// Saved state for the widget instance, or `None` if nothing is stored.
    pub fn get_state(&self, widget_id: Option<&str>) -> Result<Option<Value>, WidgetStateError> {
        let key = self.key(widget_id)?;
        match self.store.get(&key)? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    pub fn set_state(&self, widget_id: Option<&str>, body: &Value) -> Result<Ack, WidgetStateError> {
        let key = self.key(widget_id)?;
        self.store.set(&key, &serde_json::to_string(body)?)?;
        debug!("Stored state for {}", key);
        Ok(Ack::OK)
    }

    pub fn clear_state(&self, widget_id: Option<&str>) -> Result<Ack, WidgetStateError> {
        let key = self.key(widget_id)?;
        self.store.remove(&key)?;
        debug!("Cleared state for {}", key);
        Ok(Ack::OK)
    }
}
