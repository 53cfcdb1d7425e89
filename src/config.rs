//! Application-level configuration constants.

// Persistence
pub const DEFAULT_PERSIST_KEY: &str = "timers";
pub const DEFAULT_STORAGE_NAMESPACE: &str = "default";

// Widget state keys are `<prefix>_<widgetId>`
pub const TIMER_KEY_PREFIX: &str = "timer";
pub const STOPWATCH_KEY_PREFIX: &str = "stopwatch";

// Refresh cadence for hosts that cannot use animation frames
pub const DEFAULT_REFRESH_INTERVAL_MS: u32 = 1000;

// Timer ids
pub const TIMER_ID_PREFIX: &str = "timer";
