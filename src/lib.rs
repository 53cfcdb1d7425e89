//! Timer and stopwatch engine for dashboard widgets, plus the small pieces of
//! widget plumbing around it: persistence stores, per-instance state
//! handlers, settings defaults and duration formatting.

pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod settings;
pub mod store;
pub mod timer;
pub mod utils;
pub mod widget_state;

#[cfg(target_arch = "wasm32")]
pub mod widget;

pub use engine::{EngineOptions, TimerEngine, TimerEngineBuilder, TimerObserver};
pub use error::{DurationParseError, PersistError, StoreError, WidgetStateError};
pub use host::{Clock, FrameScheduler, ManualClock, ManualScheduler, SystemClock};
pub use store::{KeyValueStore, MemoryStore, NamespacedStore};
pub use timer::{Lap, Timer, TimerId};
pub use utils::{format_time, parse_duration};
pub use widget_state::{WidgetKind, WidgetStateHandler};
