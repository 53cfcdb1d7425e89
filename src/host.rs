//! Host collaborators the timer engine is driven by: a wall clock and a
//! "next frame" scheduler.
//!
//! The browser build wires these to `Date.now()` and
//! `window.requestAnimationFrame`; native builds and tests use the manual
//! implementations, which advance only when told to.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// Wall clock in milliseconds since the Unix epoch.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Invokes a callback once before the next display refresh.
pub trait FrameScheduler {
    /// Returns `false` when the host refused the request; the callback will
    /// then never run.
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> bool;
}

/// `Date.now()` in the browser, `SystemTime` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now(&self) -> f64 {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Clock that only moves when advanced explicitly.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance_ms(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance_ms(secs * 1000.0);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now_ms.get()
    }
}

/// Queues frame callbacks until the owner runs a frame.
///
/// Callbacks requested while a frame is running are deferred to the next
/// frame, matching `requestAnimationFrame`.
#[derive(Default)]
pub struct ManualScheduler {
    pending: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run every callback queued before this call. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        let batch: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }

    /// Run frames until nothing is queued or `max_frames` is reached.
    /// Returns the number of frames run.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.pending() > 0 {
            self.run_frame();
            frames += 1;
        }
        frames
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> bool {
        self.pending.borrow_mut().push_back(callback);
        true
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{AnimationFrameScheduler, IntervalScheduler};

#[cfg(target_arch = "wasm32")]
mod browser {
    use gloo_timers::callback::Timeout;
    use log::error;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use super::FrameScheduler;
    use crate::config::DEFAULT_REFRESH_INTERVAL_MS;

    /// `window.requestAnimationFrame`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct AnimationFrameScheduler;

    impl FrameScheduler for AnimationFrameScheduler {
        fn request_frame(&self, callback: Box<dyn FnOnce()>) -> bool {
            let closure = Closure::once_into_js(move || callback());
            match gloo_utils::window().request_animation_frame(closure.unchecked_ref()) {
                Ok(_) => true,
                Err(err) => {
                    error!("requestAnimationFrame failed: {:?}", err);
                    false
                }
            }
        }
    }

    /// Fixed-cadence fallback for hosts where animation frames are throttled
    /// or never fire (hidden dashboards, background tabs).
    #[derive(Debug, Clone, Copy)]
    pub struct IntervalScheduler {
        interval_ms: u32,
    }

    impl IntervalScheduler {
        pub fn new(interval_ms: u32) -> Self {
            Self { interval_ms }
        }
    }

    impl Default for IntervalScheduler {
        fn default() -> Self {
            Self::new(DEFAULT_REFRESH_INTERVAL_MS)
        }
    }

    impl FrameScheduler for IntervalScheduler {
        fn request_frame(&self, callback: Box<dyn FnOnce()>) -> bool {
            Timeout::new(self.interval_ms, move || callback()).forget();
            true
        }
    }
}
