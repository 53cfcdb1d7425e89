//! Multi-timer engine: lifecycle operations plus a self-scheduling update
//! loop that recomputes running timers once per frame.
//!
//! Remaining time is always derived from each timer's absolute start anchor,
//! never from accumulated per-frame deltas, so dropped or throttled frames
//! cannot introduce drift.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, error, info, warn};

use crate::config::DEFAULT_PERSIST_KEY;
use crate::error::PersistError;
use crate::host::{Clock, FrameScheduler};
use crate::store::KeyValueStore;
use crate::timer::{Lap, Timer, TimerId};

/// Receives engine notifications. Both methods default to doing nothing.
pub trait TimerObserver {
    /// Something affecting display changed. Fired at most once per frame by
    /// the update loop.
    fn update(&self) {}

    /// The timer reached zero. Fired exactly once per run.
    fn complete(&self, _id: &TimerId) {}
}

struct OnUpdate<F>(F);

impl<F: Fn()> TimerObserver for OnUpdate<F> {
    fn update(&self) {
        (self.0)()
    }
}

struct OnComplete<F>(F);

impl<F: Fn(&TimerId)> TimerObserver for OnComplete<F> {
    fn complete(&self, id: &TimerId) {
        (self.0)(id)
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub persist_key: String,
    /// Delete timers from the collection as soon as they complete
    pub auto_remove_finished: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            persist_key: DEFAULT_PERSIST_KEY.to_string(),
            auto_remove_finished: false,
        }
    }
}

struct Shared {
    timers: RefCell<Vec<Timer>>,
    observers: RefCell<Vec<Rc<dyn TimerObserver>>>,
    loop_active: Cell<bool>,
    options: EngineOptions,
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn FrameScheduler>,
    store: Option<Rc<dyn KeyValueStore>>,
}

impl Shared {
    fn notify_update(&self) {
        // Snapshot so observers may subscribe or call back into the engine
        let observers: Vec<_> = self.observers.borrow().clone();
        for observer in &observers {
            observer.update();
        }
    }

    fn notify_complete(&self, id: &TimerId) {
        let observers: Vec<_> = self.observers.borrow().clone();
        for observer in &observers {
            observer.complete(id);
        }
    }

    fn any_running(&self) -> bool {
        self.timers.borrow().iter().any(|t| t.is_running)
    }

    /// One pass of the update loop.
    fn tick(self: &Rc<Self>) {
        let now = self.clock.now();

        // The running set is taken fresh on every pass, so timers started
        // while the loop is live are picked up on the next frame.
        let completed: Vec<TimerId> = self
            .timers
            .borrow_mut()
            .iter_mut()
            .filter(|t| t.is_running)
            .filter_map(|t| t.refresh(now).then(|| t.id.clone()))
            .collect();

        for id in &completed {
            info!("Timer {} completed", id);
            self.notify_complete(id);
        }

        if self.options.auto_remove_finished && !completed.is_empty() {
            // A completion handler may have restarted the timer; keep it then.
            self.timers
                .borrow_mut()
                .retain(|t| !(completed.contains(&t.id) && !t.is_running));
        }

        self.notify_update();

        if self.any_running() {
            let weak: Weak<Shared> = Rc::downgrade(self);
            let scheduled = self.scheduler.request_frame(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.tick();
                }
            }));
            if !scheduled {
                // Nothing will call back; let the next start() begin a new loop
                warn!("Frame request rejected, update loop stopped");
                self.loop_active.set(false);
            }
        } else {
            debug!("Update loop idle");
            self.loop_active.set(false);
        }
    }
}

fn valid_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration >= 0.0 {
        duration
    } else {
        warn!("Invalid timer duration {}, using 0", duration);
        0.0
    }
}

/// Configures and builds a [`TimerEngine`].
pub struct TimerEngineBuilder {
    options: EngineOptions,
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn FrameScheduler>,
    store: Option<Rc<dyn KeyValueStore>>,
    observers: Vec<Rc<dyn TimerObserver>>,
}

impl TimerEngineBuilder {
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn persist_key(mut self, key: impl Into<String>) -> Self {
        self.options.persist_key = key.into();
        self
    }

    pub fn auto_remove_finished(mut self, enabled: bool) -> Self {
        self.options.auto_remove_finished = enabled;
        self
    }

    pub fn store(mut self, store: Rc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn observer(mut self, observer: Rc<dyn TimerObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn on_update(self, f: impl Fn() + 'static) -> Self {
        self.observer(Rc::new(OnUpdate(f)))
    }

    pub fn on_complete(self, f: impl Fn(&TimerId) + 'static) -> Self {
        self.observer(Rc::new(OnComplete(f)))
    }

    pub fn build(self) -> TimerEngine {
        TimerEngine {
            shared: Rc::new(Shared {
                timers: RefCell::new(Vec::new()),
                observers: RefCell::new(self.observers),
                loop_active: Cell::new(false),
                options: self.options,
                clock: self.clock,
                scheduler: self.scheduler,
                store: self.store,
            }),
        }
    }
}

/// Handle to one engine instance. Clones share the same timers.
#[derive(Clone)]
pub struct TimerEngine {
    shared: Rc<Shared>,
}

impl TimerEngine {
    pub fn builder(clock: Rc<dyn Clock>, scheduler: Rc<dyn FrameScheduler>) -> TimerEngineBuilder {
        TimerEngineBuilder {
            options: EngineOptions::default(),
            clock,
            scheduler,
            store: None,
            observers: Vec::new(),
        }
    }

    pub fn new(
        options: EngineOptions,
        clock: Rc<dyn Clock>,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Self {
        Self::builder(clock, scheduler).options(options).build()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.shared.options
    }

    pub fn subscribe(&self, observer: Rc<dyn TimerObserver>) {
        self.shared.observers.borrow_mut().push(observer);
    }

    /// Whether a frame callback is currently scheduled.
    pub fn is_loop_active(&self) -> bool {
        self.shared.loop_active.get()
    }

    /// Create a stopped timer and return its id.
    ///
    /// Non-finite or negative durations are clamped to zero; a zero-length
    /// timer completes on the first frame after it is started.
    pub fn add_timer(&self, duration: f64, label: impl Into<String>) -> TimerId {
        let duration = valid_duration(duration);

        let id = {
            let mut timers = self.shared.timers.borrow_mut();
            let now = self.shared.clock.now();
            let mut id = TimerId::generate(now);
            while timers.iter().any(|t| t.id == id) {
                id = TimerId::generate(now);
            }
            timers.push(Timer::new(id.clone(), duration, label.into()));
            id
        };

        debug!("Added timer {} ({}s)", id, duration);
        self.shared.notify_update();
        id
    }

    /// Remove a timer. Unknown ids leave the collection untouched, but
    /// observers are still notified.
    pub fn remove_timer(&self, id: &TimerId) {
        self.shared.timers.borrow_mut().retain(|t| &t.id != id);
        self.shared.notify_update();
    }

    pub fn clear_all(&self) {
        self.shared.timers.borrow_mut().clear();
        self.shared.notify_update();
    }

    /// Start or resume a timer, continuing from its current `remaining`.
    ///
    /// Starting a timer that is already running keeps its anchor.
    pub fn start(&self, id: &TimerId) {
        let now = self.shared.clock.now();
        {
            let mut timers = self.shared.timers.borrow_mut();
            let Some(timer) = timers.iter_mut().find(|t| &t.id == id) else {
                return;
            };
            if !timer.is_running {
                timer.begin(now);
                debug!("Started timer {} with {}s remaining", id, timer.remaining);
            }
        }
        self.ensure_loop();
    }

    /// Stop a timer, keeping its last computed `remaining`.
    pub fn stop(&self, id: &TimerId) {
        if !self.with_timer_mut(id, |t| t.is_running = false) {
            return;
        }
        debug!("Stopped timer {}", id);
        self.shared.notify_update();
    }

    /// Restore the full duration, stop, and clear laps.
    pub fn reset(&self, id: &TimerId) {
        if !self.with_timer_mut(id, Timer::clear) {
            return;
        }
        debug!("Reset timer {}", id);
        self.shared.notify_update();
    }

    /// Record a lap on a running timer and return the elapsed seconds.
    pub fn add_lap(&self, id: &TimerId) -> Option<f64> {
        let now = self.shared.clock.now();
        let lap_time = {
            let mut timers = self.shared.timers.borrow_mut();
            let timer = timers.iter_mut().find(|t| &t.id == id && t.is_running)?;
            let lap_time = timer.elapsed();
            timer.laps.push(Lap {
                time: lap_time,
                timestamp: now,
            });
            lap_time
        };
        self.shared.notify_update();
        Some(lap_time)
    }

    pub fn timer(&self, id: &TimerId) -> Option<Timer> {
        self.shared
            .timers
            .borrow()
            .iter()
            .find(|t| &t.id == id)
            .cloned()
    }

    /// Snapshot of every timer, in creation order.
    pub fn timers(&self) -> Vec<Timer> {
        self.shared.timers.borrow().clone()
    }

    /// Borrow the live collection without cloning it.
    ///
    /// Calling engine operations from inside `f` panics.
    pub fn with_timers<R>(&self, f: impl FnOnce(&[Timer]) -> R) -> R {
        f(&self.shared.timers.borrow())
    }

    pub fn len(&self) -> usize {
        self.shared.timers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.timers.borrow().is_empty()
    }

    /// Mark every timer stopped. Anchors are left in place and the update
    /// loop winds down on its own next pass.
    pub fn destroy(&self) {
        for timer in self.shared.timers.borrow_mut().iter_mut() {
            timer.is_running = false;
        }
        debug!("Engine destroyed");
    }

    /// Persist the collection under the configured key. Failures are logged.
    pub fn save(&self) {
        if let Err(err) = self.try_save() {
            error!("Failed to save timers: {}", err);
        }
    }

    /// Replace the collection with the persisted one, if any. Failures are
    /// logged and leave the in-memory timers untouched.
    pub fn load(&self) {
        if let Err(err) = self.try_load() {
            error!("Failed to load timers: {}", err);
        }
    }

    pub fn try_save(&self) -> Result<(), PersistError> {
        let store = self.shared.store.as_ref().ok_or(PersistError::NoStore)?;
        let blob = serde_json::to_string(&*self.shared.timers.borrow())?;
        store.set(&self.shared.options.persist_key, &blob)?;
        debug!("Saved timers under '{}'", self.shared.options.persist_key);
        Ok(())
    }

    /// Returns `Ok(false)` when nothing was stored under the key.
    ///
    /// Restored timers that were running keep counting from their stored
    /// anchors, so time spent while the page was closed is accounted for.
    pub fn try_load(&self) -> Result<bool, PersistError> {
        let store = self.shared.store.as_ref().ok_or(PersistError::NoStore)?;
        let Some(blob) = store.get(&self.shared.options.persist_key)? else {
            return Ok(false);
        };
        if blob.is_empty() {
            return Ok(false);
        }

        let stored: Vec<Timer> = serde_json::from_str(&blob)?;
        let mut timers: Vec<Timer> = Vec::with_capacity(stored.len());
        for mut timer in stored {
            if timers.iter().any(|t| t.id == timer.id) {
                warn!("Dropping stored timer with duplicate id {}", timer.id);
                continue;
            }
            timer.duration = valid_duration(timer.duration);
            timer.remaining = if timer.remaining.is_finite() {
                timer.remaining.min(timer.duration).max(0.0)
            } else {
                timer.duration
            };
            if timer.is_running && timer.start_time.is_none() {
                warn!("Timer {} was stored running without an anchor", timer.id);
                timer.is_running = false;
            }
            timers.push(timer);
        }

        info!(
            "Loaded {} timers from '{}'",
            timers.len(),
            self.shared.options.persist_key
        );
        *self.shared.timers.borrow_mut() = timers;

        if self.shared.any_running() {
            self.ensure_loop();
        } else {
            self.shared.notify_update();
        }
        Ok(true)
    }

    fn with_timer_mut(&self, id: &TimerId, f: impl FnOnce(&mut Timer)) -> bool {
        let mut timers = self.shared.timers.borrow_mut();
        match timers.iter_mut().find(|t| &t.id == id) {
            Some(timer) => {
                f(timer);
                true
            }
            None => false,
        }
    }

    /// Run a pass now and keep scheduling frames, unless a loop is already
    /// live; that loop picks up newly running timers on its next pass.
    fn ensure_loop(&self) {
        if self.shared.loop_active.replace(true) {
            return;
        }
        debug!("Update loop started");
        self.shared.tick();
    }
}
