//! JavaScript-facing timer/stopwatch widget.
//!
//! Each widget instance owns its own engine, persisted to `localStorage`
//! under `<kind>_<widgetId>`, and reports changes through the JS callbacks
//! passed to the constructor.

use std::rc::Rc;

use js_sys::Function;
use log::error;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::engine::{TimerEngine, TimerObserver};
use crate::error::WidgetStateError;
use crate::host::{AnimationFrameScheduler, Clock, FrameScheduler, IntervalScheduler, SystemClock};
use crate::store::LocalStorage;
use crate::timer::TimerId;
use crate::utils::{format_time, parse_duration};
use crate::widget_state::WidgetKind;

#[wasm_bindgen(start)]
pub fn init() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
}

/// Plain JS objects with `null` for absent values, matching the persisted blob.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

struct JsCallbacks {
    on_update: Option<Function>,
    on_complete: Option<Function>,
}

impl TimerObserver for JsCallbacks {
    fn update(&self) {
        if let Some(f) = &self.on_update {
            if let Err(err) = f.call0(&JsValue::NULL) {
                error!("onUpdate callback threw: {:?}", err);
            }
        }
    }

    fn complete(&self, id: &TimerId) {
        if let Some(f) = &self.on_complete {
            if let Err(err) = f.call1(&JsValue::NULL, &JsValue::from_str(id.as_str())) {
                error!("onComplete callback threw: {:?}", err);
            }
        }
    }
}

#[wasm_bindgen]
pub struct TimerWidget {
    engine: TimerEngine,
}

#[wasm_bindgen]
impl TimerWidget {
    /// `kind` is `"timer"` or `"stopwatch"`. With `use_interval`, the widget
    /// refreshes on a fixed cadence instead of animation frames.
    #[wasm_bindgen(constructor)]
    pub fn new(
        kind: &str,
        widget_id: &str,
        auto_remove_finished: bool,
        use_interval: bool,
        on_update: Option<Function>,
        on_complete: Option<Function>,
    ) -> Result<TimerWidget, JsValue> {
        let kind: WidgetKind = kind
            .parse()
            .map_err(|e: WidgetStateError| JsValue::from_str(&e.to_string()))?;
        if widget_id.is_empty() {
            return Err(JsValue::from_str("Missing widgetId"));
        }

        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let scheduler: Rc<dyn FrameScheduler> = if use_interval {
            Rc::new(IntervalScheduler::default())
        } else {
            Rc::new(AnimationFrameScheduler)
        };

        let engine = TimerEngine::builder(clock, scheduler)
            .persist_key(kind.state_key(widget_id))
            .auto_remove_finished(auto_remove_finished)
            .store(Rc::new(LocalStorage))
            .observer(Rc::new(JsCallbacks {
                on_update,
                on_complete,
            }))
            .build();

        Ok(TimerWidget { engine })
    }

    #[wasm_bindgen(js_name = addTimer)]
    pub fn add_timer(&self, duration: f64, label: Option<String>) -> String {
        self.engine
            .add_timer(duration, label.unwrap_or_default())
            .to_string()
    }

    #[wasm_bindgen(js_name = removeTimer)]
    pub fn remove_timer(&self, id: String) {
        self.engine.remove_timer(&TimerId::from(id));
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&self) {
        self.engine.clear_all();
    }

    pub fn start(&self, id: String) {
        self.engine.start(&TimerId::from(id));
    }

    pub fn stop(&self, id: String) {
        self.engine.stop(&TimerId::from(id));
    }

    pub fn reset(&self, id: String) {
        self.engine.reset(&TimerId::from(id));
    }

    #[wasm_bindgen(js_name = addLap)]
    pub fn add_lap(&self, id: String) -> Option<f64> {
        self.engine.add_lap(&TimerId::from(id))
    }

    /// The timer as a plain object, or `undefined`.
    #[wasm_bindgen(js_name = getTimer)]
    pub fn get_timer(&self, id: String) -> Result<JsValue, JsValue> {
        match self.engine.timer(&TimerId::from(id)) {
            Some(timer) => to_js(&timer),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = getTimers)]
    pub fn get_timers(&self) -> Result<JsValue, JsValue> {
        self.engine.with_timers(|timers| to_js(timers))
    }

    #[wasm_bindgen(js_name = formatTime)]
    pub fn format_time(seconds: f64, show_millis: bool) -> String {
        format_time(seconds, show_millis)
    }

    #[wasm_bindgen(js_name = parseDuration)]
    pub fn parse_duration(input: &str) -> Result<f64, JsValue> {
        parse_duration(input).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn save(&self) {
        self.engine.save();
    }

    pub fn load(&self) {
        self.engine.load();
    }

    pub fn destroy(&self) {
        self.engine.destroy();
    }
}
