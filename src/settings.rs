//! Widget settings defaults and data-attribute coercion.
//!
//! Setting definitions come from the widget's compose file, e.g.
//! `{"autoRemove": {"type": "boolean", "value": true}}`.

use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct DropdownOption {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SettingDefinition {
    Boolean {
        value: Option<bool>,
    },
    Number {
        value: Option<f64>,
        min: Option<f64>,
    },
    Dropdown {
        value: Option<String>,
        #[serde(default)]
        values: Vec<DropdownOption>,
    },
    Text {
        value: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

impl SettingDefinition {
    /// The value a freshly placed widget starts with, `None` for unsupported
    /// setting types.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            SettingDefinition::Boolean { value } => Some(Value::Bool(value.unwrap_or(false))),
            SettingDefinition::Number { value, min } => {
                Some(number_value(value.or(*min).unwrap_or(0.0)))
            }
            SettingDefinition::Dropdown { value, values } => Some(Value::String(
                values
                    .first()
                    .map(|option| option.id.clone())
                    .or_else(|| value.clone())
                    .unwrap_or_default(),
            )),
            SettingDefinition::Text { value } => {
                Some(Value::String(value.clone().unwrap_or_default()))
            }
            SettingDefinition::Unsupported => None,
        }
    }
}

/// Derive default settings from a map of setting definitions.
///
/// Entries that are not valid definitions or have an unsupported type are
/// skipped.
pub fn init_settings(definitions: &Map<String, Value>) -> Map<String, Value> {
    let mut defaults = Map::new();
    for (key, raw) in definitions {
        let definition = match SettingDefinition::deserialize(raw) {
            Ok(definition) => definition,
            Err(err) => {
                debug!("Skipping setting '{}': {}", key, err);
                continue;
            }
        };
        if let Some(value) = definition.default_value() {
            defaults.insert(key.clone(), value);
        }
    }
    defaults
}

/// Coerce a raw `data-*` attribute value.
///
/// Missing attributes yield `default`; `"true"`/`"false"` become booleans,
/// numeric strings become numbers (blank counts as `0`, `0x`/`0o`/`0b`
/// prefixes are honoured), anything else stays a string. `"Infinity"` stays a
/// string because JSON has no representation for it.
pub fn parse_setting(raw: Option<&str>, default: Value) -> Value {
    let Some(raw) = raw else {
        return default;
    };
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return number_value(0.0);
            }
            match parse_radix_literal(trimmed).or_else(|| trimmed.parse::<f64>().ok()) {
                Some(number) if number.is_finite() => number_value(number),
                _ => Value::String(raw.to_string()),
            }
        }
    }
}

/// `0x1f`, `0o17`, `0b101` (unsigned, any letter case).
fn parse_radix_literal(text: &str) -> Option<f64> {
    let lower = text.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest.to_string(), 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest.to_string(), 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest.to_string(), 2)
    } else {
        return None;
    };
    if digits.starts_with('+') {
        return None;
    }
    u64::from_str_radix(&digits, radix).ok().map(|n| n as f64)
}

/// Integral values are stored as JSON integers so they compare equal to the
/// numbers the host hands back.
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}
