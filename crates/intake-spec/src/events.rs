use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::values::{FormValues, display_string};

/// Interaction a host sends back for a rendered control.
///
/// Events never touch the answer map themselves; [`ControlEvent::resolve`] computes
/// the `(storage key, new value)` pair that the session's value-change handler applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlEvent {
    /// Text inputs, text areas, selects and radios.
    SetValue { key: String, value: Value },
    /// Checkbox toggled on or off.
    ToggleOption {
        key: String,
        option: String,
        checked: bool,
    },
    /// One sub-field of a date input edited.
    SetDatePart {
        key: String,
        part: String,
        value: String,
    },
    /// Sign action of a signature acknowledgment.
    Sign { key: String, signature: String },
    ClearSignature { key: String },
}

impl ControlEvent {
    pub fn key(&self) -> &str {
        match self {
            ControlEvent::SetValue { key, .. }
            | ControlEvent::ToggleOption { key, .. }
            | ControlEvent::SetDatePart { key, .. }
            | ControlEvent::Sign { key, .. }
            | ControlEvent::ClearSignature { key } => key,
        }
    }

    /// Computes the value to store, or `None` when the event changes nothing.
    pub fn resolve(&self, values: &FormValues) -> Option<(String, Value)> {
        let current = values.get(self.key());
        let next = match self {
            ControlEvent::SetValue { value, .. } => value.clone(),
            ControlEvent::ToggleOption {
                option, checked, ..
            } => toggle_option(current, option, *checked),
            ControlEvent::SetDatePart { part, value, .. } => {
                let mut parts = current
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_else(Map::new);
                parts.insert(part.clone(), Value::String(value.clone()));
                Value::Object(parts)
            }
            ControlEvent::Sign { signature, .. } => {
                if !display_string(current).is_empty() || signature.is_empty() {
                    return None;
                }
                Value::String(signature.clone())
            }
            ControlEvent::ClearSignature { .. } => Value::String(String::new()),
        };
        Some((self.key().to_string(), next))
    }
}

fn toggle_option(current: Option<&Value>, option: &str, checked: bool) -> Value {
    let mut selected: Vec<String> = Vec::new();
    if let Some(items) = current.and_then(Value::as_array) {
        for item in items.iter().filter_map(Value::as_str) {
            if !selected.iter().any(|existing| existing == item) {
                selected.push(item.to_string());
            }
        }
    }

    if checked {
        if !selected.iter().any(|existing| existing == option) {
            selected.push(option.to_string());
        }
    } else {
        selected.retain(|existing| existing != option);
    }

    Value::Array(selected.into_iter().map(Value::String).collect())
}
