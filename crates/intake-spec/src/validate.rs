use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conditions::{is_component_visible, is_option_visible};
use crate::i18n::{Language, message_with, resolve_text};
use crate::schema::{ComponentKind, IntakeComponent, IntakeStep};
use crate::values::{FieldErrors, FormValues, is_empty_value, strict_equals};

/// Required-field failure reported for the active step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StepValidationError {
    pub field: String,
    pub label: String,
    pub message: String,
}

/// Checks every visible, required component of the step that has a storage key.
///
/// Option children only count when their option is visible and currently selected.
pub fn validate_step(
    step: &IntakeStep,
    values: &FormValues,
    language: Language,
) -> Vec<StepValidationError> {
    let mut errors = Vec::new();
    collect_validation_errors(&step.components, values, language, &mut errors);
    errors
}

fn collect_validation_errors(
    components: &[IntakeComponent],
    values: &FormValues,
    language: Language,
    errors: &mut Vec<StepValidationError>,
) {
    for component in components {
        if !is_component_visible(component, values) {
            continue;
        }

        let storage_key = component.storage_key();
        if let Some(key) = storage_key
            && component.field.required
            && is_empty_value(values.get(key))
        {
            let mut label = resolve_text(component.field.label.as_ref(), language);
            if label.is_empty() {
                label = key.to_string();
            }
            errors.push(StepValidationError {
                field: key.to_string(),
                message: message_with(language, "intake.validation.required", &[("label", &label)]),
                label,
            });
        }

        collect_validation_errors(&component.components, values, language, errors);

        let current = storage_key.and_then(|key| values.get(key));
        for (index, option) in component.options.iter().enumerate() {
            if option.children.is_empty() || !is_option_visible(option, values) {
                continue;
            }
            let selected = match storage_key {
                Some(_) => is_option_selected(
                    &component.kind,
                    current,
                    &option.resolved_value(index, language),
                ),
                None => true,
            };
            if selected {
                collect_validation_errors(&option.children, values, language, errors);
            }
        }
    }
}

/// Selection test shared by validation: membership for checkboxes, equality for
/// radios and selects. Other kinds treat every option as selected.
pub fn is_option_selected(kind: &ComponentKind, current: Option<&Value>, option_value: &str) -> bool {
    match kind {
        ComponentKind::Checkboxes => current
            .and_then(Value::as_array)
            .is_some_and(|selected| selected.iter().any(|item| item.as_str() == Some(option_value))),
        ComponentKind::Radios | ComponentKind::Select => {
            strict_equals(current, Some(&Value::String(option_value.to_string())))
        }
        _ => true,
    }
}

/// Subset of the answer map touched by the step's storage keys, hidden fields included.
pub fn extract_step_values(step: &IntakeStep, values: &FormValues) -> FormValues {
    step.storage_keys()
        .into_iter()
        .filter_map(|key| values.get(&key).cloned().map(|value| (key, value)))
        .collect()
}

/// Field error lookup used by the renderer.
pub fn field_errors(errors: &[StepValidationError]) -> FieldErrors {
    errors
        .iter()
        .map(|error| (error.field.clone(), error.message.clone()))
        .collect()
}
