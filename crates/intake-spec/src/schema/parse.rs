use serde_json::{Map, Value};
use tracing::debug;

use super::kind::{ComponentKind, string_field};
use super::{
    ConditionDefinition, ConditionGroup, ConditionOp, FieldProps, IntakeComponent,
    IntakeComponentOption, IntakeSchema, IntakeStep,
};
use crate::i18n::LocalizedText;

const STRUCTURAL_COMPONENT_KEYS: [&str; 4] = ["type", "components", "options", "conditions"];
const STRUCTURAL_OPTION_KEYS: [&str; 2] = ["children", "conditions"];
const STRUCTURAL_STEP_KEYS: [&str; 2] = ["stepId", "components"];

/// Normalizes an arbitrary JSON document into an [`IntakeSchema`].
///
/// Never fails: a non-object root yields [`IntakeSchema::empty`], steps without a
/// `stepId` and components without a string `type` are dropped.
pub fn parse_intake_schema(raw: &Value) -> IntakeSchema {
    let Some(root) = raw.as_object() else {
        debug!("intake schema root is not an object");
        return IntakeSchema::empty();
    };

    let version = root
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let title = root
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let steps = root
        .get("steps")
        .and_then(Value::as_array)
        .map(|steps| steps.iter().filter_map(parse_step).collect())
        .unwrap_or_default();

    IntakeSchema {
        version,
        title,
        steps,
    }
}

fn parse_step(raw: &Value) -> Option<IntakeStep> {
    let step = raw.as_object()?;
    let Some(step_id) = string_field(step, "stepId") else {
        debug!("dropping intake step without stepId");
        return None;
    };

    Some(IntakeStep {
        title: text_field(step, "title"),
        description: text_field(step, "description"),
        components: parse_components(step.get("components")),
        extra: without_keys(step, &STRUCTURAL_STEP_KEYS),
        step_id,
    })
}

pub(crate) fn parse_components(raw: Option<&Value>) -> Vec<IntakeComponent> {
    raw.and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_component).collect())
        .unwrap_or_default()
}

fn parse_component(raw: &Value) -> Option<IntakeComponent> {
    let component = raw.as_object()?;
    let Some(component_type) = component.get("type").and_then(Value::as_str) else {
        debug!("dropping intake component without a string type");
        return None;
    };
    if component_type.is_empty() {
        debug!("dropping intake component with an empty type");
        return None;
    }

    Some(IntakeComponent {
        component_type: component_type.to_string(),
        kind: ComponentKind::from_raw(component_type, component),
        field: parse_field_props(component),
        components: parse_components(component.get("components")),
        options: component
            .get("options")
            .and_then(Value::as_array)
            .map(|options| options.iter().filter_map(parse_option).collect())
            .unwrap_or_default(),
        conditions: parse_condition_group(component.get("conditions")),
        extra: without_keys(component, &STRUCTURAL_COMPONENT_KEYS),
    })
}

fn parse_field_props(raw: &Map<String, Value>) -> FieldProps {
    FieldProps {
        id: string_field(raw, "id"),
        storage_key: string_field(raw, "storageKey"),
        name: string_field(raw, "name"),
        label: text_field(raw, "label"),
        hint: text_field(raw, "hint"),
        placeholder: text_field(raw, "placeholder"),
        required: raw.get("required").and_then(Value::as_bool) == Some(true),
        class: string_field(raw, "class").or_else(|| string_field(raw, "classes")),
        label_class: string_field(raw, "labelClass"),
        legend_class: string_field(raw, "legendClass"),
    }
}

fn parse_option(raw: &Value) -> Option<IntakeComponentOption> {
    let option = raw.as_object()?;
    Some(IntakeComponentOption {
        label: text_field(option, "label"),
        hint: text_field(option, "hint"),
        value: string_field(option, "value"),
        children: parse_components(option.get("children")),
        conditions: parse_condition_group(option.get("conditions")),
        extra: without_keys(option, &STRUCTURAL_OPTION_KEYS),
    })
}

fn parse_condition_group(raw: Option<&Value>) -> Option<ConditionGroup> {
    let group = raw?.as_object()?;
    let parse_list = |key: &str| -> Vec<ConditionDefinition> {
        group
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_condition).collect())
            .unwrap_or_default()
    };

    let all = parse_list("all");
    let any = parse_list("any");
    if all.is_empty() && any.is_empty() {
        return None;
    }
    Some(ConditionGroup { all, any })
}

fn parse_condition(raw: &Value) -> Option<ConditionDefinition> {
    let condition = raw.as_object()?;
    let reference = condition
        .get("ref")
        .and_then(Value::as_str)
        .map(str::to_string);
    let op = condition
        .get("op")
        .and_then(Value::as_str)
        .map(ConditionOp::parse);
    let value = condition.get("value").cloned();

    let has_reference = reference.as_deref().is_some_and(|reference| !reference.is_empty());
    let has_op = op.as_ref().is_some_and(|op| !op.as_str().is_empty());
    if !has_reference && !has_op && value.is_none() {
        return None;
    }

    Some(ConditionDefinition {
        reference,
        op,
        value,
    })
}

pub(crate) fn text_field(raw: &Map<String, Value>, key: &str) -> Option<LocalizedText> {
    raw.get(key).and_then(LocalizedText::from_value)
}

fn without_keys(raw: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    raw.iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
