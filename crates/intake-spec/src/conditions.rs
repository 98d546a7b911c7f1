use tracing::trace;

use crate::schema::{
    ConditionDefinition, ConditionGroup, ConditionOp, IntakeComponent, IntakeComponentOption,
};
use crate::values::{FormValues, is_empty_value, lookup_value, strict_equals, to_number};

/// Evaluates a visibility predicate. An absent group is always visible.
pub fn evaluate_condition_group(group: Option<&ConditionGroup>, values: &FormValues) -> bool {
    let Some(group) = group else {
        return true;
    };

    if !group
        .all
        .iter()
        .all(|condition| evaluate_condition(condition, values))
    {
        return false;
    }

    if !group.any.is_empty()
        && !group
            .any
            .iter()
            .any(|condition| evaluate_condition(condition, values))
    {
        return false;
    }

    true
}

/// Evaluates a single comparison against the answer map.
///
/// Missing or unrecognized operators evaluate to `true`.
pub fn evaluate_condition(condition: &ConditionDefinition, values: &FormValues) -> bool {
    let reference = condition
        .reference
        .as_deref()
        .filter(|reference| !reference.is_empty());
    let op = condition.op.as_ref().filter(|op| !op.as_str().is_empty());

    let Some(op) = op else {
        return true;
    };

    let candidate = reference.and_then(|reference| lookup_value(values, reference));
    let expected = condition.value.as_ref();

    match op {
        ConditionOp::Equals => strict_equals(candidate, expected),
        ConditionOp::NotEquals => !strict_equals(candidate, expected),
        ConditionOp::Exists => !is_empty_value(candidate),
        ConditionOp::NotExists => is_empty_value(candidate),
        ConditionOp::GreaterThan => compare(candidate, expected, |left, right| left > right),
        ConditionOp::LessThan => compare(candidate, expected, |left, right| left < right),
        ConditionOp::Other(op) => {
            trace!(op = %op, reference = ?reference, "unknown condition operator passes");
            true
        }
    }
}

fn compare<F>(
    candidate: Option<&serde_json::Value>,
    expected: Option<&serde_json::Value>,
    predicate: F,
) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (to_number(candidate), to_number(expected)) {
        (Some(left), Some(right)) => predicate(left, right),
        _ => false,
    }
}

pub fn is_component_visible(component: &IntakeComponent, values: &FormValues) -> bool {
    evaluate_condition_group(component.conditions.as_ref(), values)
}

pub fn is_option_visible(option: &IntakeComponentOption, values: &FormValues) -> bool {
    evaluate_condition_group(option.conditions.as_ref(), values)
}
