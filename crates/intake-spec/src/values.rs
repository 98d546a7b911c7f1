use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Flat answer map keyed by component storage key, shared across every step.
pub type FormValues = Map<String, Value>;

/// Field-level error messages keyed by storage key.
pub type FieldErrors = BTreeMap<String, String>;

/// Resolves a condition or summary reference against the answer map.
///
/// An exact top-level key wins before the reference is treated as a dotted path,
/// so stored keys that contain dots still match directly.
pub fn lookup_value<'a>(values: &'a FormValues, reference: &str) -> Option<&'a Value> {
    if reference.is_empty() {
        return None;
    }
    if let Some(value) = values.get(reference) {
        return Some(value);
    }

    let mut segments = reference.split('.');
    let mut cursor = values.get(segments.next()?)?;
    for segment in segments {
        cursor = match cursor {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cursor)
}

/// Missing, `null`, blank strings and zero-length arrays/objects are empty.
/// `0` and `false` are answers.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => false,
    }
}

/// Accepts finite numbers and non-blank numeric strings.
pub fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64().filter(|number| number.is_finite()),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Some(number) = radix_literal(trimmed) {
                return Some(number);
            }
            // Only the spelled-out `Infinity` is numeric; `inf` and `nan` are words.
            let unsigned = trimmed.trim_start_matches(['+', '-']);
            if unsigned.chars().any(|c| c.is_ascii_alphabetic())
                && unsigned != "Infinity"
                && !unsigned.contains(['e', 'E'])
            {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|number| !number.is_nan())
        }
        _ => None,
    }
}

/// Unsigned `0x`, `0o` and `0b` integer literals.
fn radix_literal(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok().map(|number| number as f64)
}

/// Identity comparison between an answer and a schema literal.
///
/// Two absent values are equal; numbers compare numerically; arrays and objects
/// never match because an answer is never the same instance as a schema literal.
pub fn strict_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Null), Some(Value::Null)) => true,
        (Some(Value::Bool(left)), Some(Value::Bool(right))) => left == right,
        (Some(Value::Number(left)), Some(Value::Number(right))) => left.as_f64() == right.as_f64(),
        (Some(Value::String(left)), Some(Value::String(right))) => left == right,
        _ => false,
    }
}

/// String form of an answer as shown inside a text control.
pub fn display_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => format_number(number),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| display_string(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

pub(crate) fn format_number(number: &serde_json::Number) -> String {
    if number.is_f64()
        && let Some(float) = number.as_f64()
        && float.fract() == 0.0
        && float.abs() < 1e15
    {
        return format!("{}", float as i64);
    }
    number.to_string()
}

/// JavaScript-style truthiness used for optional schema flags.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|number| number != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Builds the initial answer map by merging draft payloads in order.
/// Later sources overwrite earlier keys; non-object sources are ignored.
pub fn seed_values<'a>(sources: impl IntoIterator<Item = Option<&'a Value>>) -> FormValues {
    let mut initial = FormValues::new();
    for source in sources.into_iter().flatten() {
        if let Value::Object(map) = source {
            for (key, value) in map {
                initial.insert(key.clone(), value.clone());
            }
        }
    }
    initial
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(raw: Value) -> FormValues {
        raw.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn lookup_prefers_literal_dotted_key() {
        let answers = values(json!({
            "address.city": "Ottawa",
            "address": { "city": "Gatineau", "lines": ["1 Main St"] }
        }));
        assert_eq!(lookup_value(&answers, "address.city"), Some(&json!("Ottawa")));
        assert_eq!(
            lookup_value(&answers, "address.lines.0"),
            Some(&json!("1 Main St"))
        );
        assert_eq!(lookup_value(&answers, "address.postal"), None);
        assert_eq!(lookup_value(&answers, ""), None);
    }

    #[test]
    fn numeric_coercion_rejects_non_numbers() {
        assert_eq!(to_number(Some(&json!(" 42 "))), Some(42.0));
        assert_eq!(to_number(Some(&json!(3.5))), Some(3.5));
        assert_eq!(to_number(Some(&json!("abc"))), None);
        assert_eq!(to_number(Some(&json!("   "))), None);
        assert_eq!(to_number(Some(&json!("inf"))), None);
        assert_eq!(to_number(Some(&json!("NaN"))), None);
        assert_eq!(to_number(Some(&json!("1e3"))), Some(1000.0));
        assert_eq!(to_number(Some(&json!("0x10"))), Some(16.0));
        assert_eq!(to_number(Some(&json!("0B11"))), Some(3.0));
        assert_eq!(to_number(Some(&json!(" 0o7 "))), Some(7.0));
        assert_eq!(to_number(Some(&json!("0x"))), None);
        assert_eq!(to_number(Some(&json!("0b12"))), None);
        assert_eq!(to_number(Some(&json!("-0x10"))), None);
        assert_eq!(to_number(Some(&json!(true))), None);
        assert_eq!(to_number(None), None);
    }

    #[test]
    fn strict_equality_matches_primitives_only() {
        assert!(strict_equals(Some(&json!(1)), Some(&json!(1.0))));
        assert!(strict_equals(None, None));
        assert!(!strict_equals(Some(&json!("1")), Some(&json!(1))));
        assert!(!strict_equals(Some(&json!(["a"])), Some(&json!(["a"]))));
        assert!(!strict_equals(None, Some(&json!(null))));
    }

    #[test]
    fn display_string_mirrors_text_controls() {
        assert_eq!(display_string(Some(&json!(12.0))), "12");
        assert_eq!(display_string(Some(&json!(["a", 2]))), "a,2");
        assert_eq!(display_string(None), "");
    }

    #[test]
    fn seed_values_merges_in_order() {
        let step_data = json!({ "a": 1, "b": 1 });
        let data = json!({ "b": 2 });
        let ignored = json!("not-an-object");
        let seeded = seed_values([Some(&step_data), Some(&ignored), Some(&data)]);
        assert_eq!(seeded.get("a"), Some(&json!(1)));
        assert_eq!(seeded.get("b"), Some(&json!(2)));
    }
}
