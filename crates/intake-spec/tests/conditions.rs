use proptest::prelude::*;
use serde_json::{Value, json};

use intake_spec::{
    ConditionDefinition, ConditionGroup, ConditionOp, FormValues, evaluate_condition,
    evaluate_condition_group,
};

fn answers(raw: Value) -> FormValues {
    raw.as_object().cloned().unwrap_or_default()
}

fn condition(reference: &str, op: &str, value: Option<Value>) -> ConditionDefinition {
    ConditionDefinition {
        reference: Some(reference.to_string()),
        op: Some(ConditionOp::parse(op)),
        value,
    }
}

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(|number| json!(number)),
        "[a-c0-9 ]{0,3}".prop_map(Value::String),
        Just(json!([])),
        Just(json!({})),
        Just(json!(["a"])),
    ]
}

fn answer_map() -> impl Strategy<Value = FormValues> {
    prop::collection::btree_map(prop_oneof![Just("a"), Just("b"), Just("c")], leaf_value(), 0..3)
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect()
        })
}

fn any_condition() -> impl Strategy<Value = ConditionDefinition> {
    (
        prop_oneof![Just("a"), Just("b"), Just("c"), Just("missing")],
        prop_oneof![
            Just("equals"),
            Just("notEquals"),
            Just("exists"),
            Just("notExists"),
            Just(">"),
            Just("<"),
        ],
        prop::option::of(leaf_value()),
    )
        .prop_map(|(reference, op, value)| condition(reference, op, value))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn absent_and_empty_groups_are_visible(values in answer_map()) {
        prop_assert!(evaluate_condition_group(None, &values));
        prop_assert!(evaluate_condition_group(Some(&ConditionGroup::default()), &values));
    }

    #[test]
    fn all_is_conjunction(values in answer_map(), members in prop::collection::vec(any_condition(), 1..4)) {
        let expected = members.iter().all(|member| evaluate_condition(member, &values));
        let group = ConditionGroup { all: members, any: Vec::new() };
        prop_assert_eq!(evaluate_condition_group(Some(&group), &values), expected);
    }

    #[test]
    fn any_is_disjunction(values in answer_map(), members in prop::collection::vec(any_condition(), 1..4)) {
        let expected = members.iter().any(|member| evaluate_condition(member, &values));
        let group = ConditionGroup { all: Vec::new(), any: members };
        prop_assert_eq!(evaluate_condition_group(Some(&group), &values), expected);
    }

    #[test]
    fn equality_operators_are_inverses(
        values in answer_map(),
        reference in prop_oneof![Just("a"), Just("missing")],
        expected in prop::option::of(leaf_value()),
    ) {
        let equals = condition(reference, "equals", expected.clone());
        let not_equals = condition(reference, "notEquals", expected);
        prop_assert_ne!(
            evaluate_condition(&equals, &values),
            evaluate_condition(&not_equals, &values)
        );
    }

    #[test]
    fn existence_operators_are_inverses(values in answer_map(), reference in prop_oneof![Just("a"), Just("b")]) {
        prop_assert_ne!(
            evaluate_condition(&condition(reference, "exists", None), &values),
            evaluate_condition(&condition(reference, "notExists", None), &values)
        );
    }

    #[test]
    fn non_numeric_comparisons_are_false(number in -100i64..100, word in "[a-z]{1,6}") {
        let values = answers(json!({ "n": number, "w": word }));
        for op in [">", "<"] {
            prop_assert!(!evaluate_condition(&condition("w", op, Some(json!(number))), &values));
            prop_assert!(!evaluate_condition(&condition("n", op, Some(json!(word.clone()))), &values));
            prop_assert!(!evaluate_condition(&condition("missing", op, Some(json!(number))), &values));
        }
    }
}

#[test]
fn exists_follows_emptiness_rule() {
    let values = answers(json!({
        "blank": "",
        "spaces": "   ",
        "list": [],
        "object": {},
        "null": null,
        "zero": 0,
        "no": false,
        "text": "x",
        "items": [1]
    }));
    for key in ["blank", "spaces", "list", "object", "null", "undefined"] {
        assert!(
            !evaluate_condition(&condition(key, "exists", None), &values),
            "{key} should be empty"
        );
    }
    for key in ["zero", "no", "text", "items"] {
        assert!(
            evaluate_condition(&condition(key, "exists", None), &values),
            "{key} should exist"
        );
    }
}

#[test]
fn numeric_comparisons_coerce_strings() {
    let values = answers(json!({ "age": "42", "income": 18000.5 }));
    assert!(evaluate_condition(&condition("age", ">", Some(json!(17))), &values));
    assert!(evaluate_condition(&condition("age", "<", Some(json!("100"))), &values));
    assert!(!evaluate_condition(&condition("age", ">", Some(json!(42))), &values));
    assert!(evaluate_condition(&condition("income", "<", Some(json!(20000))), &values));
    assert!(!evaluate_condition(&condition("age", ">", Some(json!(" "))), &values));
}

#[test]
fn radix_prefixed_answers_compare_numerically() {
    let values = answers(json!({ "code": "0x10", "mask": "0b11", "mode": "0o7" }));
    assert!(evaluate_condition(&condition("code", ">", Some(json!(15))), &values));
    assert!(!evaluate_condition(&condition("code", ">", Some(json!(16))), &values));
    assert!(evaluate_condition(&condition("mask", "<", Some(json!(4))), &values));
    assert!(evaluate_condition(&condition("mode", "<", Some(json!("0x8"))), &values));
}

#[test]
fn equality_is_strict_about_types() {
    let values = answers(json!({ "count": 3, "flag": true, "tags": ["a"] }));
    assert!(evaluate_condition(&condition("count", "equals", Some(json!(3))), &values));
    assert!(!evaluate_condition(&condition("count", "equals", Some(json!("3"))), &values));
    assert!(evaluate_condition(&condition("flag", "equals", Some(json!(true))), &values));
    assert!(!evaluate_condition(&condition("tags", "equals", Some(json!(["a"]))), &values));
    assert!(evaluate_condition(&condition("missing", "equals", None), &values));
    assert!(!evaluate_condition(&condition("missing", "equals", Some(Value::Null)), &values));
}

#[test]
fn dotted_references_traverse_nested_answers() {
    let values = answers(json!({
        "applicant": { "address": { "province": "ON" } },
        "applicant.name": "Literal"
    }));
    assert!(evaluate_condition(
        &condition("applicant.address.province", "equals", Some(json!("ON"))),
        &values
    ));
    assert!(evaluate_condition(
        &condition("applicant.name", "equals", Some(json!("Literal"))),
        &values
    ));
}

#[test]
fn missing_or_unknown_operator_is_permissive() {
    let values = FormValues::new();
    let no_op = ConditionDefinition {
        reference: Some("a".into()),
        op: None,
        value: Some(json!(1)),
    };
    assert!(evaluate_condition(&no_op, &values));
    assert!(evaluate_condition(&condition("a", "contains", Some(json!("x"))), &values));
}

#[test]
fn empty_any_does_not_hide() {
    let values = answers(json!({ "a": "x" }));
    let group = ConditionGroup {
        all: vec![condition("a", "exists", None)],
        any: Vec::new(),
    };
    assert!(evaluate_condition_group(Some(&group), &values));

    let failing_any = ConditionGroup {
        all: Vec::new(),
        any: vec![condition("a", "notExists", None)],
    };
    assert!(!evaluate_condition_group(Some(&failing_any), &values));
}
