use serde_json::{Value, json};

use intake_spec::{
    FormValues, IntakeSchema, Language, extract_step_values, field_errors, parse_intake_schema,
    validate_step,
};

fn fixture() -> IntakeSchema {
    let raw: Value = serde_json::from_str(include_str!("../tests/fixtures/intake_schema.json"))
        .expect("fixture json");
    parse_intake_schema(&raw)
}

fn answers(raw: Value) -> FormValues {
    raw.as_object().cloned().unwrap_or_default()
}

fn single_step(components: Value) -> IntakeSchema {
    parse_intake_schema(&json!({ "steps": [{ "stepId": "s", "components": components }] }))
}

#[test]
fn hidden_required_field_is_not_validated() {
    let schema = single_step(json!([
        {
            "type": "input",
            "storageKey": "spouseName",
            "required": true,
            "conditions": { "all": [{ "ref": "married", "op": "equals", "value": true }] }
        }
    ]));
    let step = &schema.steps[0];

    let errors = validate_step(step, &answers(json!({ "married": false })), Language::En);
    assert!(errors.is_empty());

    let errors = validate_step(step, &answers(json!({ "married": true })), Language::En);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "spouseName");
    assert_eq!(errors[0].label, "spouseName");
    assert_eq!(errors[0].message, "spouseName is required.");
}

#[test]
fn required_uses_condition_emptiness() {
    let schema = single_step(json!([
        { "type": "input", "name": "zero", "required": true },
        { "type": "input", "name": "blank", "required": true },
        { "type": "checkboxes", "name": "none", "required": true, "options": [{ "value": "a" }] },
        { "type": "date-input", "name": "dob", "required": true },
        { "type": "input", "name": "optional" },
        { "type": "input", "name": "truthy", "required": "yes" }
    ]));
    let values = answers(json!({ "zero": 0, "blank": "  ", "none": [], "dob": {} }));
    let errors = validate_step(&schema.steps[0], &values, Language::En);
    let fields: Vec<_> = errors.iter().map(|error| error.field.as_str()).collect();
    assert_eq!(fields, ["blank", "none", "dob"]);
}

#[test]
fn labels_are_localized_in_messages() {
    let schema = fixture();
    let errors = validate_step(&schema.steps[0], &FormValues::new(), Language::Fr);
    let messages: Vec<_> = errors.iter().map(|error| error.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "Prénom est obligatoire.",
            "Adresse courriel est obligatoire.",
            "Avez-vous une carte de statut? est obligatoire."
        ]
    );
}

#[test]
fn selected_option_children_are_validated() {
    let schema = fixture();
    let step = &schema.steps[0];
    let base = json!({
        "applicant.firstName": "Mary",
        "email": "mary@example.org"
    });

    let mut values = answers(base.clone());
    values.insert("hasStatusCard".into(), json!("no"));
    assert!(validate_step(step, &values, Language::En).is_empty());

    values.insert("hasStatusCard".into(), json!("yes"));
    let errors = validate_step(step, &values, Language::En);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "statusCardNumber");
    assert_eq!(errors[0].label, "Card number");
}

#[test]
fn checkbox_membership_gates_children() {
    let schema = fixture();
    let step = &schema.steps[1];

    let errors = validate_step(step, &answers(json!({ "supports": ["training"] })), Language::En);
    assert!(errors.is_empty());

    let errors = validate_step(
        step,
        &answers(json!({ "supports": ["training", "childcare"] })),
        Language::En,
    );
    assert_eq!(field_errors(&errors).get("childrenCount").map(String::as_str), Some("How many children? is required."));
}

#[test]
fn hidden_option_children_are_skipped_even_when_selected() {
    let schema = single_step(json!([
        {
            "type": "radios",
            "storageKey": "path",
            "options": [
                {
                    "value": "a",
                    "conditions": { "all": [{ "ref": "enabled", "op": "exists" }] },
                    "children": [{ "type": "input", "name": "detail", "required": true }]
                }
            ]
        }
    ]));
    let values = answers(json!({ "path": "a" }));
    assert!(validate_step(&schema.steps[0], &values, Language::En).is_empty());

    let mut enabled = values.clone();
    enabled.insert("enabled".into(), json!(true));
    assert_eq!(validate_step(&schema.steps[0], &enabled, Language::En).len(), 1);
}

#[test]
fn extract_keeps_hidden_answers_and_skips_unset_keys() {
    let schema = fixture();
    let values = answers(json!({
        "applicant.firstName": "Mary",
        "statusCardNumber": "123",
        "hasStatusCard": "no",
        "goalsSummary": "elsewhere"
    }));
    let subset = extract_step_values(&schema.steps[0], &values);
    let keys: Vec<_> = subset.keys().map(String::as_str).collect();
    assert_eq!(keys, ["applicant.firstName", "hasStatusCard", "statusCardNumber"]);
}
