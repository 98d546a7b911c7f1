use serde_json::{Value, json};

use intake_spec::i18n::resolve_value_text;
use intake_spec::{ComponentKind, ConditionOp, Language, parse_intake_schema, resolve_text};

fn fixture() -> Value {
    serde_json::from_str(include_str!("../tests/fixtures/intake_schema.json")).expect("fixture json")
}

#[test]
fn parses_fixture_steps_in_order() {
    let schema = parse_intake_schema(&fixture());
    assert_eq!(schema.version, "2024.09");
    assert_eq!(schema.title, "ISET Program Application");
    let ids: Vec<_> = schema.steps.iter().map(|step| step.step_id.as_str()).collect();
    assert_eq!(ids, ["applicant", "goals", "review"]);
    assert_eq!(
        resolve_text(schema.steps[0].title.as_ref(), Language::Fr),
        "À propos de vous"
    );
}

#[test]
fn non_object_root_degrades_to_empty_schema() {
    for raw in [json!(null), json!([1, 2]), json!("schema"), json!(42)] {
        let schema = parse_intake_schema(&raw);
        assert_eq!(schema.version, "unknown");
        assert_eq!(schema.title, "");
        assert!(schema.steps.is_empty());
    }
}

#[test]
fn malformed_nodes_are_dropped() {
    let schema = parse_intake_schema(&json!({
        "steps": [
            { "title": "no id" },
            { "stepId": "", "components": [] },
            "not-a-step",
            {
                "stepId": "kept",
                "components": [
                    { "label": "missing type" },
                    { "type": 7 },
                    { "type": "" },
                    { "type": "input", "name": "ok", "components": [], "options": [] }
                ]
            }
        ]
    }));
    assert_eq!(schema.version, "unknown");
    assert_eq!(schema.steps.len(), 1);
    let step = &schema.steps[0];
    assert_eq!(step.step_id, "kept");
    assert_eq!(step.components.len(), 1);
    assert!(step.components[0].components.is_empty());
    assert!(step.components[0].options.is_empty());
}

#[test]
fn type_aliases_share_strategies() {
    let schema = parse_intake_schema(&json!({
        "steps": [{
            "stepId": "s",
            "components": [
                { "type": "warning-text", "text": "Careful" },
                { "type": "phone", "name": "phone" },
                { "type": "text-area", "name": "notes", "rows": 3 },
                { "type": "date", "name": "dob" },
                { "type": "radio", "name": "r", "options": [{ "value": "a" }] },
                { "type": "checkbox", "name": "c", "options": [{ "value": "a" }] },
                { "type": "carousel" }
            ]
        }]
    }));
    let kinds: Vec<_> = schema.steps[0]
        .components
        .iter()
        .map(|component| &component.kind)
        .collect();
    assert!(matches!(kinds[0], ComponentKind::Paragraph(_)));
    assert!(matches!(kinds[1], ComponentKind::Input(spec) if spec.input_type == "text"));
    assert!(matches!(kinds[2], ComponentKind::TextArea(spec) if spec.rows == Some(3)));
    assert!(matches!(kinds[3], ComponentKind::DateInput(spec) if spec.fields.len() == 3));
    assert!(matches!(kinds[4], ComponentKind::Radios));
    assert!(matches!(kinds[5], ComponentKind::Checkboxes));
    assert!(matches!(kinds[6], ComponentKind::Unsupported));
    assert_eq!(schema.steps[0].components[6].component_type, "carousel");
}

#[test]
fn authoring_metadata_is_preserved() {
    let schema = parse_intake_schema(&fixture());
    let first_name = &schema.steps[0].components[1];
    assert_eq!(first_name.storage_key(), Some("applicant.firstName"));
    assert_eq!(first_name.extra.get("autocomplete"), Some(&json!("given-name")));
    assert!(first_name.extra.get("type").is_none());
    assert!(first_name.field.required);
}

#[test]
fn conditions_and_option_children_are_parsed() {
    let schema = parse_intake_schema(&fixture());
    let supports = &schema.steps[1].components[0];
    assert_eq!(supports.options.len(), 3);
    assert_eq!(supports.options[1].children.len(), 1);
    let relocation = supports.options[2]
        .conditions
        .as_ref()
        .expect("option conditions");
    assert_eq!(relocation.all[0].op, Some(ConditionOp::Exists));
    assert_eq!(relocation.all[0].reference.as_deref(), Some("applicant.firstName"));
    assert_eq!(supports.options[2].resolved_value(2, Language::En), "Relocation");
}

#[test]
fn storage_keys_walk_option_children_but_not_summary_rows() {
    let schema = parse_intake_schema(&fixture());
    let keys = schema.storage_keys();
    assert_eq!(
        keys[0].1,
        ["applicant.firstName", "email", "dateOfBirth", "hasStatusCard", "statusCardNumber"]
    );
    assert_eq!(keys[1].1, ["supports", "childrenCount", "goalsSummary", "region"]);
    assert_eq!(keys[2].1, ["signature", "documents"]);
}

#[test]
fn storage_keys_are_deduplicated() {
    let schema = parse_intake_schema(&json!({
        "steps": [{
            "stepId": "s",
            "components": [
                { "type": "input", "storageKey": "a" },
                { "type": "input", "name": "a" },
                { "type": "paragraph", "components": [{ "type": "input", "name": "b" }] }
            ]
        }]
    }));
    assert_eq!(schema.steps[0].storage_keys(), ["a", "b"]);
}

#[test]
fn resolve_text_falls_back_across_languages() {
    assert_eq!(resolve_value_text(Some(&json!("")), Language::En), "");
    assert_eq!(resolve_value_text(None, Language::En), "");
    assert_eq!(resolve_value_text(Some(&json!({ "fr": "Bonjour" })), Language::En), "Bonjour");
    assert_eq!(
        resolve_value_text(Some(&json!({ "en": "  ", "fr": "Bonjour" })), Language::En),
        "Bonjour"
    );
    assert_eq!(
        resolve_value_text(Some(&json!({ "en": "Hello", "fr": "Bonjour" })), Language::Fr),
        "Bonjour"
    );
    assert_eq!(resolve_value_text(Some(&json!({ "en": null })), Language::En), "");
    assert_eq!(resolve_value_text(Some(&json!(12)), Language::En), "");
}
