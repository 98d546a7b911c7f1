mod kind;
mod parse;

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::i18n::LocalizedText;

pub use kind::{
    AccordionItem, AccordionSpec, CharacterCountSpec, ComponentKind, DateField, DateInputSpec,
    DetailsSpec, InputSpec, ParagraphSpec, SignatureSpec, SummaryListSpec, SummaryRow,
    TextAreaSpec,
};
pub use parse::parse_intake_schema;

/// Root intake document. Read-only for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeSchema {
    pub version: String,
    pub title: String,
    pub steps: Vec<IntakeStep>,
}

impl IntakeSchema {
    /// Schema returned for documents that are not JSON objects.
    pub fn empty() -> Self {
        Self {
            version: "unknown".into(),
            title: String::new(),
            steps: Vec::new(),
        }
    }

    /// Storage keys reachable from each step, in step order.
    pub fn storage_keys(&self) -> Vec<(String, Vec<String>)> {
        self.steps
            .iter()
            .map(|step| (step.step_id.clone(), step.storage_keys()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntakeStep {
    pub step_id: String,
    pub title: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub components: Vec<IntakeComponent>,
    pub extra: Map<String, Value>,
}

impl IntakeStep {
    /// Every storage key under the step, including option children, regardless of visibility.
    pub fn storage_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        let mut seen = BTreeSet::new();
        collect_storage_keys(&self.components, &mut keys, &mut seen);
        keys
    }
}

fn collect_storage_keys(
    components: &[IntakeComponent],
    keys: &mut Vec<String>,
    seen: &mut BTreeSet<String>,
) {
    for component in components {
        if let Some(key) = component.storage_key()
            && seen.insert(key.to_string())
        {
            keys.push(key.to_string());
        }
        collect_storage_keys(&component.components, keys, seen);
        for option in &component.options {
            collect_storage_keys(&option.children, keys, seen);
        }
    }
}

/// Fields shared by every leaf control.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldProps {
    pub id: Option<String>,
    pub storage_key: Option<String>,
    pub name: Option<String>,
    pub label: Option<LocalizedText>,
    pub hint: Option<LocalizedText>,
    pub placeholder: Option<LocalizedText>,
    pub required: bool,
    pub class: Option<String>,
    pub label_class: Option<String>,
    pub legend_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntakeComponent {
    /// Raw `type` tag as authored.
    pub component_type: String,
    pub kind: ComponentKind,
    pub field: FieldProps,
    pub components: Vec<IntakeComponent>,
    pub options: Vec<IntakeComponentOption>,
    pub conditions: Option<ConditionGroup>,
    /// Authoring metadata preserved verbatim, minus the structural keys.
    pub extra: Map<String, Value>,
}

impl IntakeComponent {
    /// Explicit `storageKey`, else `name`. Components without either store nothing.
    pub fn storage_key(&self) -> Option<&str> {
        self.field
            .storage_key
            .as_deref()
            .or(self.field.name.as_deref())
    }

    pub fn class_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.field.class.as_deref().unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntakeComponentOption {
    pub label: Option<LocalizedText>,
    pub hint: Option<LocalizedText>,
    pub value: Option<String>,
    pub children: Vec<IntakeComponent>,
    pub conditions: Option<ConditionGroup>,
    pub extra: Map<String, Value>,
}

impl IntakeComponentOption {
    /// Identity of the option: explicit value, else resolved label, else `option-{index}`
    /// where `index` is the option's position in the component's full option list.
    pub fn resolved_value(&self, index: usize, language: crate::Language) -> String {
        if let Some(value) = &self.value {
            return value.clone();
        }
        let label = crate::i18n::resolve_text(self.label.as_ref(), language);
        if !label.is_empty() {
            return label;
        }
        format!("option-{index}")
    }
}

/// Visibility predicate: every `all` member holds and, when present, at least one `any` member.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionGroup {
    pub all: Vec<ConditionDefinition>,
    pub any: Vec<ConditionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionDefinition {
    pub reference: Option<String>,
    pub op: Option<ConditionOp>,
    /// `Some(Value::Null)` when the author wrote `"value": null`.
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOp {
    Equals,
    NotEquals,
    Exists,
    NotExists,
    GreaterThan,
    LessThan,
    Other(String),
}

impl ConditionOp {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "equals" => ConditionOp::Equals,
            "notEquals" => ConditionOp::NotEquals,
            "exists" => ConditionOp::Exists,
            "notExists" => ConditionOp::NotExists,
            ">" => ConditionOp::GreaterThan,
            "<" => ConditionOp::LessThan,
            other => ConditionOp::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConditionOp::Equals => "equals",
            ConditionOp::NotEquals => "notEquals",
            ConditionOp::Exists => "exists",
            ConditionOp::NotExists => "notExists",
            ConditionOp::GreaterThan => ">",
            ConditionOp::LessThan => "<",
            ConditionOp::Other(raw) => raw,
        }
    }
}
