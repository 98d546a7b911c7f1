use serde_json::{Map, Value};

use super::IntakeComponent;
use super::parse::{parse_components, text_field};
use crate::i18n::LocalizedText;
use crate::values::is_truthy;

/// Render strategy selected by a component's `type` tag.
///
/// Each variant carries only the fields its strategy reads; everything else stays
/// in the component's `extra` side-table. Unknown tags map to `Unsupported`, which
/// still renders a visible warning.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Paragraph(ParagraphSpec),
    Input(InputSpec),
    TextArea(TextAreaSpec),
    CharacterCount(CharacterCountSpec),
    SummaryList(SummaryListSpec),
    Select,
    DateInput(DateInputSpec),
    Radios,
    Checkboxes,
    Details(DetailsSpec),
    Accordion(AccordionSpec),
    SignatureAck(SignatureSpec),
    FileUpload,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphSpec {
    pub text: Option<LocalizedText>,
    /// Element tag requested through `as`, defaults to `p`.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub input_type: String,
    pub autocomplete: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextAreaSpec {
    pub rows: Option<u32>,
    pub max_length: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterCountSpec {
    pub rows: Option<u32>,
    pub max_length: Option<i64>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryListSpec {
    pub rows: Vec<SummaryRow>,
    pub hide_empty: bool,
    pub empty_fallback: Option<LocalizedText>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryRow {
    pub key: Option<String>,
    /// Answer reference; defaults to `key`.
    pub value_ref: Option<String>,
    pub label: Option<LocalizedText>,
    pub empty_fallback: Option<LocalizedText>,
    pub components: Vec<IntakeComponent>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateInputSpec {
    pub fields: Vec<DateField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateField {
    pub name: String,
    pub label: Option<LocalizedText>,
    pub classes: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailsSpec {
    pub summary: Option<LocalizedText>,
    pub title: Option<LocalizedText>,
    pub text: Option<LocalizedText>,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccordionSpec {
    pub items: Vec<AccordionItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccordionItem {
    pub heading: Option<LocalizedText>,
    pub title: Option<LocalizedText>,
    pub summary: Option<LocalizedText>,
    pub content: Option<LocalizedText>,
    pub components: Vec<IntakeComponent>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureSpec {
    pub action_label: Option<LocalizedText>,
    pub clear_label: Option<LocalizedText>,
    pub status_signed: Option<LocalizedText>,
    pub status_unsigned: Option<LocalizedText>,
}

const DATE_PARTS: [&str; 3] = ["day", "month", "year"];

impl ComponentKind {
    pub(crate) fn from_raw(tag: &str, raw: &Map<String, Value>) -> Self {
        match tag {
            "paragraph" | "inset-text" | "warning-text" => ComponentKind::Paragraph(ParagraphSpec {
                text: text_field(raw, "text"),
                tag: string_field(raw, "as"),
            }),
            "input" | "text" | "email" | "number" | "phone" => ComponentKind::Input(InputSpec {
                input_type: string_field(raw, "inputType").unwrap_or_else(|| "text".into()),
                autocomplete: string_field(raw, "autocomplete"),
            }),
            "textarea" | "text-area" => ComponentKind::TextArea(TextAreaSpec {
                rows: rows_field(raw),
                max_length: integer_field(raw, "maxLength"),
            }),
            "character-count" => ComponentKind::CharacterCount(CharacterCountSpec {
                rows: rows_field(raw),
                max_length: integer_field(raw, "maxLength"),
                threshold: number_field(raw, "threshold"),
            }),
            "summary-list" => ComponentKind::SummaryList(SummaryListSpec {
                rows: raw
                    .get("rows")
                    .and_then(Value::as_array)
                    .map(|rows| rows.iter().map(parse_summary_row).collect())
                    .unwrap_or_default(),
                hide_empty: is_truthy(raw.get("hideEmpty")),
                empty_fallback: text_field(raw, "emptyFallback"),
            }),
            "select" => ComponentKind::Select,
            "date" | "date-input" => ComponentKind::DateInput(DateInputSpec {
                fields: parse_date_fields(raw.get("dateFields")),
            }),
            "radios" | "radio" => ComponentKind::Radios,
            "checkboxes" | "checkbox" => ComponentKind::Checkboxes,
            "details" => ComponentKind::Details(DetailsSpec {
                summary: text_field(raw, "summary"),
                title: text_field(raw, "title"),
                text: text_field(raw, "text"),
                open: is_truthy(raw.get("open")),
            }),
            "accordion" => ComponentKind::Accordion(AccordionSpec {
                items: raw
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().map(parse_accordion_item).collect())
                    .unwrap_or_default(),
            }),
            "signature-ack" => ComponentKind::SignatureAck(SignatureSpec {
                action_label: text_field(raw, "actionLabel"),
                clear_label: text_field(raw, "clearLabel"),
                status_signed: text_field(raw, "statusSignedText"),
                status_unsigned: text_field(raw, "statusUnsignedText"),
            }),
            "file-upload" => ComponentKind::FileUpload,
            _ => ComponentKind::Unsupported,
        }
    }

    /// Choice kinds whose options are tested for selection before their children count.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            ComponentKind::Select | ComponentKind::Radios | ComponentKind::Checkboxes
        )
    }
}

fn parse_summary_row(raw: &Value) -> SummaryRow {
    let Some(row) = raw.as_object() else {
        return SummaryRow::default();
    };
    let key = string_field(row, "key");
    SummaryRow {
        value_ref: string_field(row, "value").or_else(|| key.clone()),
        key,
        label: text_field(row, "label"),
        empty_fallback: text_field(row, "emptyFallback"),
        components: parse_components(row.get("components")),
    }
}

fn parse_accordion_item(raw: &Value) -> AccordionItem {
    let Some(item) = raw.as_object() else {
        return AccordionItem::default();
    };
    AccordionItem {
        heading: text_field(item, "heading"),
        title: text_field(item, "title"),
        summary: text_field(item, "summary"),
        content: text_field(item, "content"),
        components: parse_components(item.get("components")),
    }
}

fn parse_date_fields(raw: Option<&Value>) -> Vec<DateField> {
    let Some(fields) = raw.and_then(Value::as_array) else {
        return DATE_PARTS
            .iter()
            .enumerate()
            .map(|(index, part)| DateField {
                name: (*part).to_string(),
                label: None,
                classes: default_date_class(index).to_string(),
            })
            .collect();
    };

    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let field = field.as_object();
            let name = field
                .and_then(|field| string_field(field, "name"))
                .unwrap_or_else(|| DATE_PARTS[index.min(2)].to_string());
            DateField {
                name,
                label: field.and_then(|field| text_field(field, "label")),
                classes: field
                    .and_then(|field| string_field(field, "classes"))
                    .unwrap_or_else(|| default_date_class(index).to_string()),
            }
        })
        .collect()
}

fn default_date_class(index: usize) -> &'static str {
    if index == 2 {
        "govuk-input--width-4"
    } else {
        "govuk-input--width-2"
    }
}

/// Non-empty string field.
pub(crate) fn string_field(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn number_field(raw: &Map<String, Value>, key: &str) -> Option<f64> {
    raw.get(key)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}

fn integer_field(raw: &Map<String, Value>, key: &str) -> Option<i64> {
    number_field(raw, key).map(|value| value.trunc() as i64)
}

fn rows_field(raw: &Map<String, Value>) -> Option<u32> {
    integer_field(raw, "rows").and_then(|rows| u32::try_from(rows).ok())
}
