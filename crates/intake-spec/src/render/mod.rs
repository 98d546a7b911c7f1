mod controls;
mod summary;
mod text;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::conditions::is_component_visible;
use crate::i18n::Language;
use crate::schema::{ComponentKind, IntakeComponent};
use crate::values::{FieldErrors, FormValues};

pub use summary::format_summary_value;
pub use text::render_text;

/// Read-only inputs shared by every render strategy.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub values: &'a FormValues,
    pub errors: &'a FieldErrors,
    pub language: Language,
}

impl<'a> RenderContext<'a> {
    pub fn new(values: &'a FormValues, errors: &'a FieldErrors, language: Language) -> Self {
        Self {
            values,
            errors,
            language,
        }
    }
}

/// One rendered element. Hosts map these onto their own widgets.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    Paragraph(ParagraphNode),
    Input(InputNode),
    TextArea(TextAreaNode),
    CharacterCount(CharacterCountNode),
    SummaryList(SummaryListNode),
    Select(SelectNode),
    DateInput(DateInputNode),
    Radios(ChoiceGroupNode),
    Checkboxes(ChoiceGroupNode),
    Details(DetailsNode),
    Accordion(AccordionNode),
    SignatureAck(SignatureNode),
    FileUpload(FileUploadNode),
    Warning(WarningNode),
}

/// Label, hint and error wiring shared by leaf controls.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FieldFrame {
    /// Storage key; doubles as the control id and name.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_id: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
    /// Space separated error and hint ids, in that order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub described_by: Option<String>,
    pub group_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ParagraphNode {
    pub tag: String,
    pub class: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct InputNode {
    pub field: FieldFrame,
    pub input_type: String,
    pub class: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TextAreaNode {
    pub field: FieldFrame,
    pub class: String,
    pub rows: u32,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CharacterCountNode {
    pub field: FieldFrame,
    pub rows: u32,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<CountMessage>,
}

/// Live remaining/overflow message under a character-counted text area.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CountMessage {
    pub id: String,
    /// Negative when the value is over the limit.
    pub remaining: i64,
    pub state: CountState,
    pub class: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CountState {
    Normal,
    Warning,
    Over,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SummaryListNode {
    pub class: String,
    pub rows: Vec<SummaryListRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SummaryListRow {
    pub id: String,
    pub label: String,
    /// Formatted answer, or the row's empty fallback.
    pub value: String,
    /// `true` when `value` is the "not provided" placeholder.
    pub placeholder: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SelectNode {
    pub field: FieldFrame,
    pub class: String,
    pub placeholder: String,
    pub value: String,
    pub options: Vec<ChoiceNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ChoiceGroupNode {
    pub field: FieldFrame,
    pub class: String,
    /// Form name: the storage key, with `[]` appended for checkboxes.
    pub name: String,
    pub options: Vec<ChoiceNode>,
}

/// One visible option of a select, radio or checkbox group.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ChoiceNode {
    pub id: String,
    pub value: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub checked: bool,
    /// Revealed children; only present for the selected option.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DateInputNode {
    pub field: FieldFrame,
    pub container_id: String,
    pub parts: Vec<DatePartNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DatePartNode {
    pub id: String,
    /// `{key}.{part}` form name.
    pub name: String,
    pub part: String,
    pub label: String,
    pub class: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DetailsNode {
    pub class: String,
    pub summary: String,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AccordionNode {
    pub id: String,
    pub class: String,
    pub sections: Vec<AccordionSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AccordionSection {
    pub id: String,
    pub heading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SignatureNode {
    pub field: FieldFrame,
    pub value: String,
    /// Text applied by the sign action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub signed: bool,
    pub status: String,
    pub sign_label: String,
    pub clear_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FileUploadNode {
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub disabled: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct WarningNode {
    pub component_type: String,
    pub message: String,
}

/// Renders one component and its nested children.
///
/// Hidden components contribute nothing and their subtree is never evaluated.
pub fn render_component(component: &IntakeComponent, ctx: &RenderContext<'_>) -> Vec<RenderNode> {
    if !is_component_visible(component, ctx.values) {
        return Vec::new();
    }

    let mut nodes: Vec<RenderNode> = controls::render_kind(component, ctx).into_iter().collect();
    // Details renders its nested components inside its own body.
    if !matches!(component.kind, ComponentKind::Details(_)) {
        nodes.extend(render_components(&component.components, ctx));
    }
    nodes
}

pub fn render_components(components: &[IntakeComponent], ctx: &RenderContext<'_>) -> Vec<RenderNode> {
    components
        .iter()
        .flat_map(|component| render_component(component, ctx))
        .collect()
}

/// Serializes a node list for JSON hosts.
pub fn render_json(nodes: &[RenderNode]) -> Value {
    serde_json::to_value(nodes).unwrap_or_else(|_| Value::Array(Vec::new()))
}

/// JSON Schema describing the render tree.
pub fn render_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(Vec<RenderNode>)).unwrap_or(Value::Null)
}
