#![allow(missing_docs)]

pub mod conditions;
pub mod events;
pub mod i18n;
pub mod render;
pub mod schema;
pub mod validate;
pub mod values;

pub use conditions::{
    evaluate_condition, evaluate_condition_group, is_component_visible, is_option_visible,
};
pub use events::ControlEvent;
pub use i18n::{Language, LocalizedText, message, message_with, resolve_text};
pub use render::{
    FieldFrame, RenderContext, RenderNode, format_summary_value, render_component,
    render_components, render_json, render_schema, render_text,
};
pub use schema::{
    ComponentKind, ConditionDefinition, ConditionGroup, ConditionOp, IntakeComponent,
    IntakeComponentOption, IntakeSchema, IntakeStep, parse_intake_schema,
};
pub use validate::{StepValidationError, extract_step_values, field_errors, validate_step};
pub use values::{FieldErrors, FormValues, is_empty_value, lookup_value, seed_values};
