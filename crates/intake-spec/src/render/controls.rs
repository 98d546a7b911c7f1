use serde_json::Value;

use super::summary::render_summary_list;
use super::{
    AccordionNode, AccordionSection, CharacterCountNode, ChoiceGroupNode, ChoiceNode,
    CountMessage, CountState, DateInputNode, DatePartNode, DetailsNode, FieldFrame,
    FileUploadNode, InputNode, ParagraphNode, RenderContext, RenderNode, SelectNode,
    SignatureNode, TextAreaNode, WarningNode, render_components,
};
use crate::conditions::is_option_visible;
use crate::i18n::{LocalizedText, message, message_with, resolve_text};
use crate::schema::{
    AccordionSpec, CharacterCountSpec, ComponentKind, DateInputSpec, DetailsSpec, InputSpec,
    IntakeComponent, ParagraphSpec, SignatureSpec, TextAreaSpec,
};
use crate::values::display_string;

const DEFAULT_ROWS: u32 = 5;

pub(super) fn render_kind(component: &IntakeComponent, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    match &component.kind {
        ComponentKind::Paragraph(spec) => paragraph(component, spec, ctx),
        ComponentKind::Input(spec) => input(component, spec, ctx),
        ComponentKind::TextArea(spec) => text_area(component, spec, ctx),
        ComponentKind::CharacterCount(spec) => character_count(component, spec, ctx),
        ComponentKind::SummaryList(spec) => render_summary_list(component, spec, ctx),
        ComponentKind::Select => select(component, ctx),
        ComponentKind::DateInput(spec) => date_input(component, spec, ctx),
        ComponentKind::Radios => choice_group(component, ctx, ChoiceStyle::Radios),
        ComponentKind::Checkboxes => choice_group(component, ctx, ChoiceStyle::Checkboxes),
        ComponentKind::Details(spec) => Some(details(component, spec, ctx)),
        ComponentKind::Accordion(spec) => accordion(component, spec, ctx),
        ComponentKind::SignatureAck(spec) => signature(component, spec, ctx),
        ComponentKind::FileUpload => Some(file_upload(component, ctx)),
        ComponentKind::Unsupported => Some(RenderNode::Warning(WarningNode {
            component_type: component.component_type.clone(),
            message: message_with(
                ctx.language,
                "intake.unsupported",
                &[("type", &component.component_type)],
            ),
        })),
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn text(value: Option<&LocalizedText>, ctx: &RenderContext<'_>) -> Option<String> {
    non_empty(resolve_text(value, ctx.language))
}

fn field_frame(
    component: &IntakeComponent,
    key: &str,
    label_class: Option<&String>,
    ctx: &RenderContext<'_>,
) -> FieldFrame {
    let hint = text(component.field.hint.as_ref(), ctx);
    let error = ctx.errors.get(key).cloned();
    let hint_id = hint.as_ref().map(|_| format!("{key}-hint"));
    let error_id = error.as_ref().map(|_| format!("{key}-error"));
    let described_by = [error_id.as_deref(), hint_id.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    FieldFrame {
        id: key.to_string(),
        label: text(component.field.label.as_ref(), ctx),
        label_class: label_class.cloned(),
        hint,
        hint_id,
        required: component.field.required,
        group_class: if error.is_some() {
            "govuk-form-group govuk-form-group--error".into()
        } else {
            "govuk-form-group".into()
        },
        error,
        error_id,
        described_by: non_empty(described_by),
    }
}

fn paragraph(
    component: &IntakeComponent,
    spec: &ParagraphSpec,
    ctx: &RenderContext<'_>,
) -> Option<RenderNode> {
    let text = text(spec.text.as_ref(), ctx)?;
    Some(RenderNode::Paragraph(ParagraphNode {
        tag: spec.tag.clone().unwrap_or_else(|| "p".into()),
        class: component.class_or("govuk-body").to_string(),
        text,
    }))
}

fn input(component: &IntakeComponent, spec: &InputSpec, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let key = component.storage_key()?;
    Some(RenderNode::Input(InputNode {
        field: field_frame(component, key, component.field.label_class.as_ref(), ctx),
        input_type: spec.input_type.clone(),
        class: component.class_or("govuk-input").to_string(),
        value: display_string(ctx.values.get(key)),
        placeholder: text(component.field.placeholder.as_ref(), ctx),
        autocomplete: spec.autocomplete.clone(),
    }))
}

fn text_area(
    component: &IntakeComponent,
    spec: &TextAreaSpec,
    ctx: &RenderContext<'_>,
) -> Option<RenderNode> {
    let key = component.storage_key()?;
    Some(RenderNode::TextArea(TextAreaNode {
        field: field_frame(component, key, component.field.label_class.as_ref(), ctx),
        class: component.class_or("govuk-textarea").to_string(),
        rows: spec.rows.unwrap_or(DEFAULT_ROWS),
        value: display_string(ctx.values.get(key)),
        max_length: spec.max_length,
        placeholder: text(component.field.placeholder.as_ref(), ctx),
    }))
}

fn character_count(
    component: &IntakeComponent,
    spec: &CharacterCountSpec,
    ctx: &RenderContext<'_>,
) -> Option<RenderNode> {
    let key = component.storage_key()?;
    let value = display_string(ctx.values.get(key));
    let mut field = field_frame(component, key, component.field.label_class.as_ref(), ctx);

    let count = spec.max_length.map(|max_length| {
        let id = format!("{key}-character-count");
        // Browser text length counts UTF-16 code units.
        let length = value.encode_utf16().count() as i64;
        let remaining = max_length - length;
        let (state, text) = if remaining < 0 {
            (
                CountState::Over,
                message_with(
                    ctx.language,
                    "intake.character_count.over",
                    &[("count", &remaining.abs().to_string())],
                ),
            )
        } else {
            let state = match spec.threshold {
                Some(threshold) if remaining as f64 <= threshold => CountState::Warning,
                _ => CountState::Normal,
            };
            (
                state,
                message_with(
                    ctx.language,
                    "intake.character_count.remaining",
                    &[("count", &remaining.to_string())],
                ),
            )
        };
        let class = match state {
            CountState::Normal => "govuk-character-count__message",
            CountState::Warning => {
                "govuk-character-count__message govuk-character-count__message--warning"
            }
            CountState::Over => {
                "govuk-character-count__message govuk-character-count__message--invalid"
            }
        };
        CountMessage {
            id,
            remaining,
            state,
            class: class.to_string(),
            text,
        }
    });

    if spec.max_length.is_some_and(|max_length| max_length != 0) {
        let id = format!("{key}-character-count");
        field.described_by = Some(match field.described_by.take() {
            Some(existing) => format!("{existing} {id}"),
            None => id,
        });
    }

    Some(RenderNode::CharacterCount(CharacterCountNode {
        field,
        rows: spec.rows.unwrap_or(DEFAULT_ROWS),
        value,
        max_length: spec.max_length,
        count,
    }))
}

fn select(component: &IntakeComponent, ctx: &RenderContext<'_>) -> Option<RenderNode> {
    let key = component.storage_key()?;
    if component.options.is_empty() {
        return None;
    }
    let current = display_string(ctx.values.get(key));
    let options = choice_options(component, key, ctx, |value| current == value);

    Some(RenderNode::Select(SelectNode {
        field: field_frame(component, key, component.field.label_class.as_ref(), ctx),
        class: component.class_or("govuk-select").to_string(),
        placeholder: text(component.field.placeholder.as_ref(), ctx)
            .unwrap_or_else(|| message(ctx.language, "intake.select.placeholder")),
        value: current,
        options,
    }))
}

#[derive(Clone, Copy)]
enum ChoiceStyle {
    Radios,
    Checkboxes,
}

fn choice_group(
    component: &IntakeComponent,
    ctx: &RenderContext<'_>,
    style: ChoiceStyle,
) -> Option<RenderNode> {
    let key = component.storage_key()?;
    if component.options.is_empty() {
        return None;
    }

    let field = field_frame(component, key, component.field.legend_class.as_ref(), ctx);
    let node = match style {
        ChoiceStyle::Radios => {
            let current = display_string(ctx.values.get(key));
            RenderNode::Radios(ChoiceGroupNode {
                field,
                class: component.class_or("govuk-radios").to_string(),
                name: key.to_string(),
                options: choice_options(component, key, ctx, |value| current == value),
            })
        }
        ChoiceStyle::Checkboxes => {
            let selected: Vec<&str> = ctx
                .values
                .get(key)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            RenderNode::Checkboxes(ChoiceGroupNode {
                field,
                class: component.class_or("govuk-checkboxes").to_string(),
                name: format!("{key}[]"),
                options: choice_options(component, key, ctx, |value| selected.contains(&value)),
            })
        }
    };
    Some(node)
}

/// Visible options with their identities. Option ids and synthetic values use the
/// position in the full option list so they stay stable when siblings hide.
fn choice_options<F>(
    component: &IntakeComponent,
    key: &str,
    ctx: &RenderContext<'_>,
    is_checked: F,
) -> Vec<ChoiceNode>
where
    F: Fn(&str) -> bool,
{
    component
        .options
        .iter()
        .enumerate()
        .filter(|(_, option)| is_option_visible(option, ctx.values))
        .map(|(index, option)| {
            let value = option.resolved_value(index, ctx.language);
            let checked = is_checked(&value);
            ChoiceNode {
                id: format!("{key}-{index}"),
                label: text(option.label.as_ref(), ctx).unwrap_or_else(|| value.clone()),
                hint: text(option.hint.as_ref(), ctx),
                children: if checked {
                    render_components(&option.children, ctx)
                } else {
                    Vec::new()
                },
                checked,
                value,
            }
        })
        .collect()
}

fn date_input(
    component: &IntakeComponent,
    spec: &DateInputSpec,
    ctx: &RenderContext<'_>,
) -> Option<RenderNode> {
    let key = component.storage_key()?;
    let current = ctx.values.get(key).and_then(Value::as_object);
    let parts = spec
        .fields
        .iter()
        .map(|field| {
            let label = text(field.label.as_ref(), ctx).unwrap_or_else(|| {
                match field.name.as_str() {
                    "day" | "month" | "year" => {
                        message(ctx.language, &format!("intake.date.{}", field.name))
                    }
                    other => other.to_string(),
                }
            });
            DatePartNode {
                id: format!("{key}-{}", field.name),
                name: format!("{key}.{}", field.name),
                part: field.name.clone(),
                label,
                class: format!("govuk-input govuk-date-input__input {}", field.classes),
                value: current
                    .and_then(|parts| parts.get(&field.name))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }
        })
        .collect();

    Some(RenderNode::DateInput(DateInputNode {
        field: field_frame(component, key, component.field.label_class.as_ref(), ctx),
        container_id: format!("{key}-date"),
        parts,
    }))
}

fn details(component: &IntakeComponent, spec: &DetailsSpec, ctx: &RenderContext<'_>) -> RenderNode {
    let summary = text(spec.summary.as_ref(), ctx)
        .or_else(|| text(spec.title.as_ref(), ctx))
        .or_else(|| text(component.field.label.as_ref(), ctx))
        .unwrap_or_else(|| message(ctx.language, "intake.details.summary"));

    RenderNode::Details(DetailsNode {
        class: component.class_or("govuk-details").to_string(),
        summary,
        open: spec.open,
        hint: text(component.field.hint.as_ref(), ctx),
        text: text(spec.text.as_ref(), ctx),
        children: render_components(&component.components, ctx),
    })
}

fn accordion(
    component: &IntakeComponent,
    spec: &AccordionSpec,
    ctx: &RenderContext<'_>,
) -> Option<RenderNode> {
    if spec.items.is_empty() {
        return None;
    }

    let id = component
        .field
        .id
        .clone()
        .or_else(|| component.field.storage_key.clone())
        .unwrap_or_else(|| fallback_accordion_id(component));

    let sections = spec
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let position = (index + 1).to_string();
            AccordionSection {
                id: format!("{id}-section-{index}"),
                heading: text(item.heading.as_ref(), ctx)
                    .or_else(|| text(item.title.as_ref(), ctx))
                    .unwrap_or_else(|| {
                        message_with(ctx.language, "intake.accordion.section", &[("n", &position)])
                    }),
                summary: text(item.summary.as_ref(), ctx),
                content: text(item.content.as_ref(), ctx),
                children: render_components(&item.components, ctx),
            }
        })
        .collect();

    Some(RenderNode::Accordion(AccordionNode {
        class: component.class_or("govuk-accordion").to_string(),
        id,
        sections,
    }))
}

/// Content-derived id: `accordion-` plus the first 8 hex chars of a blake3 digest.
fn fallback_accordion_id(component: &IntakeComponent) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(component.component_type.as_bytes());
    hasher.update(Value::Object(component.extra.clone()).to_string().as_bytes());
    let digest = hasher.finalize().to_hex();
    format!("accordion-{}", &digest.as_str()[..8])
}

fn signature(
    component: &IntakeComponent,
    spec: &SignatureSpec,
    ctx: &RenderContext<'_>,
) -> Option<RenderNode> {
    let key = component.storage_key()?;
    let value = display_string(ctx.values.get(key));
    let signed = !value.trim().is_empty();
    let status = if signed {
        text(spec.status_signed.as_ref(), ctx)
            .unwrap_or_else(|| message(ctx.language, "intake.signature.signed"))
    } else {
        text(spec.status_unsigned.as_ref(), ctx)
            .unwrap_or_else(|| message(ctx.language, "intake.signature.unsigned"))
    };

    Some(RenderNode::SignatureAck(SignatureNode {
        field: field_frame(component, key, component.field.label_class.as_ref(), ctx),
        placeholder: text(component.field.placeholder.as_ref(), ctx),
        signed,
        status,
        sign_label: text(spec.action_label.as_ref(), ctx)
            .unwrap_or_else(|| message(ctx.language, "intake.signature.sign")),
        clear_label: text(spec.clear_label.as_ref(), ctx)
            .unwrap_or_else(|| message(ctx.language, "intake.signature.clear")),
        value,
    }))
}

fn file_upload(component: &IntakeComponent, ctx: &RenderContext<'_>) -> RenderNode {
    RenderNode::FileUpload(FileUploadNode {
        class: component.class_or("govuk-form-group").to_string(),
        label: text(component.field.label.as_ref(), ctx),
        hint: text(component.field.hint.as_ref(), ctx),
        disabled: true,
        message: message(ctx.language, "intake.file_upload.placeholder"),
    })
}
