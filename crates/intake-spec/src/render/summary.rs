use serde_json::Value;

use super::{RenderContext, RenderNode, SummaryListNode, SummaryListRow, render_components};
use crate::i18n::{Language, message, message_with, resolve_text};
use crate::schema::{IntakeComponent, SummaryListSpec};
use crate::values::{display_string, format_number, lookup_value};

pub(super) fn render_summary_list(
    component: &IntakeComponent,
    spec: &SummaryListSpec,
    ctx: &RenderContext<'_>,
) -> Option<RenderNode> {
    let component_fallback = resolve_text(spec.empty_fallback.as_ref(), ctx.language);

    let rows: Vec<SummaryListRow> = spec
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let mut label = resolve_text(row.label.as_ref(), ctx.language);
            if label.is_empty() {
                label = row.key.clone().unwrap_or_else(|| {
                    message_with(ctx.language, "intake.summary.row", &[("n", &(index + 1).to_string())])
                });
            }

            let mut fallback = resolve_text(row.empty_fallback.as_ref(), ctx.language);
            if fallback.is_empty() {
                fallback = component_fallback.clone();
            }

            let formatted = row
                .value_ref
                .as_deref()
                .and_then(|reference| lookup_value(ctx.values, reference))
                .map(|value| format_summary_value(value, ctx.language))
                .unwrap_or_default();

            if spec.hide_empty && formatted.trim().is_empty() && fallback.trim().is_empty() {
                return None;
            }

            let shown = if formatted.trim().is_empty() {
                fallback
            } else {
                formatted
            };
            let placeholder = shown.is_empty();

            Some(SummaryListRow {
                id: match &row.key {
                    Some(key) => format!("{key}-{index}"),
                    None => format!("summary-row-{index}"),
                },
                label,
                value: if placeholder {
                    message(ctx.language, "intake.summary.not_provided")
                } else {
                    shown
                },
                placeholder,
                children: render_components(&row.components, ctx),
            })
        })
        .collect();

    if rows.is_empty() {
        return None;
    }

    Some(RenderNode::SummaryList(SummaryListNode {
        class: component.class_or("govuk-summary-list").to_string(),
        rows,
    }))
}

/// Formats an answer for read-only display.
///
/// Booleans become Yes/No, arrays and plain objects join their non-blank parts
/// with `, `, and date-shaped objects render as `D/M/Y` skipping blank parts.
pub fn format_summary_value(value: &Value, language: Language) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => message(language, "intake.summary.yes"),
        Value::Bool(false) => message(language, "intake.summary.no"),
        Value::Number(number) => format_number(number),
        Value::String(text) => text.clone(),
        Value::Array(items) => join_formatted(items.iter(), language),
        Value::Object(map) => {
            if ["day", "month", "year"].iter().any(|part| map.contains_key(*part)) {
                ["day", "month", "year"]
                    .iter()
                    .map(|part| display_string(map.get(*part)))
                    .filter(|part| !part.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join("/")
            } else {
                join_formatted(map.values(), language)
            }
        }
    }
}

fn join_formatted<'a>(items: impl Iterator<Item = &'a Value>, language: Language) -> String {
    items
        .map(|item| format_summary_value(item, language))
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
