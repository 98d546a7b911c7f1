use super::{FieldFrame, RenderNode};

/// Human-readable outline of a rendered step, used by terminal hosts.
pub fn render_text(nodes: &[RenderNode]) -> String {
    let mut lines = Vec::new();
    for node in nodes {
        push_node(node, 0, &mut lines);
    }
    lines.join("\n")
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn push_field(field: &FieldFrame, detail: &str, depth: usize, lines: &mut Vec<String>) {
    let pad = indent(depth);
    let label = field.label.as_deref().unwrap_or(&field.id);
    let mut entry = format!("{pad}[{}] {label}", field.id);
    if field.required {
        entry.push_str(" *");
    }
    if !detail.is_empty() {
        entry.push_str(&format!(": {detail}"));
    }
    lines.push(entry);
    if let Some(hint) = &field.hint {
        lines.push(format!("{pad}  ({hint})"));
    }
    if let Some(error) = &field.error {
        lines.push(format!("{pad}  ! {error}"));
    }
}

fn push_children(children: &[RenderNode], depth: usize, lines: &mut Vec<String>) {
    for child in children {
        push_node(child, depth, lines);
    }
}

fn push_node(node: &RenderNode, depth: usize, lines: &mut Vec<String>) {
    let pad = indent(depth);
    match node {
        RenderNode::Paragraph(paragraph) => lines.push(format!("{pad}{}", paragraph.text)),
        RenderNode::Input(input) => push_field(&input.field, &quoted(&input.value), depth, lines),
        RenderNode::TextArea(area) => push_field(&area.field, &quoted(&area.value), depth, lines),
        RenderNode::CharacterCount(count) => {
            push_field(&count.field, &quoted(&count.value), depth, lines);
            if let Some(message) = &count.count {
                lines.push(format!("{pad}  {}", message.text));
            }
        }
        RenderNode::SummaryList(list) => {
            for row in &list.rows {
                lines.push(format!("{pad}{}: {}", row.label, row.value));
                push_children(&row.children, depth + 1, lines);
            }
        }
        RenderNode::Select(select) => {
            let chosen = select
                .options
                .iter()
                .find(|option| option.checked)
                .map(|option| option.label.clone())
                .unwrap_or_else(|| select.placeholder.clone());
            push_field(&select.field, &chosen, depth, lines);
            for option in &select.options {
                lines.push(format!("{pad}  - {} = {}", option.label, option.value));
                push_children(&option.children, depth + 2, lines);
            }
        }
        RenderNode::Radios(group) | RenderNode::Checkboxes(group) => {
            let marker = if matches!(node, RenderNode::Radios(_)) {
                ("( )", "(x)")
            } else {
                ("[ ]", "[x]")
            };
            push_field(&group.field, "", depth, lines);
            for option in &group.options {
                let mark = if option.checked { marker.1 } else { marker.0 };
                lines.push(format!("{pad}  {mark} {} = {}", option.label, option.value));
                if let Some(hint) = &option.hint {
                    lines.push(format!("{pad}      ({hint})"));
                }
                push_children(&option.children, depth + 2, lines);
            }
        }
        RenderNode::DateInput(date) => {
            let parts = date
                .parts
                .iter()
                .map(|part| format!("{} {}", part.label, quoted(&part.value)))
                .collect::<Vec<_>>()
                .join(", ");
            push_field(&date.field, &parts, depth, lines);
        }
        RenderNode::Details(details) => {
            let marker = if details.open { "v" } else { ">" };
            lines.push(format!("{pad}{marker} {}", details.summary));
            if let Some(hint) = &details.hint {
                lines.push(format!("{pad}  ({hint})"));
            }
            if let Some(text) = &details.text {
                lines.push(format!("{pad}  {text}"));
            }
            push_children(&details.children, depth + 1, lines);
        }
        RenderNode::Accordion(accordion) => {
            for section in &accordion.sections {
                lines.push(format!("{pad}# {}", section.heading));
                if let Some(summary) = &section.summary {
                    lines.push(format!("{pad}  {summary}"));
                }
                if let Some(content) = &section.content {
                    lines.push(format!("{pad}  {content}"));
                }
                push_children(&section.children, depth + 1, lines);
            }
        }
        RenderNode::SignatureAck(signature) => {
            let detail = format!("{} [{}]", quoted(&signature.value), signature.status);
            push_field(&signature.field, &detail, depth, lines);
        }
        RenderNode::FileUpload(upload) => {
            let label = upload.label.as_deref().unwrap_or_default();
            lines.push(format!("{pad}{label} ({})", upload.message).trim_end().to_string());
        }
        RenderNode::Warning(warning) => lines.push(format!("{pad}! {}", warning.message)),
    }
}

fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}
