use anyhow::Result;
use clap::Args;
use intake_spec::{
    FieldErrors, IntakeStep, Language, RenderContext, field_errors, render_components,
    render_json, render_text, resolve_text, validate_step,
};
use serde_json::json;

use super::{InputArgs, OutputFormat, print_json, select_step};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Validate the step first and show its errors inline
    #[arg(long)]
    pub validate: bool,
}

pub fn run(args: &RenderArgs, language: Language) -> Result<()> {
    let (schema, values) = args.input.load()?;
    let step = select_step(&schema, args.input.step)?;

    let errors: FieldErrors = if args.validate {
        field_errors(&validate_step(step, &values, language))
    } else {
        FieldErrors::new()
    };
    let ctx = RenderContext::new(&values, &errors, language);
    let nodes = render_components(&step.components, &ctx);

    match args.format {
        OutputFormat::Json => print_json(&json!({
            "stepId": step.step_id,
            "language": language,
            "nodes": render_json(&nodes),
        })),
        OutputFormat::Text => {
            println!("{}", step_heading(step, language));
            let body = render_text(&nodes);
            if !body.is_empty() {
                println!("{body}");
            }
            Ok(())
        }
    }
}

pub fn step_heading(step: &IntakeStep, language: Language) -> String {
    let title = resolve_text(step.title.as_ref(), language);
    if title.is_empty() {
        format!("== {} ==", step.step_id)
    } else {
        format!("== {title} ==")
    }
}
