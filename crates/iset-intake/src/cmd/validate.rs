use anyhow::{Result, bail};
use clap::Args;
use intake_spec::{Language, validate_step};
use serde_json::json;

use super::{InputArgs, OutputFormat, print_json, select_step};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: &ValidateArgs, language: Language) -> Result<()> {
    let (schema, values) = args.input.load()?;
    let step = select_step(&schema, args.input.step)?;
    let errors = validate_step(step, &values, language);

    match args.format {
        OutputFormat::Json => print_json(&json!({
            "stepId": step.step_id,
            "valid": errors.is_empty(),
            "errors": errors,
        }))?,
        OutputFormat::Text => {
            if errors.is_empty() {
                println!("{}: ok", step.step_id);
            }
            for error in &errors {
                println!("{}: {}: {}", step.step_id, error.field, error.message);
            }
        }
    }

    if !errors.is_empty() {
        bail!(
            "step {} has {} validation error(s)",
            step.step_id,
            errors.len()
        );
    }
    Ok(())
}
