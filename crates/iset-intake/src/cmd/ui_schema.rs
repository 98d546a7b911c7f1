use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use intake_spec::render_schema;

use super::print_json;

#[derive(Args, Debug, Clone)]
pub struct UiSchemaArgs {
    /// Write the schema to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

pub fn run(args: &UiSchemaArgs) -> Result<()> {
    let schema = render_schema();
    let Some(path) = &args.out else {
        return print_json(&schema);
    };
    let body = serde_json::to_string_pretty(&schema).context("serialize render schema")?;
    fs::write(path, body + "\n").with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
