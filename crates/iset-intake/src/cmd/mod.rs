pub mod i18n;
pub mod keys;
pub mod render;
pub mod run;
pub mod ui_schema;
pub mod validate;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use intake_spec::{FormValues, IntakeSchema, IntakeStep, parse_intake_schema};
use serde_json::Value;
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Schema, answers and step selection shared by the offline commands.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Intake schema document (JSON)
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Answers as a JSON object keyed by storage key
    #[arg(long, value_name = "FILE")]
    pub answers: Option<PathBuf>,
    /// Zero-based step index
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub step: usize,
}

impl InputArgs {
    pub fn load(&self) -> Result<(IntakeSchema, FormValues)> {
        let schema = load_schema(&self.schema)?;
        let values = match &self.answers {
            Some(path) => load_answers(path)?,
            None => FormValues::new(),
        };
        Ok((schema, values))
    }
}

pub fn load_schema(path: &Path) -> Result<IntakeSchema> {
    let raw = read_json(path)?;
    let schema = parse_intake_schema(&raw);
    debug!(
        path = %path.display(),
        version = %schema.version,
        steps = schema.steps.len(),
        "loaded intake schema"
    );
    Ok(schema)
}

pub fn load_answers(path: &Path) -> Result<FormValues> {
    match read_json(path)? {
        Value::Object(map) => Ok(map),
        other => bail!(
            "answers file {} must contain a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ),
    }
}

pub fn select_step(schema: &IntakeSchema, index: usize) -> Result<&IntakeStep> {
    if schema.steps.is_empty() {
        bail!("the intake schema does not contain any steps");
    }
    schema.steps.get(index).with_context(|| {
        format!(
            "step {index} is out of range; the schema has {} step(s)",
            schema.steps.len()
        )
    })
}

pub fn print_json(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("serialize output")?
    );
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {} as JSON", path.display()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
