use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value};

use super::{OutputFormat, load_schema, print_json};

#[derive(Args, Debug, Clone)]
pub struct KeysArgs {
    /// Intake schema document (JSON)
    #[arg(long, value_name = "FILE")]
    pub schema: std::path::PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: &KeysArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let keys = schema.storage_keys();

    match args.format {
        OutputFormat::Json => {
            let by_step: Map<String, Value> = keys
                .into_iter()
                .map(|(step_id, keys)| {
                    (
                        step_id,
                        Value::Array(keys.into_iter().map(Value::String).collect()),
                    )
                })
                .collect();
            print_json(&Value::Object(by_step))
        }
        OutputFormat::Text => {
            for (step_id, keys) in keys {
                println!("{step_id}:");
                for key in keys {
                    println!("  {key}");
                }
            }
            Ok(())
        }
    }
}
