use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{
    self, keys::KeysArgs, render::RenderArgs, run::RunArgs, ui_schema::UiSchemaArgs,
    validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "iset-intake",
    about = "Render, validate and fill in ISET intake forms",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Display language (en or fr)
    #[arg(long = "locale", value_name = "LOCALE", global = true)]
    locale: Option<String>,

    /// Log requests and step transitions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one step of a schema file
    Render(RenderArgs),
    /// Check one step's required fields against an answers file
    Validate(ValidateArgs),
    /// List the storage keys each step owns
    Keys(KeysArgs),
    /// Print the JSON Schema of the render tree
    UiSchema(UiSchemaArgs),
    /// Fill in an intake form against a running backend
    Run(RunArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let language = cmd::i18n::select_language(cli.locale.as_deref());
    match cli.command {
        Commands::Render(args) => cmd::render::run(&args, language),
        Commands::Validate(args) => cmd::validate::run(&args, language),
        Commands::Keys(args) => cmd::keys::run(&args),
        Commands::UiSchema(args) => cmd::ui_schema::run(&args),
        Commands::Run(args) => cmd::run::run(args, language),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::OutputFormat;

    #[test]
    fn parses_render_subcommand() {
        let cli = Cli::try_parse_from([
            "iset-intake",
            "--locale",
            "fr",
            "render",
            "--schema",
            "schema.json",
            "--answers",
            "answers.json",
            "--step",
            "2",
            "--format",
            "json",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.locale.as_deref(), Some("fr"));
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.input.schema.to_str(), Some("schema.json"));
                assert_eq!(
                    args.input.answers.as_deref().and_then(|path| path.to_str()),
                    Some("answers.json")
                );
                assert_eq!(args.input.step, 2);
                assert_eq!(args.format, OutputFormat::Json);
                assert!(!args.validate);
            }
            _ => panic!("expected render args"),
        }
    }

    #[test]
    fn locale_is_global() {
        let cli = Cli::try_parse_from([
            "iset-intake",
            "keys",
            "--schema",
            "schema.json",
            "--locale",
            "fr-CA",
            "-v",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.locale.as_deref(), Some("fr-CA"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Keys(_)));
    }

    #[test]
    fn parses_run_endpoint_overrides() {
        let cli = Cli::try_parse_from([
            "iset-intake",
            "run",
            "--base-url",
            "http://intake.test",
            "--schema-path",
            "/v2/schema",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.base_url.as_deref(), Some("http://intake.test"));
                assert_eq!(args.schema_path.as_deref(), Some("/v2/schema"));
                assert!(args.draft_path.is_none());
            }
            _ => panic!("expected run args"),
        }
    }

    #[test]
    fn step_defaults_to_first() {
        let cli = Cli::try_parse_from(["iset-intake", "validate", "--schema", "s.json"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.input.step, 0);
                assert_eq!(args.format, OutputFormat::Text);
            }
            _ => panic!("expected validate args"),
        }
    }
}
