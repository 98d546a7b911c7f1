use std::env;

use anyhow::{Context, Result, bail};
use clap::Args;
use intake_lib::{ApiEndpoints, HttpIntakeApi, IntakeRunner, NavigationOutcome, PageView};
use intake_spec::{ControlEvent, Language, render_text};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::OutputFormat;

pub const BASE_URL_ENV: &str = "INTAKE_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

const HELP: &str = "\
commands:
  set KEY VALUE           answer a text, select or radio field
  toggle KEY OPTION       tick a checkbox option
  untoggle KEY OPTION     untick a checkbox option
  date KEY PART VALUE     edit the day, month or year of a date
  sign KEY NAME           sign an acknowledgment
  clear KEY               clear a signature
  next                    save this step and continue (submits on the last step)
  back                    go to the previous step
  submit                  submit the application from the last step
  show                    print the current page again
  quit                    leave without submitting";

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Backend base URL (falls back to INTAKE_BASE_URL, then http://localhost:3000)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// Override the schema endpoint path
    #[arg(long, value_name = "PATH")]
    pub schema_path: Option<String>,
    /// Override the draft endpoint path
    #[arg(long, value_name = "PATH")]
    pub draft_path: Option<String>,
    /// Override the submit endpoint path
    #[arg(long, value_name = "PATH")]
    pub submit_path: Option<String>,
    /// How pages are printed after each command
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl RunArgs {
    fn endpoints(&self) -> ApiEndpoints {
        let defaults = ApiEndpoints::default();
        ApiEndpoints {
            schema: self.schema_path.clone().unwrap_or(defaults.schema),
            draft: self.draft_path.clone().unwrap_or(defaults.draft),
            submit: self.submit_path.clone().unwrap_or(defaults.submit),
        }
    }
}

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    Event(ControlEvent),
    Next,
    Back,
    Submit,
    Show,
    Help,
    Quit,
}

impl ReplCommand {
    /// Blank lines parse to `None`.
    fn parse(line: &str) -> Result<Option<Self>> {
        let (word, rest) = split_word(line);
        let command = match word {
            "" => return Ok(None),
            "next" | "continue" => ReplCommand::Next,
            "back" => ReplCommand::Back,
            "submit" => ReplCommand::Submit,
            "show" => ReplCommand::Show,
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" => ReplCommand::Quit,
            "set" => {
                let (key, value) = key_and_rest(word, rest)?;
                ReplCommand::Event(ControlEvent::SetValue {
                    key,
                    value: Value::String(value.to_string()),
                })
            }
            "toggle" | "untoggle" => {
                let (key, option) = key_and_rest(word, rest)?;
                ReplCommand::Event(ControlEvent::ToggleOption {
                    key,
                    option: option.to_string(),
                    checked: word == "toggle",
                })
            }
            "date" => {
                let (key, rest) = key_and_rest(word, rest)?;
                let (part, value) = split_word(rest);
                if !matches!(part, "day" | "month" | "year") {
                    bail!("date PART must be day, month or year");
                }
                ReplCommand::Event(ControlEvent::SetDatePart {
                    key,
                    part: part.to_string(),
                    value: value.to_string(),
                })
            }
            "sign" => {
                let (key, signature) = key_and_rest(word, rest)?;
                if signature.is_empty() {
                    bail!("usage: sign KEY NAME");
                }
                ReplCommand::Event(ControlEvent::Sign {
                    key,
                    signature: signature.to_string(),
                })
            }
            "clear" => {
                let (key, _) = key_and_rest(word, rest)?;
                ReplCommand::Event(ControlEvent::ClearSignature { key })
            }
            other => bail!("unknown command `{other}`; type `help` for a list"),
        };
        Ok(Some(command))
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn key_and_rest<'a>(command: &str, rest: &'a str) -> Result<(String, &'a str)> {
    let (key, rest) = split_word(rest);
    if key.is_empty() {
        bail!("`{command}` needs a storage key");
    }
    Ok((key.to_string(), rest))
}

pub fn resolve_base_url(flag: Option<&str>, env_value: Option<String>) -> String {
    flag.map(str::to_string)
        .or(env_value.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn run(args: RunArgs, language: Language) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime.block_on(session_loop(args, language))
}

async fn session_loop(args: RunArgs, language: Language) -> Result<()> {
    let base_url = resolve_base_url(args.base_url.as_deref(), env::var(BASE_URL_ENV).ok());
    let api = HttpIntakeApi::new(&base_url)
        .with_context(|| format!("invalid base URL {base_url}"))?
        .with_endpoints(args.endpoints());

    let mut session = match IntakeRunner::load(api, language).await {
        Ok(session) => session,
        Err(err) => {
            let headline = err.user_message(language);
            return Err(anyhow::Error::new(err).context(headline));
        }
    };
    print_page(&session.page(), args.format)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read command")? {
        let command = match ReplCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        debug!(?command, "intake command");

        let outcome = match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ReplCommand::Show => None,
            ReplCommand::Event(event) => {
                if !session.apply(&event) {
                    eprintln!("nothing changed");
                }
                None
            }
            ReplCommand::Next => Some(session.advance().await),
            ReplCommand::Back => Some(session.back()),
            ReplCommand::Submit => Some(session.submit().await),
        };
        if let Some(note) = outcome.as_ref().and_then(outcome_note) {
            eprintln!("{note}");
        }
        print_page(&session.page(), args.format)?;
    }
    Ok(())
}

/// Outcomes the page itself does not explain.
fn outcome_note(outcome: &NavigationOutcome) -> Option<&'static str> {
    match outcome {
        NavigationOutcome::Busy => Some("a request is still in flight"),
        NavigationOutcome::NotOnLastStep => Some("submit is only available on the last step"),
        _ => None,
    }
}

fn print_page(page: &PageView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", page_text(page)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(page).context("serialize page")?
        ),
    }
    Ok(())
}

fn page_text(page: &PageView) -> String {
    let mut out = vec![format!("# {}", page.title)];
    if let Some(warning) = &page.empty_workflow {
        out.push(format!("! {warning}"));
        return out.join("\n");
    }

    if let Some(progress) = &page.progress {
        let trail: Vec<String> = page
            .steps
            .iter()
            .map(|link| {
                if link.current {
                    format!("[{}]", link.title)
                } else {
                    link.title.clone()
                }
            })
            .collect();
        out.push(format!("{progress}: {}", trail.join(" > ")));
    }
    if let Some(banner) = &page.success_banner {
        out.push(format!("+ {}: {}", banner.title, banner.message));
    }
    if let Some(banner) = &page.persist_banner {
        out.push(format!("! {}: {}", banner.title, banner.message));
    }
    if let Some(summary) = &page.error_summary {
        out.push(format!("{}:", summary.title));
        for error in &summary.errors {
            out.push(format!("  - {}: {}", error.field, error.message));
        }
    }

    if let Some(step) = &page.step {
        out.push(String::new());
        out.push(format!("== {} ==", step.title));
        if let Some(description) = &step.description {
            out.push(description.clone());
        }
        if let Some(notice) = &step.empty_notice {
            out.push(notice.clone());
        }
        let body = render_text(&step.nodes);
        if !body.is_empty() {
            out.push(body);
        }
    }

    let buttons: Vec<String> = page
        .back
        .iter()
        .chain(page.primary.iter())
        .map(|button| {
            if button.disabled {
                format!("({})", button.label)
            } else {
                format!("[{}]", button.label)
            }
        })
        .collect();
    if !buttons.is_empty() {
        out.push(String::new());
        out.push(buttons.join(" "));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_lib::{Banner, Button, StepLink, StepView};
    use serde_json::json;

    #[test]
    fn parses_value_commands() {
        assert_eq!(
            ReplCommand::parse("set applicant.firstName  Jane Doe").expect("parse"),
            Some(ReplCommand::Event(ControlEvent::SetValue {
                key: "applicant.firstName".into(),
                value: json!("Jane Doe"),
            }))
        );
        assert_eq!(
            ReplCommand::parse("untoggle supports childcare").expect("parse"),
            Some(ReplCommand::Event(ControlEvent::ToggleOption {
                key: "supports".into(),
                option: "childcare".into(),
                checked: false,
            }))
        );
        assert_eq!(
            ReplCommand::parse("date dateOfBirth month 04").expect("parse"),
            Some(ReplCommand::Event(ControlEvent::SetDatePart {
                key: "dateOfBirth".into(),
                part: "month".into(),
                value: "04".into(),
            }))
        );
        assert_eq!(
            ReplCommand::parse("clear signature").expect("parse"),
            Some(ReplCommand::Event(ControlEvent::ClearSignature {
                key: "signature".into(),
            }))
        );
    }

    #[test]
    fn set_without_value_clears_the_answer() {
        assert_eq!(
            ReplCommand::parse("set nickname").expect("parse"),
            Some(ReplCommand::Event(ControlEvent::SetValue {
                key: "nickname".into(),
                value: json!(""),
            }))
        );
    }

    #[test]
    fn parses_navigation_and_blank_lines() {
        assert_eq!(ReplCommand::parse("   ").expect("parse"), None);
        assert_eq!(ReplCommand::parse("next").expect("parse"), Some(ReplCommand::Next));
        assert_eq!(ReplCommand::parse(" back ").expect("parse"), Some(ReplCommand::Back));
        assert_eq!(ReplCommand::parse("exit").expect("parse"), Some(ReplCommand::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(ReplCommand::parse("set").is_err());
        assert!(ReplCommand::parse("sign signature").is_err());
        assert!(ReplCommand::parse("date dob week 3").is_err());
        assert!(ReplCommand::parse("dance").is_err());
    }

    #[test]
    fn base_url_precedence() {
        assert_eq!(
            resolve_base_url(Some("http://flag"), Some("http://env".into())),
            "http://flag"
        );
        assert_eq!(resolve_base_url(None, Some("http://env".into())), "http://env");
        assert_eq!(resolve_base_url(None, Some("  ".into())), DEFAULT_BASE_URL);
        assert_eq!(resolve_base_url(None, None), DEFAULT_BASE_URL);
    }

    #[test]
    fn endpoint_overrides_keep_defaults() {
        let args = RunArgs {
            base_url: None,
            schema_path: None,
            draft_path: Some("/drafts/mine".into()),
            submit_path: None,
            format: OutputFormat::Text,
        };
        let endpoints = args.endpoints();
        assert_eq!(endpoints.draft, "/drafts/mine");
        assert_eq!(endpoints.schema, ApiEndpoints::default().schema);
    }

    #[test]
    fn page_text_lists_banners_errors_and_buttons() {
        let page = PageView {
            title: "ISET".into(),
            language: Language::En,
            progress: Some("Step 2 of 2".into()),
            steps: vec![
                StepLink {
                    step_id: "a".into(),
                    title: "Applicant".into(),
                    current: false,
                },
                StepLink {
                    step_id: "b".into(),
                    title: "Review".into(),
                    current: true,
                },
            ],
            error_summary: None,
            persist_banner: Some(Banner {
                title: "Unable to save changes".into(),
                message: "Try again".into(),
            }),
            success_banner: None,
            step: Some(StepView {
                step_id: "b".into(),
                title: "Review".into(),
                description: None,
                nodes: Vec::new(),
                empty_notice: Some("Nothing here".into()),
            }),
            back: Some(Button {
                label: "Back".into(),
                disabled: false,
            }),
            primary: Some(Button {
                label: "Submitting...".into(),
                disabled: true,
            }),
            empty_workflow: None,
        };
        let text = page_text(&page);
        assert!(text.contains("Step 2 of 2: Applicant > [Review]"));
        assert!(text.contains("! Unable to save changes: Try again"));
        assert!(text.contains("== Review ==\nNothing here"));
        assert!(text.ends_with("[Back] (Submitting...)"));
    }
}
