use std::env;

use intake_spec::Language;

fn detect_env_locale() -> Option<String> {
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(val) = env::var(key) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn resolve(candidates: impl IntoIterator<Item = Option<String>>) -> Language {
    candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| Language::from_locale(&candidate))
        .unwrap_or_default()
}

/// `--locale`, then the POSIX locale variables, then the OS locale. Unsupported
/// languages fall through to the next source; English is the last resort.
pub fn select_language(cli_locale: Option<&str>) -> Language {
    resolve([
        cli_locale.map(str::to_string),
        detect_env_locale(),
        sys_locale::get_locale(),
    ])
}
