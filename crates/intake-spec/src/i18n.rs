use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unic_langid::LanguageIdentifier;

/// Languages an intake document can be rendered in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

/// Fallback order used when a localized value is missing for the requested language.
pub const SUPPORTED_LANGUAGES: [Language; 2] = [Language::En, Language::Fr];

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// Maps a locale string (`fr`, `fr-CA`, `fr_CA.UTF-8`) onto a supported language.
    ///
    /// Encoding and modifier suffixes are stripped and the rest is parsed as a
    /// language tag. Unparsable tags and unsupported languages yield `None`.
    pub fn from_locale(raw: &str) -> Option<Self> {
        let mut cleaned = raw.trim();
        if let Some((head, _)) = cleaned.split_once('.') {
            cleaned = head;
        }
        if let Some((head, _)) = cleaned.split_once('@') {
            cleaned = head;
        }
        if cleaned.is_empty() {
            return None;
        }
        let lid: LanguageIdentifier = cleaned.replace('_', "-").parse().ok()?;
        SUPPORTED_LANGUAGES
            .into_iter()
            .find(|language| lid.language.as_str() == language.code())
    }

    fn fallback_order(self) -> impl Iterator<Item = Language> {
        std::iter::once(self).chain(
            SUPPORTED_LANGUAGES
                .into_iter()
                .filter(move |language| *language != self),
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Text authored either as a plain string or as a per-locale map.
///
/// Localized entries keep document order; only string entries are retained
/// because `null` or non-string values can never be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalizedText {
    Plain(String),
    Localized(Vec<(String, String)>),
}

impl LocalizedText {
    /// Reads schema text from raw JSON. Falsy or non-text values yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.is_empty() => Some(LocalizedText::Plain(text.clone())),
            Value::Object(map) => Some(LocalizedText::Localized(
                map.iter()
                    .filter_map(|(locale, entry)| {
                        entry.as_str().map(|text| (locale.clone(), text.to_string()))
                    })
                    .collect(),
            )),
            _ => None,
        }
    }

    pub fn resolve(&self, language: Language) -> String {
        match self {
            LocalizedText::Plain(text) => text.clone(),
            LocalizedText::Localized(entries) => {
                let lookup = |locale: &str| {
                    entries
                        .iter()
                        .find(|(key, _)| key == locale)
                        .map(|(_, text)| text.as_str())
                        .filter(|text| !text.trim().is_empty())
                };
                for candidate in language.fallback_order() {
                    if let Some(text) = lookup(candidate.code()) {
                        return text.to_string();
                    }
                }
                entries
                    .iter()
                    .map(|(_, text)| text)
                    .find(|text| !text.trim().is_empty())
                    .cloned()
                    .unwrap_or_default()
            }
        }
    }
}

/// Resolves optional schema text, returning an empty string when nothing usable exists.
pub fn resolve_text(text: Option<&LocalizedText>, language: Language) -> String {
    text.map(|text| text.resolve(language)).unwrap_or_default()
}

/// Resolves raw JSON text without going through the schema model.
pub fn resolve_value_text(value: Option<&Value>, language: Language) -> String {
    value
        .and_then(LocalizedText::from_value)
        .map(|text| text.resolve(language))
        .unwrap_or_default()
}

static EN_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();
static FR_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();

fn en_messages() -> &'static BTreeMap<String, String> {
    EN_MESSAGES.get_or_init(|| parse_catalog(include_str!("../i18n/en.json")))
}

fn fr_messages() -> &'static BTreeMap<String, String> {
    FR_MESSAGES.get_or_init(|| parse_catalog(include_str!("../i18n/fr.json")))
}

fn parse_catalog(raw: &str) -> BTreeMap<String, String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Looks up a static user-facing message, falling back to English and then to the key.
pub fn message(language: Language, key: &str) -> String {
    let catalog = match language {
        Language::En => en_messages(),
        Language::Fr => fr_messages(),
    };
    catalog
        .get(key)
        .or_else(|| en_messages().get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Same as [`message`] with `{name}` placeholders substituted.
pub fn message_with(language: Language, key: &str, args: &[(&str, &str)]) -> String {
    let mut output = message(language, key);
    for (name, value) in args {
        output = output.replace(&format!("{{{name}}}"), value);
    }
    output
}
