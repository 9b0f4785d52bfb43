//! Language configuration and translation dictionaries.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ConfigError;

/// Translation and locale service.
pub trait Translator {
    /// Look up a dotted `key` in `lang`'s dictionary, returning `fallback` when absent.
    fn t(&self, lang: &str, key: &str, fallback: &str) -> String;

    /// Culture code for `lang`, e.g. `en-US`.
    fn culture(&self, lang: &str) -> String;

    /// The whole dictionary for `lang`, exposed to templates.
    fn dictionary(&self, lang: &str) -> Value;
}

/// Supported languages and their per-language build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub default: String,
    pub supported: Vec<String>,
    pub languages: IndexMap<String, LanguageBuild>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: "en".to_string(),
            supported: vec!["en".to_string()],
            languages: IndexMap::new(),
        }
    }
}

/// Per-language build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageBuild {
    /// Absolute root URL of this language's pages.
    pub canonical: Option<String>,
    pub lang_attr: Option<String>,
    pub meta_language: Option<String>,
    pub og_locale: Option<String>,
    pub alt_locale: Vec<String>,
    pub culture: Option<String>,
    pub label: Option<String>,
    /// `chrono` format pattern for displayed dates.
    pub date_format: String,
}

impl Default for LanguageBuild {
    fn default() -> Self {
        Self {
            canonical: None,
            lang_attr: None,
            meta_language: None,
            og_locale: None,
            alt_locale: Vec::new(),
            culture: None,
            label: None,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl LanguageConfig {
    /// Trim codes, default the supported list and check the default language is supported.
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        self.default = self.default.trim().to_string();
        if self.default.is_empty() {
            return Err(ConfigError::Languages("default language is empty".to_string()));
        }

        let mut supported: Vec<String> = Vec::with_capacity(self.supported.len());
        for code in &self.supported {
            let code = code.trim();
            if !code.is_empty() && !supported.iter().any(|c| c == code) {
                supported.push(code.to_string());
            }
        }
        if supported.is_empty() {
            supported.push(self.default.clone());
        }
        if !supported.contains(&self.default) {
            return Err(ConfigError::Languages(format!(
                "default language '{}' is not in the supported list",
                self.default
            )));
        }

        self.supported = supported;
        Ok(())
    }

    pub fn is_supported(&self, lang: &str) -> bool {
        self.supported.iter().any(|code| code == lang)
    }

    pub fn is_default(&self, lang: &str) -> bool {
        self.default == lang
    }

    /// `lang` when supported, otherwise the default language.
    pub fn resolve<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.is_supported(lang) {
            lang
        } else {
            &self.default
        }
    }

    /// Supported languages other than `lang`, in configured order.
    pub fn others<'a>(&'a self, lang: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.supported
            .iter()
            .map(String::as_str)
            .filter(move |code| *code != lang)
    }

    pub fn build(&self, lang: &str) -> Option<&LanguageBuild> {
        self.languages.get(lang)
    }

    /// Configured absolute root of `lang`, if any.
    pub fn canonical(&self, lang: &str) -> Option<&str> {
        self.build(lang)
            .and_then(|b| b.canonical.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn culture(&self, lang: &str) -> String {
        self.build(lang)
            .and_then(|b| b.culture.clone())
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| lang.to_string())
    }

    /// Human-readable label shown in language switchers.
    pub fn label(&self, lang: &str) -> String {
        self.build(lang)
            .and_then(|b| b.label.clone())
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| lang.to_uppercase())
    }

    pub fn lang_attr(&self, lang: &str) -> String {
        self.build(lang)
            .and_then(|b| b.lang_attr.clone())
            .unwrap_or_else(|| lang.to_string())
    }

    pub fn meta_language(&self, lang: &str) -> String {
        self.build(lang)
            .and_then(|b| b.meta_language.clone())
            .unwrap_or_else(|| self.lang_attr(lang))
    }

    pub fn og_locale(&self, lang: &str) -> Option<String> {
        self.build(lang)
            .and_then(|b| b.og_locale.clone())
            .filter(|l| !l.trim().is_empty())
    }

    pub fn alt_locales(&self, lang: &str) -> &[String] {
        self.build(lang).map(|b| b.alt_locale.as_slice()).unwrap_or(&[])
    }

    pub fn date_format(&self, lang: &str) -> &str {
        self.build(lang)
            .map(|b| b.date_format.as_str())
            .unwrap_or("%Y-%m-%d")
    }
}

/// Dictionary-backed [`Translator`].
#[derive(Debug, Clone, Default)]
pub struct I18n {
    languages: LanguageConfig,
    dictionaries: HashMap<String, Value>,
}

impl I18n {
    pub fn new(languages: LanguageConfig) -> Self {
        Self {
            languages,
            dictionaries: HashMap::new(),
        }
    }

    /// Register a dictionary for `lang`.
    pub fn with_dictionary(mut self, lang: impl Into<String>, dictionary: Value) -> Self {
        self.dictionaries.insert(lang.into(), dictionary);
        self
    }

    /// Load `<dir>/<lang>.toml` for every supported language. Missing files are skipped.
    pub async fn load(languages: LanguageConfig, dir: &Path) -> Result<Self, ConfigError> {
        let mut i18n = Self::new(languages);

        for lang in i18n.languages.supported.clone() {
            let path = dir.join(format!("{lang}.toml"));
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tracing::debug!("No dictionary for {} at {}", lang, path.display());
                continue;
            }

            let content =
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| ConfigError::Read {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
            let dictionary = parse_dictionary(&content).map_err(|message| ConfigError::Parse {
                path: path.display().to_string(),
                message,
            })?;
            i18n.dictionaries.insert(lang, dictionary);
        }

        Ok(i18n)
    }

    pub fn languages(&self) -> &LanguageConfig {
        &self.languages
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(self.dictionaries.get(lang)?, |node, part| node.get(part))
    }
}

fn parse_dictionary(content: &str) -> Result<Value, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
    serde_json::to_value(table).map_err(|e| e.to_string())
}

impl Translator for I18n {
    fn t(&self, lang: &str, key: &str, fallback: &str) -> String {
        match self.lookup(lang, key) {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => fallback.to_string(),
        }
    }

    fn culture(&self, lang: &str) -> String {
        self.languages.culture(lang)
    }

    fn dictionary(&self, lang: &str) -> Value {
        self.dictionaries
            .get(lang)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}
