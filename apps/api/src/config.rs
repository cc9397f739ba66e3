use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::{DEFAULT_MAX_INPUT_CHARS, DEFAULT_MAX_RED_FLAGS};
use crate::llm_client::{
    GeminiSettings, DEFAULT_API_BASE, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MAX_RETRIES,
    DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
///
/// Reads the process environment only; the binaries load `.env` before calling in.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_temperature: f64,
    pub llm_max_output_tokens: u32,
    pub llm_max_retries: u32,
    pub llm_timeout_secs: u64,
    pub max_input_chars: usize,
    pub max_red_flags: usize,
    pub batch_concurrency: usize,
    pub max_batch_size: usize,
    /// Optional JSON file replacing the built-in parsing lexicon.
    pub lexicon_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Like `from_env`, but an explicit API key (e.g. a CLI flag) wins over `GEMINI_API_KEY`.
    pub fn load(api_key_override: Option<String>) -> Result<Self> {
        let gemini_api_key = match api_key_override {
            Some(key) if !key.trim().is_empty() => key,
            _ => require_env("GEMINI_API_KEY")?,
        };

        Ok(Config {
            gemini_api_key,
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_API_BASE),
            llm_temperature: parse_env("LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            llm_max_output_tokens: parse_env("LLM_MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            max_input_chars: parse_env("MAX_INPUT_CHARS", DEFAULT_MAX_INPUT_CHARS)?,
            max_red_flags: parse_env("MAX_RED_FLAGS", DEFAULT_MAX_RED_FLAGS)?,
            batch_concurrency: parse_env("BATCH_CONCURRENCY", 4)?,
            max_batch_size: parse_env("MAX_BATCH_SIZE", 32)?,
            lexicon_path: std::env::var("LEXICON_PATH").ok().map(PathBuf::from),
            port: parse_env("PORT", 8000)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            model: self.gemini_model.clone(),
            api_base: self.gemini_api_base.clone(),
            temperature: self.llm_temperature,
            max_output_tokens: self.llm_max_output_tokens,
            max_retries: self.llm_max_retries,
            timeout: Duration::from_secs(self.llm_timeout_secs),
            ..GeminiSettings::new(self.gemini_api_key.clone())
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: &[&str] = &[
        "GEMINI_API_KEY",
        "GEMINI_MODEL",
        "GEMINI_API_BASE",
        "LLM_TEMPERATURE",
        "LLM_MAX_OUTPUT_TOKENS",
        "LLM_MAX_RETRIES",
        "LLM_TIMEOUT_SECS",
        "MAX_INPUT_CHARS",
        "MAX_RED_FLAGS",
        "BATCH_CONCURRENCY",
        "MAX_BATCH_SIZE",
        "LEXICON_PATH",
        "PORT",
        "RUST_LOG",
    ];

    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let kvs: Vec<(&str, Option<&str>)> = ALL_KEYS
            .iter()
            .map(|&key| {
                let value = vars.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
                (key, value)
            })
            .collect();
        temp_env::with_vars(kvs, f)
    }

    #[test]
    fn test_defaults_apply() {
        let config = with_env(&[("GEMINI_API_KEY", "k")], Config::from_env).unwrap();
        assert_eq!(config.gemini_api_key, "k");
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.llm_max_output_tokens, 1024);
        assert!((config.llm_temperature - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.max_input_chars, 8_000);
        assert_eq!(config.max_red_flags, 10);
        assert_eq!(config.port, 8000);
        assert!(config.lexicon_path.is_none());
    }

    #[test]
    fn test_missing_api_key_fails() {
        let err = with_env(&[], Config::from_env).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_dotenv_file_is_not_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "GEMINI_API_KEY=from-dotenv\n").unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let result = with_env(&[], Config::from_env);

        std::env::set_current_dir(previous).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_override_key_wins() {
        let config = with_env(&[("GEMINI_API_KEY", "env-key")], || {
            Config::load(Some("flag-key".to_string()))
        })
        .unwrap();
        assert_eq!(config.gemini_api_key, "flag-key");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = with_env(&[("GEMINI_API_KEY", "k"), ("PORT", "eighty")], Config::from_env)
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_gemini_settings_carry_overrides() {
        let config = with_env(
            &[
                ("GEMINI_API_KEY", "k"),
                ("GEMINI_MODEL", "gemini-1.5-pro"),
                ("LLM_MAX_RETRIES", "5"),
            ],
            Config::from_env,
        )
        .unwrap();
        let settings = config.gemini_settings();
        assert_eq!(settings.model, "gemini-1.5-pro");
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.api_key, "k");
    }
}
