//! Configuration from environment
//!
//! Every key has a documented default, so a fresh environment always yields a
//! usable record. A value that is present but cannot be coerced to its type is
//! a hard error rather than a silent fallback to the default.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised when an environment value cannot be coerced to its type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value `{value}` for {key}: expected {expected}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Identifier of the image-understanding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageModel {
    Blip2,
    Blip2Flan,
}

impl ImageModel {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "blip2" => Some(Self::Blip2),
            "blip2-flan" => Some(Self::Blip2Flan),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blip2 => "blip2",
            Self::Blip2Flan => "blip2-flan",
        }
    }
}

/// Identifier of the language-reasoning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextModel {
    Llama2,
    TinyLlama,
}

impl TextModel {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "llama2" => Some(Self::Llama2),
            "tinyllama" => Some(Self::TinyLlama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llama2 => "llama2",
            Self::TinyLlama => "tinyllama",
        }
    }
}

/// Minimum severity for emitted log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Directive level understood by the tracing filter.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// Resolved startup configuration.
///
/// Built once before anything else starts and never mutated afterwards. The
/// loader only reads the environment; directories named here are created by
/// whichever component consumes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub debug: bool,
    pub port: u16,
    pub host: String,
    pub model_cache_dir: PathBuf,
    pub image_model: ImageModel,
    pub text_model: TextModel,
    pub temp_image_dir: PathBuf,
    pub log_level: LogLevel,
    /// Base URL of the OpenAI-compatible inference runtime.
    pub backend_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a record from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            debug: parse_with(&lookup, "DEBUG", true, "a boolean (true/false)", parse_bool)?,
            port: parse_with(&lookup, "PORT", 8000, "an integer port", |v| {
                v.parse::<u16>().ok()
            })?,
            host: lookup("HOST").unwrap_or_else(|| "localhost".to_string()),
            model_cache_dir: lookup("MODEL_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./models/cache")),
            image_model: parse_with(
                &lookup,
                "IMAGE_MODEL",
                ImageModel::Blip2,
                "one of: blip2, blip2-flan",
                ImageModel::parse,
            )?,
            text_model: parse_with(
                &lookup,
                "TEXT_MODEL",
                TextModel::Llama2,
                "one of: llama2, tinyllama",
                TextModel::parse,
            )?,
            temp_image_dir: lookup("TEMP_IMAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./temp_images")),
            log_level: parse_with(
                &lookup,
                "LOG_LEVEL",
                LogLevel::Info,
                "one of: DEBUG, INFO, WARNING, ERROR",
                LogLevel::parse,
            )?,
            backend_url: lookup("INFERENCE_BACKEND_URL")
                .unwrap_or_else(|| "http://127.0.0.1:11434/v1".to_string()),
        })
    }
}

fn parse_with<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    expected: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match parse(&raw) {
            Some(value) => Ok(value),
            None => Err(ConfigError {
                key,
                value: raw,
                expected,
            }),
        },
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.debug);
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.model_cache_dir, PathBuf::from("./models/cache"));
        assert_eq!(config.image_model, ImageModel::Blip2);
        assert_eq!(config.text_model, TextModel::Llama2);
        assert_eq!(config.temp_image_dir, PathBuf::from("./temp_images"));
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.backend_url, "http://127.0.0.1:11434/v1");
    }

    #[test]
    fn round_trips_valid_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DEBUG", "false"),
            ("PORT", "9000"),
            ("HOST", "0.0.0.0"),
            ("MODEL_CACHE_DIR", "/var/cache/models"),
            ("IMAGE_MODEL", "blip2-flan"),
            ("TEXT_MODEL", "tinyllama"),
            ("TEMP_IMAGE_DIR", "/tmp/images"),
            ("LOG_LEVEL", "WARNING"),
            ("INFERENCE_BACKEND_URL", "http://localhost:8081/v1"),
        ]))
        .unwrap();
        assert!(!config.debug);
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.model_cache_dir, PathBuf::from("/var/cache/models"));
        assert_eq!(config.image_model, ImageModel::Blip2Flan);
        assert_eq!(config.text_model, TextModel::TinyLlama);
        assert_eq!(config.temp_image_dir, PathBuf::from("/tmp/images"));
        assert_eq!(config.log_level, LogLevel::Warning);
        assert_eq!(config.backend_url, "http://localhost:8081/v1");
    }

    #[test]
    fn port_override_leaves_other_defaults() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "9090")])).unwrap();
        assert_eq!(config.port, 9090);
        assert!(config.debug);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.model_cache_dir, PathBuf::from("./models/cache"));
        assert_eq!(config.image_model, ImageModel::Blip2);
        assert_eq!(config.text_model, TextModel::Llama2);
        assert_eq!(config.temp_image_dir, PathBuf::from("./temp_images"));
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn non_numeric_port_is_an_error_not_a_fallback() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "abc")])).unwrap_err();
        assert_eq!(err.key, "PORT");
        assert_eq!(err.value, "abc");
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn out_of_range_port_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "70000")])).unwrap_err();
        assert_eq!(err.key, "PORT");
    }

    #[test]
    fn debug_accepts_documented_tokens() {
        for (token, expected) in [
            ("True", true),
            ("False", false),
            ("true", true),
            ("false", false),
            ("1", true),
            ("0", false),
        ] {
            let config = Config::from_lookup(lookup_from(&[("DEBUG", token)])).unwrap();
            assert_eq!(config.debug, expected, "token {token:?}");
        }
    }

    #[test]
    fn unrecognized_debug_token_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("DEBUG", "maybe")])).unwrap_err();
        assert_eq!(err.key, "DEBUG");
        assert_eq!(err.value, "maybe");
    }

    #[test]
    fn unknown_model_identifiers_are_errors() {
        let err = Config::from_lookup(lookup_from(&[("IMAGE_MODEL", "clip")])).unwrap_err();
        assert_eq!(err.key, "IMAGE_MODEL");
        let err = Config::from_lookup(lookup_from(&[("TEXT_MODEL", "gpt4")])).unwrap_err();
        assert_eq!(err.key, "TEXT_MODEL");
    }

    #[test]
    fn log_level_tokens() {
        for (token, expected) in [
            ("DEBUG", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("WARNING", LogLevel::Warning),
            ("warn", LogLevel::Warning),
            ("Error", LogLevel::Error),
        ] {
            let config = Config::from_lookup(lookup_from(&[("LOG_LEVEL", token)])).unwrap();
            assert_eq!(config.log_level, expected, "token {token:?}");
        }
        let err = Config::from_lookup(lookup_from(&[("LOG_LEVEL", "verbose")])).unwrap_err();
        assert_eq!(err.key, "LOG_LEVEL");
    }

    #[test]
    fn loading_twice_yields_equal_records() {
        let vars = [("PORT", "8123"), ("IMAGE_MODEL", "blip2")];
        let first = Config::from_lookup(lookup_from(&vars)).unwrap();
        let second = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn model_tokens_round_trip() {
        for model in [ImageModel::Blip2, ImageModel::Blip2Flan] {
            assert_eq!(ImageModel::parse(model.as_str()), Some(model));
        }
        for model in [TextModel::Llama2, TextModel::TinyLlama] {
            assert_eq!(TextModel::parse(model.as_str()), Some(model));
        }
    }
}
