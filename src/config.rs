use crate::i18n::Language;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Free machine-translation endpoint used when none is configured.
pub const DEFAULT_TRANSLATE_API_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Capacity of the shared translation cache when none is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

#[derive(Debug, Clone)]
pub struct Config {
    // Translation endpoint
    pub translate_api_url: String,

    // UI language
    pub default_language: Language,
    pub language_state_file: Option<PathBuf>,

    // Cache
    pub translation_cache_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(code.trim())
                .context("DEFAULT_LANGUAGE is not a supported language")?,
            Err(_) => Language::canonical(),
        };

        Ok(Self {
            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATE_API_URL.to_string()),

            default_language,
            language_state_file: std::env::var("LANGUAGE_STATE_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            translation_cache_capacity: std::env::var("TRANSLATION_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_CACHE_CAPACITY)
                .max(1),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate_api_url: DEFAULT_TRANSLATE_API_URL.to_string(),
            default_language: Language::canonical(),
            language_state_file: None,
            translation_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
