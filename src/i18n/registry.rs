//! Language registry: Single source of truth for all supported UI languages.
//!
//! The registry is a lazily initialised singleton behind `OnceLock`. It is
//! immutable after first access, so it is safe to share across tasks.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "te", "hi")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Telugu")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "తెలుగు")
    pub native_name: &'static str,

    /// Prompt shown on the language picker, written in this language
    pub select_prompt: &'static str,

    /// Whether this is the canonical/source language (only one should be true)
    pub is_canonical: bool,

    /// Whether this language is offered in the picker
    pub enabled: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All enabled languages, in picker order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get the canonical language configuration.
    ///
    /// UI strings are authored in the canonical language, so translating to
    /// it is always a no-op.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one canonical language.
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// English is canonical; Telugu, Hindi and Tamil are translation targets.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            select_prompt: "Please Select a Language",
            is_canonical: true,
            enabled: true,
        },
        LanguageConfig {
            code: "te",
            name: "Telugu",
            native_name: "తెలుగు",
            select_prompt: "దయచేసి ఒక భాషను ఎంచుకోండి",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "hi",
            name: "Hindi",
            native_name: "हिन्दी",
            select_prompt: "कृपया एक भाषा चुनें",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "ta",
            name: "Tamil",
            native_name: "தமிழ்",
            select_prompt: "தயவுசெய்து ஒரு மொழியைத் தேர்ந்தெடுக்கவும்",
            is_canonical: false,
            enabled: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_english() {
        let config = LanguageRegistry::get()
            .get_by_code("en")
            .expect("English should be registered");

        assert_eq!(config.name, "English");
        assert!(config.is_canonical);
        assert!(config.enabled);
    }

    #[test]
    fn test_get_by_code_telugu() {
        let config = LanguageRegistry::get()
            .get_by_code("te")
            .expect("Telugu should be registered");

        assert_eq!(config.name, "Telugu");
        assert_eq!(config.native_name, "తెలుగు");
        assert!(!config.is_canonical);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("fr").is_none());
    }

    #[test]
    fn test_list_enabled_picker_order() {
        let codes: Vec<_> = LanguageRegistry::get()
            .list_enabled()
            .iter()
            .map(|lang| lang.code)
            .collect();

        assert_eq!(codes, vec!["en", "te", "hi", "ta"]);
    }

    #[test]
    fn test_canonical_returns_english() {
        assert_eq!(LanguageRegistry::get().canonical().code, "en");
    }

    #[test]
    fn test_is_enabled() {
        let registry = LanguageRegistry::get();
        assert!(registry.is_enabled("hi"));
        assert!(registry.is_enabled("ta"));
        assert!(!registry.is_enabled("de"));
        assert!(!registry.is_enabled(""));
    }

    #[test]
    fn test_every_language_has_a_select_prompt() {
        for lang in LanguageRegistry::get().list_enabled() {
            assert!(
                !lang.select_prompt.trim().is_empty(),
                "{} has no picker prompt",
                lang.code
            );
        }
    }
}
