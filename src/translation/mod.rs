//! Runtime translation of UI strings.
//!
//! `Translator::translate` never fails: when the text needs no translation it
//! is returned as-is without touching the network, and on any backend failure
//! the source text is returned and the failure is logged.

mod cache;
mod google;
mod response;

pub use cache::{CachedTranslator, TranslationCache};
pub use google::GoogleTranslator;
pub use response::{parse_translation_response, Segment, TranslationResponse};

use crate::config::Config;
use crate::i18n::{Language, TranslationMetrics};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::warn;

/// Why a single translation attempt produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Transport(String),

    #[error("translation endpoint returned HTTP {0}")]
    Status(u16),

    #[error("translation response is not valid JSON: {0}")]
    Body(String),

    #[error("malformed translation response: {0}")]
    Malformed(&'static str),
}

impl From<reqwest::Error> for TranslateError {
    fn from(error: reqwest::Error) -> Self {
        TranslateError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(error: serde_json::Error) -> Self {
        TranslateError::Body(error.to_string())
    }
}

/// `false` when `text` can be shown as-is in `target`: the target is the
/// canonical language or the text is blank.
pub fn needs_translation(text: &str, target: Language) -> bool {
    !target.is_canonical() && !text.trim().is_empty()
}

pub trait Translator: Send + Sync {
    /// One attempt against the backing service, with no short-circuiting.
    fn try_translate<'a>(
        &'a self,
        text: &'a str,
        target: Language,
    ) -> BoxFuture<'a, Result<String, TranslateError>>;

    /// Translate `text` into `target`, degrading to `text` on any failure.
    fn translate<'a>(&'a self, text: &'a str, target: Language) -> BoxFuture<'a, String> {
        Box::pin(async move {
            if !needs_translation(text, target) {
                return text.to_string();
            }

            match self.try_translate(text, target).await {
                Ok(translated) => translated,
                Err(e) => {
                    warn!(
                        "Translation to {} ({}) failed, showing source text: {}",
                        target.name(),
                        target.code(),
                        e
                    );
                    text.to_string()
                }
            }
        })
    }
}

impl<T: Translator + ?Sized> Translator for Arc<T> {
    fn try_translate<'a>(
        &'a self,
        text: &'a str,
        target: Language,
    ) -> BoxFuture<'a, Result<String, TranslateError>> {
        (**self).try_translate(text, target)
    }
}

/// The production translator: the configured endpoint behind a shared,
/// bounded cache.
pub fn translator_from_config(
    client: reqwest::Client,
    config: &Config,
    metrics: Arc<TranslationMetrics>,
) -> Arc<dyn Translator> {
    let google = GoogleTranslator::from_config(client, config, Arc::clone(&metrics));
    let cache = Arc::new(TranslationCache::new(
        config.translation_cache_capacity,
        metrics,
    ));

    Arc::new(CachedTranslator::new(Arc::new(google), cache))
}
