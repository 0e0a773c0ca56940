//! Internationalization (i18n) for the marketplace UI.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Validated `Language` handle onto a registry entry
//! - `store`: Process-wide current-language selection with change subscriptions
//! - `metrics`: Translation cache and API counters
//!
//! # Example
//!
//! ```rust,ignore
//! use agri_bazaar::i18n::{Language, LanguageStore};
//!
//! let store = LanguageStore::new(Language::canonical());
//! let mut rx = store.subscribe();
//!
//! store.set_language(Language::from_code("te")?);
//! rx.changed().await?;
//! ```

mod language;
mod metrics;
mod registry;
mod store;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use store::LanguageStore;
