//! Process-wide language selection.
//!
//! `LanguageStore` is the single writer of the current UI language. Readers
//! never touch the store directly: they hold a `watch::Receiver<Language>`
//! obtained from [`LanguageStore::subscribe`] and react to its changes.

use crate::config::Config;
use crate::i18n::Language;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// On-disk layout of the language state file.
#[derive(Debug, Serialize, Deserialize)]
struct LanguageState {
    language: Language,
}

pub struct LanguageStore {
    tx: watch::Sender<Language>,
    state_file: Option<PathBuf>,
}

impl LanguageStore {
    /// In-memory store for the session.
    pub fn new(initial: Language) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            state_file: None,
        }
    }

    /// Store that restores its selection from `path` and writes every change
    /// back to it. A missing or unreadable file falls back to `fallback`.
    pub fn with_persistence(path: impl Into<PathBuf>, fallback: Language) -> Self {
        let path = path.into();
        let initial = match load_state(&path) {
            Ok(Some(language)) => {
                info!("Restored UI language '{}' from {}", language, path.display());
                language
            }
            Ok(None) => fallback,
            Err(e) => {
                warn!(
                    "Ignoring language state file {}: {:#}",
                    path.display(),
                    e
                );
                fallback
            }
        };

        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            state_file: Some(path),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.language_state_file {
            Some(path) => Self::with_persistence(path, config.default_language),
            None => Self::new(config.default_language),
        }
    }

    pub fn current(&self) -> Language {
        *self.tx.borrow()
    }

    /// Live view of the selection; the receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.tx.subscribe()
    }

    /// Change the UI language. Subscribers are only woken when the value
    /// actually changes. Persistence failures are logged and do not roll back
    /// the in-memory selection.
    pub fn set_language(&self, language: Language) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == language {
                false
            } else {
                *current = language;
                true
            }
        });

        if !changed {
            debug!("UI language already '{}'", language);
            return;
        }

        info!("UI language changed to '{}' ({})", language, language.name());

        if let Some(path) = &self.state_file {
            if let Err(e) = save_state(path, language) {
                warn!("Failed to persist UI language: {:#}", e);
            }
        }
    }
}

impl Default for LanguageStore {
    fn default() -> Self {
        Self::new(Language::canonical())
    }
}

fn load_state(path: &Path) -> Result<Option<Language>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let state: LanguageState =
        serde_json::from_str(&contents).context("Failed to parse language state")?;

    Ok(Some(state.language))
}

/// Write via a temp file in the same directory so readers never see a
/// partially written file.
fn save_state(path: &Path, language: Language) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let temp_file =
        NamedTempFile::new_in(parent_dir).context("Failed to create temp state file")?;
    let mut writer = BufWriter::new(&temp_file);
    serde_json::to_writer(&mut writer, &LanguageState { language })
        .context("Failed to serialize language state")?;
    writer.flush().context("Failed to flush language state")?;
    drop(writer);

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
