//! Language-reactive UI text.
//!
//! A [`TranslatedText`] shows its source string immediately and re-translates
//! it whenever the source or the current language changes. The previous value
//! stays on screen until the new translation arrives.
//!
//! Every request is tagged with a sequence number and only the response to
//! the most recent request is applied, so a slow response for an earlier
//! language can never overwrite a newer one. Superseded requests are left to
//! finish; their results are dropped.

use crate::i18n::Language;
use crate::translation::{needs_translation, Translator};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// What a [`TranslatedText`] currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,

    /// Language `text` was resolved for. The mount value is the untranslated
    /// source, which is in the canonical language.
    pub language: Language,

    /// Sequence number of the request that produced `text`; 0 before any
    /// request has resolved.
    pub revision: u64,
}

struct DisplayState {
    display: watch::Sender<Rendered>,
    latest: AtomicU64,
    alive: AtomicBool,
}

impl DisplayState {
    fn next_request(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, revision: u64, language: Language, text: String) {
        if !self.alive.load(Ordering::SeqCst) {
            trace!("Discarding translation for unmounted text");
            return;
        }

        // The check runs under the channel's lock so a stale response cannot
        // slip in between a newer request's check and its write.
        self.display.send_if_modified(|current| {
            if self.latest.load(Ordering::SeqCst) != revision {
                debug!(
                    "Discarding superseded {} translation (request {})",
                    language.code(),
                    revision
                );
                return false;
            }

            *current = Rendered {
                text,
                language,
                revision,
            };
            true
        });
    }
}

/// A mounted, language-reactive text node.
///
/// Must be mounted from within a Tokio runtime. Dropping the value unmounts
/// it.
pub struct TranslatedText {
    source: watch::Sender<String>,
    language: watch::Receiver<Language>,
    state: Arc<DisplayState>,
    driver: JoinHandle<()>,
}

impl TranslatedText {
    /// Mount `source`, tracking the language published on `language`.
    pub fn mount(
        source: impl Into<String>,
        language: watch::Receiver<Language>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let source = source.into();
        let (source_tx, source_rx) = watch::channel(source.clone());
        let (display, _) = watch::channel(Rendered {
            text: source,
            language: Language::canonical(),
            revision: 0,
        });

        let state = Arc::new(DisplayState {
            display,
            latest: AtomicU64::new(0),
            alive: AtomicBool::new(true),
        });

        let driver = tokio::spawn(drive(
            source_rx,
            language.clone(),
            translator,
            Arc::clone(&state),
        ));

        Self {
            source: source_tx,
            language,
            state,
            driver,
        }
    }

    /// The text currently on screen.
    pub fn rendered(&self) -> String {
        self.state.display.borrow().text.clone()
    }

    pub fn snapshot(&self) -> Rendered {
        self.state.display.borrow().clone()
    }

    /// Watch display updates. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Rendered> {
        self.state.display.subscribe()
    }

    /// The language this text is tracking.
    pub fn language(&self) -> Language {
        *self.language.borrow()
    }

    pub fn source(&self) -> String {
        self.source.borrow().clone()
    }

    /// Replace the source string; no-op if unchanged.
    pub fn set_source(&self, text: impl Into<String>) {
        let text = text.into();
        self.source.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
    }

    /// Wait until the latest request for `language` has been applied and
    /// return the text it produced.
    ///
    /// Returns the current display right away when the tracked language is
    /// not (or is no longer) `language`.
    pub async fn resolved_for(&self, language: Language) -> String {
        let mut display = self.subscribe();
        let mut tracked = self.language.clone();
        let mut tracked_open = true;

        loop {
            if *tracked.borrow_and_update() != language {
                return self.rendered();
            }

            {
                let rendered = display.borrow_and_update();
                if rendered.language == language
                    && rendered.revision == self.state.latest.load(Ordering::SeqCst)
                {
                    return rendered.text.clone();
                }
            }

            tokio::select! {
                changed = display.changed() => {
                    if changed.is_err() {
                        return self.rendered();
                    }
                }
                changed = tracked.changed(), if tracked_open => {
                    if changed.is_err() {
                        tracked_open = false;
                    }
                }
            }
        }
    }

    pub fn unmount(self) {}
}

impl Drop for TranslatedText {
    fn drop(&mut self) {
        self.state.alive.store(false, Ordering::SeqCst);
        self.driver.abort();
    }
}

async fn drive(
    mut source: watch::Receiver<String>,
    mut language: watch::Receiver<Language>,
    translator: Arc<dyn Translator>,
    state: Arc<DisplayState>,
) {
    let mut language_open = true;

    loop {
        let text = source.borrow_and_update().clone();
        let target = *language.borrow_and_update();
        request(&state, &translator, text, target);

        tokio::select! {
            changed = source.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = language.changed(), if language_open => {
                if changed.is_err() {
                    // The store is gone; keep the last language and only
                    // follow source changes from here on.
                    language_open = false;
                    if source.changed().await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

fn request(
    state: &Arc<DisplayState>,
    translator: &Arc<dyn Translator>,
    text: String,
    target: Language,
) {
    let revision = state.next_request();

    if !needs_translation(&text, target) {
        state.apply(revision, target, text);
        return;
    }

    debug!("Translating UI text into {} (request {})", target.code(), revision);
    let state = Arc::clone(state);
    let translator = Arc::clone(translator);
    tokio::spawn(async move {
        let translated = translator.translate(&text, target).await;
        state.apply(revision, target, translated);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageStore;
    use crate::translation::testing::{FailingTranslator, TaggingTranslator};
    use crate::translation::TranslateError;
    use futures::future::BoxFuture;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    /// Holds every request until the test releases it by language.
    #[derive(Default)]
    struct GatedTranslator {
        pending: Mutex<Vec<(Language, oneshot::Sender<()>)>>,
    }

    impl GatedTranslator {
        fn pending_count(&self) -> usize {
            self.pending.lock().unwrap().len()
        }

        async fn wait_for_pending(&self, count: usize) {
            timeout(WAIT, async {
                while self.pending_count() < count {
                    tokio::task::yield_now().await;
                }
            })
            .await
            .expect("requests were never issued");
        }

        fn release(&self, language: Language) {
            let mut pending = self.pending.lock().unwrap();
            let index = pending
                .iter()
                .position(|(lang, _)| *lang == language)
                .expect("no pending request for language");
            let (_, gate) = pending.remove(index);
            let _ = gate.send(());
        }
    }

    impl Translator for GatedTranslator {
        fn try_translate<'a>(
            &'a self,
            text: &'a str,
            target: Language,
        ) -> BoxFuture<'a, Result<String, TranslateError>> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().push((target, tx));
            Box::pin(async move {
                rx.await
                    .map_err(|_| TranslateError::Transport("gate dropped".into()))?;
                Ok(format!("[{}] {}", target.code(), text))
            })
        }
    }

    async fn wait_for_text(text: &TranslatedText, expected: &str) {
        let mut rx = text.subscribe();
        timeout(WAIT, rx.wait_for(|rendered| rendered.text == expected))
            .await
            .expect("display never updated")
            .expect("display channel closed");
    }

    // ==================== Mount Tests ====================

    #[tokio::test]
    async fn test_mount_renders_source_immediately() {
        let store = LanguageStore::new(Language::ENGLISH);
        let translator = Arc::new(TaggingTranslator::default());

        let text = TranslatedText::mount("Hi", store.subscribe(), translator.clone());

        assert_eq!(text.rendered(), "Hi");
        assert_eq!(text.resolved_for(Language::ENGLISH).await, "Hi");
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_mount_in_non_default_language_translates() {
        let store = LanguageStore::new(Language::TAMIL);
        let text = TranslatedText::mount(
            "Hi",
            store.subscribe(),
            Arc::new(TaggingTranslator::default()),
        );

        // Source is shown while the translation is in flight.
        assert_eq!(text.rendered(), "Hi");
        assert_eq!(text.resolved_for(Language::TAMIL).await, "[ta] Hi");
    }

    // ==================== Reactivity Tests ====================

    #[tokio::test]
    async fn test_language_change_updates_without_remount() {
        let store = LanguageStore::new(Language::ENGLISH);
        let text = TranslatedText::mount(
            "Hi",
            store.subscribe(),
            Arc::new(TaggingTranslator::default()),
        );

        store.set_language(Language::TELUGU);
        wait_for_text(&text, "[te] Hi").await;
        assert_eq!(text.language(), Language::TELUGU);

        store.set_language(Language::ENGLISH);
        wait_for_text(&text, "Hi").await;
    }

    #[tokio::test]
    async fn test_source_change_retranslates() {
        let store = LanguageStore::new(Language::HINDI);
        let text = TranslatedText::mount(
            "Cart",
            store.subscribe(),
            Arc::new(TaggingTranslator::default()),
        );
        wait_for_text(&text, "[hi] Cart").await;

        text.set_source("Checkout");
        wait_for_text(&text, "[hi] Checkout").await;
        assert_eq!(text.source(), "Checkout");
    }

    #[tokio::test]
    async fn test_previous_value_stays_while_revalidating() {
        let store = LanguageStore::new(Language::ENGLISH);
        let translator = Arc::new(GatedTranslator::default());
        let text = TranslatedText::mount("Hi", store.subscribe(), translator.clone());

        store.set_language(Language::HINDI);
        translator.wait_for_pending(1).await;
        assert_eq!(text.rendered(), "Hi");

        translator.release(Language::HINDI);
        wait_for_text(&text, "[hi] Hi").await;
    }

    #[tokio::test]
    async fn test_failed_translation_shows_source() {
        let store = LanguageStore::new(Language::ENGLISH);
        let text = TranslatedText::mount(
            "Hello",
            store.subscribe(),
            Arc::new(FailingTranslator::default()),
        );

        store.set_language(Language::TAMIL);
        assert_eq!(text.resolved_for(Language::TAMIL).await, "Hello");
    }

    #[tokio::test]
    async fn test_resolved_for_untracked_language_returns_current_display() {
        let store = LanguageStore::new(Language::TELUGU);
        let text = TranslatedText::mount(
            "Hi",
            store.subscribe(),
            Arc::new(TaggingTranslator::default()),
        );
        wait_for_text(&text, "[te] Hi").await;

        let shown = timeout(WAIT, text.resolved_for(Language::HINDI))
            .await
            .expect("resolved_for should not wait on another language");
        assert_eq!(shown, "[te] Hi");
    }

    #[tokio::test]
    async fn test_resolved_for_stops_waiting_when_language_moves_on() {
        let store = LanguageStore::new(Language::ENGLISH);
        let translator = Arc::new(GatedTranslator::default());
        let text = TranslatedText::mount("Hi", store.subscribe(), translator.clone());

        store.set_language(Language::TELUGU);
        translator.wait_for_pending(1).await;

        let (shown, ()) = timeout(WAIT, async {
            tokio::join!(text.resolved_for(Language::TELUGU), async {
                store.set_language(Language::HINDI);
            })
        })
        .await
        .expect("resolved_for should return once the language changes");

        // Neither translation has been released yet.
        assert_eq!(shown, "Hi");
    }

    // ==================== Ordering Tests ====================

    #[tokio::test]
    async fn test_slow_earlier_response_cannot_overwrite_latest() {
        let store = LanguageStore::new(Language::ENGLISH);
        let translator = Arc::new(GatedTranslator::default());
        let text = TranslatedText::mount("Hi", store.subscribe(), translator.clone());

        // Request A (Telugu) stays in flight while request B (Hindi) is issued.
        store.set_language(Language::TELUGU);
        translator.wait_for_pending(1).await;
        store.set_language(Language::HINDI);
        translator.wait_for_pending(2).await;

        // B resolves first, then A.
        translator.release(Language::HINDI);
        wait_for_text(&text, "[hi] Hi").await;

        let mut rx = text.subscribe();
        rx.borrow_and_update();
        translator.release(Language::TELUGU);

        // A's response is discarded: no further display update arrives.
        assert!(timeout(Duration::from_millis(200), rx.changed()).await.is_err());
        assert_eq!(text.rendered(), "[hi] Hi");
        assert_eq!(text.snapshot().language, Language::HINDI);
    }

    #[tokio::test]
    async fn test_switch_back_to_default_discards_pending_translation() {
        let store = LanguageStore::new(Language::ENGLISH);
        let translator = Arc::new(GatedTranslator::default());
        let text = TranslatedText::mount("Hi", store.subscribe(), translator.clone());

        store.set_language(Language::TAMIL);
        translator.wait_for_pending(1).await;
        store.set_language(Language::ENGLISH);
        assert_eq!(text.resolved_for(Language::ENGLISH).await, "Hi");

        translator.release(Language::TAMIL);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(text.rendered(), "Hi");
    }

    // ==================== Teardown Tests ====================

    #[tokio::test]
    async fn test_unmounted_text_ignores_late_response() {
        let store = LanguageStore::new(Language::ENGLISH);
        let translator = Arc::new(GatedTranslator::default());
        let text = TranslatedText::mount("Hi", store.subscribe(), translator.clone());

        store.set_language(Language::TELUGU);
        translator.wait_for_pending(1).await;

        let mut rx = text.subscribe();
        rx.borrow_and_update();
        text.unmount();

        translator.release(Language::TELUGU);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(rx.borrow().text, "Hi");
        assert!(!rx.has_changed().unwrap_or(false));
    }

    #[tokio::test]
    async fn test_dropped_store_keeps_following_source() {
        let store = LanguageStore::new(Language::HINDI);
        let text = TranslatedText::mount(
            "Home",
            store.subscribe(),
            Arc::new(TaggingTranslator::default()),
        );
        wait_for_text(&text, "[hi] Home").await;

        drop(store);
        tokio::task::yield_now().await;

        text.set_source("Profile");
        wait_for_text(&text, "[hi] Profile").await;
    }

    #[tokio::test]
    async fn test_labels_share_one_store() {
        let store = LanguageStore::new(Language::ENGLISH);
        let translator: Arc<dyn Translator> = Arc::new(TaggingTranslator::default());

        let labels: Vec<_> = ["Products", "Vehicles", "Cart"]
            .into_iter()
            .map(|s| TranslatedText::mount(s, store.subscribe(), Arc::clone(&translator)))
            .collect();

        store.set_language(Language::TELUGU);

        for (label, source) in labels.iter().zip(["Products", "Vehicles", "Cart"]) {
            assert_eq!(
                label.resolved_for(Language::TELUGU).await,
                format!("[te] {}", source)
            );
        }
    }
}
