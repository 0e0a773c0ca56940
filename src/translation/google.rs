use super::{parse_translation_response, TranslateError, Translator};
use crate::config::Config;
use crate::i18n::{Language, TranslationMetrics};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

/// Client for the free Google machine-translation endpoint.
///
/// One GET per call, no retries, transport-default timeout.
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    metrics: Arc<TranslationMetrics>,
}

impl GoogleTranslator {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            metrics,
        }
    }

    pub fn from_config(
        client: reqwest::Client,
        config: &Config,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self::new(client, &config.translate_api_url, metrics)
    }

    async fn request(&self, text: &str, target: Language) -> Result<String, TranslateError> {
        self.metrics.record_api_call();
        debug!(
            "Requesting {} translation ({} chars)",
            target.code(),
            text.chars().count()
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed = parse_translation_response(&body)?;

        Ok(parsed.text())
    }
}

impl Translator for GoogleTranslator {
    fn try_translate<'a>(
        &'a self,
        text: &'a str,
        target: Language,
    ) -> BoxFuture<'a, Result<String, TranslateError>> {
        Box::pin(async move {
            let result = self.request(text, target).await;
            if result.is_err() {
                self.metrics.record_api_failure();
            }
            result
        })
    }
}
