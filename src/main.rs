use agri_bazaar::config::Config;
use agri_bazaar::i18n::{Language, LanguageRegistry, LanguageStore, TranslationMetrics};
use agri_bazaar::text::TranslatedText;
use agri_bazaar::translation::translator_from_config;
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::info;

fn print_usage() {
    eprintln!("Usage: agri-bazaar <language-code> <text>...\n");
    eprintln!("Languages:");
    for lang in LanguageRegistry::get().list_enabled() {
        eprintln!("  {}  {} ({})", lang.code, lang.native_name, lang.select_prompt);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout carries only the rendered text
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agri_bazaar=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((code, texts)) = args.split_first().filter(|(_, texts)| !texts.is_empty()) else {
        print_usage();
        bail!("expected a language code followed by at least one text");
    };

    let target = Language::from_code(code)?;
    let config = Config::from_env()?;

    let metrics = Arc::new(TranslationMetrics::new());
    let translator = translator_from_config(reqwest::Client::new(), &config, Arc::clone(&metrics));
    let store = LanguageStore::from_config(&config);

    info!(
        "Rendering {} labels, switching from {} to {}",
        texts.len(),
        store.current().name(),
        target.name()
    );

    let labels: Vec<TranslatedText> = texts
        .iter()
        .map(|text| TranslatedText::mount(text.as_str(), store.subscribe(), Arc::clone(&translator)))
        .collect();

    store.set_language(target);

    for label in &labels {
        println!("{}", label.resolved_for(target).await);
    }

    let report = metrics.report();
    info!(
        "Translation stats: {} API calls ({} failed), cache hit rate {:.1}%",
        report.api_calls, report.api_failures, report.cache_hit_rate
    );

    Ok(())
}
