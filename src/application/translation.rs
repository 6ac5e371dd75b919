//! Text localization use case

use std::collections::HashMap;
use std::sync::Mutex;

use futures::future::join_all;

use super::ports::Translator;

/// Language the interview service authors its texts in
pub const SOURCE_LANGUAGE: &str = "lt";

/// Longest text prefix that participates in a cache key. Question and
/// summary texts fit well under this; anything longer keys on its
/// prefix, which is accepted for texts of this shape.
const MAX_KEY_TEXT_LEN: usize = 200;

/// Process-wide memo of localized texts.
///
/// Read-through and content-addressed: a hit returns the stored
/// rendition, a miss fires one request through the translator, and a
/// failed request falls back to the source text without storing
/// anything so a later call retries. Two concurrent identical misses
/// may both fire; the last write wins, which is accepted for idempotent
/// translations.
#[derive(Default)]
pub struct TranslationCache {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored renditions
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Stored rendition for a text, if one is cached
    pub fn peek(&self, text: &str, target: &str) -> Option<String> {
        self.lock().get(&Self::key(text, target)).cloned()
    }

    /// Localize one text; never fails. Source-language targets pass
    /// through untouched and failures degrade to the source text.
    pub async fn localize<T>(&self, translator: &T, text: &str, target: &str) -> String
    where
        T: Translator + ?Sized,
    {
        if target == SOURCE_LANGUAGE || text.trim().is_empty() {
            return text.to_string();
        }

        let key = Self::key(text, target);
        if let Some(hit) = self.lock().get(&key).cloned() {
            return hit;
        }

        match translator.translate(text, target).await {
            Ok(translated) => {
                self.lock().insert(key, translated.clone());
                translated
            }
            Err(err) => {
                tracing::debug!(error = %err, "localization fell back to source text");
                text.to_string()
            }
        }
    }

    /// Localize a batch concurrently, preserving order
    pub async fn localize_all<T>(&self, translator: &T, texts: &[String], target: &str) -> Vec<String>
    where
        T: Translator + ?Sized,
    {
        join_all(
            texts
                .iter()
                .map(|text| self.localize(translator, text, target)),
        )
        .await
    }

    fn key(text: &str, target: &str) -> (String, String) {
        let prefix: String = text.chars().take(MAX_KEY_TEXT_LEN).collect();
        (target.to_string(), prefix)
    }

    // The map holds only owned strings, so a poisoned lock cannot hold
    // a half-applied update; recover instead of propagating the panic.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), String>> {
        self.entries.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}
