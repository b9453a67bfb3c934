/*!
 * Web translation backends driven through a browser session.
 *
 * A backend is a descriptor: how to build the translation URL for a language
 * pair and query, where the translated text appears in the rendered page, and
 * which marker means the backend is still rendering. The [`Translator`] runs
 * the polling loop: chunk the input, navigate once per chunk, then poll the
 * page source on a fixed interval for a bounded number of trials.
 *
 * Exhausting the trials is not an error. The last candidate (possibly empty)
 * is accepted and logged; the pipeline degrades rather than aborts.
 */

use std::time::Duration;

use log::{debug, warn};
use scraper::Html;
use tokio_util::sync::CancellationToken;

use crate::chunker;
use crate::errors::TranslationError;
use crate::markup::{self, DEFAULT_EXCLUDED_TAGS};
use crate::session::BrowserSession;

/// A web translation backend.
pub struct BackendDescriptor {
    pub id: &'static str,
    /// URL template with `{from}`, `{to}` and `{query}` placeholders
    url_fmt: &'static str,
    /// Selector for the element carrying the translated text
    extraction_selector: &'static str,
    /// Suffix the backend shows while a translation is still rendering
    truncation_marker: Option<&'static str>,
}

impl BackendDescriptor {
    /// Build the translation URL for one percent-encoded chunk.
    pub fn translation_url(&self, from_lang: &str, to_lang: &str, query: &str) -> String {
        self.url_fmt
            .replace("{from}", from_lang)
            .replace("{to}", to_lang)
            .replace("{query}", &urlencoding::encode(query))
    }

    /// Pull the current translation candidate out of the page source.
    /// An absent element is an empty candidate, not an error.
    fn extract_candidate(&self, source: &str) -> String {
        let html = Html::parse_document(source);
        markup::first_text(&html, self.extraction_selector, DEFAULT_EXCLUDED_TAGS)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Whether `candidate` is a complete translation: non-empty, not ending
    /// in the backend's truncation marker, and not a prefix of the previous
    /// chunk's translation still showing in the page.
    fn is_complete(&self, candidate: &str, previous: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        if let Some(marker) = self.truncation_marker {
            if candidate.ends_with(marker) {
                return false;
            }
        }
        !previous.starts_with(candidate)
    }
}

static BACKENDS: &[BackendDescriptor] = &[
    BackendDescriptor {
        id: "deepl",
        url_fmt: "https://www.deepl.com/en/translator#{from}/{to}/{query}",
        extraction_selector: "button.lmt__translations_as_text__text_btn",
        truncation_marker: Some("[...]"),
    },
    BackendDescriptor {
        id: "google",
        url_fmt: "https://translate.google.co.jp/#{from}/{to}/{query}",
        extraction_selector: "span.tlid-translation",
        truncation_marker: None,
    },
];

/// Look up a backend by identifier.
pub fn get(id: &str) -> Result<&'static BackendDescriptor, TranslationError> {
    let wanted = id.to_lowercase();
    BACKENDS
        .iter()
        .find(|b| b.id == wanted)
        .ok_or_else(|| TranslationError::UnknownBackend(id.to_string()))
}

/// Identifiers of all registered backends.
pub fn supported() -> Vec<&'static str> {
    BACKENDS.iter().map(|b| b.id).collect()
}

/// Timing of the per-chunk polling loop.
#[derive(Debug, Clone)]
pub struct PollingPolicy {
    /// Delay between page-source polls
    pub interval: Duration,
    /// Upper bound on polls per chunk
    pub trials: u32,
    /// Pause between consecutive chunks, giving the backend time to settle
    pub chunk_pause: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        PollingPolicy {
            interval: Duration::from_secs(1),
            trials: 30,
            chunk_pause: Duration::from_secs(1),
        }
    }
}

/// State of the per-chunk polling loop. `Satisfied` and `TrialsExhausted`
/// are both terminal and both yield the current candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    Requesting,
    Polling { trial: u32 },
    Satisfied,
    TrialsExhausted,
}

/// Translates text chunk by chunk through a browser session.
pub struct Translator {
    backend: &'static BackendDescriptor,
    from_lang: String,
    to_lang: String,
    max_chars: usize,
    policy: PollingPolicy,
    cancel: CancellationToken,
    /// Translation accepted for the previous chunk. The page can still show
    /// it right after navigation, so a candidate matching a prefix of it is
    /// stale, not complete.
    cache: String,
}

impl Translator {
    pub fn new(
        backend: &'static BackendDescriptor,
        from_lang: impl Into<String>,
        to_lang: impl Into<String>,
        max_chars: usize,
        policy: PollingPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Translator {
            backend,
            from_lang: from_lang.into(),
            to_lang: to_lang.into(),
            max_chars,
            policy,
            cancel,
            cache: String::new(),
        }
    }

    pub fn backend_id(&self) -> &'static str {
        self.backend.id
    }

    /// Translate `text`: chunk, then translate each chunk in order and
    /// concatenate. Cancellation is honored at every chunk boundary and poll
    /// iteration.
    pub async fn translate(
        &mut self,
        session: &mut dyn BrowserSession,
        text: &str,
    ) -> Result<String, TranslationError> {
        let chunks = chunker::split(text, self.max_chars);
        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            if self.cancel.is_cancelled() {
                return Err(TranslationError::Cancelled);
            }
            let piece = self.translate_chunk(session, &chunk.text).await?;
            self.cache = piece.clone();
            translated.push(piece);
            self.pause(self.policy.chunk_pause).await?;
        }
        Ok(translated.concat())
    }

    async fn translate_chunk(
        &mut self,
        session: &mut dyn BrowserSession,
        query: &str,
    ) -> Result<String, TranslationError> {
        let url = self
            .backend
            .translation_url(&self.from_lang, &self.to_lang, query);
        let mut state = ChunkState::Requesting;
        let mut candidate = String::new();
        loop {
            state = match state {
                ChunkState::Requesting => {
                    // Fragment-only URL changes do not trigger a reload, so
                    // refresh before navigating.
                    session.refresh().await?;
                    session.navigate(&url).await?;
                    ChunkState::Polling { trial: 0 }
                }
                ChunkState::Polling { trial } if trial < self.policy.trials => {
                    self.pause(self.policy.interval).await?;
                    candidate = self.backend.extract_candidate(&session.page_source().await?);
                    debug!(
                        "{} trial {}/{}: {} chars",
                        self.backend.id,
                        trial + 1,
                        self.policy.trials,
                        candidate.len()
                    );
                    if self.backend.is_complete(&candidate, &self.cache) {
                        ChunkState::Satisfied
                    } else {
                        ChunkState::Polling { trial: trial + 1 }
                    }
                }
                ChunkState::Polling { .. } => ChunkState::TrialsExhausted,
                ChunkState::Satisfied => return Ok(candidate),
                ChunkState::TrialsExhausted => {
                    warn!(
                        "{}: no complete translation after {} trial(s), accepting {} chars",
                        self.backend.id,
                        self.policy.trials,
                        candidate.len()
                    );
                    return Ok(candidate);
                }
            };
        }
    }

    /// Sleep that wakes early on cancellation.
    async fn pause(&self, duration: Duration) -> Result<(), TranslationError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(TranslationError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
