/*!
 * Journal crawlers and their registry.
 *
 * Each supported journal registers a crawler implementing a fixed capability
 * interface. Two crawl modes exist: structured-markup extraction from the
 * rendered page (Nature, ScienceDirect, Springer) and source-text extraction
 * from a downloaded e-print archive (arXiv). The registry is a compile-time
 * table; a journal is looked up by identifier or inferred from the URL.
 *
 * Crawlers degrade instead of aborting: a failed fetch or an extraction that
 * finds nothing produces an empty document and a log line, never an error.
 */

mod arxiv;
mod markup_crawlers;

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use log::warn;
use once_cell::sync::Lazy;
use scraper::Html;
use url::Url;

pub use arxiv::ArxivCrawler;
pub use markup_crawlers::{MarkupCrawler, MarkupRules};

use crate::document::Document;
use crate::errors::CrawlError;
use crate::fetch::{self, Fetcher, HttpFetcher};
use crate::markup;
use crate::session::BrowserSession;

/// Extraction strategy of a crawler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Extract title and sections from the rendered page markup
    StructuredMarkup,
    /// Download the source archive and extract from markup-language source
    SourceText,
}

/// Shared resources handed to a crawler for one document request.
pub struct CrawlContext {
    /// Downloads that bypass the browser session (arXiv e-prints)
    pub fetcher: Box<dyn Fetcher>,
    /// Directory for downloaded archives and extracted sources
    pub scratch_dir: PathBuf,
}

impl CrawlContext {
    pub fn new(client: reqwest::Client, scratch_dir: PathBuf) -> Self {
        CrawlContext {
            fetcher: Box::new(HttpFetcher::new(client)),
            scratch_dir,
        }
    }

    /// Context with a caller-supplied download implementation.
    pub fn with_fetcher(fetcher: Box<dyn Fetcher>, scratch_dir: PathBuf) -> Self {
        CrawlContext { fetcher, scratch_dir }
    }
}

/// A crawler for one journal source.
#[async_trait]
pub trait JournalCrawler: Send + Sync {
    /// Canonical journal identifier (e.g. `"nature"`).
    fn id(&self) -> &'static str;

    fn mode(&self) -> CrawlMode;

    /// Whether the journal renders article content client-side, so a plain
    /// HTTP fetch may miss the body.
    fn need_rendering(&self) -> bool {
        false
    }

    /// Fetch and extract, propagating failures to [`get_contents`] which
    /// turns them into a degraded document.
    ///
    /// [`get_contents`]: JournalCrawler::get_contents
    async fn crawl(
        &self,
        url: &str,
        session: &mut dyn BrowserSession,
        ctx: &CrawlContext,
    ) -> Result<Document, CrawlError>;

    /// Crawl `url`, degrading to an empty document on failure.
    async fn get_contents(
        &self,
        url: &str,
        session: &mut dyn BrowserSession,
        ctx: &CrawlContext,
    ) -> Document {
        match self.crawl(url, session, ctx).await {
            Ok(document) => document,
            Err(e) => {
                warn!("crawl of {} failed ({}); returning empty document", url, e);
                Document::empty()
            }
        }
    }
}

static CRAWLERS: Lazy<HashMap<&'static str, Box<dyn JournalCrawler>>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, Box<dyn JournalCrawler>> = HashMap::new();
    for rules in markup_crawlers::ALL_RULES {
        map.insert(rules.id, Box::new(MarkupCrawler::new(rules)));
    }
    map.insert("arxiv", Box::new(ArxivCrawler));
    map
});

/// Hosts that identify a journal without fetching the page.
static HOST2JOURNAL: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("arxiv.org", "arxiv"),
        ("www.nature.com", "nature"),
        ("www.sciencedirect.com", "sciencedirect"),
        ("linkinghub.elsevier.com", "sciencedirect"),
        ("link.springer.com", "springer"),
    ])
});

/// Site-identity meta markers mapped to journal identifiers. Checked against
/// `og:site_name` and `citation_publisher` of the fetched page.
static MARKER2JOURNAL: &[(&str, &str)] = &[
    ("nature", "nature"),
    ("sciencedirect", "sciencedirect"),
    ("elsevier", "sciencedirect"),
    ("springer", "springer"),
    ("arxiv", "arxiv"),
];

/// Look up a crawler by explicit identifier.
pub fn resolve(id: &str) -> Result<&'static dyn JournalCrawler, CrawlError> {
    CRAWLERS
        .get(id.to_lowercase().as_str())
        .map(|c| c.as_ref())
        .ok_or_else(|| CrawlError::UnknownJournal(id.to_string()))
}

/// Identifiers of all registered journals.
pub fn supported() -> Vec<&'static str> {
    let mut ids: Vec<_> = CRAWLERS.keys().copied().collect();
    ids.sort_unstable();
    ids
}

/// Infer the journal from a URL: known hosts are matched directly, anything
/// else is fetched once and identified from its site-identity meta markers.
pub async fn infer_journal(
    client: &reqwest::Client,
    url: &str,
) -> Result<&'static dyn JournalCrawler, CrawlError> {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(id) = parsed.host_str().and_then(|h| HOST2JOURNAL.get(h)) {
            return resolve(id);
        }
    }
    let (final_url, body) = fetch::fetch_text_with_url(client, url).await?;
    if let Ok(parsed) = Url::parse(&final_url) {
        if let Some(id) = parsed.host_str().and_then(|h| HOST2JOURNAL.get(h)) {
            return resolve(id);
        }
    }
    match journal_from_page(&body) {
        Some(id) => resolve(id),
        None => Err(CrawlError::Indistinguishable(url.to_string())),
    }
}

/// Identify the journal from a page's site-identity meta markers.
pub fn journal_from_page(body: &str) -> Option<&'static str> {
    let html = Html::parse_document(body);
    let marker = markup::meta_content(&html, "og:site_name")
        .or_else(|| markup::meta_content(&html, "citation_publisher"))?;
    let normalized = marker.to_lowercase();
    MARKER2JOURNAL
        .iter()
        .find(|(marker, _)| normalized.contains(marker))
        .map(|(_, id)| *id)
}
