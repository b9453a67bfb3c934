/*!
 * End-to-end pipeline: resolve the journal, run the gateway passthrough,
 * crawl the paper, translate each section and render the bilingual output.
 *
 * The pipeline degrades wherever the data allows: a failed crawl
 * yields an empty document, a failed section translation yields an empty
 * translation, and the rendered output always carries one translated entry
 * per crawled section.
 */

use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::app_config::Config;
use crate::document::{Document, TranslatedSection};
use crate::errors::{AppError, TranslationError};
use crate::fetch;
use crate::gateways::{self, Credentials};
use crate::journals::{self, CrawlContext, JournalCrawler};
use crate::render;
use crate::session::{BrowserSession, DriverKind, HttpSession, RemoteSession, probe_driver};
use crate::translators::{self, Translator};

/// Composes gateway, crawler, translator and renderer for one run.
pub struct Pipeline {
    config: Config,
    credentials: Credentials,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let credentials = Credentials::new();
        Pipeline { config, credentials, cancel: CancellationToken::new() }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Token callers can use to stop the run; honored at section and chunk
    /// boundaries and inside every polling loop.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the full pipeline for one paper URL. Returns the path of the
    /// rendered HTML (or PDF when configured).
    pub async fn run(&self, url: &str) -> Result<PathBuf, AppError> {
        if local_pdf_path(url) {
            return Err(AppError::Config(format!(
                "'{}' looks like a local PDF file; PDF input is not supported, \
                 pass the article or abstract page URL instead",
                url
            )));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(self.config.session.connect_timeout())
            .timeout(self.config.session.request_timeout())
            .cookie_store(true)
            .build()
            .unwrap_or_default();

        let crawler = self.resolve_crawler(&client, url).await?;
        info!("journal: {}", crawler.id());

        let (mut session, driver) = self.open_session().await;
        if driver == DriverKind::Http && crawler.need_rendering() {
            warn!(
                "journal '{}' renders its article body client-side; plain http \
                 fetches may come back without it",
                crawler.id()
            );
        }

        let gateway = gateways::get(&self.config.gateway)?;
        let rewriter = gateway
            .passthrough(session.as_mut(), crawler.id(), &self.credentials)
            .await?;
        let cano_url = fetch::canonicalize(&client, url).await;
        let target_url = rewriter.rewrite(&cano_url);
        if target_url != cano_url {
            info!("gateway '{}' rewrote target to {}", gateway.id(), target_url);
        }

        let scratch = tempfile::tempdir()?;
        let ctx = CrawlContext::new(client, scratch.path().to_path_buf());
        let document = crawler.get_contents(&target_url, session.as_mut(), &ctx).await;
        info!(
            "crawled '{}': {} section(s)",
            document.title,
            document.sections.len()
        );

        let translated = self.translate_document(session.as_mut(), &document).await?;

        let out_dir = self.config.output.resolved_out_dir();
        let html_path = render::write_html(&out_dir, &document.title, &translated)?;
        if self.config.output.pdf {
            return render::html_to_pdf(&html_path, self.config.output.delete_html).await;
        }
        Ok(html_path)
    }

    async fn resolve_crawler(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<&'static dyn JournalCrawler, AppError> {
        if self.config.journal.is_empty() {
            Ok(journals::infer_journal(client, url).await?)
        } else {
            Ok(journals::resolve(&self.config.journal)?)
        }
    }

    /// Open the browser session: a WebDriver session when the configured
    /// endpoint answers, plain HTTP fetches otherwise. The resolved driver
    /// kind is reported so callers can diagnose rendering mismatches.
    async fn open_session(&self) -> (Box<dyn BrowserSession>, DriverKind) {
        let session_cfg = &self.config.session;
        if probe_driver(&session_cfg.webdriver_url).await == DriverKind::Remote {
            match RemoteSession::connect(&session_cfg.webdriver_url, session_cfg.load_wait()).await
            {
                Ok(session) => return (Box::new(session), DriverKind::Remote),
                Err(e) => warn!("webdriver session failed ({}); using http fetches", e),
            }
        }
        let session = HttpSession::new(
            session_cfg.connect_timeout(),
            session_cfg.request_timeout(),
        );
        (Box::new(session), DriverKind::Http)
    }

    /// Translate every section, attaching an empty translation where a
    /// section fails so original and translated sections stay 1:1.
    async fn translate_document(
        &self,
        session: &mut dyn BrowserSession,
        document: &Document,
    ) -> Result<Vec<TranslatedSection>, AppError> {
        let backend = translators::get(&self.config.translator)?;
        let mut translator = Translator::new(
            backend,
            self.config.source_language.clone(),
            self.config.target_language.clone(),
            self.config.translation.max_chars,
            self.config.translation.polling_policy(),
            self.cancel.clone(),
        );

        let progress = ProgressBar::new(document.sections.len() as u64);
        progress.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.enable_steady_tick(Duration::from_millis(120));

        let mut translated = Vec::with_capacity(document.sections.len());
        for section in &document.sections {
            progress.set_message(section.headline.clone());
            let text = match translator.translate(session, &section.body).await {
                Ok(text) => text,
                Err(TranslationError::Cancelled) => {
                    progress.abandon_with_message("cancelled");
                    return Err(TranslationError::Cancelled.into());
                }
                Err(e) => {
                    warn!(
                        "translation of section '{}' failed ({}); keeping original only",
                        section.headline, e
                    );
                    String::new()
                }
            };
            translated.push(TranslatedSection { section: section.clone(), translated: text });
            progress.inc(1);
        }
        progress.finish_with_message("translated");
        Ok(translated)
    }
}

/// A local filesystem path to a PDF. These are not an accepted input: only
/// journal page and arXiv URLs are (arXiv PDF URLs stay valid, their number
/// resolves to the e-print archive).
fn local_pdf_path(input: &str) -> bool {
    if !input.to_ascii_lowercase().ends_with(".pdf") {
        return false;
    }
    match Url::parse(input) {
        Ok(parsed) => parsed.scheme() == "file",
        Err(_) => true,
    }
}
