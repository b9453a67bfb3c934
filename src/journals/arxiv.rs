/*!
 * Source-text crawler for arXiv.
 *
 * Section text comes from the downloaded e-print archive: extract the TeX
 * sources, convert to plain text and split on section marks. The title comes
 * from the rendered abstract page, falling back to the `\title` command when
 * the page yields nothing.
 */

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::archive;
use crate::document::{Document, Section};
use crate::errors::CrawlError;
use crate::latex;
use crate::markup::{self, DEFAULT_EXCLUDED_TAGS};
use crate::session::BrowserSession;

use super::{CrawlContext, CrawlMode, JournalCrawler};

static ARXIV_NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+/((?:\d|\.|v)+)(?:\.pdf)?$").unwrap());

pub struct ArxivCrawler;

impl ArxivCrawler {
    /// Extract the arXiv number from an abstract, PDF or e-print URL.
    pub fn arxiv_no(url: &str) -> Option<String> {
        ARXIV_NO.captures(url).map(|c| c[1].to_string())
    }

    pub fn abs_url(arxiv_no: &str) -> String {
        format!("https://arxiv.org/abs/{}", arxiv_no)
    }

    pub fn eprint_url(arxiv_no: &str) -> String {
        format!("https://arxiv.org/e-print/{}", arxiv_no)
    }

    async fn title_from_abs_page(
        &self,
        session: &mut dyn BrowserSession,
        abs_url: &str,
    ) -> Result<Option<String>, CrawlError> {
        session.navigate(abs_url).await?;
        let source = session.page_source().await?;
        let html = Html::parse_document(&source);
        let title = markup::first_text(&html, "h1.title", DEFAULT_EXCLUDED_TAGS)?
            .map(|t| t.trim_start_matches("Title:").trim().to_string());
        Ok(title)
    }
}

#[async_trait]
impl JournalCrawler for ArxivCrawler {
    fn id(&self) -> &'static str {
        "arxiv"
    }

    fn mode(&self) -> CrawlMode {
        CrawlMode::SourceText
    }

    async fn crawl(
        &self,
        url: &str,
        session: &mut dyn BrowserSession,
        ctx: &CrawlContext,
    ) -> Result<Document, CrawlError> {
        let arxiv_no = Self::arxiv_no(url)
            .ok_or_else(|| CrawlError::Extraction(format!("no arXiv number in {}", url)))?;
        info!("crawling arXiv paper {}", arxiv_no);

        let archive_path = ctx
            .fetcher
            .download(&Self::eprint_url(&arxiv_no), &ctx.scratch_dir)
            .await?;
        let tex_dir = ctx.scratch_dir.join(format!("{}-src", arxiv_no));
        let mut tex_files = archive::extract_sources(&archive_path, &tex_dir, ".tex")?;
        tex_files.sort();
        let mut tex = String::new();
        for path in &tex_files {
            tex.push_str(&std::fs::read_to_string(path)?);
            tex.push('\n');
        }
        debug!("read {} tex file(s), {} bytes", tex_files.len(), tex.len());

        let text = latex::to_plain_text(&tex);
        let sections = sections_from_text(&text);

        // The rendered abstract page has the authoritative title; the TeX
        // \title command is the fallback.
        let title = match self.title_from_abs_page(session, &Self::abs_url(&arxiv_no)).await {
            Ok(Some(title)) => title,
            _ => latex::title(&tex).unwrap_or_default(),
        };

        Ok(Document::new(title, sections))
    }
}

/// Split converted source text into sections: the first line of each
/// `§`-delimited segment is the headline, the remainder the body.
fn sections_from_text(text: &str) -> Vec<Section> {
    latex::split_sections(text)
        .into_iter()
        .map(|segment| match segment.split_once('\n') {
            Some((headline, body)) => Section::new(headline.trim(), body.trim()),
            None => Section::new("", segment.trim()),
        })
        .filter(|s| !s.headline.is_empty() || !s.body.is_empty())
        .collect()
}
