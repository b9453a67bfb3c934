/*!
 * Structured-markup crawlers driven by per-journal extraction rules.
 *
 * Each journal is a [`MarkupRules`] descriptor: what to strip from the page,
 * where the title lives, which elements are sections, which attribute values
 * mark non-content sections (references, acknowledgements, rights), and where
 * a section keeps its headline. One [`MarkupCrawler`] implementation runs any
 * descriptor.
 */

use async_trait::async_trait;
use log::{debug, info};
use scraper::Html;

use crate::document::{Document, Section};
use crate::errors::CrawlError;
use crate::markup::{self, DEFAULT_EXCLUDED_TAGS};
use crate::session::BrowserSession;

use super::{CrawlContext, CrawlMode, JournalCrawler};

/// Extraction rules for one journal's article pages.
pub struct MarkupRules {
    pub id: &'static str,
    /// Elements removed from the page before extraction
    pub decompose_selectors: &'static [&'static str],
    pub title_selector: &'static str,
    pub section_selector: &'static str,
    /// Tried when the primary section selector matches nothing (older page
    /// layouts)
    pub fallback_section_selector: Option<&'static str>,
    /// Attribute inspected to drop non-content sections
    pub avoid_attr: &'static str,
    pub avoid_values: &'static [&'static str],
    /// Whether sections lacking the avoid attribute are kept
    pub keep_unlabelled: bool,
    /// Element carrying the section headline, searched within each section
    pub headline_selector: &'static str,
    /// Rewrite applied to the input URL before navigation
    pub rewrite_url: Option<fn(&str) -> String>,
    /// Whether the article body is rendered client-side, so a plain HTTP
    /// fetch may come back without it
    pub need_rendering: bool,
}

/// Non-content section markers shared by Nature-platform journals.
const NATURE_AVOID_LABELS: &[&str] = &[
    "Ack1",
    "Bib1",
    "additional-information",
    "article-comments",
    "article-info",
    "author-information",
    "ethics",
    "further-reading",
    "rightslink",
];

pub static NATURE_RULES: MarkupRules = MarkupRules {
    id: "nature",
    decompose_selectors: &[
        "a.c-article__pill-button",
        "div#MagazineFulltextArticleBodySuffix",
        "div#Bib1-section",
        "div#Ack1-section",
        "div#author-information-section",
        "div#ethics-section",
        "div#additional-information-section",
        "div#rightslink-section",
        "div#article-info",
        "div#further-reading-section",
    ],
    title_selector: "h1.c-article-title",
    section_selector: "section",
    fallback_section_selector: Some("div.c-article-section__content"),
    avoid_attr: "aria-labelledby",
    avoid_values: NATURE_AVOID_LABELS,
    keep_unlabelled: true,
    headline_selector: "h2",
    rewrite_url: None,
    need_rendering: false,
};

pub static SCIENCEDIRECT_RULES: MarkupRules = MarkupRules {
    id: "sciencedirect",
    decompose_selectors: &["ol.links-for-figure"],
    title_selector: "span.title-text",
    section_selector: "div.Abstracts, div#body section",
    fallback_section_selector: None,
    avoid_attr: "aria-labelledby",
    avoid_values: &[],
    keep_unlabelled: true,
    headline_selector: "h2",
    rewrite_url: Some(sciencedirect_full_text_url),
    need_rendering: true,
};

pub static SPRINGER_RULES: MarkupRules = MarkupRules {
    id: "springer",
    decompose_selectors: &[],
    title_selector: "h1.c-article-title",
    section_selector: "section",
    fallback_section_selector: None,
    avoid_attr: "aria-labelledby",
    avoid_values: NATURE_AVOID_LABELS,
    keep_unlabelled: false,
    headline_selector: "h2",
    rewrite_url: None,
    need_rendering: false,
};

pub static ALL_RULES: &[&MarkupRules] = &[&NATURE_RULES, &SCIENCEDIRECT_RULES, &SPRINGER_RULES];

/// ScienceDirect abstract URLs render without the article body.
fn sciencedirect_full_text_url(url: &str) -> String {
    url.replace("/abs/", "/")
}

/// Runs a [`MarkupRules`] descriptor against a rendered page.
pub struct MarkupCrawler {
    rules: &'static MarkupRules,
}

impl MarkupCrawler {
    pub fn new(rules: &'static MarkupRules) -> Self {
        MarkupCrawler { rules }
    }
}

#[async_trait]
impl JournalCrawler for MarkupCrawler {
    fn id(&self) -> &'static str {
        self.rules.id
    }

    fn mode(&self) -> CrawlMode {
        CrawlMode::StructuredMarkup
    }

    fn need_rendering(&self) -> bool {
        self.rules.need_rendering
    }

    async fn crawl(
        &self,
        url: &str,
        session: &mut dyn BrowserSession,
        _ctx: &CrawlContext,
    ) -> Result<Document, CrawlError> {
        let page_url = match self.rules.rewrite_url {
            Some(rewrite) => rewrite(url),
            None => url.to_string(),
        };
        session.navigate(&page_url).await?;
        let source = session.page_source().await?;
        info!("extracting '{}' content from {}", self.rules.id, session.current_url());
        extract_document(&source, self.rules)
    }
}

/// Parse the page and apply the descriptor. Synchronous on purpose: the
/// parsed DOM must not be held across an await point.
fn extract_document(source: &str, rules: &MarkupRules) -> Result<Document, CrawlError> {
    let mut html = Html::parse_document(source);
    for sel in rules.decompose_selectors {
        let removed = markup::decompose(&mut html, sel)?;
        if removed > 0 {
            debug!("decomposed {} '{}' element(s)", removed, sel);
        }
    }

    let title = markup::first_text(&html, rules.title_selector, DEFAULT_EXCLUDED_TAGS)?
        .unwrap_or_default();

    let section_sel = markup::selector(rules.section_selector)?;
    let headline_sel = markup::selector(rules.headline_selector)?;
    let mut elements: Vec<_> = html
        .select(&section_sel)
        .filter(|el| match el.value().attr(rules.avoid_attr) {
            Some(value) => !rules.avoid_values.contains(&value),
            None => rules.keep_unlabelled,
        })
        .collect();
    if elements.is_empty() {
        if let Some(fallback) = rules.fallback_section_selector {
            let sel = markup::selector(fallback)?;
            elements = html.select(&sel).collect();
        }
    }

    let mut sections = Vec::new();
    for element in elements {
        let headline = element
            .select(&headline_sel)
            .next()
            .map(|h| markup::visible_text(h, DEFAULT_EXCLUDED_TAGS))
            .unwrap_or_default();
        let body = markup::visible_text(element, DEFAULT_EXCLUDED_TAGS);
        let body = markup::strip_headline_prefix(&body, &headline);
        if headline.is_empty() && body.is_empty() {
            continue;
        }
        sections.push(Section::new(headline, body));
    }
    debug!("extracted {} section(s), title '{}'", sections.len(), title);
    Ok(Document::new(title, sections))
}
