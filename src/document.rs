/*!
 * Document model shared by crawlers, translator and renderer.
 */

use serde::{Deserialize, Serialize};

/// A titled body of text within a document; the unit of translation.
/// Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section heading, possibly empty for untitled leading content
    pub headline: String,
    /// Section body text in the source language
    pub body: String,
}

impl Section {
    pub fn new(headline: impl Into<String>, body: impl Into<String>) -> Self {
        Section { headline: headline.into(), body: body.into() }
    }
}

/// A section paired with its translation. `translated` is the empty string
/// when every chunk of the section failed to translate; the section itself
/// is never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedSection {
    pub section: Section,
    pub translated: String,
}

/// A crawled paper: title plus sections in natural reading order.
/// Produced once per crawl and only consumed afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new(title: impl Into<String>, sections: Vec<Section>) -> Self {
        Document { title: title.into(), sections }
    }

    /// Degraded result for failed fetches: empty title, no sections.
    pub fn empty() -> Self {
        Document::default()
    }
}
