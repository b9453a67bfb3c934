/*!
 * HTML extraction helpers on top of the scraper crate.
 *
 * Crawlers describe what to extract as CSS selector strings; these helpers
 * compile the selectors, pull visible text while skipping excluded subtrees,
 * and read site-identity meta markers.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::errors::CrawlError;

/// Tags whose text never belongs in extracted content.
pub const DEFAULT_EXCLUDED_TAGS: &[&str] =
    &["script", "style", "noscript", "link", "meta", "button", "sup"];

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\u{3000}]+").unwrap());

/// Remove every element matching `selector_source` from the parsed document.
/// Returns how many elements were detached.
pub fn decompose(html: &mut Html, selector_source: &str) -> Result<usize, CrawlError> {
    let sel = selector(selector_source)?;
    let ids: Vec<_> = html.select(&sel).map(|el| el.id()).collect();
    let count = ids.len();
    for id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
    Ok(count)
}

/// Compile a CSS selector, mapping failure to an extraction error.
pub fn selector(source: &str) -> Result<Selector, CrawlError> {
    Selector::parse(source)
        .map_err(|e| CrawlError::Extraction(format!("bad selector '{}': {:?}", source, e)))
}

/// Collapse runs of whitespace and trim, the way page text is normalized
/// everywhere in the pipeline.
pub fn str_strip(text: &str) -> String {
    SPACES.replace_all(text, " ").trim().to_string()
}

/// Visible text of an element, skipping subtrees of excluded tags.
pub fn visible_text(element: ElementRef<'_>, excluded_tags: &[&str]) -> String {
    let mut out = String::new();
    collect_text(*element, excluded_tags, &mut out);
    str_strip(&out)
}

fn collect_text(node: ego_tree::NodeRef<'_, Node>, excluded_tags: &[&str], out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if !excluded_tags.contains(&element.name()) {
                    collect_text(child, excluded_tags, out);
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Text of the first element matching `selector_source`, if any.
pub fn first_text(
    html: &Html,
    selector_source: &str,
    excluded_tags: &[&str],
) -> Result<Option<String>, CrawlError> {
    let sel = selector(selector_source)?;
    Ok(html
        .select(&sel)
        .next()
        .map(|el| visible_text(el, excluded_tags))
        .filter(|t| !t.is_empty()))
}

/// Read the content of a `<meta>` tag by `name` or `property` attribute.
pub fn meta_content(html: &Html, key: &str) -> Option<String> {
    let sel = Selector::parse("meta").ok()?;
    for el in html.select(&sel) {
        let matches = el.value().attr("name") == Some(key)
            || el.value().attr("property") == Some(key);
        if matches {
            if let Some(content) = el.value().attr("content") {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
    }
    None
}

/// Strip a duplicated headline prefix from a section body.
pub fn strip_headline_prefix(body: &str, headline: &str) -> String {
    if !headline.is_empty() {
        if let Some(rest) = body.strip_prefix(headline) {
            return rest.trim_start().to_string();
        }
    }
    body.to_string()
}
