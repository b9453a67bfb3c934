/*!
 * Best-effort LaTeX-to-plain-text conversion.
 *
 * Good enough for feeding a translation backend: sectioning commands become
 * `§` markers the arXiv crawler splits on, citation/reference commands become
 * noise markers that are stripped afterwards, formatting commands are
 * unwrapped to their argument.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Noise markers removed from converted text before sectioning.
pub const NOISE_MARKERS: &[&str] = &["<cit.>", "<ref>", "\u{a0}"];

/// Section delimiter emitted for `\section`; subsections get `§.§`.
pub const SECTION_MARK: &str = "§";

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)(^|[^\\])%.*$").unwrap());
static SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\section\*?\{([^}]*)\}").unwrap());
static SUBSECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:sub)+section\*?\{([^}]*)\}").unwrap());
static CITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\cite[tp]?\*?(?:\[[^\]]*\])?\{[^}]*\}").unwrap());
static REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:auto|eq|c)?ref\*?\{[^}]*\}").unwrap());
static LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:label|footnote|url|href)\{[^}]*\}").unwrap());
static ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:begin|end)\{[^}]*\}").unwrap());
static WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:emph|textbf|textit|texttt|textsc|text|mathrm|title)\{([^{}]*)\}").unwrap()
});
static COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[a-zA-Z]+\*?").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{3000}]+").unwrap());

/// Extract the `\title{...}` argument, if present.
pub fn title(tex: &str) -> Option<String> {
    static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\title\{([^}]*)\}").unwrap());
    TITLE.captures(tex).map(|c| c[1].trim().to_string())
}

/// Convert LaTeX source to plain text.
pub fn to_plain_text(tex: &str) -> String {
    // Preamble carries no prose.
    let body = match tex.find(r"\begin{document}") {
        Some(pos) => &tex[pos..],
        None => tex,
    };
    let mut text = COMMENT.replace_all(body, "$1").into_owned();
    text = SUBSECTION.replace_all(&text, format!("\n{SECTION_MARK}.{SECTION_MARK} $1\n")).into_owned();
    text = SECTION.replace_all(&text, format!("\n{SECTION_MARK} $1\n")).into_owned();
    text = CITE.replace_all(&text, "<cit.>").into_owned();
    text = REF.replace_all(&text, "<ref>").into_owned();
    text = LABEL.replace_all(&text, "").into_owned();
    text = ENV.replace_all(&text, "").into_owned();
    // Unwrap formatting commands, innermost first.
    loop {
        let next = WRAPPER.replace_all(&text, "$1").into_owned();
        if next == text {
            break;
        }
        text = next;
    }
    text = COMMAND.replace_all(&text, "").into_owned();
    text = text.replace(['{', '}', '~'], " ");
    for marker in NOISE_MARKERS {
        text = text.replace(marker, "");
    }
    SPACES.replace_all(&text, " ").trim().to_string()
}

/// Split converted text into `§`-delimited segments, normalizing subsection
/// marks down to section marks first. Empty segments are dropped.
pub fn split_sections(text: &str) -> Vec<String> {
    text.replace(&format!("{SECTION_MARK}.{SECTION_MARK}"), SECTION_MARK)
        .split(SECTION_MARK)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
