/*!
 * Tests for LaTeX-to-plain-text conversion
 */

use ronyaku::latex;

const SAMPLE: &str = r"\documentclass{article}
\title{Attention Is All You Need}
\begin{document}
\maketitle
% a comment line
\section{Introduction}
Recurrent models~\cite{lstm} factor computation along positions.
\subsection{Background}
See \ref{sec:model} for details.
\section*{Conclusion}
We presented the \textbf{Transformer}.
\end{document}";

/// Test title extraction from the \title command
#[test]
fn test_title_withTitleCommand_shouldExtractArgument() {
    assert_eq!(latex::title(SAMPLE).as_deref(), Some("Attention Is All You Need"));
    assert_eq!(latex::title("no title here"), None);
}

/// Test that sectioning commands become section marks
#[test]
fn test_to_plain_text_withSections_shouldEmitSectionMarks() {
    let text = latex::to_plain_text(SAMPLE);
    assert!(text.contains("§ Introduction"));
    assert!(text.contains("§.§ Background"));
    assert!(text.contains("§ Conclusion"));
}

/// Test that citations, references and comments are stripped
#[test]
fn test_to_plain_text_withNoise_shouldStripIt() {
    let text = latex::to_plain_text(SAMPLE);
    assert!(!text.contains("<cit.>"));
    assert!(!text.contains("<ref>"));
    assert!(!text.contains("a comment line"));
    assert!(!text.contains(r"\cite"));
    assert!(!text.contains(r"\begin"));
}

/// Test that formatting wrappers are unwrapped to their argument
#[test]
fn test_to_plain_text_withWrappers_shouldKeepArguments() {
    let text = latex::to_plain_text(SAMPLE);
    assert!(text.contains("Transformer"));
    assert!(!text.contains(r"\textbf"));
}

/// Test that the preamble does not leak into the output
#[test]
fn test_to_plain_text_withPreamble_shouldDropIt() {
    let text = latex::to_plain_text(SAMPLE);
    assert!(!text.contains("documentclass"));
}

/// Test section splitting with subsection normalization
#[test]
fn test_split_sections_withSubsections_shouldNormalizeMarks() {
    let text = "Intro prose.\n§ One\nbody one\n§.§ One-sub\nbody sub\n§ Two\nbody two";
    let sections = latex::split_sections(text);
    assert_eq!(sections.len(), 4);
    assert!(sections[0].starts_with("Intro prose."));
    assert!(sections[1].starts_with("One"));
    assert!(sections[2].starts_with("One-sub"));
    assert!(sections[3].starts_with("Two"));
}

/// Test that empty segments are dropped
#[test]
fn test_split_sections_withEmptySegments_shouldDropThem() {
    assert!(latex::split_sections("").is_empty());
    assert_eq!(latex::split_sections("§§ Only\ncontent").len(), 1);
}
