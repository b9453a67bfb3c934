/*!
 * Tests for sentence-aware text chunking
 */

use ronyaku::chunker::{ChunkSplitter, sentence_tokenize, split};

/// Test that a text fitting the budget comes back as one chunk
#[test]
fn test_split_withTextWithinBudget_shouldYieldSingleChunk() {
    let chunks = split("This is a pen. That is a dog.", 100);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].index, 0);
    assert_eq!(chunks[0].text, "This is a pen. That is a dog.");
}

/// Test that chunks close on sentence boundaries
#[test]
fn test_split_withTightBudget_shouldCloseOnSentenceBoundaries() {
    let chunks = split("This is a pen. That is a dog.", 15);
    let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["This is a pen.", "That is a dog."]);
}

/// Test that an oversized sentence is split on word boundaries
#[test]
fn test_split_withOversizedSentence_shouldFallBackToWords() {
    let text = "Supercalifragilistic expialidocious antidisestablishmentarianism.";
    let chunks = split(text, 20);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        // Word-level pieces respect the budget unless a single word exceeds it
        assert!(
            chunk.text.chars().count() <= 20
                || chunk.text.split_whitespace().count() == 1
        );
    }
    let rejoined: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rejoined.join(" "), text);
}

/// Test that a single token longer than the whole budget is force-emitted
/// instead of looping forever
#[test]
fn test_split_withTokenLongerThanBudget_shouldForceEmitAndTerminate() {
    let long_token = "x".repeat(50);
    let chunks = split(&long_token, 10);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, long_token);
}

/// Test that an oversized token between normal sentences never merges into a
/// chunk with other content
#[test]
fn test_split_withMixedOversizedToken_shouldIsolateIt() {
    let long_token = "y".repeat(30);
    let text = format!("Short one. {} Short two.", long_token);
    let chunks = split(&text, 12);
    assert!(chunks.iter().any(|c| c.text == long_token));
    for chunk in &chunks {
        if chunk.text.contains(&long_token) {
            assert_eq!(chunk.text, long_token);
        }
    }
}

/// Test that the split is deterministic for the same input
#[test]
fn test_split_withSameInput_shouldBeDeterministic() {
    let text = "One sentence here. Another sentence there. And a third one to finish.";
    assert_eq!(split(text, 25), split(text, 25));
}

/// Test that chunk indices are consecutive from zero
#[test]
fn test_split_withManyChunks_shouldNumberThemConsecutively() {
    let text = "A b c. D e f. G h i. J k l. M n o.";
    let chunks = split(text, 8);
    for (expected, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, expected);
    }
}

/// Test that empty and whitespace-only input yield no chunks
#[test]
fn test_split_withEmptyInput_shouldYieldNothing() {
    assert!(split("", 100).is_empty());
    assert!(split("   \n\t  ", 100).is_empty());
}

/// Test that a short text stays in one chunk at the default request size
#[test]
fn test_split_withDefaultRequestSize_shouldKeepShortTextWhole() {
    let chunks = split("This is a pen.", 5000);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "This is a pen.");
}

/// Test that a long text splits into multiple bounded chunks at the default
/// request size
#[test]
fn test_split_withLongText_shouldBoundEveryChunk() {
    let text = "This is sentence number one of the long body. ".repeat(260);
    assert!(text.chars().count() > 10_000);
    let chunks = split(&text, 5000);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 5000);
    }
}

/// Test sentence tokenization with western and CJK terminators
#[test]
fn test_sentence_tokenize_withMixedTerminators_shouldSplitOnBoth() {
    let sentences = sentence_tokenize("First one. 二つ目です。 Third?  Tail without stop");
    assert_eq!(
        sentences,
        vec!["First one.", "二つ目です。", "Third?", "Tail without stop"]
    );
}

/// Test that the splitter works lazily as an iterator
#[test]
fn test_chunk_splitter_asIterator_shouldYieldOnDemand() {
    let mut splitter = ChunkSplitter::new("One two. Three four.", 12);
    let first = splitter.next().unwrap();
    assert_eq!(first.text, "One two.");
    let second = splitter.next().unwrap();
    assert_eq!(second.text, "Three four.");
    assert!(splitter.next().is_none());
}
