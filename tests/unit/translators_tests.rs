/*!
 * Tests for translation backends and the polling loop
 */

use std::time::Duration;

use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use ronyaku::errors::TranslationError;
use ronyaku::translators::{self, PollingPolicy, Translator};

use crate::common::mock_session::MockSession;

fn fast_policy(trials: u32) -> PollingPolicy {
    PollingPolicy {
        interval: Duration::from_millis(1),
        trials,
        chunk_pause: Duration::from_millis(1),
    }
}

fn deepl_page(text: &str) -> String {
    format!(
        r#"<html><body><button class="lmt__translations_as_text__text_btn">{}</button></body></html>"#,
        text
    )
}

fn make_translator(backend: &str, max_chars: usize, policy: PollingPolicy) -> Translator {
    Translator::new(
        translators::get(backend).unwrap(),
        "en",
        "ja",
        max_chars,
        policy,
        CancellationToken::new(),
    )
}

/// Test that polling keeps going until the candidate is complete
#[tokio::test]
async fn test_translate_withIncompleteThenCompletePage_shouldPollUntilSettled() {
    let mut session = MockSession::with_pages([
        deepl_page(""),
        deepl_page("これは [...]"),
        deepl_page("これはペンです。"),
    ]);
    let mut translator = make_translator("deepl", 5000, fast_policy(10));
    let result =
        tokio_test::assert_ok!(translator.translate(&mut session, "This is a pen.").await);
    assert_eq!(result, "これはペンです。");
    // Fragment navigation refreshes once per chunk
    assert_eq!(session.refresh_count, 1);
    assert_eq!(session.navigations.len(), 1);
    assert!(session.navigations[0].starts_with("https://www.deepl.com/en/translator#en/ja/"));
}

/// Test that exhausting the trials degrades to the last candidate
#[tokio::test]
async fn test_translate_withNeverSettlingPage_shouldAcceptLastCandidate() {
    // The page never stops showing the truncation marker
    let mut session = MockSession::with_pages([deepl_page("まだ [...]")]);
    let mut translator = make_translator("deepl", 5000, fast_policy(3));
    let result = translator.translate(&mut session, "Some text.").await.unwrap();
    assert_eq!(result, "まだ [...]");
}

/// Test that an empty page for all trials yields an empty translation
#[tokio::test]
async fn test_translate_withEmptyPage_shouldDegradeToEmptyString() {
    let mut session = MockSession::with_pages([String::from("<html><body></body></html>")]);
    let mut translator = make_translator("deepl", 5000, fast_policy(2));
    let result = translator.translate(&mut session, "Some text.").await.unwrap();
    assert_eq!(result, "");
}

/// Test that chunks are translated in order and concatenated
#[tokio::test]
async fn test_translate_withMultipleChunks_shouldConcatenateInOrder() {
    // Budget forces two chunks, one sentence each
    let mut session = MockSession::with_pages([deepl_page("一つ目。"), deepl_page("二つ目。")]);
    let mut translator = make_translator("deepl", 25, fast_policy(10));
    let result = translator
        .translate(&mut session, "First sentence here. Second sentence there.")
        .await
        .unwrap();
    assert_eq!(result, "一つ目。二つ目。");
    assert_eq!(session.navigations.len(), 2);
    assert_eq!(session.refresh_count, 2);
}

/// Test that a stale translation left from the previous chunk is not accepted
#[tokio::test]
async fn test_translate_withStalePreviousTranslation_shouldWaitForFreshOne() {
    let mut session = MockSession::with_pages([
        // Chunk 1 settles immediately
        deepl_page("前の翻訳です。"),
        // Chunk 2 first shows a prefix of chunk 1's translation, then fresh text
        deepl_page("前の翻訳"),
        deepl_page("新しい翻訳です。"),
    ]);
    let mut translator = make_translator("deepl", 25, fast_policy(10));
    let result = translator
        .translate(&mut session, "First sentence here. Second sentence there.")
        .await
        .unwrap();
    assert_eq!(result, "前の翻訳です。新しい翻訳です。");
}

/// Test that cancellation interrupts the polling loop
#[tokio::test]
async fn test_translate_withCancelledToken_shouldReturnCancelled() {
    let cancel = CancellationToken::new();
    let mut translator = Translator::new(
        translators::get("google").unwrap(),
        "en",
        "ja",
        5000,
        fast_policy(30),
        cancel.clone(),
    );
    cancel.cancel();
    let mut session = MockSession::with_pages([String::from("<html></html>")]);
    let result = translator.translate(&mut session, "Some text.").await;
    assert!(matches!(result, Err(TranslationError::Cancelled)));
}

/// Test that translating empty text makes no requests at all
#[tokio::test]
async fn test_translate_withEmptyText_shouldSkipTheBackend() {
    let mut session = MockSession::new();
    let mut translator = make_translator("google", 5000, fast_policy(5));
    let result = translator.translate(&mut session, "   ").await.unwrap();
    assert_eq!(result, "");
    assert!(session.navigations.is_empty());
}
