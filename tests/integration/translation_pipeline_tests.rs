/*!
 * End-to-end crawl-and-translate tests over scripted sessions
 */

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use ronyaku::app_config::Config;
use ronyaku::document::TranslatedSection;
use ronyaku::errors::AppError;
use ronyaku::gateways::{self, Credentials};
use ronyaku::journals::{self, CrawlContext};
use ronyaku::pipeline::Pipeline;
use ronyaku::render;
use ronyaku::translators::{self, PollingPolicy, Translator};

use crate::common::{create_temp_dir, mock_session::MockSession};

fn fast_policy() -> PollingPolicy {
    PollingPolicy {
        interval: Duration::from_millis(1),
        trials: 2,
        chunk_pause: Duration::from_millis(1),
    }
}

fn deepl_page(text: &str) -> String {
    format!(
        r#"<html><body><button class="lmt__translations_as_text__text_btn">{}</button></body></html>"#,
        text
    )
}

const ARTICLE: &str = r#"<html><body>
    <h1 class="c-article-title">A paper about birds</h1>
    <section aria-labelledby="Abs1"><h2>Abstract</h2><p>Birds can fly.</p></section>
    <section aria-labelledby="Sec1"><h2>Methods</h2><p>We watched birds.</p></section>
</body></html>"#;

/// Test the crawl-translate-render composition with every stage scripted
#[tokio::test]
async fn test_pipeline_withScriptedSession_shouldProduceBilingualOutput() {
    let dir = create_temp_dir().unwrap();
    let ctx = CrawlContext::new(reqwest::Client::new(), dir.path().to_path_buf());

    // Gateway passthrough first: identity, untouched session
    let gateway = gateways::get("useless").unwrap();
    let mut session = MockSession::with_pages([
        ARTICLE.to_string(),
        deepl_page("鳥は飛べる。"),
        deepl_page("鳥を観察した。"),
    ]);
    let rewriter = gateway
        .passthrough(&mut session, "nature", &Credentials::new())
        .await
        .unwrap();
    let url = rewriter.rewrite("https://www.nature.com/articles/birds");

    let crawler = journals::resolve("nature").unwrap();
    let document = crawler.get_contents(&url, &mut session, &ctx).await;
    assert_eq!(document.title, "A paper about birds");
    assert_eq!(document.sections.len(), 2);

    let mut translator = Translator::new(
        translators::get("deepl").unwrap(),
        "en",
        "ja",
        5000,
        fast_policy(),
        CancellationToken::new(),
    );
    let mut translated = Vec::new();
    for section in &document.sections {
        let text = translator.translate(&mut session, &section.body).await.unwrap();
        translated.push(TranslatedSection { section: section.clone(), translated: text });
    }
    assert_eq!(translated[0].translated, "鳥は飛べる。");
    assert_eq!(translated[1].translated, "鳥を観察した。");

    let out = dir.path().join("out");
    let html_path = render::write_html(&out, &document.title, &translated).unwrap();
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("A paper about birds"));
    assert!(html.contains("Birds can fly."));
    assert!(html.contains("鳥は飛べる。"));
}

/// Test that sections stay 1:1 with their (possibly empty) translations when
/// the backend never settles
#[tokio::test]
async fn test_pipeline_withUnresponsiveBackend_shouldKeepSectionsOneToOne() {
    let dir = create_temp_dir().unwrap();
    let ctx = CrawlContext::new(reqwest::Client::new(), dir.path().to_path_buf());

    let mut session = MockSession::with_pages([
        ARTICLE.to_string(),
        // The backend page stays empty for every poll of every chunk
        String::from("<html><body></body></html>"),
    ]);
    let crawler = journals::resolve("nature").unwrap();
    let document = crawler
        .get_contents("https://www.nature.com/articles/birds", &mut session, &ctx)
        .await;
    assert_eq!(document.sections.len(), 2);

    let mut translator = Translator::new(
        translators::get("deepl").unwrap(),
        "en",
        "ja",
        5000,
        fast_policy(),
        CancellationToken::new(),
    );
    let mut translated = Vec::new();
    for section in &document.sections {
        let text = translator.translate(&mut session, &section.body).await.unwrap();
        translated.push(TranslatedSection { section: section.clone(), translated: text });
    }

    // Every original section is kept, each with an empty translation
    assert_eq!(translated.len(), document.sections.len());
    assert!(translated.iter().all(|t| t.translated.is_empty()));

    let out = dir.path().join("out");
    let html_path = render::write_html(&out, &document.title, &translated).unwrap();
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("Birds can fly."));
    assert!(html.contains("We watched birds."));
}

/// Test that a dead source degrades to an empty but renderable document
#[tokio::test]
async fn test_pipeline_withFailingFetch_shouldRenderEmptyDocument() {
    let dir = create_temp_dir().unwrap();
    let ctx = CrawlContext::new(reqwest::Client::new(), dir.path().to_path_buf());

    let mut session = MockSession::failing();
    let crawler = journals::resolve("springer").unwrap();
    let document = crawler
        .get_contents("https://link.springer.com/article/gone", &mut session, &ctx)
        .await;
    assert!(document.title.is_empty());
    assert!(document.sections.is_empty());

    // An empty document still renders to a (titleless) page
    let out = dir.path().join("out");
    let html_path = render::write_html(&out, &document.title, &[]).unwrap();
    assert!(html_path.ends_with("untitled.html"));
}

/// Test that a local PDF path is rejected up front with a clear message
#[tokio::test]
async fn test_pipeline_withLocalPdfPath_shouldRejectWithExplicitError() {
    let pipeline = Pipeline::new(Config::default());
    let err = pipeline.run("./downloads/paper.pdf").await.unwrap_err();
    match err {
        AppError::Config(message) => assert!(message.contains("PDF input is not supported")),
        other => panic!("expected a config error, got {}", other),
    }
}
