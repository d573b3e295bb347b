use std::path::Path;

use newsrag_core::vault::Secret;
use newsrag_core::{BuildOutcome, Config, Pipeline, PipelineError};
use newsrag_llm::LlmError;
use newsrag_llm::mock::MockProvider;
use newsrag_memory::document::{LoaderConfig, SplitterConfig, TextSplitter, WebLoader};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_A: &str = "<html><head><title>Rates</title></head><body>\
    <h1>Central bank raises rates</h1>\
    <p>The central bank raised its main interest rate by a quarter point on Tuesday.</p>\
    <p>Officials said inflation remained too high.</p>\
    </body></html>";

async fn serve_article(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html"))
        .mount(server)
        .await;
}

fn local_pipeline(provider: MockProvider, index_path: &Path) -> Pipeline<MockProvider> {
    let loader = WebLoader::new(&LoaderConfig {
        allow_private_hosts: true,
        ..LoaderConfig::default()
    });
    Pipeline::new(
        provider,
        Box::new(loader),
        TextSplitter::new(SplitterConfig::default()),
        index_path,
        4,
    )
}

#[tokio::test]
async fn single_article_question_cites_that_article() {
    let server = MockServer::start().await;
    serve_article(&server, "/article-a", ARTICLE_A).await;
    let article_a = format!("{}/article-a", server.uri());

    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.json");
    let provider = MockProvider::with_responses(vec![format!(
        "The article is about the central bank raising interest rates.\nSOURCES: {article_a}"
    )]);
    let pipeline = local_pipeline(provider, &index_path);

    let outcome = pipeline
        .build(&[article_a.clone(), String::new(), String::new()])
        .await
        .unwrap();
    let BuildOutcome::Built(report) = outcome else {
        panic!("expected a build");
    };
    assert_eq!(report.documents, 1);
    assert!(report.failed.is_empty());
    assert!(index_path.exists());

    let answer = pipeline.ask("What is the main topic?").await.unwrap();
    assert!(!answer.answer_text.is_empty());
    assert_eq!(answer.source_urls, vec![article_a]);
}

#[tokio::test]
async fn query_before_any_build_reports_missing_index() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = local_pipeline(MockProvider::default(), &dir.path().join("index.json"));
    let result = pipeline.ask("What is the main topic?").await;
    assert!(matches!(result, Err(PipelineError::MissingIndex(_))));
}

#[tokio::test]
async fn unreachable_urls_produce_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.json");
    let pipeline = local_pipeline(MockProvider::default(), &index_path);
    let result = pipeline.build(&[format!("{}/down", server.uri())]).await;

    assert!(matches!(result, Err(PipelineError::NoContent)));
    assert!(!index_path.exists());
}

fn openai_config(server: &MockServer, index_path: &Path) -> Config {
    let mut config = Config::default();
    config.llm.base_url = server.uri();
    config.loader.allow_private_hosts = true;
    config.index.path = index_path.to_path_buf();
    config.secrets.openai_api_key = Some(Secret::new("sk-test"));
    config
}

#[tokio::test]
async fn openai_compatible_backend_end_to_end() {
    let server = MockServer::start().await;
    serve_article(&server, "/article-a", ARTICLE_A).await;
    let article_a = format!("{}/article-a", server.uri());

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": format!("Interest rates.\nSOURCES: {article_a}")}}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = openai_config(&server, &dir.path().join("index.json"));
    let pipeline = Pipeline::from_config(&config).unwrap();

    pipeline.build(&[article_a.clone()]).await.unwrap();
    let answer = pipeline.ask("What is the main topic?").await.unwrap();
    assert_eq!(answer.answer_text, "Interest rates.");
    assert_eq!(answer.source_urls, vec![article_a]);
}

#[tokio::test]
async fn rejected_api_key_aborts_build() {
    let server = MockServer::start().await;
    serve_article(&server, "/article-a", ARTICLE_A).await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.json");
    let config = openai_config(&server, &index_path);
    let pipeline = Pipeline::from_config(&config).unwrap();

    let result = pipeline.build(&[format!("{}/article-a", server.uri())]).await;
    assert!(matches!(
        result,
        Err(PipelineError::Remote(LlmError::Auth { status: 401, .. }))
    ));
    assert!(!index_path.exists());
}
