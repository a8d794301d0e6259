use super::*;
use crate::config::OllamaConfig;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OllamaClient {
    let address = server.address();
    let config = Config {
        ollama: OllamaConfig {
            host: address.ip().to_string(),
            port: address.port(),
            embedding_model: "test-embed".to_string(),
            chat_model: "test-chat".to_string(),
            batch_size: 2,
            ..OllamaConfig::default()
        },
        ..Config::default()
    };

    OllamaClient::new(&config)
        .expect("should create client")
        .with_retry_attempts(2)
        .with_backoff(Duration::from_millis(1))
}

#[test]
fn client_configuration() {
    let config = Config {
        ollama: OllamaConfig {
            host: "test-host".to_string(),
            port: 1234,
            chat_model: "test-chat".to_string(),
            batch_size: 128,
            ..OllamaConfig::default()
        },
        ..Config::default()
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.chat_model, "test-chat");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
    assert!(client.api_key.is_none());
}

#[test]
fn client_builder_methods() {
    let client = OllamaClient::new(&Config::default())
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(0)
        .with_api_key(Some("token".to_string()));

    assert_eq!(client.retry_attempts, 1);
    assert_eq!(client.api_key.as_deref(), Some("token"));
}

#[tokio::test(flavor = "multi_thread")]
async fn embeddings_are_batched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({"model": "test-embed"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"embeddings": [[0.1, 0.2], [0.3, 0.4]]})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let texts: Vec<String> = ["a", "b", "c", "d"].iter().map(ToString::to_string).collect();
    let vectors = tokio::task::spawn_blocking(move || client.generate_embeddings(&texts))
        .await
        .expect("task should join")
        .expect("embeddings should succeed");

    assert_eq!(vectors.len(), 4);
    assert_eq!(vectors[2], vec![0.1, 0.2]);
}

#[tokio::test(flavor = "multi_thread")]
async fn embedding_count_mismatch_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.embed("soup"))
        .await
        .expect("task should join");

    assert!(matches!(result, Err(RecipeError::Embedding(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn generate_returns_response_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "test-chat", "stream": false})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "Try a mushroom risotto.", "done": true})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = tokio::task::spawn_blocking(move || client.complete("what's for dinner?"))
        .await
        .expect("task should join")
        .expect("generation should succeed");

    assert_eq!(text, "Try a mushroom risotto.");
}

#[tokio::test(flavor = "multi_thread")]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.complete("hello"))
        .await
        .expect("task should join");

    assert!(matches!(result, Err(RecipeError::Generation(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.generate("hello"))
        .await
        .expect("task should join");

    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn api_key_is_sent_as_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(header("Authorization", "Bearer kitchen-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
        .mount(&server)
        .await;

    let client = client_for(&server).with_api_key(Some("kitchen-secret".to_string()));
    let text = tokio::task::spawn_blocking(move || client.generate("ping"))
        .await
        .expect("task should join")
        .expect("authorized request should succeed");

    assert_eq!(text, "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn health_check_requires_both_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "test-embed"}, {"name": "test-chat"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let healthy = client.clone();
    tokio::task::spawn_blocking(move || healthy.health_check())
        .await
        .expect("task should join")
        .expect("both models are available");

    let missing_chat = Config {
        ollama: OllamaConfig {
            host: server.address().ip().to_string(),
            port: server.address().port(),
            embedding_model: "test-embed".to_string(),
            chat_model: "absent-model".to_string(),
            ..OllamaConfig::default()
        },
        ..Config::default()
    };
    let client = OllamaClient::new(&missing_chat).expect("should create client");
    let result = tokio::task::spawn_blocking(move || client.health_check())
        .await
        .expect("task should join");
    assert!(result.is_err());
}
