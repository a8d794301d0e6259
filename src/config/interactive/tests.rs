use super::test_ollama_connection;
use crate::config::OllamaConfig;

#[test]
fn unreachable_ollama_reports_failure() {
    let config = OllamaConfig {
        host: "127.0.0.1".to_string(),
        port: 9,
        ..OllamaConfig::default()
    };
    assert!(!test_ollama_connection(&config));
}
