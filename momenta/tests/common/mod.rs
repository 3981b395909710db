#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use momenta::config::{
    ClassifierConfig, Config, EmbeddingsConfig, LlmConfig, SearchConfig, SummaryConfig,
};
use momenta::models::{Category, Entry, Mood, Theme, Thread};

/// Minimal OpenAI-shaped chat completion body carrying `content`.
pub fn chat_completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

pub async fn mount_chat_completion(server: &MockServer, content: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(content)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_chat_failure(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub async fn mount_embeddings(server: &MockServer, embedding: Vec<f32>) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": embedding}]
        })))
        .mount(server)
        .await;
}

pub fn llm_config(base_url: &str) -> LlmConfig {
    LlmConfig {
        model: "openai/test-model".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url.to_string()),
        timeout_secs: 5,
        max_retries: 0,
        intent_timeout_secs: 5,
        revalidation_timeout_secs: 5,
    }
}

pub fn embeddings_config(base_url: &str, dimensions: usize) -> EmbeddingsConfig {
    EmbeddingsConfig {
        model: "openai/test-embedding".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url.to_string()),
        dimensions,
        timeout_secs: 5,
    }
}

/// Fully offline configuration: no LLM, no embeddings.
pub fn offline_config() -> Config {
    Config {
        llm: None,
        embeddings: None,
        classifier: ClassifierConfig {
            merge_window_secs: 3600,
        },
        search: SearchConfig {
            threshold: 0.5,
            max_results: 10,
        },
        summary: SummaryConfig {
            cache_size: 4,
            timeout_secs: 5,
        },
    }
}

pub fn work_thread(title: &str, category_name: &str, last_updated_at: i64) -> Thread {
    let mut thread = Thread::open(
        title,
        Category {
            name: category_name.to_string(),
            theme: Theme::Work,
        },
        Vec::new(),
        Mood::Focused,
        22,
        Entry::new("seed entry", last_updated_at, Vec::new()),
    );
    thread.last_updated_at = last_updated_at;
    thread
}
