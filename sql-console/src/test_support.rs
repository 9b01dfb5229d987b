//! In-process stand-in for the chat-completion endpoint.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use common::config::{LlmConfig, DEFAULT_LLM_MODEL, DEFAULT_TEMPERATURE};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub fn llm_config(base_url: &str) -> LlmConfig {
    LlmConfig {
        api_key: "sk-test".to_string(),
        base_url: base_url.to_string(),
        model: DEFAULT_LLM_MODEL.to_string(),
        temperature: DEFAULT_TEMPERATURE,
    }
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct MockCompletions {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockCompletions {
    /// Answers every call with `content` as the first choice.
    pub async fn spawn(status: StatusCode, content: &str) -> Self {
        let reply = json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        });
        Self::spawn_raw(status, reply).await
    }

    /// Answers every call with `reply` verbatim.
    pub async fn spawn_raw(status: StatusCode, reply: Value) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            reply,
            seen: seen.clone(),
        };
        let app = Router::new()
            .route("/chat/completions", post(completions))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            seen,
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state
        .seen
        .lock()
        .unwrap()
        .push(SeenRequest { authorization, body });
    (state.status, Json(state.reply.clone()))
}
