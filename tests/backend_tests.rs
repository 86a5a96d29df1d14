use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use xml_analyst::llm::{Anthropic, ConfiguredLlms, OpenAI, LLM};
use xml_analyst::{AnalyzeRequest, Config, Orchestrator, XmlAnalystError};

const XML: &[u8] = br#"<root><item id="1">A</item><item id="2">B</item></root>"#;

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn anthropic_messages(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.requests.lock().unwrap().push((headers, body));
    Json(json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": "claude-haiku-4-5",
        "content": [
            {"type": "text", "text": "a"},
            {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "iVBORw0KGgo="}},
            {"type": "text", "text": "b"}
        ],
        "stop_reason": "end_turn"
    }))
}

async fn openai_responses(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.requests.lock().unwrap().push((headers, body));
    Json(json!({
        "id": "resp_test",
        "object": "response",
        "output": [
            {"type": "message", "role": "assistant", "content": [
                {"type": "output_text", "text": "id,text\n1,A\n2,B", "annotations": []}
            ]}
        ]
    }))
}

async fn overloaded() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
}

/// Serves `router` on an ephemeral port and returns its `/v1` base URL.
async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

async fn mock_backends() -> (String, Captured) {
    let captured = Captured::default();
    let router = Router::new()
        .route("/v1/messages", post(anthropic_messages))
        .route("/v1/responses", post(openai_responses))
        .with_state(captured.clone());
    (spawn_mock(router).await, captured)
}

fn orchestrator_for(config: Config) -> Orchestrator {
    let config = Arc::new(config);
    Orchestrator::new(
        Arc::clone(&config),
        Arc::new(ConfiguredLlms::new(config)),
    )
}

#[tokio::test]
async fn test_anthropic_text_blocks_are_joined_and_non_text_dropped() {
    let (base_url, captured) = mock_backends().await;
    let orchestrator = orchestrator_for(Config {
        anthropic_api_key: Some("sk-ant-test".to_string()),
        custom_anthropic_url: Some(base_url),
        ..Config::default()
    });

    let request = AnalyzeRequest {
        provider: "anthropic".to_string(),
        ..AnalyzeRequest::new(XML.to_vec(), "List items")
    };
    let output = orchestrator.analyze(request).await.unwrap();
    assert_eq!(output.text, "a\nb");

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["x-api-key"], "sk-ant-test");
    assert_eq!(headers["anthropic-version"], "2023-06-01");
    assert_eq!(body["model"], "claude-haiku-4-5");
    assert_eq!(body["max_tokens"], 2048);
    assert_eq!(body["messages"][0]["role"], "user");
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("List items"));
    assert!(prompt.contains("- item: 2"));
}

#[tokio::test]
async fn test_openai_output_text_is_returned() {
    let (base_url, captured) = mock_backends().await;
    let orchestrator = orchestrator_for(Config {
        openai_api_key: Some("sk-test".to_string()),
        custom_openai_url: Some(format!("{}/", base_url)),
        ..Config::default()
    });

    let request = AnalyzeRequest {
        model: Some("gpt-4.1".to_string()),
        ..AnalyzeRequest::new(XML.to_vec(), "List items")
    };
    let output = orchestrator.analyze(request).await.unwrap();
    assert_eq!(output.text, "id,text\n1,A\n2,B");
    assert_eq!(output.filename(), "result.csv");

    let requests = captured.requests.lock().unwrap();
    let (headers, body) = &requests[0];
    assert_eq!(headers["authorization"], "Bearer sk-test");
    assert_eq!(body["model"], "gpt-4.1");
    assert!(body["input"].as_str().unwrap().contains("TOP PATHS"));
}

#[tokio::test]
async fn test_backend_failure_is_an_llm_error() {
    let router = Router::new()
        .route("/v1/messages", post(overloaded))
        .route("/v1/responses", post(overloaded));
    let base_url = spawn_mock(router).await;

    let anthropic = Anthropic::new("sk-ant-test", &base_url);
    match anthropic.generate_text("hi", "claude-haiku-4-5").await {
        Err(XmlAnalystError::LlmError(msg)) => {
            assert!(msg.contains("503"));
            assert!(msg.contains("overloaded"));
        }
        other => panic!("expected llm error, got {:?}", other),
    }

    let openai = OpenAI::new("sk-test", &base_url);
    assert!(matches!(
        openai.generate_text("hi", "gpt-4o-mini").await,
        Err(XmlAnalystError::LlmError(_))
    ));
}
