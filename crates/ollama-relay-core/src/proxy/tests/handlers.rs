use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::proxy::{build_relay_router, GatewaySnapshot, SharedSnapshot};
use ollama_relay_types::{GatewayConfig, UpstreamConfig};

fn test_config(upstream_url: &str, inbound_key: Option<&str>) -> GatewayConfig {
    GatewayConfig {
        upstream: UpstreamConfig {
            base_url: upstream_url.to_string(),
            api_key: "sk-test".to_string(),
            ..Default::default()
        },
        model_mapping: HashMap::from([
            ("llama2".to_string(), "gpt-4".to_string()),
            ("codellama".to_string(), "gpt-4o-mini".to_string()),
        ]),
        api_key: inbound_key.map(str::to_string),
        ..Default::default()
    }
}

fn create_test_server(config: &GatewayConfig) -> TestServer {
    let snapshot = SharedSnapshot::new(GatewaySnapshot::from_config(config).unwrap());
    TestServer::new(build_relay_router(snapshot)).unwrap()
}

fn sse_delta(text: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"id": "c1", "object": "chat.completion.chunk", "choices": [{"index": 0, "delta": {"content": text}, "finish_reason": null}]})
    )
}

fn sse_body(deltas: &[&str]) -> String {
    let mut body = sse_delta("").replace(r#""content":"""#, r#""role":"assistant""#);
    for d in deltas {
        body.push_str(&sse_delta(d));
    }
    body.push_str(
        "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    );
    body.push_str("data: [DONE]\n\n");
    body
}

fn ndjson_lines(text: &str) -> Vec<Value> {
    text.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
}

#[tokio::test]
async fn test_root_reports_running() {
    let server = create_test_server(&GatewayConfig::default());
    let response = server.get("/").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "Ollama is running"}));
}

#[tokio::test]
async fn test_tags_lists_aliases_without_upstream() {
    // Unreachable upstream: listing must not depend on it.
    let server = create_test_server(&test_config("http://127.0.0.1:1/v1", Some("secret")));
    let response = server.get("/api/tags").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let models = body["models"].as_array().unwrap();
    let names: Vec<&str> = models.iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["codellama", "llama2"]);
    assert_eq!(models[0]["model"], "codellama");
    assert_eq!(models[0]["size"], 0);
    assert_eq!(models[0]["details"]["format"], "gguf");
    assert!(models[0]["modified_at"].is_string());
}

#[tokio::test]
async fn test_chat_non_stream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "stream": false,
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = create_test_server(&test_config(&format!("{}/v1", upstream.uri()), None));
    let response = server
        .post("/api/chat")
        .json(&json!({"model": "llama2", "messages": [{"role": "user", "content": "hi"}], "stream": false}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["model"], "llama2");
    assert_eq!(body["message"]["role"], "assistant");
    assert_eq!(body["message"]["content"], "hello");
    assert_eq!(body["done"], true);
    assert_eq!(body["done_reason"], "stop");
    for field in ["total_duration", "load_duration", "prompt_eval_count", "prompt_eval_duration", "eval_count", "eval_duration"] {
        assert!(body[field].is_u64(), "{} should be populated", field);
    }
    assert_eq!(body["eval_count"], 1);
}

#[tokio::test]
async fn test_chat_stream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4", "stream": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(&["hel", "lo"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let server = create_test_server(&test_config(&format!("{}/v1", upstream.uri()), None));
    let response = server
        .post("/api/chat")
        .json(&json!({"model": "llama2", "messages": [{"role": "user", "content": "hi"}], "stream": true}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/x-ndjson");

    let lines = ndjson_lines(&response.text());
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["done"], false);
    assert_eq!(lines[0]["message"]["content"], "hel");
    assert_eq!(lines[1]["done"], false);
    assert_eq!(lines[1]["message"]["content"], "lo");
    assert_eq!(lines[2]["done"], true);
    assert_eq!(lines[2]["message"]["content"], "");
    assert!(lines[2]["total_duration"].is_u64());
    assert!(lines[2]["eval_count"].is_u64());
}

#[tokio::test]
async fn test_generate_stream_defaults_to_true() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "mistral",
            "stream": true,
            "messages": [
                {"role": "system", "content": "be terse"},
                {"role": "user", "content": "sky?"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(&["blue", " sky"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let server = create_test_server(&test_config(&format!("{}/v1", upstream.uri()), None));
    let response = server
        .post("/api/generate")
        .json(&json!({"model": "mistral", "prompt": "sky?", "system": "be terse"}))
        .await;

    response.assert_status_ok();
    let lines = ndjson_lines(&response.text());
    let text: String = lines.iter().map(|l| l["response"].as_str().unwrap_or_default()).collect();
    assert_eq!(text, "blue sky");
    assert_eq!(lines.iter().filter(|l| l["done"] == true).count(), 1);
    assert_eq!(lines.last().unwrap()["done"], true);
    assert_eq!(lines.last().unwrap()["model"], "mistral");
}

#[tokio::test]
async fn test_upstream_401_is_mapped_without_retry() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = create_test_server(&test_config(&format!("{}/v1", upstream.uri()), None));
    let response = server
        .post("/api/chat")
        .json(&json!({"model": "llama2", "messages": [{"role": "user", "content": "hi"}], "stream": false}))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>(), json!({"error": "Incorrect API key provided"}));
}

#[tokio::test]
async fn test_upstream_404_is_not_found() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "The model `nope` does not exist"}
        })))
        .mount(&upstream)
        .await;

    let server = create_test_server(&test_config(&upstream.uri(), None));
    let response = server
        .post("/api/generate")
        .json(&json!({"model": "nope", "prompt": "hi", "stream": true}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.json::<Value>()["error"].as_str().unwrap().contains("does not exist"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let server = create_test_server(&test_config("http://127.0.0.1:1/v1", None));
    let response = server
        .post("/api/chat")
        .json(&json!({"model": "llama2", "messages": [{"role": "user", "content": "hi"}]}))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_malformed_requests_skip_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&upstream).await;
    let server = create_test_server(&test_config(&upstream.uri(), None));

    let response = server.post("/api/chat").json(&json!({"messages": [{"role": "user", "content": "hi"}]})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({"error": "model is required"}));

    let response = server.post("/api/generate").json(&json!({"model": "llama2"})).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.post("/api/chat").text("{not json").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_inbound_auth() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "ok"}}]
        })))
        .expect(2)
        .mount(&upstream)
        .await;

    let server = create_test_server(&test_config(&upstream.uri(), Some("secret")));
    let request = json!({"model": "llama2", "messages": [{"role": "user", "content": "hi"}], "stream": false});

    let response = server.post("/api/chat").json(&request).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(response.json::<Value>()["error"].is_string());

    let response = server
        .post("/api/chat")
        .add_header(HeaderName::from_static("authorization"), HeaderValue::from_static("Bearer wrong"))
        .json(&request)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/chat")
        .add_header(HeaderName::from_static("authorization"), HeaderValue::from_static("Bearer secret"))
        .json(&request)
        .await;
    response.assert_status_ok();

    let response = server
        .post("/api/chat")
        .add_header(HeaderName::from_static("x-api-key"), HeaderValue::from_static("secret"))
        .json(&request)
        .await;
    response.assert_status_ok();

    // Discovery routes stay open.
    server.get("/api/tags").await.assert_status_ok();
    server.get("/").await.assert_status_ok();
}

#[tokio::test]
async fn test_show_describes_alias() {
    let server = create_test_server(&test_config("http://127.0.0.1:1/v1", None));

    let response = server.post("/api/show").json(&json!({"name": "llama2"})).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["modelfile"].as_str().unwrap().starts_with("FROM gpt-4"));
    assert_eq!(body["model_info"]["general.basename"], "gpt-4");
    assert_eq!(body["capabilities"], json!(["completion"]));

    let response = server.post("/api/show").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_embeddings_single_and_batch() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({"model": "gpt-4", "input": "hello", "dimensions": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2]}]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({"input": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"index": 1, "embedding": [2.0]},
                {"index": 0, "embedding": [1.0]}
            ]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = create_test_server(&test_config(&format!("{}/v1", upstream.uri()), None));

    let response = server
        .post("/api/embeddings")
        .json(&json!({"model": "llama2", "prompt": "hello", "options": {"dimensions": 2}}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"embedding": [0.1, 0.2]}));

    let response =
        server.post("/api/embeddings").json(&json!({"model": "llama2", "prompt": ["a", "b"]})).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"embedding": [[1.0], [2.0]]}));
}

#[tokio::test]
async fn test_reload_is_seen_by_next_request() {
    let snapshot = SharedSnapshot::new(
        GatewaySnapshot::from_config(&test_config("http://127.0.0.1:1/v1", None)).unwrap(),
    );
    let server = TestServer::new(build_relay_router(snapshot.clone())).unwrap();

    let mut config = test_config("http://127.0.0.1:1/v1", None);
    config.model_mapping = HashMap::from([("phi".to_string(), "gpt-4o".to_string())]);
    snapshot.replace(GatewaySnapshot::from_config(&config).unwrap()).await;

    let body: Value = server.get("/api/tags").await.json();
    assert_eq!(body["models"].as_array().unwrap().len(), 1);
    assert_eq!(body["models"][0]["name"], "phi");
}
