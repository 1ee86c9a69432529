//! Integration tests for the built-in tools and the dispatch heuristic
//!
//! Web search runs against a wiremock server standing in for the
//! DuckDuckGo Instant Answer API.

use serde_json::json;
use wiremock::{
    matchers::{method, query_param},
    Mock, MockServer, ResponseTemplate,
};

use sdk::tool::Tool;
use symposium_engine::config::Config;
use symposium_engine::tools::{
    detect_tool, extract_query, should_use_tools, CalculatorTool, ToolKind, ToolRegistry,
    WebSearchTool,
};
use symposium_engine::transcript::Turn;

#[test]
fn test_question_routing() {
    let cases = [
        ("What is 15 * 23?", Some(ToolKind::Calculate)),
        ("Please search for the history of Athens", Some(ToolKind::WebSearch)),
        ("What is the current date?", Some(ToolKind::CurrentInfo)),
        ("Why do we dream?", Some(ToolKind::WebSearch)),
        ("Is the year 1984 special?", Some(ToolKind::Calculate)),
        ("Virtue is a habit", None),
    ];

    for (question, expected) in cases {
        assert_eq!(detect_tool(question, true), expected, "question: {}", question);
        assert_eq!(detect_tool(question, false), None);
    }
}

#[test]
fn test_query_extraction() {
    assert_eq!(extract_query(ToolKind::Calculate, "What is 15 * 23?"), "15 * 23");
    assert_eq!(extract_query(ToolKind::CurrentInfo, "What time is it now?"), "time");
    assert_eq!(extract_query(ToolKind::CurrentInfo, "What is today?"), "date");
    assert_eq!(extract_query(ToolKind::CurrentInfo, "current events"), "datetime");
    assert_eq!(
        extract_query(
            ToolKind::WebSearch,
            "I am curious. What is the Socratic method? Tell me."
        ),
        "What is the Socratic method"
    );
}

#[test]
fn test_intent_comes_from_latest_user_turn() {
    let transcript = vec![
        Turn::user("How should a city be governed?"),
        Turn::participant("Socrates", "What is a city?", 1),
    ];
    assert!(should_use_tools(true, &transcript, "unused"));
    assert!(!should_use_tools(false, &transcript, "unused"));
    assert!(should_use_tools(true, &[], "what is 2+2"));
    assert!(!should_use_tools(true, &[], "Virtue is a habit"));
}

#[tokio::test]
async fn test_registry_from_config() {
    let mut config = Config::default();
    config.tools.get_mut("web_search").unwrap().enabled = false;

    let registry = ToolRegistry::from_config(&config).unwrap();
    assert!(!registry.contains("web_search"));
    assert!(registry.contains("calculate"));
    assert!(registry.contains("get_current_info"));

    assert_eq!(registry.dispatch("calculate", "2 ** 10").await, "Result: 1024");
    assert_eq!(
        registry.dispatch("web_search", "Athens").await,
        "Error: Tool 'web_search' not found"
    );
}

#[tokio::test]
async fn test_deeply_nested_question_degrades_to_error_text() {
    let depth = 20_000;
    let question = format!("Calculate {}1{}", "(".repeat(depth), ")".repeat(depth));
    let query = extract_query(ToolKind::Calculate, &question);

    let registry = ToolRegistry::from_config(&Config::default()).unwrap();
    let result = registry.dispatch("calculate", &query).await;

    assert!(result.starts_with("Calculation error:"), "got: {}", result);
}

#[tokio::test]
async fn test_calculator_through_tool_trait() {
    let tool = CalculatorTool::new();
    assert_eq!(tool.name(), "calculate");

    let output = tool.execute("(1 + 2) * 3").await.unwrap();
    assert_eq!(output.into_text(), "Result: 9");

    let output = tool.execute("1 / 0").await.unwrap();
    assert_eq!(output.into_text(), "Error: Division by zero");
}

#[tokio::test]
async fn test_web_search_collects_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "Socrates"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Abstract": "Socrates was a Greek philosopher.",
            "RelatedTopics": [
                { "Text": "Plato - student of Socrates" },
                { "Text": "" },
                { "Name": "Category without text" },
                { "Text": "Xenophon - historian" }
            ],
            "Definition": "A classical Athenian philosopher."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WebSearchTool::with_endpoint(server.uri(), 5, 5).unwrap();
    let results = tool.search("Socrates").await;

    assert_eq!(
        results,
        vec![
            "Summary: Socrates was a Greek philosopher.".to_string(),
            "Plato - student of Socrates".to_string(),
            "Xenophon - historian".to_string(),
            "Definition: A classical Athenian philosopher.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_web_search_limits_topics() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RelatedTopics": [
                { "Text": "one" },
                { "Text": "two" },
                { "Text": "three" }
            ]
        })))
        .mount(&server)
        .await;

    let tool = WebSearchTool::with_endpoint(server.uri(), 2, 5).unwrap();
    assert_eq!(tool.search("numbers").await, vec!["one", "two"]);
}

#[tokio::test]
async fn test_web_search_without_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Abstract": "",
            "RelatedTopics": []
        })))
        .mount(&server)
        .await;

    let tool = WebSearchTool::with_endpoint(server.uri(), 5, 5).unwrap();
    assert_eq!(tool.search("zzzz").await, vec!["No results found"]);
}

#[tokio::test]
async fn test_web_search_reports_errors_as_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tool = WebSearchTool::with_endpoint(server.uri(), 5, 5).unwrap();
    let results = tool.search("Athens").await;

    assert_eq!(results.len(), 1);
    assert!(results[0].starts_with("Search error:"));
}

#[tokio::test]
async fn test_web_search_empty_query() {
    let tool = WebSearchTool::with_endpoint("http://127.0.0.1:9", 5, 5).unwrap();
    assert_eq!(tool.search("   ").await, vec!["No query provided"]);
}
