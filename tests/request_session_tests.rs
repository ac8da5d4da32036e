//! Integration tests for request session assembly and terminal operations.
//!
//! Each test mounts a mock that only matches the expected request shape and
//! asserts that exactly one request matched.

use std::collections::HashMap;

use resilient_http::{Client, DataType, RequestError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{
    basic_auth, body_json, body_string, header, method, path, query_param,
};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

async fn expect_one(server: &MockServer, mock: MockBuilder) {
    mock.respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Method and Header Tests
// ============================================================================

#[tokio::test]
async fn test_get_with_header() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("GET"))
            .and(path("/set_header"))
            .and(header("API-Key", "fookey")),
    )
    .await;

    let outcome = Client::new()
        .unwrap()
        .request()
        .get(format!("{}/set_header", server.uri()))
        .set("API-Key", "fookey")
        .end()
        .await;

    assert_eq!(outcome.code(), Some(200));
}

#[tokio::test]
async fn test_every_method_selector() {
    let server = MockServer::start().await;
    for verb in ["GET", "POST", "PUT", "HEAD", "DELETE", "PATCH"] {
        expect_one(&server, Mock::given(method(verb)).and(path("/verb"))).await;
    }

    let client = Client::new().unwrap();
    let url = format!("{}/verb", server.uri());
    let outcomes = [
        client.request().get(&url).end().await,
        client.request().post(&url).end().await,
        client.request().put(&url).end().await,
        client.request().head(&url).end().await,
        client.request().delete(&url).end().await,
        client.request().patch(&url).end().await,
    ];

    for outcome in outcomes {
        assert_eq!(outcome.code(), Some(200));
    }
}

#[tokio::test]
async fn test_set_headers_applies_every_entry() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("GET"))
            .and(header("X-One", "1"))
            .and(header("X-Two", "2")),
    )
    .await;

    let mut headers = HashMap::new();
    headers.insert("X-One", "1");
    headers.insert("X-Two", "2");

    Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .set_headers(headers)
        .end()
        .await;
}

#[tokio::test]
async fn test_basic_auth() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("GET")).and(basic_auth("user", "pass")),
    )
    .await;

    Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .basic_auth("user", Some("pass".to_string()))
        .end()
        .await;
}

// ============================================================================
// Body Tests
// ============================================================================

#[tokio::test]
async fn test_post_merges_json_strings() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("POST"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"query1":"test","query2":"test"}"#)),
    )
    .await;

    Client::new()
        .unwrap()
        .request()
        .post(server.uri())
        .send(r#"{"query1":"test"}"#)
        .send(r#"{"query2":"test"}"#)
        .end()
        .await;
}

#[tokio::test]
async fn test_post_plain_strings_are_form_encoded() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("POST"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("query1=test&query2=test")),
    )
    .await;

    Client::new()
        .unwrap()
        .request()
        .post(server.uri())
        .send("query1=test")
        .send("query2=test")
        .end()
        .await;
}

#[tokio::test]
async fn test_post_form_type_flattens_json() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("POST")).and(body_string("id=123456789&name=nemo")),
    )
    .await;

    Client::new()
        .unwrap()
        .request()
        .post(server.uri())
        .data_type(DataType::Form)
        .send(r#"{"id":123456789, "name":"nemo"}"#)
        .end()
        .await;
}

#[tokio::test]
async fn test_post_struct_merges_with_json_string() {
    #[derive(Serialize)]
    struct Shade {
        color: String,
        size: f64,
    }

    #[derive(Serialize)]
    struct Style {
        upper: Shade,
        lower: Shade,
        name: String,
    }

    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("POST")).and(body_json(json!({
            "a": "a",
            "lower": {"color": "green", "size": 1.7},
            "upper": {"color": "red", "size": 0.0},
            "name": "Cindy"
        }))),
    )
    .await;

    let style = Style {
        upper: Shade {
            color: "red".to_string(),
            size: 0.0,
        },
        lower: Shade {
            color: "green".to_string(),
            size: 1.7,
        },
        name: "Cindy".to_string(),
    };

    Client::new()
        .unwrap()
        .request()
        .post(server.uri())
        .send(r#"{"a":"a"}"#)
        .send(&style)
        .end()
        .await;
}

#[tokio::test]
async fn test_caller_content_type_wins_over_hint() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("PUT"))
            .and(header("content-type", "application/merge-patch+json"))
            .and(body_string(r#"{"state":"closed"}"#)),
    )
    .await;

    Client::new()
        .unwrap()
        .request()
        .put(server.uri())
        .set("Content-Type", "application/merge-patch+json")
        .send(&json!({"state": "closed"}))
        .end()
        .await;
}

#[tokio::test]
async fn test_text_type_sends_raw_body() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("POST"))
            .and(header("content-type", "text/plain"))
            .and(body_string("hello world")),
    )
    .await;

    Client::new()
        .unwrap()
        .request()
        .post(server.uri())
        .data_type(DataType::Text)
        .send("hello ")
        .send("world")
        .end()
        .await;
}

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_query_strings_accumulate() {
    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("POST"))
            .and(path("/set_query"))
            .and(query_param("query1", "test"))
            .and(query_param("query2", "test")),
    )
    .await;

    Client::new()
        .unwrap()
        .request()
        .post(format!("{}/set_query", server.uri()))
        .query("query1=test")
        .query("query2=test")
        .end()
        .await;
}

#[tokio::test]
async fn test_query_from_struct() {
    #[derive(Serialize)]
    struct Page {
        limit: u32,
        cursor: &'static str,
    }

    let server = MockServer::start().await;
    expect_one(
        &server,
        Mock::given(method("GET"))
            .and(query_param("limit", "50"))
            .and(query_param("cursor", "abc 123")),
    )
    .await;

    Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .query(&Page {
            limit: 50,
            cursor: "abc 123",
        })
        .end()
        .await;
}

// ============================================================================
// Terminal Operation Tests
// ============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Pair {
    a: String,
    b: String,
}

#[tokio::test]
async fn test_end_struct_decodes_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"a":"x","b":"y"}"#))
        .mount(&server)
        .await;

    let (outcome, pair) = Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .end_struct::<Pair>()
        .await;

    assert!(outcome.errors.is_empty(), "Unexpected errors: {:?}", outcome.errors);
    assert_eq!(outcome.code(), Some(200));
    assert_eq!(outcome.body, br#"{"a":"x","b":"y"}"#.to_vec());
    assert_eq!(
        pair,
        Some(Pair {
            a: "x".to_string(),
            b: "y".to_string()
        })
    );
}

#[tokio::test]
async fn test_end_struct_keeps_response_on_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (outcome, pair) = Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .end_struct::<Pair>()
        .await;

    assert!(pair.is_none());
    assert_eq!(outcome.code(), Some(200));
    assert_eq!(outcome.body, b"not json".to_vec());
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(outcome.errors[0], RequestError::Decode(_)));
}

#[tokio::test]
async fn test_end_bytes_returns_raw_body_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("x-request-id", "req-1")
                .set_body_bytes(vec![0_u8, 159, 146, 150]),
        )
        .mount(&server)
        .await;

    let (response, body, errors) = Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .end_bytes()
        .await
        .into_parts();

    let response = response.unwrap();
    assert_eq!(response.code(), 201);
    assert_eq!(response.header("X-Request-Id"), Some("req-1"));
    assert!(response.url.is_some());
    assert_eq!(body, vec![0_u8, 159, 146, 150]);
    assert!(errors.is_empty());
}

#[tokio::test]
async fn test_end_replaces_invalid_utf8_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff_u8, b'o', b'k']))
        .mount(&server)
        .await;

    let outcome = Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .end()
        .await;

    assert_eq!(outcome.body, "\u{FFFD}ok");
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid"))
        .mount(&server)
        .await;

    let outcome = Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .end()
        .await;

    assert_eq!(outcome.code(), Some(422));
    assert_eq!(outcome.body, "invalid");
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn test_invalid_header_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = Client::new()
        .unwrap()
        .request()
        .get(server.uri())
        .set("bad header", "x")
        .end()
        .await;

    assert!(outcome.response.is_none());
    assert!(matches!(
        outcome.errors[..],
        [RequestError::InvalidHeader { .. }]
    ));
}

#[tokio::test]
async fn test_debug_mode_does_not_change_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("logged"))
        .mount(&server)
        .await;

    let outcome = Client::new()
        .unwrap()
        .request()
        .post(server.uri())
        .debug(true)
        .send(r#"{"k":"v"}"#)
        .end()
        .await;

    assert_eq!(outcome.body, "logged");
}
