//! Integration tests for the runtime client against a mock server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use discogen_runtime::{Client, DEFAULT_USER_AGENT, Error, Media, Options, Request};
use serde::{Deserialize, Serialize};
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct TaskList {
    id: String,
    title: String,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Counter {
    #[serde(
        rename = "grid",
        default,
        skip_serializing_if = "Option::is_none",
        with = "discogen_runtime::wire::string"
    )]
    grid: Option<Vec<Vec<i64>>>,
}

fn client(server: &MockServer) -> Client {
    Client::new(reqwest::Client::new(), format!("{}/tasks/v1/", server.uri()))
}

#[tokio::test]
async fn test_execute_json_decodes_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/v1/users/@me/lists/abc"))
        .and(query_param("alt", "json"))
        .and(query_param("maxResults", "5"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "abc", "title": "Groceries" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut opts = Options::new();
    opts.set("maxResults", 5);
    let mut req = Request::new("GET", "users/@me/lists/{tasklist}");
    req.path_param("tasklist", "abc");
    req.apply_options(&opts);

    let list: TaskList = client(&server).execute_json(req).await.unwrap();
    assert_eq!(
        list,
        TaskList {
            id: "abc".into(),
            title: "Groceries".into()
        }
    );
}

#[tokio::test]
async fn test_json_body_and_data_wrapper() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks/v1/lists"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({ "data": { "title": "New" } })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = Request::new("POST", "lists");
    req.json_body(&serde_json::json!({ "title": "New" })).unwrap();
    client(&server)
        .with_data_wrapper(true)
        .execute_empty(req)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_media_upload_goes_to_upload_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/tasks/v1/lists"))
        .and(query_param("uploadType", "media"))
        .and(header("content-type", "text/plain"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "m1",
            "title": "uploaded"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = Request::new("POST", "lists");
    req.media(Media::new("hello", "text/plain"));
    let list: TaskList = client(&server).execute_json(req).await.unwrap();
    assert_eq!(list.id, "m1");
}

#[tokio::test]
async fn test_api_error_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/v1/lists/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": 404, "message": "Task list not found" }
        })))
        .mount(&server)
        .await;

    let req = Request::new("GET", "lists/missing");
    let err = client(&server)
        .execute_json::<TaskList>(req)
        .await
        .unwrap_err();
    match &err {
        Error::Api {
            status, message, ..
        } => {
            assert_eq!(*status, 404);
            assert_eq!(message.as_deref(), Some("Task list not found"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "API error 404: Task list not found");
}

#[tokio::test]
async fn test_api_error_without_json_uses_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/v1/lists/x"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let err = client(&server)
        .execute_empty(Request::new("DELETE", "lists/x"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "API error 500: backend exploded");
}

#[tokio::test]
async fn test_undecodable_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server)
        .with_user_agent("custom/1.0")
        .execute_json::<TaskList>(Request::new("GET", "lists"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_nested_string_encoded_record_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/v1/counters/c1"))
        .and(body_json(serde_json::json!({ "grid": [["5", "-6"]] })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "grid": [["1", "2"], [3]] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut req = Request::new("PUT", "counters/{counter}");
    req.path_param("counter", "c1");
    req.json_body(&Counter {
        grid: Some(vec![vec![5, -6]]),
    })
    .unwrap();

    let counter: Counter = client(&server).execute_json(req).await.unwrap();
    assert_eq!(counter.grid, Some(vec![vec![1, 2], vec![3]]));
}

#[tokio::test]
async fn test_alias_body_and_response_keep_string_encoding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks/v1/counters/c1:reset"))
        .and(body_json(serde_json::json!(["10", "18446744073709551"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["1", "2"])))
        .expect(1)
        .mount(&server)
        .await;

    let ids: Vec<i64> = vec![10, 18_446_744_073_709_551];
    let mut req = Request::new("POST", "counters/{counter}:reset");
    req.path_param("counter", "c1");
    req.wire_body(&ids).unwrap();

    let reset: Vec<i64> = client(&server).execute_wire(req).await.unwrap();
    assert_eq!(reset, vec![1, 2]);
}
