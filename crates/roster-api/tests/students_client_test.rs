#![allow(clippy::unwrap_used)]
// Integration tests for `StudentsClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roster_api::{Error, ResourceId, StudentBody, StudentsClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StudentsClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client =
        StudentsClient::with_client(reqwest::Client::new(), &base_url, "/api/students").unwrap();
    (server, client)
}

fn draft() -> StudentBody {
    StudentBody {
        name: "A".into(),
        email: "a@x.com".into(),
        major: "CS".into(),
        enrollment_date: "2024-01-01".into(),
    }
}

// ── List ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_preserves_server_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "name": "Zed", "email": "z@x.com", "major": "Math", "enrollmentDate": "2023-09-01"},
            {"id": 2, "name": "Amy", "email": "a@x.com"},
            {"id": "x-5", "name": "Bo", "email": "b@x.com", "major": null, "enrollmentDate": ""}
        ])))
        .mount(&server)
        .await;

    let students = client.list_students().await.unwrap();

    assert_eq!(students.len(), 3);
    assert_eq!(students[0].id, ResourceId::Number(9));
    assert_eq!(students[1].name, "Amy");
    assert_eq!(students[1].major, "");
    assert_eq!(students[2].id, ResourceId::Text("x-5".into()));
    assert_eq!(students[2].enrollment_date, "");
}

#[tokio::test]
async fn test_list_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client.list_students().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_students().await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => assert!(body.contains("oops")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_sends_draft_and_returns_assigned_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/students"))
        .and(body_json(json!({
            "name": "A",
            "email": "a@x.com",
            "major": "CS",
            "enrollmentDate": "2024-01-01"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "name": "A",
            "email": "a@x.com",
            "major": "CS",
            "enrollmentDate": "2024-01-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.create_student(&draft()).await.unwrap();

    assert_eq!(created.id, ResourceId::Number(42));
    assert_eq!(created.email, "a@x.com");
}

#[tokio::test]
async fn test_create_server_rejects() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(400).set_body_string("email must not be blank"))
        .mount(&server)
        .await;

    let result = client.create_student(&StudentBody::default()).await;

    match result {
        Err(Error::Status { status, ref message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("email"), "got: {message}");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

// ── Update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_with_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/students/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client
        .update_student(&ResourceId::Number(7), &draft())
        .await
        .unwrap();

    assert!(updated.is_none());
}

#[tokio::test]
async fn test_update_with_record_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/students/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "name": "A",
            "email": "a@x.com"
        })))
        .mount(&server)
        .await;

    let updated = client
        .update_student(&ResourceId::Text("abc".into()), &draft())
        .await
        .unwrap();

    assert_eq!(updated.map(|s| s.id), Some(ResourceId::Text("abc".into())));
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/students/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client
        .update_student(&ResourceId::Number(99), &draft())
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_success() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/students/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_student(&ResourceId::Number(7)).await.unwrap();
}

#[tokio::test]
async fn test_second_delete_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/students/7"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/students/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    client.delete_student(&ResourceId::Number(7)).await.unwrap();
    let err = client
        .delete_student(&ResourceId::Number(7))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let base_url = Url::parse("http://127.0.0.1:1").unwrap();
    let client =
        StudentsClient::with_client(reqwest::Client::new(), &base_url, "/api/students").unwrap();

    let err = client.list_students().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
}
