use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_token, Envelope, Task};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_tasks_empty() {
    let resp = app().oneshot(empty_request("GET", "/tasks")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Envelope<Task> = body_json(resp).await;
    assert!(envelope.data.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_task_returns_201_with_one_element() {
    let resp = app()
        .oneshot(json_request("POST", "/tasks", r#"{"label":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let envelope: Envelope<Task> = body_json(resp).await;
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0].id, 1);
    assert_eq!(envelope.data[0].label, "Buy milk");
    assert!(!envelope.data[0].done);
}

#[tokio::test]
async fn create_task_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/tasks", r#"{"not_label":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_task_not_found() {
    let resp = app().oneshot(empty_request("GET", "/tasks/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_task_non_integer_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/tasks/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- replace / patch ---

#[tokio::test]
async fn replace_task_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/tasks/1", r#"{"label":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_task_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/tasks/1", r#"{"done":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_task_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/tasks/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- access token ---

#[tokio::test]
async fn protected_app_rejects_missing_token() {
    let resp = app_with_token(Some("s3cret".to_string()))
        .oneshot(empty_request("GET", "/tasks"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_app_accepts_matching_token() {
    let resp = app_with_token(Some("s3cret".to_string()))
        .oneshot(empty_request("GET", "/tasks?access_token=s3cret"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/tasks", r#"{"label":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Envelope<Task> = body_json(resp).await;
    let id = created.data[0].id;

    // second task, already done, for filtering
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/tasks",
            r#"{"label":"Feed cat","done":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // list — both, ordered by id
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/tasks"))
        .await
        .unwrap();
    let listed: Envelope<Task> = body_json(resp).await;
    let ids: Vec<i64> = listed.data.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![id, id + 1]);

    // list filtered
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/tasks?done=true"))
        .await
        .unwrap();
    let listed: Envelope<Task> = body_json(resp).await;
    assert_eq!(listed.data.len(), 1);
    assert_eq!(listed.data[0].label, "Feed cat");

    // patch — only done
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/tasks/{id}"),
            r#"{"done":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Envelope<Task> = body_json(resp).await;
    assert_eq!(patched.data[0].label, "Walk dog"); // unchanged
    assert!(patched.data[0].done);

    // replace — omitted done resets to default
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/tasks/{id}"),
            r#"{"label":"Walk cat"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Envelope<Task> = body_json(resp).await;
    assert_eq!(replaced.data[0].label, "Walk cat");
    assert!(!replaced.data[0].done);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/tasks/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/tasks/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
