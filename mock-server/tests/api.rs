use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Post, VALID_TOKEN};
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

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- posts ---

#[tokio::test]
async fn list_posts_empty() {
    let resp = app().oneshot(get("/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Post> = body_json(resp).await;
    assert!(posts.is_empty());
}

#[tokio::test]
async fn create_post_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", r#"{"userId":4,"title":"Hi","body":"There"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.id, 1);
    assert_eq!(post.user_id, 4);
    assert_eq!(post.title, "Hi");
}

#[tokio::test]
async fn create_post_missing_title_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", r#"{"userId":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_post_has_problem_body() {
    let resp = app().oneshot(get("/posts/99")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["errors"], "No post with id 99");
}

#[tokio::test]
async fn non_numeric_id_returns_400() {
    let resp = app().oneshot(get("/posts/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_missing_post_returns_404() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/posts/5")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- auth ---

#[tokio::test]
async fn me_without_token_is_401_with_message() {
    let resp = app().oneshot(get("/me")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "missing bearer token");
}

#[tokio::test]
async fn me_with_valid_token() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(http::header::AUTHORIZATION, format!("Bearer {VALID_TOKEN}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["name"], "tester");
}

// --- fixtures ---

#[tokio::test]
async fn empty_returns_204_without_body() {
    let resp = app().oneshot(get("/empty")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn malformed_is_200_with_broken_json() {
    let resp = app().oneshot(get("/malformed")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

#[tokio::test]
async fn echo_returns_request_body() {
    let resp = app()
        .oneshot(json_request("POST", "/echo", r#"{"a":[1,2,3]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], br#"{"a":[1,2,3]}"#);
}

#[tokio::test]
async fn headers_are_echoed_lowercase() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/headers")
                .header("X-Request-Id", "abc")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["x-request-id"], "abc");
}

#[tokio::test]
async fn upload_requires_token() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/uploads")
                .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=X")
                .body("--X--\r\n".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_collects_fields_and_files() {
    let body = concat!(
        "--X\r\n",
        "Content-Disposition: form-data; name=\"caption\"\r\n\r\n",
        "sunset\r\n",
        "--X\r\n",
        "Content-Disposition: form-data; name=\"image\"; filename=\"s.png\"\r\n",
        "Content-Type: image/png\r\n\r\n",
        "PNG!\r\n",
        "--X--\r\n",
    );
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/uploads")
                .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=X")
                .header(http::header::AUTHORIZATION, format!("Bearer {VALID_TOKEN}"))
                .body(body.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let upload: mock_server::Upload = body_json(resp).await;
    assert_eq!(upload.fields["caption"], "sunset");
    assert_eq!(upload.files.len(), 1);
    assert_eq!(upload.files[0].file_name, "s.png");
    assert_eq!(upload.files[0].content_type, "image/png");
    assert_eq!(upload.files[0].size, 4);
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
        .call(json_request("POST", "/posts", r#"{"userId":1,"title":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Post = body_json(resp).await;
    let id = created.id;

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/posts/{id}"),
            r#"{"userId":1,"title":"Walk cat","body":"later"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Post = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert_eq!(updated.body, "later");

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/posts/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Post = body_json(resp).await;
    assert_eq!(fetched, updated);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/posts/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // list after delete: empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/posts"))
        .await
        .unwrap();
    let posts: Vec<Post> = body_json(resp).await;
    assert!(posts.is_empty());
}
