use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u32,
    pub id: u32,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: u32,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Upload {
    pub id: Uuid,
    pub fields: BTreeMap<String, String>,
    pub files: Vec<UploadedFile>,
}

#[derive(Default)]
pub struct Store {
    posts: BTreeMap<u32, Post>,
    next_id: u32,
}

pub type Db = Arc<RwLock<Store>>;

/// Token accepted by the bearer-protected routes.
pub const VALID_TOKEN: &str = "let-me-in";

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        posts: BTreeMap::new(),
        next_id: 1,
    }));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/me", get(me))
        .route("/uploads", post(upload))
        .route("/echo", post(echo).put(echo))
        .route("/headers", get(echo_headers))
        .route("/empty", get(no_content))
        .route("/malformed", get(malformed))
        .route("/validation", post(validation_error))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn problem(status: StatusCode, title: &str, errors: Value) -> Response {
    (status, Json(json!({ "title": title, "errors": errors }))).into_response()
}

fn not_found(id: u32) -> Response {
    problem(
        StatusCode::NOT_FOUND,
        "Not Found",
        Value::String(format!("No post with id {id}")),
    )
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(store.posts.values().cloned().collect())
}

async fn create_post(State(db): State<Db>, Json(input): Json<NewPost>) -> (StatusCode, Json<Post>) {
    let mut store = db.write().await;
    let post = Post {
        user_id: input.user_id,
        id: store.next_id,
        title: input.title,
        body: input.body,
    };
    store.next_id += 1;
    store.posts.insert(post.id, post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(State(db): State<Db>, Path(id): Path<u32>) -> Response {
    let store = db.read().await;
    match store.posts.get(&id) {
        Some(post) => Json(post.clone()).into_response(),
        None => not_found(id),
    }
}

async fn update_post(State(db): State<Db>, Path(id): Path<u32>, Json(input): Json<NewPost>) -> Response {
    let mut store = db.write().await;
    let Some(post) = store.posts.get_mut(&id) else {
        return not_found(id);
    };
    post.user_id = input.user_id;
    post.title = input.title;
    post.body = input.body;
    Json(post.clone()).into_response()
}

async fn delete_post(State(db): State<Db>, Path(id): Path<u32>) -> Response {
    let mut store = db.write().await;
    match store.posts.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(id),
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn me(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(VALID_TOKEN) => Json(json!({ "name": "tester", "token": VALID_TOKEN })).into_response(),
        Some(_) => (StatusCode::FORBIDDEN, Json(json!({ "message": "token rejected" }))).into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "missing bearer token" }))).into_response(),
    }
}

async fn upload(headers: HeaderMap, mut multipart: Multipart) -> Response {
    if bearer(&headers) != Some(VALID_TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "missing bearer token" }))).into_response();
    }

    let mut fields = BTreeMap::new();
    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return problem(StatusCode::BAD_REQUEST, "Bad multipart body", Value::String(err.to_string())),
        };
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return problem(StatusCode::BAD_REQUEST, "Bad multipart body", Value::String(err.to_string())),
        };
        match file_name {
            Some(file_name) => files.push(UploadedFile {
                name,
                file_name,
                content_type,
                size: bytes.len(),
            }),
            None => {
                fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    let upload = Upload {
        id: Uuid::new_v4(),
        fields,
        files,
    };
    (StatusCode::CREATED, Json(upload)).into_response()
}

async fn echo(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    let echoed = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(echoed)
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn malformed() -> Response {
    ([(header::CONTENT_TYPE, "application/json")], "{\"title\": \"unterminated").into_response()
}

async fn validation_error() -> Response {
    problem(
        StatusCode::UNPROCESSABLE_ENTITY,
        "One or more validation errors occurred.",
        json!({ "title": ["The title field is required."] }),
    )
}
