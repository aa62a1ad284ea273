use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use bank::{ErrorBody, Message, Note, NoteInput};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use server::{
    app,
    config::{Config, MissingNotePolicy},
    database::{DocumentStore, MemoryStore, NoteRecord, StoreError},
    state::AppState,
};
use tokio::net::TcpListener;

async fn spawn(config: Config, store: Arc<dyn DocumentStore>) -> String {
    let state = AppState::with_store(config, store);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app(state)).await.expect("serve app") });

    format!("http://{addr}/notes")
}

async fn spawn_memory() -> String {
    spawn(Config::default(), Arc::new(MemoryStore::new())).await
}

async fn create(client: &Client, base: &str, title: &str, content: &str) -> Note {
    let response = client
        .post(base)
        .json(&NoteInput::new(title, content))
        .send()
        .await
        .expect("post note");
    assert_eq!(response.status(), StatusCode::OK);

    response.json().await.expect("note json")
}

#[tokio::test]
async fn groceries_scenario() {
    let base = spawn_memory().await;
    let client = Client::new();

    let response = client
        .post(&base)
        .json(&json!({"title": "Groceries", "content": "Milk, eggs"}))
        .send()
        .await
        .expect("post note");
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = response.json().await.expect("json");

    let id = created["id"].as_str().expect("id").to_string();
    assert!(!id.is_empty());
    assert_eq!(created["title"], "Groceries");
    assert_eq!(created["content"], "Milk, eggs");
    assert!(created["createdAt"].is_string());

    let fetched: Value = client
        .get(format!("{base}/{id}"))
        .send()
        .await
        .expect("get note")
        .json()
        .await
        .expect("json");
    assert_eq!(fetched, created);

    let response = client
        .delete(format!("{base}/{id}"))
        .send()
        .await
        .expect("delete note");
    assert_eq!(response.status(), StatusCode::OK);
    let message: Message = response.json().await.expect("json");
    assert_eq!(message.message, "Note deleted successfully");

    let response = client
        .get(format!("{base}/{id}"))
        .send()
        .await
        .expect("get note");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body, json!({"error": "Note not found"}));
}

#[tokio::test]
async fn update_keeps_identity_and_timestamp() {
    let base = spawn_memory().await;
    let client = Client::new();
    let original = create(&client, &base, "Draft", "first pass").await;

    let response = client
        .put(format!("{base}/{}", original.id))
        .json(&NoteInput::new("Final", "second pass"))
        .send()
        .await
        .expect("put note");
    assert_eq!(response.status(), StatusCode::OK);
    let message: Message = response.json().await.expect("json");
    assert_eq!(message.message, "Note updated successfully");

    let updated: Note = client
        .get(format!("{base}/{}", original.id))
        .send()
        .await
        .expect("get note")
        .json()
        .await
        .expect("json");
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.content, "second pass");
}

#[tokio::test]
async fn list_reflects_creates_minus_deletes() {
    let base = spawn_memory().await;
    let client = Client::new();

    let mut created = Vec::new();
    for i in 0..5 {
        created.push(create(&client, &base, &format!("note {i}"), "body").await);
    }
    for note in &created[..2] {
        let status = client
            .delete(format!("{base}/{}", note.id))
            .send()
            .await
            .expect("delete")
            .status();
        assert_eq!(status, StatusCode::OK);
    }

    let listed: Vec<Note> = client
        .get(&base)
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("json");
    assert_eq!(listed.len(), 3);
    for note in &listed {
        assert!(created[2..].iter().any(|c| c == note));
    }
}

#[tokio::test]
async fn missing_ids_confirm_by_default() {
    let base = spawn_memory().await;
    let client = Client::new();

    let response = client
        .put(format!("{base}/ghost"))
        .json(&NoteInput::new("a", "b"))
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .delete(format!("{base}/ghost"))
        .send()
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);

    let status = client
        .get(format!("{base}/ghost"))
        .send()
        .await
        .expect("get")
        .status();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_ids_can_be_not_found() {
    let config = Config {
        missing_note_policy: MissingNotePolicy::NotFound,
        ..Config::default()
    };
    let base = spawn(config, Arc::new(MemoryStore::new())).await;
    let client = Client::new();

    let response = client
        .put(format!("{base}/ghost"))
        .json(&NoteInput::new("a", "b"))
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = response.json().await.expect("json");
    assert_eq!(body.error, "Note not found");

    let status = client
        .delete(format!("{base}/ghost"))
        .send()
        .await
        .expect("delete")
        .status();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_bodies_never_reach_the_store() {
    let base = spawn_memory().await;
    let client = Client::new();

    let response = client
        .post(&base)
        .json(&json!({"title": "", "content": "x"}))
        .send()
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.expect("json");
    assert_eq!(body.error, "Title and content are required");

    let response = client
        .post(&base)
        .json(&json!({"title": "only a title"}))
        .send()
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.expect("json");
    assert_eq!(body.error, "Malformed payload");

    let response = client
        .post(&base)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listed: Vec<Note> = client
        .get(&base)
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("json");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn invalid_update_bodies_leave_the_note_alone() {
    let base = spawn_memory().await;
    let client = Client::new();
    let original = create(&client, &base, "Groceries", "Milk, eggs").await;
    let url = format!("{base}/{}", original.id);

    let response = client
        .put(&url)
        .json(&json!({"title": "", "content": "Bread"}))
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.expect("json");
    assert_eq!(body.error, "Title and content are required");

    let response = client
        .put(&url)
        .json(&json!({"title": "Groceries"}))
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.expect("json");
    assert_eq!(body.error, "Malformed payload");

    let stored: Note = client
        .get(&url)
        .send()
        .await
        .expect("get note")
        .json()
        .await
        .expect("json");
    assert_eq!(stored, original);
}

struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    fn backend_tag(&self) -> &'static str {
        "broken"
    }

    async fn add(&self, _record: NoteRecord) -> Result<String, StoreError> {
        Err(broken())
    }

    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        Err(broken())
    }

    async fn get(&self, _id: &str) -> Result<Option<Note>, StoreError> {
        Err(broken())
    }

    async fn update(&self, _id: &str, _input: NoteInput) -> Result<bool, StoreError> {
        Err(broken())
    }

    async fn delete(&self, _id: &str) -> Result<bool, StoreError> {
        Err(broken())
    }
}

fn broken() -> StoreError {
    StoreError::Redis(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "connection refused",
    )))
}

#[tokio::test]
async fn store_failures_map_to_static_messages() {
    let base = spawn(Config::default(), Arc::new(BrokenStore)).await;
    let client = Client::new();

    let cases = [
        (
            client.post(&base).json(&NoteInput::new("a", "b")),
            "Failed to create note",
        ),
        (client.get(&base), "Failed to fetch notes"),
        (client.get(format!("{base}/x")), "Failed to fetch note"),
        (
            client
                .put(format!("{base}/x"))
                .json(&NoteInput::new("a", "b")),
            "Failed to update note",
        ),
        (client.delete(format!("{base}/x")), "Failed to delete note"),
    ];

    for (request, expected) in cases {
        let response = request.send().await.expect("send");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = response.json().await.expect("json");
        assert_eq!(body.error, expected);
    }
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let base = spawn_memory().await;
    let client = Client::new();

    let response = client
        .request(reqwest::Method::OPTIONS, &base)
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .expect("preflight");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
