use std::sync::Arc;

use bank::NoteInput;
use client::{HttpNotesApi, NoteBoard, NotesApi, Submit};
use server::{app, config::Config, database::MemoryStore, state::AppState};
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let state = AppState::with_store(Config::default(), Arc::new(MemoryStore::new()));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app(state)).await.expect("serve app") });

    format!("http://{addr}/notes")
}

#[tokio::test]
async fn board_tracks_server_state() {
    let base = spawn_server().await;
    let seeded = HttpNotesApi::new(&base)
        .create(&NoteInput::new("Seeded", "before mount"))
        .await
        .expect("seed");

    let mut board = NoteBoard::new(HttpNotesApi::new(&base));
    board.mount().await;
    assert_eq!(board.notes().len(), 1);
    assert_eq!(board.notes()[0], seeded);

    board.set_title("Groceries");
    board.set_content("Milk, eggs");
    assert_eq!(board.submit().await, Submit::Created);
    assert_eq!(board.notes().len(), 2);
    assert!(board.title().is_empty());

    let created_id = board.notes()[1].id.clone();
    let fetched = board.api().get(&created_id).await.expect("get");
    assert_eq!(fetched.title, "Groceries");

    assert!(board.delete(&seeded.id).await);
    assert_eq!(board.notes().len(), 1);

    let remote = board.api().list().await.expect("list");
    assert_eq!(remote, board.notes());
}

#[tokio::test]
async fn update_is_available_through_the_api() {
    let base = spawn_server().await;
    let api = HttpNotesApi::new(&base);

    let note = api
        .create(&NoteInput::new("Draft", "v1"))
        .await
        .expect("create");
    let message = api
        .update(&note.id, &NoteInput::new("Draft", "v2"))
        .await
        .expect("update");
    assert_eq!(message.message, "Note updated successfully");

    let fetched = api.get(&note.id).await.expect("get");
    assert_eq!(fetched.content, "v2");
    assert_eq!(fetched.created_at, note.created_at);
}

#[tokio::test]
async fn unreachable_server_leaves_board_untouched() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let mut board = NoteBoard::new(HttpNotesApi::new(format!("http://{addr}/notes")));
    board.mount().await;
    board.set_title("Groceries");
    board.set_content("Milk, eggs");

    assert_eq!(board.submit().await, Submit::Failed);
    assert!(board.notes().is_empty());
    assert_eq!(board.title(), "Groceries");
    assert!(!board.delete("anything").await);
}

#[tokio::test]
async fn missing_note_surfaces_server_error() {
    let base = spawn_server().await;
    let api = HttpNotesApi::new(&base);

    let err = api.get("ghost").await.expect_err("missing note");
    assert!(err.to_string().contains("Note not found"));
}
