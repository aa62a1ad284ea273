//! # Notes client
//!
//! Terminal front-end for the notes API.
//!
//! ## Flow
//! - On start, fetch the whole list once
//! - `add` sends the pending title/content, appends what the server returned, clears the fields
//! - `delete` removes the note locally once the server accepted it
//! - Failures are logged and otherwise ignored, the local list is left as it was
//! - Empty title or content never leaves the client
//!
//! ## Not wired
//! [`api::NotesApi::update`] exists, but the board never calls it.

pub mod api;
pub mod board;

pub use api::{ApiError, DEFAULT_API_URL, HttpNotesApi, NotesApi};
pub use board::{NoteBoard, Submit};
