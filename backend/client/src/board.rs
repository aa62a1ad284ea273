use std::fmt::Write;

use bank::{Note, NoteInput};
use tracing::{debug, error};

use crate::api::NotesApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// A field was empty, nothing was sent.
    Invalid,
    Created,
    Failed,
}

/// Local copy of the note list plus the pending form fields.
///
/// The list is only replaced by `mount` and otherwise patched with what this
/// board's own requests return, so it can go stale against other writers.
pub struct NoteBoard<A> {
    api: A,
    notes: Vec<Note>,
    title: String,
    content: String,
}

impl<A: NotesApi> NoteBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            notes: Vec::new(),
            title: String::new(),
            content: String::new(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Replaces the local list with the server's. Keeps the old list on failure.
    pub async fn mount(&mut self) {
        match self.api.list().await {
            Ok(notes) => {
                debug!(count = notes.len(), "Fetched notes");
                self.notes = notes;
            }
            Err(e) => error!("Error fetching notes: {e}"),
        }
    }

    pub async fn submit(&mut self) -> Submit {
        let input = NoteInput::new(self.title.clone(), self.content.clone());

        if !input.is_complete() {
            return Submit::Invalid;
        }

        match self.api.create(&input).await {
            Ok(note) => {
                self.notes.push(note);
                self.title.clear();
                self.content.clear();
                Submit::Created
            }
            Err(e) => {
                error!("Error adding note: {e}");
                Submit::Failed
            }
        }
    }

    /// Drops `id` locally once the server accepted the delete.
    pub async fn delete(&mut self, id: &str) -> bool {
        match self.api.delete(id).await {
            Ok(_) => {
                self.notes.retain(|note| note.id != id);
                true
            }
            Err(e) => {
                error!("Error deleting note: {e}");
                false
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Note App\n");

        if self.notes.is_empty() {
            out.push_str("  (no notes)\n");
        }

        for (index, note) in self.notes.iter().enumerate() {
            let _ = writeln!(
                out,
                "  [{}] {}: {}  ({})",
                index + 1,
                note.title,
                note.content,
                note.id
            );
        }

        out
    }
}
