use async_trait::async_trait;
use bank::{ErrorBody, Message, Note, NoteInput};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/notes";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered {status}: {error}")]
    Status { status: StatusCode, error: String },
}

/// The five calls the notes API answers.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, ApiError>;

    async fn create(&self, input: &NoteInput) -> Result<Note, ApiError>;

    async fn get(&self, id: &str) -> Result<Note, ApiError>;

    async fn update(&self, id: &str, input: &NoteInput) -> Result<Message, ApiError>;

    async fn delete(&self, id: &str) -> Result<Message, ApiError>;
}

pub struct HttpNotesApi {
    client: Client,
    base_url: String,
}

impl HttpNotesApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn note_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let error = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());

        return Err(ApiError::Status { status, error });
    }

    Ok(response.json().await?)
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list(&self) -> Result<Vec<Note>, ApiError> {
        decode(self.client.get(&self.base_url).send().await?).await
    }

    async fn create(&self, input: &NoteInput) -> Result<Note, ApiError> {
        decode(self.client.post(&self.base_url).json(input).send().await?).await
    }

    async fn get(&self, id: &str) -> Result<Note, ApiError> {
        decode(self.client.get(self.note_url(id)).send().await?).await
    }

    async fn update(&self, id: &str, input: &NoteInput) -> Result<Message, ApiError> {
        decode(self.client.put(self.note_url(id)).json(input).send().await?).await
    }

    async fn delete(&self, id: &str) -> Result<Message, ApiError> {
        decode(self.client.delete(self.note_url(id)).send().await?).await
    }
}
