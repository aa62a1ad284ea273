//! # Document store
//!
//! Every route performs exactly one call against a [`DocumentStore`].
//!
//! ## Backends
//!
//! - [`MemoryStore`]: process-local map, lost on restart. Used when no Redis URL is configured.
//! - [`RedisStore`]: one Redis hash per collection, field is the note id, value is the JSON record.
//!
//! ## Semantics
//!
//! - `add` assigns the id, callers never choose one
//! - `update` only touches title and content and never creates a missing record
//! - `update`/`delete` report whether the id existed, the route decides what that means
//! - `update` is a single Lua script on Redis, so it cannot interleave with a delete
//! - Otherwise no transactions, concurrent updates to the same id are last-writer-wins
use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bank::{Note, NoteInput};
use chrono::{DateTime, Utc};
use redis::{
    AsyncCommands, Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt record: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A note as persisted, the id lives outside the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NoteRecord {
    pub fn new(input: NoteInput, created_at: DateTime<Utc>) -> Self {
        Self {
            title: input.title,
            content: input.content,
            created_at,
        }
    }

    pub fn into_note(self, id: String) -> Note {
        Note {
            id,
            title: self.title,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    async fn add(&self, record: NoteRecord) -> Result<String, StoreError>;

    async fn list(&self) -> Result<Vec<Note>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Note>, StoreError>;

    /// Returns `false` when `id` is absent.
    async fn update(&self, id: &str, input: NoteInput) -> Result<bool, StoreError>;

    /// Returns `false` when `id` is absent.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, NoteRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn add(&self, record: NoteRecord) -> Result<String, StoreError> {
        let id = new_id();
        self.records.write().await.insert(id.clone(), record);

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let mut notes: Vec<Note> = self
            .records
            .read()
            .await
            .iter()
            .map(|(id, record)| record.clone().into_note(id.clone()))
            .collect();
        sort_notes(&mut notes);

        Ok(notes)
    }

    async fn get(&self, id: &str) -> Result<Option<Note>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(id)
            .map(|record| record.clone().into_note(id.to_string())))
    }

    async fn update(&self, id: &str, input: NoteInput) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;

        let Some(record) = records.get_mut(id) else {
            return Ok(false);
        };
        record.title = input.title;
        record.content = input.content;

        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(id).is_some())
    }
}

/// Rewrites title and content inside Redis so a concurrent `HDEL` cannot be undone.
///
/// KEYS[1] collection, ARGV id, title, content. Returns 0 when the field is absent.
const UPDATE_SCRIPT: &str = r#"
local payload = redis.call('HGET', KEYS[1], ARGV[1])
if not payload then
    return 0
end
local record = cjson.decode(payload)
record.title = ARGV[2]
record.content = ARGV[3]
redis.call('HSET', KEYS[1], ARGV[1], cjson.encode(record))
return 1
"#;

pub struct RedisStore {
    connection: ConnectionManager,
    collection: String,
    update_script: Script,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, collection: &str) -> Result<Self, StoreError> {
        let config = ConnectionManagerConfig::new().set_number_of_retries(1);

        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager_with_config(config).await?;

        Ok(Self::new(connection, collection))
    }

    pub fn new(connection: ConnectionManager, collection: &str) -> Self {
        Self {
            connection,
            collection: collection.to_string(),
            update_script: Script::new(UPDATE_SCRIPT),
        }
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    fn backend_tag(&self) -> &'static str {
        "redis"
    }

    async fn add(&self, record: NoteRecord) -> Result<String, StoreError> {
        let mut connection = self.connection.clone();
        let id = new_id();
        let payload = serde_json::to_string(&record)?;

        let _: () = connection.hset(&self.collection, &id, payload).await?;

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let mut connection = self.connection.clone();
        let entries: HashMap<String, String> = connection.hgetall(&self.collection).await?;

        let mut notes = entries
            .into_iter()
            .map(|(id, payload)| {
                serde_json::from_str::<NoteRecord>(&payload).map(|record| record.into_note(id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        sort_notes(&mut notes);

        Ok(notes)
    }

    async fn get(&self, id: &str) -> Result<Option<Note>, StoreError> {
        let mut connection = self.connection.clone();
        let payload: Option<String> = connection.hget(&self.collection, id).await?;

        payload
            .map(|payload| {
                serde_json::from_str::<NoteRecord>(&payload)
                    .map(|record| record.into_note(id.to_string()))
            })
            .transpose()
            .map_err(StoreError::from)
    }

    async fn update(&self, id: &str, input: NoteInput) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        let updated: i64 = self
            .update_script
            .key(&self.collection)
            .arg(id)
            .arg(input.title)
            .arg(input.content)
            .invoke_async(&mut connection)
            .await?;

        Ok(updated == 1)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let removed: usize = connection.hdel(&self.collection, id).await?;

        Ok(removed > 0)
    }
}

pub async fn init_store(
    redis_url: Option<&str>,
    collection: &str,
) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match redis_url {
        Some(url) => Ok(Arc::new(RedisStore::connect(url, collection).await?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}
