//! Client seam for the hosted document store and its collaborators.
//!
//! The repository layer talks to three traits defined here: [`DocumentStore`]
//! (identifier-keyed documents in nested collections), [`BlobStore`] (file
//! uploads that resolve to public URLs), and [`ServerClock`] (the write
//! timestamp collaborator). [`rest::RestStore`] backs all three with the
//! hosted HTTP API; [`memory::MemoryStore`] backs them in-process for tests
//! and offline runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{domain::UserId, error::ApiError};
use thiserror::Error;

pub mod memory;
pub mod paths;
pub mod rest;

pub use paths::{CollectionPath, DocumentPath};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {path}")]
    Status {
        status: reqwest::StatusCode,
        path: String,
    },
    #[error("failed to decode document: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering applied by the store to a collection listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub direction: Direction,
}

impl OrderBy {
    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Descending,
        }
    }

    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
        }
    }
}

/// One identifier-keyed document as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone()).map_err(StoreError::Decode)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists every document in a collection, optionally ordered by the store.
    async fn list(
        &self,
        collection: &CollectionPath,
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Fetches one document; [`StoreError::NotFound`] when absent.
    async fn get(&self, document: &DocumentPath) -> Result<Document, StoreError>;

    /// Upserts one document.
    async fn set(&self, document: &DocumentPath, data: Value) -> Result<(), StoreError>;

    /// Deletes one document. Deleting an absent document succeeds.
    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads a file under a logical path scoped by purpose and owner and
    /// returns a publicly fetchable URL.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        purpose: &str,
        owner: &UserId,
        filename: &str,
    ) -> Result<String, StoreError>;
}

/// Timestamp collaborator: supplies the server-consistent "now" for writes.
pub trait ServerClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
