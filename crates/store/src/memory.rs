//! In-process store used by tests and the desktop app's offline mode.

use std::{cmp::Ordering, collections::HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::domain::UserId;
use tokio::sync::RwLock;

use crate::{
    BlobStore, CollectionPath, Direction, Document, DocumentPath, DocumentStore, OrderBy,
    ServerClock, StoreError,
};

#[derive(Default)]
struct MemoryState {
    // Documents keyed by collection path, in insertion order. Listing a
    // collection without an OrderBy returns that order, which is what the
    // hosted store does for unordered subcollection reads.
    collections: HashMap<String, Vec<(String, Value)>>,
    blobs: HashMap<String, Vec<u8>>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs, for assertions in tests.
    pub async fn blob_count(&self) -> usize {
        self.state.read().await.blobs.len()
    }
}

fn compare_order_field(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => {
            // Timestamps serialize as RFC 3339 strings; compare as instants
            // when both sides parse, since fractional seconds break plain
            // lexicographic order.
            match (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(
        &self,
        collection: &CollectionPath,
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read().await;
        let mut documents: Vec<Document> = state
            .collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            documents.sort_by(|a, b| {
                let ordering = compare_order_field(
                    a.data.get(order.field).unwrap_or(&Value::Null),
                    b.data.get(order.field).unwrap_or(&Value::Null),
                );
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        Ok(documents)
    }

    async fn get(&self, document: &DocumentPath) -> Result<Document, StoreError> {
        let state = self.state.read().await;
        state
            .collections
            .get(document.parent().as_str())
            .and_then(|docs| docs.iter().find(|(id, _)| id == document.id()))
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .ok_or_else(|| StoreError::NotFound(document.as_str().to_string()))
    }

    async fn set(&self, document: &DocumentPath, data: Value) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let docs = state
            .collections
            .entry(document.parent().as_str().to_string())
            .or_default();
        match docs.iter().position(|(id, _)| id == document.id()) {
            Some(index) => docs[index].1 = data,
            None => docs.push((document.id().to_string(), data)),
        }
        Ok(())
    }

    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(docs) = state.collections.get_mut(document.parent().as_str()) {
            docs.retain(|(id, _)| id != document.id());
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        purpose: &str,
        owner: &UserId,
        filename: &str,
    ) -> Result<String, StoreError> {
        let path = format!("{purpose}/{owner}/{filename}");
        let mut state = self.state.write().await;
        state.blobs.insert(path.clone(), bytes);
        Ok(format!("memory://blobs/{path}"))
    }
}

impl ServerClock for MemoryStore {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
