//! reqwest-backed client for the hosted document-store HTTP API.
//!
//! Documents live under `/v1/<path>`; collection listings take optional
//! `order_by`/`direction` query parameters; blob uploads go to
//! `/v1/blobs/{purpose}/{owner}`. Failures carry the structured
//! [`ApiError`](shared::error::ApiError) body when the server provides one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use shared::{domain::UserId, error::ApiError};
use tracing::debug;

use crate::{
    BlobStore, CollectionPath, Direction, Document, DocumentPath, DocumentStore, OrderBy,
    ServerClock, StoreError,
};

#[derive(Debug, Deserialize)]
struct WireDocument {
    id: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    documents: Vec<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct BlobUploadResponse {
    url: String,
}

pub struct RestStore {
    http: Client,
    base_url: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }
}

/// Maps a non-success response to a [`StoreError`], preferring the server's
/// structured error body when it decodes.
async fn check(response: Response, path: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(path.to_string()));
    }
    if let Ok(api_error) = response.json::<ApiError>().await {
        return Err(StoreError::Api(api_error));
    }
    Err(StoreError::Status {
        status,
        path: path.to_string(),
    })
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn list(
        &self,
        collection: &CollectionPath,
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut request = self.http.get(self.url(collection.as_str()));
        if let Some(order) = order {
            let direction = match order.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            request = request.query(&[("order_by", order.field), ("direction", direction)]);
        }

        let response = check(request.send().await?, collection.as_str()).await?;
        let body: ListResponse = response.json().await?;
        Ok(body
            .documents
            .into_iter()
            .map(|doc| Document {
                id: doc.id,
                data: doc.data,
            })
            .collect())
    }

    async fn get(&self, document: &DocumentPath) -> Result<Document, StoreError> {
        let response = check(
            self.http.get(self.url(document.as_str())).send().await?,
            document.as_str(),
        )
        .await?;
        let body: WireDocument = response.json().await?;
        Ok(Document {
            id: body.id,
            data: body.data,
        })
    }

    async fn set(&self, document: &DocumentPath, data: Value) -> Result<(), StoreError> {
        debug!(path = document.as_str(), "writing document");
        check(
            self.http
                .put(self.url(document.as_str()))
                .json(&data)
                .send()
                .await?,
            document.as_str(),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError> {
        debug!(path = document.as_str(), "deleting document");
        let result = check(
            self.http.delete(self.url(document.as_str())).send().await?,
            document.as_str(),
        )
        .await;
        match result {
            // Deleting an already-absent document is a success.
            Err(StoreError::NotFound(_)) => Ok(()),
            Err(err) => Err(err),
            Ok(_) => Ok(()),
        }
    }
}

#[async_trait]
impl BlobStore for RestStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        purpose: &str,
        owner: &UserId,
        filename: &str,
    ) -> Result<String, StoreError> {
        let path = format!("blobs/{purpose}/{owner}");
        let response = check(
            self.http
                .post(self.url(&path))
                .query(&[("filename", filename)])
                .body(bytes)
                .send()
                .await?,
            &path,
        )
        .await?;
        let body: BlobUploadResponse = response.json().await?;
        Ok(body.url)
    }
}

impl ServerClock for RestStore {
    // Stands in for the server timestamp the hosted SDK would supply.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
