use super::*;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shared::error::{ApiError, ErrorCode};
use store::{memory::MemoryStore, CollectionPath, DocumentPath, StoreError};

/// Deterministic write clock: each call is one second later than the last.
struct StepClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl StepClock {
    fn new() -> Self {
        Self {
            base: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("base timestamp"),
            ticks: AtomicI64::new(0),
        }
    }
}

impl ServerClock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::seconds(tick)
    }
}

struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _purpose: &str,
        _owner: &UserId,
        _filename: &str,
    ) -> Result<String, StoreError> {
        Err(StoreError::Api(ApiError::new(
            ErrorCode::Internal,
            "blob upload rejected",
        )))
    }
}

/// Delegates to a real in-memory store but rejects listings of collections
/// whose path ends with the configured suffix.
struct FailOnList {
    inner: Arc<MemoryStore>,
    fail_suffix: &'static str,
}

#[async_trait]
impl DocumentStore for FailOnList {
    async fn list(
        &self,
        collection: &CollectionPath,
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        if collection.as_str().ends_with(self.fail_suffix) {
            return Err(StoreError::Api(ApiError::new(
                ErrorCode::Internal,
                "listing rejected",
            )));
        }
        self.inner.list(collection, order).await
    }

    async fn get(&self, document: &DocumentPath) -> Result<Document, StoreError> {
        self.inner.get(document).await
    }

    async fn set(&self, document: &DocumentPath, data: serde_json::Value) -> Result<(), StoreError> {
        self.inner.set(document, data).await
    }

    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError> {
        self.inner.delete(document).await
    }
}

/// Delegates to a real in-memory store while logging every write-path call.
/// Writes under the configured collection prefix are rejected instead.
struct RecordingStore {
    inner: Arc<MemoryStore>,
    calls: Mutex<Vec<String>>,
    reject_writes_under: Option<&'static str>,
}

impl RecordingStore {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            reject_writes_under: None,
        }
    }

    fn rejecting_writes_under(inner: Arc<MemoryStore>, prefix: &'static str) -> Self {
        Self {
            reject_writes_under: Some(prefix),
            ..Self::new(inner)
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn list(
        &self,
        collection: &CollectionPath,
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection, order).await
    }

    async fn get(&self, document: &DocumentPath) -> Result<Document, StoreError> {
        self.inner.get(document).await
    }

    async fn set(&self, document: &DocumentPath, data: serde_json::Value) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("set {}", document.as_str()));
        if let Some(prefix) = self.reject_writes_under {
            if document.as_str().starts_with(prefix) {
                return Err(StoreError::Api(ApiError::new(
                    ErrorCode::Internal,
                    "write rejected",
                )));
            }
        }
        self.inner.set(document, data).await
    }

    async fn delete(&self, document: &DocumentPath) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete {}", document.as_str()));
        self.inner.delete(document).await
    }
}

fn profile(uid: &str, fullname: &str, username: &str) -> UserProfile {
    UserProfile {
        uid: UserId::new(uid),
        fullname: fullname.to_string(),
        username: username.to_string(),
        profile_image_url: format!("https://img.example/{uid}.png"),
    }
}

fn client_over(store: Arc<MemoryStore>) -> FeedClient {
    FeedClient::new(store.clone(), store, Arc::new(StepClock::new()))
}

#[tokio::test]
async fn feed_is_ordered_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store);
    let author = profile("u1", "Aki Tanaka", "aki");

    for text in ["first", "second", "third"] {
        client
            .send_tweet(&author, None, text)
            .await
            .expect("send tweet");
    }

    let feed = client
        .fetch_tweets(&author.uid)
        .await
        .expect("fetch feed");
    let texts: Vec<&str> = feed.iter().map(|tweet| tweet.text.as_str()).collect();
    assert_eq!(texts, ["third", "second", "first"]);
}

#[tokio::test]
async fn derived_counts_match_relation_documents() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store);
    let author = profile("u1", "Aki Tanaka", "aki");
    let liker = profile("u2", "Ben Ito", "ben");
    let other_liker = profile("u3", "Cam Sato", "cam");

    let tweet = client
        .send_tweet(&author, None, "count me")
        .await
        .expect("send tweet");
    client
        .like_tweet(&liker.uid, &tweet.id)
        .await
        .expect("like");
    client
        .like_tweet(&other_liker.uid, &tweet.id)
        .await
        .expect("like");
    client
        .send_comment(&liker, &tweet.id, "nice")
        .await
        .expect("comment");

    let feed = client.fetch_tweets(&liker.uid).await.expect("fetch feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].likes, 2);
    assert_eq!(feed[0].comments, 1);
    assert!(feed[0].is_liked);

    let feed = client.fetch_tweets(&author.uid).await.expect("fetch feed");
    assert!(!feed[0].is_liked);
}

#[tokio::test]
async fn fresh_tweet_without_attachment_has_empty_derived_fields() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store);
    let author = profile("u1", "Aki Tanaka", "aki");

    let tweet = client
        .send_tweet(&author, None, "no picture")
        .await
        .expect("send tweet");

    assert_eq!(tweet.image_url, None);
    assert_eq!(tweet.likes, 0);
    assert_eq!(tweet.comments, 0);
    assert!(!tweet.is_liked);
    assert_eq!(tweet.fullname, "Aki Tanaka");
    assert_eq!(tweet.username, "aki");
}

#[tokio::test]
async fn attachment_url_flows_into_the_stored_document() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store.clone());
    let author = profile("u1", "Aki Tanaka", "aki");

    let attachment = Attachment {
        bytes: b"png bytes".to_vec(),
        filename: "photo.png".to_string(),
    };
    let tweet = client
        .send_tweet(&author, Some(attachment), "with picture")
        .await
        .expect("send tweet");

    assert_eq!(
        tweet.image_url.as_deref(),
        Some("memory://blobs/tweet/u1/photo.png")
    );
    assert_eq!(store.blob_count().await, 1);

    let detail = client
        .fetch_tweet_detail(&tweet.id, &author.uid)
        .await
        .expect("detail");
    assert_eq!(detail.tweet.image_url, tweet.image_url);
}

#[tokio::test]
async fn like_then_unlike_leaves_no_relation_records() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store.clone());
    let author = profile("u1", "Aki Tanaka", "aki");
    let viewer = UserId::new("u2");

    let tweet = client
        .send_tweet(&author, None, "toggle me")
        .await
        .expect("send tweet");
    client.like_tweet(&viewer, &tweet.id).await.expect("like");
    client
        .unlike_tweet(&viewer, &tweet.id)
        .await
        .expect("unlike");

    let tweet_side = store
        .list(&paths::tweet_likes(&tweet.id), None)
        .await
        .expect("list tweet likes");
    let viewer_side = store
        .list(&paths::user_likes(&viewer), None)
        .await
        .expect("list user likes");
    assert!(tweet_side.is_empty());
    assert!(viewer_side.is_empty());

    let feed = client.fetch_tweets(&viewer).await.expect("fetch feed");
    assert_eq!(feed[0].likes, 0);
    assert!(!feed[0].is_liked);
}

#[tokio::test]
async fn unlike_without_prior_like_succeeds() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store);
    let author = profile("u1", "Aki Tanaka", "aki");

    let tweet = client
        .send_tweet(&author, None, "never liked")
        .await
        .expect("send tweet");
    client
        .unlike_tweet(&UserId::new("u2"), &tweet.id)
        .await
        .expect("unlike is idempotent");
}

#[tokio::test]
async fn like_relation_writes_touch_the_viewer_record_first() {
    let store = Arc::new(MemoryStore::new());
    let author = profile("u1", "Aki Tanaka", "aki");
    let tweet = client_over(store.clone())
        .send_tweet(&author, None, "ordered writes")
        .await
        .expect("send tweet");

    let recorder = Arc::new(RecordingStore::new(store.clone()));
    let client = FeedClient::new(recorder.clone(), store, Arc::new(StepClock::new()));
    let viewer = UserId::new("u2");

    client.like_tweet(&viewer, &tweet.id).await.expect("like");
    client
        .unlike_tweet(&viewer, &tweet.id)
        .await
        .expect("unlike");

    let id = tweet.id.as_str();
    assert_eq!(
        recorder.calls(),
        [
            format!("set users/u2/likes/{id}"),
            format!("set tweets/{id}/likes/u2"),
            format!("delete users/u2/likes/{id}"),
            format!("delete tweets/{id}/likes/u2"),
        ]
    );
}

#[tokio::test]
async fn failed_tweet_side_like_write_keeps_the_viewer_record() {
    let store = Arc::new(MemoryStore::new());
    let author = profile("u1", "Aki Tanaka", "aki");
    let tweet = client_over(store.clone())
        .send_tweet(&author, None, "half liked")
        .await
        .expect("send tweet");

    let recorder = Arc::new(RecordingStore::rejecting_writes_under(
        store.clone(),
        "tweets/",
    ));
    let client = FeedClient::new(recorder, store.clone(), Arc::new(StepClock::new()));
    let viewer = UserId::new("u2");

    client
        .like_tweet(&viewer, &tweet.id)
        .await
        .expect_err("tweet-side write rejected");

    // No rollback: the viewer-side record written first stays behind.
    let viewer_side = store
        .list(&paths::user_likes(&viewer), None)
        .await
        .expect("list user likes");
    let tweet_side = store
        .list(&paths::tweet_likes(&tweet.id), None)
        .await
        .expect("list tweet likes");
    assert_eq!(viewer_side.len(), 1);
    assert_eq!(viewer_side[0].id, tweet.id.as_str());
    assert!(tweet_side.is_empty());
}

#[tokio::test]
async fn detail_of_tweet_with_zero_comments() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store);
    let author = profile("u1", "Aki Tanaka", "aki");
    let liker = UserId::new("u2");

    let tweet = client
        .send_tweet(&author, None, "quiet tweet")
        .await
        .expect("send tweet");
    client.like_tweet(&liker, &tweet.id).await.expect("like");

    let detail = client
        .fetch_tweet_detail(&tweet.id, &liker)
        .await
        .expect("detail");
    assert!(detail.comments.is_empty());
    assert_eq!(detail.tweet.comments, 0);
    assert_eq!(detail.tweet.likes, 1);
    assert!(detail.tweet.is_liked);
}

#[tokio::test]
async fn detail_comments_preserve_store_return_order() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store);
    let author = profile("u1", "Aki Tanaka", "aki");
    let commenter = profile("u2", "Ben Ito", "ben");

    let tweet = client
        .send_tweet(&author, None, "discuss")
        .await
        .expect("send tweet");
    for text in ["one", "two", "three"] {
        client
            .send_comment(&commenter, &tweet.id, text)
            .await
            .expect("comment");
    }

    let detail = client
        .fetch_tweet_detail(&tweet.id, &author.uid)
        .await
        .expect("detail");
    let texts: Vec<&str> = detail
        .comments
        .iter()
        .map(|comment| comment.text.as_str())
        .collect();
    assert_eq!(texts, ["one", "two", "three"]);
    assert_eq!(detail.comments[0].username, "ben");
}

#[tokio::test]
async fn failed_attachment_upload_prevents_the_tweet_write() {
    let store = Arc::new(MemoryStore::new());
    let client = FeedClient::new(
        store.clone(),
        Arc::new(FailingBlobStore),
        Arc::new(StepClock::new()),
    );
    let author = profile("u1", "Aki Tanaka", "aki");

    let attachment = Attachment {
        bytes: b"png bytes".to_vec(),
        filename: "photo.png".to_string(),
    };
    let result = client
        .send_tweet(&author, Some(attachment), "never lands")
        .await;
    assert!(result.is_err());

    let tweets = store
        .list(&paths::tweets(), None)
        .await
        .expect("list tweets");
    assert!(tweets.is_empty());
}

#[tokio::test]
async fn feed_fetch_aborts_when_any_subquery_fails() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store.clone());
    let author = profile("u1", "Aki Tanaka", "aki");
    for text in ["a", "b"] {
        client
            .send_tweet(&author, None, text)
            .await
            .expect("send tweet");
    }

    let flaky = FeedClient::new(
        Arc::new(FailOnList {
            inner: store,
            fail_suffix: "comments",
        }),
        Arc::new(FailingBlobStore),
        Arc::new(StepClock::new()),
    );
    let result = flaky.fetch_tweets(&author.uid).await;
    assert!(result.is_err(), "no partial feed on sub-query failure");
}

#[tokio::test]
async fn detail_of_missing_tweet_surfaces_not_found() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(store);

    let err = client
        .fetch_tweet_detail(&TweetId::new("absent"), &UserId::new("u1"))
        .await
        .expect_err("missing tweet");
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::NotFound(_))
    ));
}
