//! Repository layer: translates UI intents into document-store calls and
//! assembles view models.
//!
//! Every function is stateless given its store handles; failures from the
//! store surface verbatim to the caller. Like/comment counts and the
//! viewer-liked flag are derived per read by inspecting the relation
//! subcollections, not stored on the tweet document.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use shared::{
    doc::{CommentDoc, LikeDoc, TweetDoc},
    domain::{CommentId, TweetId, UserId, UserProfile},
    view::{Comment, Tweet, TweetDetail},
};
use store::{paths, BlobStore, Document, DocumentStore, OrderBy, ServerClock};
use tracing::error;

/// A file attached to a new tweet, uploaded to blob storage before the
/// tweet document is written.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub filename: String,
}

#[derive(Clone)]
pub struct FeedClient {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn ServerClock>,
}

impl FeedClient {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn ServerClock>,
    ) -> Self {
        Self {
            store,
            blobs,
            clock,
        }
    }

    /// Fetches the full feed for a viewer, newest first.
    ///
    /// Derived fields fan out as one like listing plus one comment listing
    /// per tweet, run concurrently across tweets and joined all-or-nothing:
    /// a single sub-query failure aborts the whole batch.
    pub async fn fetch_tweets(&self, viewer: &UserId) -> Result<Vec<Tweet>> {
        let docs = self
            .store
            .list(&paths::tweets(), Some(OrderBy::desc("timestamp")))
            .await?;
        let tweets = try_join_all(docs.iter().map(|doc| self.build_tweet(doc, viewer))).await?;
        Ok(tweets)
    }

    /// Fetches one tweet plus its comment list. Comments are returned in
    /// store order; only the feed listing is explicitly sorted.
    pub async fn fetch_tweet_detail(
        &self,
        tweet_id: &TweetId,
        viewer: &UserId,
    ) -> Result<TweetDetail> {
        let doc = self.store.get(&paths::tweet(tweet_id)).await?;
        let tweet_doc: TweetDoc = doc.decode()?;

        let likes = self
            .store
            .list(&paths::tweet_likes(tweet_id), None)
            .await?;
        let comment_docs = self
            .store
            .list(&paths::tweet_comments(tweet_id), None)
            .await?;

        let is_liked = likes.iter().any(|like| like.id == viewer.as_str());
        let tweet = Tweet::from_doc(
            tweet_doc,
            likes.len() as u64,
            comment_docs.len() as u64,
            is_liked,
        );
        let comments = comment_docs
            .iter()
            .map(|doc| doc.decode::<CommentDoc>().map(Comment::from_doc))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TweetDetail { tweet, comments })
    }

    /// Posts a new tweet. An attachment is uploaded first; if the upload
    /// fails the tweet document is never written. Author fields are copied
    /// into the document at write time.
    pub async fn send_tweet(
        &self,
        author: &UserProfile,
        attachment: Option<Attachment>,
        text: &str,
    ) -> Result<Tweet> {
        let image_url = match attachment {
            Some(upload) => Some(
                self.blobs
                    .upload(upload.bytes, "tweet", &author.uid, &upload.filename)
                    .await?,
            ),
            None => None,
        };

        let id = TweetId::generate();
        let doc = TweetDoc {
            id: id.clone(),
            uid: author.uid.clone(),
            fullname: author.fullname.clone(),
            username: author.username.clone(),
            profile_image_url: author.profile_image_url.clone(),
            text: text.to_string(),
            image_url,
            timestamp: self.clock.now(),
        };

        let data = serde_json::to_value(&doc)?;
        if let Err(err) = self.store.set(&paths::tweet(&id), data).await {
            error!(tweet_id = %id, "failed to write tweet document: {err}");
            return Err(err).context("failed to write tweet document");
        }

        Ok(Tweet::from_doc(doc, 0, 0, false))
    }

    /// Adds a comment under a tweet and returns its view model.
    pub async fn send_comment(
        &self,
        author: &UserProfile,
        tweet_id: &TweetId,
        text: &str,
    ) -> Result<Comment> {
        let doc = CommentDoc {
            uid: author.uid.clone(),
            fullname: author.fullname.clone(),
            username: author.username.clone(),
            profile_image_url: author.profile_image_url.clone(),
            text: text.to_string(),
            timestamp: self.clock.now(),
        };
        let data = serde_json::to_value(&doc)?;
        let comment_id = CommentId::generate();
        self.store
            .set(
                &paths::tweet_comments(tweet_id).doc(comment_id.as_str()),
                data,
            )
            .await?;
        Ok(Comment::from_doc(doc))
    }

    /// Marks a tweet liked by the viewer. Two independent writes in fixed
    /// order: the viewer-side record, then the tweet-side record. There is
    /// no rollback if the second write fails after the first succeeds.
    pub async fn like_tweet(&self, viewer: &UserId, tweet_id: &TweetId) -> Result<()> {
        let record = serde_json::to_value(LikeDoc::default())?;
        self.store
            .set(
                &paths::user_likes(viewer).doc(tweet_id.as_str()),
                record.clone(),
            )
            .await?;
        self.store
            .set(&paths::tweet_likes(tweet_id).doc(viewer.as_str()), record)
            .await?;
        Ok(())
    }

    /// Removes both like relation records, viewer-side first.
    pub async fn unlike_tweet(&self, viewer: &UserId, tweet_id: &TweetId) -> Result<()> {
        self.store
            .delete(&paths::user_likes(viewer).doc(tweet_id.as_str()))
            .await?;
        self.store
            .delete(&paths::tweet_likes(tweet_id).doc(viewer.as_str()))
            .await?;
        Ok(())
    }

    // Like listing first, then comment listing; the two are sequential
    // within a tweet while tweets themselves are built concurrently.
    async fn build_tweet(&self, doc: &Document, viewer: &UserId) -> Result<Tweet> {
        let tweet_doc: TweetDoc = doc.decode()?;
        let likes = self
            .store
            .list(&paths::tweet_likes(&tweet_doc.id), None)
            .await?;
        let comments = self
            .store
            .list(&paths::tweet_comments(&tweet_doc.id), None)
            .await?;
        let is_liked = likes.iter().any(|like| like.id == viewer.as_str());
        Ok(Tweet::from_doc(
            tweet_doc,
            likes.len() as u64,
            comments.len() as u64,
            is_liked,
        ))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
