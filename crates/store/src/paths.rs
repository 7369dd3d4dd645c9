//! Typed collection/document addressing for the hosted store.
//!
//! Paths alternate collection and document segments, so a collection path
//! always has an odd number of segments and a document path an even number.

use shared::domain::{TweetId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl CollectionPath {
    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath(format!("{}/{id}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocumentPath {
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{name}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path segment, i.e. the document id.
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The collection this document lives in.
    pub fn parent(&self) -> CollectionPath {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => CollectionPath(parent.to_string()),
            None => CollectionPath(self.0.clone()),
        }
    }
}

/// Top-level tweet collection.
pub fn tweets() -> CollectionPath {
    CollectionPath("tweets".to_string())
}

pub fn tweet(id: &TweetId) -> DocumentPath {
    tweets().doc(id.as_str())
}

/// Like relation records under a tweet, keyed by user id.
pub fn tweet_likes(id: &TweetId) -> CollectionPath {
    tweet(id).collection("likes")
}

pub fn tweet_comments(id: &TweetId) -> CollectionPath {
    tweet(id).collection("comments")
}

/// Like relation records under a user, keyed by tweet id.
pub fn user_likes(uid: &UserId) -> CollectionPath {
    CollectionPath(format!("users/{uid}/likes"))
}
