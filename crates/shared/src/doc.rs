//! Stored document shapes, distinct from the view models in [`crate::view`].
//!
//! Collection layout on the hosted store:
//!
//! ```text
//! tweets/{tweet_id}                 TweetDoc
//! tweets/{tweet_id}/likes/{uid}     LikeDoc
//! tweets/{tweet_id}/comments/{id}   CommentDoc
//! users/{uid}/likes/{tweet_id}      LikeDoc
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{TweetId, UserId};

/// One tweet document. Author fields are copied in at write time and never
/// re-read from the profile afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetDoc {
    pub id: TweetId,
    pub uid: UserId,
    pub fullname: String,
    pub username: String,
    pub profile_image_url: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDoc {
    pub uid: UserId,
    pub fullname: String,
    pub username: String,
    pub profile_image_url: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Like relation record: its existence is the payload. The pair of records
/// (viewer-side and tweet-side) is maintained by two independent writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeDoc {}
