//! View models: plain records shaped for rendering, assembled by the
//! repository layer from stored documents plus derived fields.

use serde::{Deserialize, Serialize};

use crate::{
    doc::{CommentDoc, TweetDoc},
    domain::{TweetId, UserId},
    time::format_timestamp,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub uid: UserId,
    pub fullname: String,
    pub username: String,
    pub profile_image_url: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: String,
    pub likes: u64,
    pub comments: u64,
    pub is_liked: bool,
}

impl Tweet {
    /// Builds the view model for one tweet from its stored document and the
    /// per-read derived fields (counts and the viewer-liked flag).
    pub fn from_doc(doc: TweetDoc, likes: u64, comments: u64, is_liked: bool) -> Self {
        Self {
            id: doc.id,
            uid: doc.uid,
            fullname: doc.fullname,
            username: doc.username,
            profile_image_url: doc.profile_image_url,
            text: doc.text,
            image_url: doc.image_url,
            timestamp: format_timestamp(doc.timestamp),
            likes,
            comments,
            is_liked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub uid: UserId,
    pub fullname: String,
    pub username: String,
    pub profile_image_url: String,
    pub text: String,
    pub timestamp: String,
}

impl Comment {
    pub fn from_doc(doc: CommentDoc) -> Self {
        Self {
            uid: doc.uid,
            fullname: doc.fullname,
            username: doc.username,
            profile_image_url: doc.profile_image_url,
            text: doc.text,
            timestamp: format_timestamp(doc.timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetDetail {
    pub tweet: Tweet,
    pub comments: Vec<Comment>,
}
