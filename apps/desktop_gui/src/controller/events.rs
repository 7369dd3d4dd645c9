//! Events flowing from the backend worker back to the UI thread.

use shared::{
    domain::TweetId,
    view::{Comment, Tweet, TweetDetail},
};

pub enum UiEvent {
    Info(String),
    FeedLoaded(Vec<Tweet>),
    DetailLoaded(TweetDetail),
    TweetPosted(Tweet),
    CommentPosted { tweet_id: TweetId, comment: Comment },
    TweetLiked(TweetId),
    TweetUnliked(TweetId),
    Error(String),
}
