//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use shared::domain::TweetId;

pub enum BackendCommand {
    RefreshFeed,
    OpenTweet {
        tweet_id: TweetId,
    },
    SendTweet {
        text: String,
        attachment_path: Option<PathBuf>,
    },
    SendComment {
        tweet_id: TweetId,
        text: String,
    },
    Like {
        tweet_id: TweetId,
    },
    Unlike {
        tweet_id: TweetId,
    },
}
