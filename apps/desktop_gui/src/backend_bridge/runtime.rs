//! Backend worker: owns a tokio runtime on its own thread and drives the
//! repository layer in response to queued UI commands.

use std::{path::PathBuf, sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use feed_client::{Attachment, FeedClient};
use shared::domain::{UserId, UserProfile};
use store::{memory::MemoryStore, rest::RestStore};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub struct BackendConfig {
    pub server_url: String,
    pub offline: bool,
    pub profile: UserProfile,
}

pub fn launch(config: BackendConfig, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(format!(
                    "backend worker startup failure: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = if config.offline {
                let memory = Arc::new(MemoryStore::new());
                let client = FeedClient::new(memory.clone(), memory.clone(), memory);
                seed_demo_feed(&client, &config.profile).await;
                client
            } else {
                let rest = Arc::new(RestStore::new(config.server_url));
                FeedClient::new(rest.clone(), rest.clone(), rest)
            };
            let viewer = config.profile.uid.clone();

            let _ = ui_tx.try_send(UiEvent::Info("Connected".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                process_command(&client, &config.profile, &viewer, cmd, &ui_tx).await;
            }
        });
    });
}

async fn process_command(
    client: &FeedClient,
    profile: &UserProfile,
    viewer: &UserId,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) {
    let event = match cmd {
        BackendCommand::RefreshFeed => match client.fetch_tweets(viewer).await {
            Ok(tweets) => UiEvent::FeedLoaded(tweets),
            Err(err) => UiEvent::Error(format!("failed to load feed: {err:#}")),
        },
        BackendCommand::OpenTweet { tweet_id } => {
            match client.fetch_tweet_detail(&tweet_id, viewer).await {
                Ok(detail) => UiEvent::DetailLoaded(detail),
                Err(err) => UiEvent::Error(format!("failed to load tweet: {err:#}")),
            }
        }
        BackendCommand::SendTweet {
            text,
            attachment_path,
        } => match load_attachment(attachment_path).await {
            Ok(attachment) => match client.send_tweet(profile, attachment, &text).await {
                Ok(tweet) => UiEvent::TweetPosted(tweet),
                Err(err) => UiEvent::Error(format!("failed to post tweet: {err:#}")),
            },
            Err(err) => UiEvent::Error(format!("failed to read attachment: {err:#}")),
        },
        BackendCommand::SendComment { tweet_id, text } => {
            match client.send_comment(profile, &tweet_id, &text).await {
                Ok(comment) => UiEvent::CommentPosted { tweet_id, comment },
                Err(err) => UiEvent::Error(format!("failed to post comment: {err:#}")),
            }
        }
        BackendCommand::Like { tweet_id } => match client.like_tweet(viewer, &tweet_id).await {
            Ok(()) => UiEvent::TweetLiked(tweet_id),
            Err(err) => UiEvent::Error(format!("failed to like tweet: {err:#}")),
        },
        BackendCommand::Unlike { tweet_id } => match client.unlike_tweet(viewer, &tweet_id).await {
            Ok(()) => UiEvent::TweetUnliked(tweet_id),
            Err(err) => UiEvent::Error(format!("failed to unlike tweet: {err:#}")),
        },
    };
    let _ = ui_tx.try_send(event);
}

async fn load_attachment(path: Option<PathBuf>) -> anyhow::Result<Option<Attachment>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(&path).await?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("attachment")
        .to_string();
    Ok(Some(Attachment { bytes, filename }))
}

async fn seed_demo_feed(client: &FeedClient, viewer: &UserProfile) {
    let ada = UserProfile {
        uid: UserId::new("demo-ada"),
        fullname: "Ada Park".to_string(),
        username: "ada".to_string(),
        profile_image_url: String::new(),
    };
    let noor = UserProfile {
        uid: UserId::new("demo-noor"),
        fullname: "Noor Haddad".to_string(),
        username: "noor".to_string(),
        profile_image_url: String::new(),
    };

    let result: anyhow::Result<()> = async {
        let first = client
            .send_tweet(&ada, None, "Shipped the new build today.")
            .await?;
        client.send_comment(&noor, &first.id, "Congrats!").await?;
        client.like_tweet(&viewer.uid, &first.id).await?;
        client
            .send_tweet(&noor, None, "Morning run done, coffee next.")
            .await?;
        Ok(())
    }
    .await;

    if let Err(err) = result {
        tracing::warn!("failed to seed offline demo feed: {err:#}");
    }
}
