//! App shell: compose box, feed screen, tweet detail view, error banner.
//!
//! The app holds view state only. Every intent is queued as a
//! [`BackendCommand`]; results come back as [`UiEvent`]s drained once per
//! frame.

use std::{cell::RefCell, path::PathBuf, time::Duration};

use crossbeam_channel::{Receiver, Sender};
use egui::{Color32, RichText};
use shared::{
    domain::{TweetId, UserProfile},
    view::{Tweet, TweetDetail},
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::widgets;

pub struct FeedApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    profile: UserProfile,
    tweets: Vec<Tweet>,
    detail: Option<TweetDetail>,
    compose_text: String,
    compose_attachment: String,
    comment_text: String,
    banner: Option<String>,
    status: Option<String>,
    feed_requested: bool,
}

impl FeedApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        profile: UserProfile,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            profile,
            tweets: Vec::new(),
            detail: None,
            compose_text: String::new(),
            compose_attachment: String::new(),
            comment_text: String::new(),
            banner: None,
            status: None,
            feed_requested: false,
        }
    }

    fn send_command(&mut self, command: BackendCommand) {
        if self.cmd_tx.try_send(command).is_err() {
            self.banner = Some("Backend worker unavailable".to_string());
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = Some(message),
                UiEvent::FeedLoaded(tweets) => self.tweets = tweets,
                UiEvent::DetailLoaded(detail) => self.detail = Some(detail),
                UiEvent::TweetPosted(tweet) => self.tweets.insert(0, tweet),
                UiEvent::CommentPosted { tweet_id, comment } => {
                    if let Some(detail) = &mut self.detail {
                        if detail.tweet.id == tweet_id {
                            detail.tweet.comments += 1;
                            detail.comments.push(comment);
                        }
                    }
                    if let Some(row) = self.tweets.iter_mut().find(|t| t.id == tweet_id) {
                        row.comments += 1;
                    }
                }
                UiEvent::TweetLiked(tweet_id) => self.apply_like(&tweet_id, true),
                UiEvent::TweetUnliked(tweet_id) => self.apply_like(&tweet_id, false),
                UiEvent::Error(message) => self.banner = Some(message),
            }
        }
    }

    fn apply_like(&mut self, tweet_id: &TweetId, liked: bool) {
        if let Some(row) = self.tweets.iter_mut().find(|t| &t.id == tweet_id) {
            update_like_state(row, liked);
        }
        if let Some(detail) = &mut self.detail {
            if &detail.tweet.id == tweet_id {
                update_like_state(&mut detail.tweet, liked);
            }
        }
    }

    fn show_banner(&mut self, ui: &mut egui::Ui) {
        let mut dismissed = false;
        if let Some(message) = &self.banner {
            ui.horizontal_wrapped(|ui| {
                ui.colored_label(Color32::from_rgb(240, 71, 71), message.as_str());
                if ui.button("Dismiss").clicked() {
                    dismissed = true;
                }
            });
            ui.separator();
        }
        if dismissed {
            self.banner = None;
        }
    }

    fn show_compose(&mut self, ui: &mut egui::Ui) -> Option<BackendCommand> {
        let mut command = None;
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new(&self.profile.fullname).strong());
            ui.label(RichText::new(format!("@{}", self.profile.username)).weak());
        });
        ui.add(
            egui::TextEdit::multiline(&mut self.compose_text)
                .hint_text("What's happening?")
                .desired_rows(2)
                .desired_width(f32::INFINITY),
        );
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.compose_attachment)
                    .hint_text("Attachment path (optional)")
                    .desired_width(260.0),
            );
            if ui.button("Post").clicked() && !self.compose_text.trim().is_empty() {
                let attachment_path = match self.compose_attachment.trim() {
                    "" => None,
                    path => Some(PathBuf::from(path)),
                };
                command = Some(BackendCommand::SendTweet {
                    text: self.compose_text.trim().to_string(),
                    attachment_path,
                });
                self.compose_text.clear();
                self.compose_attachment.clear();
            }
            if ui.button("Refresh").clicked() {
                command = Some(BackendCommand::RefreshFeed);
            }
        });
        ui.add_space(4.0);
        command
    }

    fn show_feed(&mut self, ui: &mut egui::Ui) -> Vec<BackendCommand> {
        let pending = RefCell::new(Vec::new());
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.tweets.is_empty() {
                    ui.weak("Nothing here yet. Post the first tweet.");
                }
                for tweet in &self.tweets {
                    let response = widgets::tweet_cell(
                        ui,
                        tweet,
                        &mut |id: &TweetId| {
                            pending.borrow_mut().push(BackendCommand::Like {
                                tweet_id: id.clone(),
                            });
                        },
                        &mut |id: &TweetId| {
                            pending.borrow_mut().push(BackendCommand::Unlike {
                                tweet_id: id.clone(),
                            });
                        },
                    );
                    if response.clicked() {
                        pending.borrow_mut().push(BackendCommand::OpenTweet {
                            tweet_id: tweet.id.clone(),
                        });
                    }
                }
            });
        pending.into_inner()
    }

    fn show_detail(&mut self, ui: &mut egui::Ui) -> Vec<BackendCommand> {
        let mut commands = Vec::new();
        let Some(detail) = self.detail.take() else {
            return commands;
        };
        let mut close = false;

        if ui.button("\u{2190} Back to feed").clicked() {
            close = true;
            commands.push(BackendCommand::RefreshFeed);
        }
        ui.add_space(4.0);

        let pending = RefCell::new(Vec::new());
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                widgets::tweet_cell(
                    ui,
                    &detail.tweet,
                    &mut |id: &TweetId| {
                        pending.borrow_mut().push(BackendCommand::Like {
                            tweet_id: id.clone(),
                        });
                    },
                    &mut |id: &TweetId| {
                        pending.borrow_mut().push(BackendCommand::Unlike {
                            tweet_id: id.clone(),
                        });
                    },
                );
                ui.separator();

                for comment in &detail.comments {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&comment.fullname).strong());
                        ui.label(
                            RichText::new(format!(
                                "@{} \u{2022} {}",
                                comment.username, comment.timestamp
                            ))
                            .weak(),
                        );
                    });
                    ui.label(&comment.text);
                    ui.add_space(6.0);
                }

                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.comment_text)
                            .hint_text("Write a reply")
                            .desired_width(280.0),
                    );
                    if ui.button("Reply").clicked() && !self.comment_text.trim().is_empty() {
                        pending.borrow_mut().push(BackendCommand::SendComment {
                            tweet_id: detail.tweet.id.clone(),
                            text: self.comment_text.trim().to_string(),
                        });
                        self.comment_text.clear();
                    }
                });
            });
        commands.extend(pending.into_inner());

        if !close {
            self.detail = Some(detail);
        }
        commands
    }
}

impl eframe::App for FeedApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.feed_requested {
            self.feed_requested = true;
            self.send_command(BackendCommand::RefreshFeed);
        }
        self.drain_events();

        let mut commands = Vec::new();
        egui::TopBottomPanel::top("compose").show(ctx, |ui| {
            self.show_banner(ui);
            commands.extend(self.show_compose(ui));
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if let Some(status) = &self.status {
                ui.weak(status.as_str());
            }
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.detail.is_some() {
                commands.extend(self.show_detail(ui));
            } else {
                commands.extend(self.show_feed(ui));
            }
        });

        for command in commands {
            self.send_command(command);
        }

        // Worker events arrive between frames.
        ctx.request_repaint_after(Duration::from_millis(200));
    }
}

/// Applies a like/unlike confirmation to one row. Duplicate confirmations
/// are ignored so counts stay consistent with the flag.
fn update_like_state(tweet: &mut Tweet, liked: bool) {
    if tweet.is_liked == liked {
        return;
    }
    tweet.is_liked = liked;
    if liked {
        tweet.likes += 1;
    } else {
        tweet.likes = tweet.likes.saturating_sub(1);
    }
}
