use clap::Parser;
use crossbeam_channel::bounded;
use shared::domain::{UserId, UserProfile};

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use backend_bridge::runtime::{self, BackendConfig};
use controller::events::UiEvent;

/// Desktop client for the tweet feed hosted on the remote document store.
#[derive(Parser, Debug)]
#[command(name = "feed-desktop")]
struct Args {
    /// Base URL of the hosted document-store API.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,

    /// Run against an in-memory store seeded with demo content.
    #[arg(long)]
    offline: bool,

    /// Viewer identity; supplied by the auth collaborator in production.
    #[arg(long, default_value = "demo-user")]
    uid: String,

    #[arg(long, default_value = "Demo User")]
    fullname: String,

    #[arg(long, default_value = "demo")]
    username: String,

    #[arg(long, default_value = "")]
    profile_image_url: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let profile = UserProfile {
        uid: UserId::new(args.uid),
        fullname: args.fullname,
        username: args.username,
        profile_image_url: args.profile_image_url,
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(
        BackendConfig {
            server_url: args.server_url,
            offline: args.offline,
            profile: profile.clone(),
        },
        cmd_rx,
        ui_tx,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Feed Desktop")
            .with_inner_size([520.0, 760.0])
            .with_min_inner_size([420.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Feed Desktop",
        options,
        Box::new(|_cc| Ok(Box::new(ui::FeedApp::new(cmd_tx, ui_rx, profile)))),
    )
}
