//! Feed widgets.

use egui::{Align2, Color32, CornerRadius, FontId, RichText, Sense, Stroke, Vec2};
use shared::{domain::TweetId, view::Tweet};

const LIKED_HEART: Color32 = Color32::from_rgb(240, 71, 71);
const MUTED_TEXT: Color32 = Color32::from_rgb(148, 150, 158);

/// Renders one feed item: avatar, author line, body text, optional attached
/// image link, and the action bar. Returns the row response so the caller
/// can wire an "open detail" action to a click on the cell itself.
///
/// The heart invokes `like_action` or `unlike_action` (depending on
/// `is_liked`) with the tweet id; the click stays on the inner button and is
/// never reported as a row click. The widget performs no I/O and holds no
/// state.
pub fn tweet_cell(
    ui: &mut egui::Ui,
    tweet: &Tweet,
    like_action: &mut dyn FnMut(&TweetId),
    unlike_action: &mut dyn FnMut(&TweetId),
) -> egui::Response {
    let frame = egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                avatar(ui, &tweet.fullname);
                ui.add_space(6.0);
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::Label::new(RichText::new(&tweet.fullname).strong())
                                .selectable(false),
                        );
                        ui.add(
                            egui::Label::new(
                                RichText::new(format!(
                                    "@{} \u{2022} {}",
                                    tweet.username, tweet.timestamp
                                ))
                                .color(MUTED_TEXT),
                            )
                            .selectable(false),
                        );
                    });
                    ui.add(egui::Label::new(tweet.text.as_str()).wrap());
                    if let Some(image_url) = &tweet.image_url {
                        // Attachment rendered as a link; no inline fetch here.
                        ui.hyperlink(image_url);
                    }
                    ui.add_space(4.0);
                    action_bar(ui, tweet, like_action, unlike_action);
                });
            });
        });

    frame.response.interact(Sense::click())
}

fn avatar(ui: &mut egui::Ui, fullname: &str) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(36.0), Sense::hover());
    ui.painter()
        .rect_filled(rect, CornerRadius::same(18), Color32::from_rgb(70, 75, 90));
    let initial = fullname.chars().next().unwrap_or('?');
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        initial,
        FontId::proportional(16.0),
        Color32::WHITE,
    );
}

fn action_bar(
    ui: &mut egui::Ui,
    tweet: &Tweet,
    like_action: &mut dyn FnMut(&TweetId),
    unlike_action: &mut dyn FnMut(&TweetId),
) {
    ui.horizontal(|ui| {
        ui.add(
            egui::Label::new(RichText::new(format!("\u{1f4ac} {}", tweet.comments)).color(MUTED_TEXT))
                .selectable(false),
        );
        ui.add_space(12.0);

        if tweet.is_liked {
            if ui
                .add(icon_btn(&format!("\u{2764} {}", tweet.likes), LIKED_HEART))
                .clicked()
            {
                unlike_action(&tweet.id);
            }
        } else if ui
            .add(icon_btn(&format!("\u{2661} {}", tweet.likes), MUTED_TEXT))
            .clicked()
        {
            like_action(&tweet.id);
        }

        ui.add_space(12.0);
        // Bookmark is rendered but not wired to anything yet.
        let _ = ui.add(icon_btn("\u{1f516}", MUTED_TEXT));
    });
}

fn icon_btn(text: &str, color: Color32) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).color(color))
        .min_size(egui::vec2(24.0, 24.0))
        .stroke(Stroke::NONE)
        .fill(Color32::TRANSPARENT)
}
