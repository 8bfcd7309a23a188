//! Popup panels and the modal frame they open in

mod gallery;
mod intro;
mod screenshots;
mod skills;

pub use gallery::{card_reveal, hostname, screenshot_path, DeviceMode, GalleryPanel};
pub use intro::IntroPanel;
pub use screenshots::{ScreenshotCache, ScreenshotStatus};
pub use skills::{category_gradient, chunk_honeycomb, HoneycombLayout, SkillsPanel};

pub(crate) use skills::lerp_color;

use crate::content::{Hint, PanelContent};
use egui::{Color32, Id, Rect, Sense, Vec2};
use std::path::PathBuf;
use vitrine_scene::{Panel, Popup, CLOSE_DELAY};

pub(crate) fn hint_text(hint: &Hint) -> String {
    format!("💡 To know about my {}, please click the {}.", hint.topic, hint.character)
}

/// What the user did in the popup this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    /// Close button or backdrop clicked
    Close,
}

/// Draws the open popup with its entrance and exit transitions
pub struct PopupView {
    intro: IntroPanel,
    skills: SkillsPanel,
    gallery: GalleryPanel,
    shown: Option<(Panel, f64)>,
}

impl PopupView {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            intro: IntroPanel::new(),
            skills: SkillsPanel::new(),
            gallery: GalleryPanel::new(asset_root),
            shown: None,
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context, popup: &Popup, content: &PanelContent) -> Option<PopupAction> {
        let visibility = ctx.animate_bool_with_time(
            Id::new("popup_visibility"),
            popup.is_visible(),
            CLOSE_DELAY.as_secs_f32(),
        );
        let Some(panel) = popup.panel() else {
            self.shown = None;
            return None;
        };

        let now = ctx.input(|i| i.time);
        let opened_at = match self.shown {
            Some((shown, at)) if shown == panel => at,
            _ => {
                self.shown = Some((panel, now));
                now
            }
        };
        let age = (now - opened_at) as f32;

        let mut action = None;
        let screen = ctx.screen_rect();

        egui::Area::new(Id::new("popup_backdrop"))
            .order(egui::Order::Middle)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                ui.painter()
                    .rect_filled(screen, 0.0, Color32::from_black_alpha((150.0 * visibility) as u8));
                if ui.allocate_rect(screen, Sense::click()).clicked() {
                    action = Some(PopupAction::Close);
                }
            });

        let frame_rect = popup_rect(screen, visibility);
        egui::Area::new(Id::new("popup_window"))
            .order(egui::Order::Foreground)
            .fixed_pos(frame_rect.min)
            .show(ctx, |ui| {
                ui.set_opacity(visibility);
                ui.set_width(frame_rect.width());
                egui::Frame::none()
                    .fill(Color32::from_rgba_unmultiplied(17, 24, 39, 235))
                    .stroke(egui::Stroke::new(1.0, Color32::from_white_alpha(40)))
                    .rounding(20.0)
                    .inner_margin(egui::Margin::same(20.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                                let close = ui
                                    .add(egui::Button::new(egui::RichText::new("✕").size(18.0).color(Color32::WHITE)).frame(false))
                                    .on_hover_cursor(egui::CursorIcon::PointingHand);
                                if close.clicked() {
                                    action = Some(PopupAction::Close);
                                }
                            });
                        });
                        egui::ScrollArea::vertical()
                            .max_height((frame_rect.height() - 80.0).max(120.0))
                            .show(ui, |ui| match panel {
                                Panel::Intro => self.intro.ui(ui, &content.intro),
                                Panel::Skills => self.skills.ui(ui, &content.skills),
                                Panel::Gallery => self.gallery.ui(ui, &content.gallery, age),
                            });
                    });
            });

        action
    }
}

/// Popup bounds: centred, at most 960 wide and 85% tall, sliding up and
/// growing slightly as `visibility` goes from 0 to 1
pub fn popup_rect(screen: Rect, visibility: f32) -> Rect {
    let width = (screen.width() - 32.0).clamp(0.0, 960.0);
    let height = (screen.height() * 0.85).max(0.0);
    let scale = 0.95 + 0.05 * visibility;
    let slide = 24.0 * (1.0 - visibility);
    Rect::from_center_size(screen.center() + Vec2::new(0.0, slide), Vec2::new(width, height) * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    #[test]
    fn hint_sentence() {
        let hint = Hint {
            topic: "Projects".into(),
            character: "Table Banger character".into(),
        };
        assert_eq!(
            hint_text(&hint),
            "💡 To know about my Projects, please click the Table Banger character."
        );
    }

    #[test]
    fn popup_settles_centred() {
        let screen = Rect::from_min_size(Pos2::ZERO, Vec2::new(1200.0, 800.0));
        let rect = popup_rect(screen, 1.0);
        assert_eq!(rect.center(), screen.center());
        assert_eq!(rect.width(), 960.0);
        assert_eq!(rect.height(), 680.0);

        let entering = popup_rect(screen, 0.0);
        assert!(entering.center().y > rect.center().y);
        assert!(entering.width() < rect.width());
    }

    #[test]
    fn narrow_screens_keep_a_margin() {
        let screen = Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 700.0));
        assert_eq!(popup_rect(screen, 1.0).width(), 368.0);
    }
}
