//! Project screenshot gallery with a desktop/mobile toggle

use super::hint_text;
use super::screenshots::ScreenshotCache;
use crate::content::GalleryContent;
use egui::{Color32, Sense, Vec2};
use std::path::PathBuf;

/// Delay between consecutive card entrances
pub const STAGGER_SECONDS: f32 = 0.04;
/// Length of one card's fade-in
pub const FADE_SECONDS: f32 = 0.5;
/// Cards start this far below their resting place
const RISE_DISTANCE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceMode {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceMode {
    fn dir(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

/// Host part of a link, as shown on its card
pub fn hostname(link: &str) -> Option<String> {
    let url = url::Url::parse(link).ok()?;
    url.host_str().map(str::to_string)
}

/// (opacity, downward offset) of card `index`, `age` seconds after the
/// gallery opened
pub fn card_reveal(age: f32, index: usize) -> (f32, f32) {
    let t = ((age - index as f32 * STAGGER_SECONDS) / FADE_SECONDS).clamp(0.0, 1.0);
    let eased = 1.0 - (1.0 - t).powi(3);
    (eased, RISE_DISTANCE * (1.0 - eased))
}

/// Screenshot path for 1-based `id`, relative to the asset root
pub fn screenshot_path(mode: DeviceMode, id: usize) -> String {
    format!("/images/{}/{}.avif", mode.dir(), id)
}

pub struct GalleryPanel {
    mode: DeviceMode,
    screenshots: ScreenshotCache,
}

impl GalleryPanel {
    /// Screenshots are read from `asset_root`/images
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            mode: DeviceMode::default(),
            screenshots: ScreenshotCache::new(asset_root),
        }
    }

    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DeviceMode) {
        self.mode = mode;
    }

    fn links<'a>(&self, content: &'a GalleryContent) -> &'a [String] {
        match self.mode {
            DeviceMode::Desktop => &content.desktop,
            DeviceMode::Mobile => &content.mobile,
        }
    }

    /// Draw the gallery; `age` is seconds since the popup opened
    pub fn ui(&mut self, ui: &mut egui::Ui, content: &GalleryContent, age: f32) {
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new(&content.title).size(28.0).strong().color(Color32::WHITE));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                for (mode, label) in [(DeviceMode::Mobile, "📱 Mobile"), (DeviceMode::Desktop, "🖥 Desktop")] {
                    let selected = self.mode == mode;
                    let button = egui::Button::new(egui::RichText::new(label).color(Color32::WHITE))
                        .fill(if selected {
                            Color32::from_rgb(0xf9, 0x73, 0x16)
                        } else {
                            Color32::from_gray(107)
                        })
                        .rounding(16.0);
                    if ui.add(button).clicked() {
                        self.set_mode(mode);
                    }
                }
            });
        });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(hint_text(&content.hint))
                    .italics()
                    .color(Color32::from_white_alpha(204)),
            );
        });
        ui.add_space(8.0);

        let columns = if ui.available_width() < 480.0 { 3 } else { 4 };
        let spacing = 16.0;
        let card_width = (ui.available_width() - spacing * (columns - 1) as f32) / columns as f32;
        let card_height = match self.mode {
            DeviceMode::Desktop => card_width * 0.75,
            DeviceMode::Mobile => card_width * 460.0 / 320.0,
        };

        let mode = self.mode;
        let links = self.links(content);
        let ctx = ui.ctx().clone();
        let screenshots = &mut self.screenshots;
        egui::Grid::new("gallery_grid")
            .spacing(Vec2::splat(spacing))
            .show(ui, |ui| {
                for (index, link) in links.iter().enumerate() {
                    let shot = screenshots.texture(&ctx, mode, index + 1);
                    card(ui, mode, index, link, shot.as_ref(), Vec2::new(card_width, card_height), age);
                    if (index + 1) % columns == 0 {
                        ui.end_row();
                    }
                }
            });
    }
}

fn card(
    ui: &mut egui::Ui,
    mode: DeviceMode,
    index: usize,
    link: &str,
    shot: Option<&egui::TextureHandle>,
    size: Vec2,
    age: f32,
) {
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());
    let (opacity, offset) = card_reveal(age, index);
    let hovered = response.hovered();
    let rect = rect.translate(Vec2::new(0.0, offset));
    let rect = if hovered { rect.expand2(rect.size() * 0.015) } else { rect };

    let alpha = |a: u8| (a as f32 * opacity) as u8;
    let painter = ui.painter();
    painter.rect_filled(rect, 12.0, Color32::from_rgba_unmultiplied(40, 40, 48, alpha(230)));
    match shot {
        Some(texture) => {
            egui::Image::new(texture)
                .rounding(12.0)
                .tint(Color32::from_white_alpha(alpha(255)))
                .paint_at(ui, rect);
        }
        // Still decoding, or the file could not be loaded
        None => {
            painter.text(
                rect.center_top() + Vec2::new(0.0, 16.0),
                egui::Align2::CENTER_TOP,
                format!("Screenshot {}", index + 1),
                egui::FontId::proportional(14.0),
                Color32::from_rgba_unmultiplied(255, 255, 255, alpha(220)),
            );
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                screenshot_path(mode, index + 1),
                egui::FontId::monospace(10.0),
                Color32::from_rgba_unmultiplied(255, 255, 255, alpha(120)),
            );
        }
    }

    if hovered {
        let host = hostname(link).unwrap_or_else(|| link.to_string());
        let band = egui::Rect::from_center_size(rect.center_bottom() - Vec2::new(0.0, 28.0), Vec2::new(rect.width() * 0.9, 32.0));
        painter.rect_filled(band, 16.0, Color32::from_black_alpha(166));
        painter.text(
            band.center(),
            egui::Align2::CENTER_CENTER,
            format!("{} ↗", host),
            egui::FontId::proportional(13.0),
            Color32::WHITE,
        );
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    if response.clicked() {
        ui.ctx().open_url(egui::OpenUrl::new_tab(link));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_drops_scheme_and_path() {
        assert_eq!(hostname("https://airbrill.in/").as_deref(), Some("airbrill.in"));
        assert_eq!(
            hostname("https://ssb-static-site.vercel.app").as_deref(),
            Some("ssb-static-site.vercel.app")
        );
        assert_eq!(hostname("not a url"), None);
    }

    #[test]
    fn every_gallery_link_has_a_host() {
        let content = crate::content::PanelContent::embedded().unwrap().gallery;
        for link in content.desktop.iter().chain(&content.mobile) {
            assert!(hostname(link).is_some(), "{link}");
        }
    }

    #[test]
    fn cards_reveal_in_order() {
        // Card 10 starts 0.4 s in
        assert_eq!(card_reveal(0.3, 10), (0.0, 20.0));
        assert!(card_reveal(0.5, 10).0 > 0.0);
        let (first, _) = card_reveal(0.2, 0);
        let (later, _) = card_reveal(0.2, 3);
        assert!(first > later);
        assert_eq!(card_reveal(10.0, 19), (1.0, 0.0));
    }

    #[test]
    fn toggling_switches_link_table() {
        let content = crate::content::PanelContent::embedded().unwrap().gallery;
        let mut panel = GalleryPanel::new("site/public");
        assert_eq!(panel.mode(), DeviceMode::Desktop);
        assert_eq!(panel.links(&content)[0], "https://airbrill.in/");
        panel.set_mode(DeviceMode::Mobile);
        assert_eq!(panel.links(&content)[0], "https://1hairstop.in/");
        assert_eq!(screenshot_path(panel.mode(), 7), "/images/mobile/7.avif");
    }
}
