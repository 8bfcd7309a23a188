//! Loading and title overlays drawn over the 3D scene

use crate::panels::lerp_color;
use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontId, Id, Vec2};
use std::f32::consts::TAU;

/// Seconds per back-and-forth sweep of the title gradient
pub const HUE_CYCLE: f32 = 6.0;
/// Seconds per glow pulse
pub const GLOW_CYCLE: f32 = 3.0;

/// Stops of the title gradient; the first colour repeats at the end
const TITLE_STOPS: [Color32; 4] = [
    Color32::from_rgb(0xff, 0x00, 0x80),
    Color32::from_rgb(0x79, 0x28, 0xca),
    Color32::from_rgb(0x2a, 0xfa, 0xdf),
    Color32::from_rgb(0xff, 0x00, 0x80),
];

/// "Loading NN%" while assets are outstanding, nothing once they are in
pub fn loading_label(percent: u8) -> Option<String> {
    (percent < 100).then(|| format!("Loading {}%", percent))
}

/// Gradient offset in [0, 1]: sweeps 0 → 1 → 0 over `HUE_CYCLE`
pub fn hue_phase(t: f32) -> f32 {
    let c = t.rem_euclid(HUE_CYCLE) / HUE_CYCLE;
    let linear = if c < 0.5 { c * 2.0 } else { 2.0 - c * 2.0 };
    // ease in-out
    linear * linear * (3.0 - 2.0 * linear)
}

/// Glow strength in [0, 1]: 0 at the start of each cycle, 1 half way
pub fn glow_strength(t: f32) -> f32 {
    (1.0 - (t.rem_euclid(GLOW_CYCLE) / GLOW_CYCLE * TAU).cos()) / 2.0
}

/// Sample the title gradient at `g` in [0, 1]
pub fn gradient_color(g: f32) -> Color32 {
    let segments = (TITLE_STOPS.len() - 1) as f32;
    let scaled = g.clamp(0.0, 1.0) * segments;
    let index = (scaled.floor() as usize).min(TITLE_STOPS.len() - 2);
    lerp_color(TITLE_STOPS[index], TITLE_STOPS[index + 1], scaled - index as f32)
}

/// Colour of the glyph at horizontal position `x` in [0, 1] of the title.
/// The gradient is three times the title's width and slides under it.
pub fn title_glyph_color(t: f32, x: f32) -> Color32 {
    gradient_color((hue_phase(t) * 2.0 + x.clamp(0.0, 1.0)) / 3.0)
}

fn title_job(title: &str, size: f32, color_for: impl Fn(f32) -> Color32) -> LayoutJob {
    let mut job = LayoutJob::default();
    let glyphs: Vec<char> = title.to_uppercase().chars().collect();
    let last = glyphs.len().saturating_sub(1).max(1) as f32;
    for (i, ch) in glyphs.iter().enumerate() {
        let mut buf = [0u8; 4];
        job.append(
            ch.encode_utf8(&mut buf),
            0.0,
            TextFormat {
                font_id: FontId::proportional(size),
                color: color_for(i as f32 / last),
                extra_letter_spacing: 8.0,
                ..Default::default()
            },
        );
    }
    job
}

pub fn loading_ui(ctx: &egui::Context, percent: u8) {
    let Some(label) = loading_label(percent) else {
        return;
    };
    egui::Area::new(Id::new("loading_overlay"))
        .order(egui::Order::Foreground)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(label).size(20.0).strong().color(Color32::WHITE));
        });
}

pub fn title_ui(ctx: &egui::Context, title: &str, t: f32) {
    if title.is_empty() {
        return;
    }
    let screen = ctx.screen_rect();
    let size = (screen.width() * 0.06).clamp(28.0, 80.0);
    let glow = glow_strength(t);
    let origin = screen.min + Vec2::new(screen.width() * 0.35, screen.height() * 0.12);

    egui::Area::new(Id::new("title_overlay"))
        .order(egui::Order::Background)
        .fixed_pos(origin)
        .interactable(false)
        .show(ctx, |ui| {
            let painter = ui.painter();

            // Halo: the title repeated around its position, wider and
            // brighter at the peak of each pulse
            let radius = 3.0 + 5.0 * glow;
            let halo_alpha = (40.0 + 50.0 * glow) as u8;
            for step in 0..8 {
                let angle = step as f32 / 8.0 * TAU;
                let offset = Vec2::new(angle.cos(), angle.sin()) * radius;
                let halo = painter.layout_job(title_job(title, size, |x| {
                    let c = title_glyph_color(t, x);
                    Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), halo_alpha)
                }));
                painter.galley(origin + offset, halo, Color32::WHITE);
            }

            let galley = painter.layout_job(title_job(title, size, |x| title_glyph_color(t, x)));
            let rect = egui::Rect::from_min_size(origin, galley.size());
            painter.galley(origin, galley, Color32::WHITE);
            ui.allocate_rect(rect, egui::Sense::hover());
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_label_hides_at_completion() {
        assert_eq!(loading_label(0).as_deref(), Some("Loading 0%"));
        assert_eq!(loading_label(67).as_deref(), Some("Loading 67%"));
        assert_eq!(loading_label(100), None);
    }

    #[test]
    fn hue_sweeps_forward_and_back() {
        assert_eq!(hue_phase(0.0), 0.0);
        assert!((hue_phase(3.0) - 1.0).abs() < 1e-5);
        assert!((hue_phase(6.0)).abs() < 1e-5);
        assert!((hue_phase(1.5) - 0.5).abs() < 1e-5);
        assert!((hue_phase(4.5) - hue_phase(1.5)).abs() < 1e-5);
    }

    #[test]
    fn glow_pulses_every_three_seconds() {
        assert!(glow_strength(0.0).abs() < 1e-6);
        assert!((glow_strength(1.5) - 1.0).abs() < 1e-6);
        assert!(glow_strength(3.0).abs() < 1e-5);
        assert!((glow_strength(0.75) - glow_strength(2.25)).abs() < 1e-5);
    }

    #[test]
    fn gradient_hits_its_stops() {
        assert_eq!(gradient_color(0.0), Color32::from_rgb(0xff, 0x00, 0x80));
        assert_eq!(gradient_color(1.0 / 3.0), Color32::from_rgb(0x79, 0x28, 0xca));
        assert_eq!(gradient_color(1.0), Color32::from_rgb(0xff, 0x00, 0x80));
        assert_eq!(gradient_color(-2.0), gradient_color(0.0));
    }

    #[test]
    fn title_starts_on_the_first_stop() {
        assert_eq!(title_glyph_color(0.0, 0.0), TITLE_STOPS[0]);
        assert_ne!(title_glyph_color(0.0, 0.0), title_glyph_color(3.0, 0.0));
    }
}
