//! Developer intro: headline, role badge, summary, career cards and links

use super::hint_text;
use crate::content::IntroContent;
use egui::{Color32, RichText};

const CARD_FILL: Color32 = Color32::from_rgb(107, 114, 128);
const ACCENTS: [Color32; 3] = [
    Color32::from_rgb(96, 165, 250),
    Color32::from_rgb(192, 132, 252),
    Color32::from_rgb(74, 222, 128),
];

#[derive(Default)]
pub struct IntroPanel;

impl IntroPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn ui(&self, ui: &mut egui::Ui, content: &IntroContent) {
        let muted = Color32::from_white_alpha(178);

        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&content.name).size(30.0).strong().color(Color32::WHITE));
            ui.label(RichText::new(format!("📍 {}", content.location)).size(13.0).color(Color32::WHITE));
            ui.add_space(8.0);

            egui::Frame::none()
                .fill(Color32::from_rgba_unmultiplied(139, 92, 246, 60))
                .stroke(egui::Stroke::new(1.0, Color32::from_white_alpha(50)))
                .rounding(16.0)
                .inner_margin(egui::Margin::symmetric(16.0, 8.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let (dot, _) = ui.allocate_exact_size(egui::Vec2::splat(8.0), egui::Sense::hover());
                        ui.painter().circle_filled(dot.center(), 4.0, Color32::from_rgb(74, 222, 128));
                        ui.label(RichText::new(&content.role).strong().color(Color32::BLACK));
                    });
                });
        });

        ui.add_space(12.0);
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 4.0;
            ui.label(RichText::new("I have").color(Color32::WHITE));
            ui.label(RichText::new(&content.experience).size(32.0).strong().color(Color32::WHITE));
            ui.label(RichText::new(&content.summary).color(Color32::WHITE));
        });

        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(hint_text(&content.hint)).italics().color(Color32::from_white_alpha(204)));
        });
        ui.add_space(12.0);

        let stacked = ui.available_width() < 640.0;
        let columns = if stacked { 1 } else { content.career.len().max(1) };
        ui.columns(columns, |cols| {
            for (index, entry) in content.career.iter().enumerate() {
                let ui = &mut cols[index % columns];
                egui::Frame::none()
                    .fill(CARD_FILL)
                    .stroke(egui::Stroke::new(1.0, Color32::from_white_alpha(50)))
                    .rounding(16.0)
                    .inner_margin(egui::Margin::same(16.0))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new("💼").size(20.0).color(ACCENTS[index % ACCENTS.len()]));
                        ui.label(RichText::new(&entry.title).strong().color(Color32::WHITE));
                        ui.label(RichText::new(&entry.period).size(12.0).color(muted));
                        for line in &entry.highlights {
                            ui.label(RichText::new(format!("• {}", line)).size(12.0).color(muted));
                        }
                    });
                ui.add_space(8.0);
            }
        });

        ui.add_space(16.0);
        ui.vertical_centered(|ui| {
            ui.horizontal_wrapped(|ui| {
                for link in &content.links {
                    let response = ui.add(
                        egui::Button::new(RichText::new(&link.label).color(Color32::WHITE))
                            .fill(Color32::from_white_alpha(25))
                            .stroke(egui::Stroke::new(1.0, Color32::from_white_alpha(50)))
                            .rounding(8.0),
                    );
                    if response.clicked() {
                        ui.ctx().open_url(egui::OpenUrl::new_tab(&link.url));
                    }
                    response.on_hover_cursor(egui::CursorIcon::PointingHand).on_hover_text(&link.url);
                }
            });
        });
    }
}
