//! Skills honeycomb: category legend and a staggered grid of hexagons

use super::hint_text;
use crate::content::{Category, SkillsContent};
use egui::{Color32, Pos2, Rect, Sense, Vec2};

/// Hexagon height as a fraction of its width
const HEX_ASPECT: f32 = 0.866;
/// Neighbouring hexagons overlap by this fraction of the width
const HEX_OVERLAP: f32 = 0.13;
/// Consecutive rows overlap by a quarter of this height
const ROW_PITCH_HEIGHT: f32 = 0.956_025_4;

/// Hexagon size and row length for a window width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoneycombLayout {
    pub size: f32,
    pub per_row: usize,
}

impl HoneycombLayout {
    pub fn for_width(width: f32) -> Self {
        if width < 480.0 {
            Self { size: 80.0, per_row: 4 }
        } else if width < 768.0 {
            Self { size: 100.0, per_row: 4 }
        } else {
            Self { size: 120.0, per_row: 6 }
        }
    }

    /// Top-left corner of the hexagon at (`row`, `col`)
    pub fn cell_origin(&self, row: usize, col: usize) -> Vec2 {
        let step_x = self.size * (1.0 - HEX_OVERLAP);
        let step_y = self.size * HEX_ASPECT - self.size * ROW_PITCH_HEIGHT * 0.25;
        let indent = if row % 2 == 1 { self.size / 2.0 } else { 0.0 };
        Vec2::new(indent + col as f32 * step_x, row as f32 * step_y)
    }

    /// Space taken by `rows`
    pub fn extent<T>(&self, rows: &[&[T]]) -> Vec2 {
        let mut extent = Vec2::ZERO;
        for (row, items) in rows.iter().enumerate() {
            if items.is_empty() {
                continue;
            }
            let origin = self.cell_origin(row, items.len() - 1);
            extent.x = extent.x.max(origin.x + self.size);
            extent.y = extent.y.max(origin.y + self.size * HEX_ASPECT);
        }
        extent
    }
}

/// Split items into rows of `per_row` and `per_row - 1`, alternating.
/// `per_row` below 2 is raised to 2.
pub fn chunk_honeycomb<T>(items: &[T], per_row: usize) -> Vec<&[T]> {
    let per_row = per_row.max(2);
    let mut rows = Vec::new();
    let mut start = 0;
    while start < items.len() {
        let count = if rows.len() % 2 == 0 { per_row } else { per_row - 1 };
        let end = (start + count).min(items.len());
        rows.push(&items[start..end]);
        start = end;
    }
    rows
}

/// 135° gradient endpoints for a category
pub fn category_gradient(category: Category) -> (Color32, Color32) {
    match category {
        Category::Frontend => (Color32::from_rgb(0x1f, 0x59, 0xab), Color32::from_rgb(0x1c, 0xa9, 0xc9)),
        Category::Backend => (Color32::from_rgb(0x13, 0xaa, 0x52), Color32::from_rgb(0x13, 0xaa, 0x52)),
        Category::Devops => (Color32::from_rgb(0xff, 0x98, 0x00), Color32::from_rgb(0xff, 0x57, 0x22)),
    }
}

pub(crate) fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        mix(a.r(), b.r()),
        mix(a.g(), b.g()),
        mix(a.b(), b.b()),
        mix(a.a(), b.a()),
    )
}

/// Corner points of a pointy-top hexagon inscribed in `rect`
fn hex_corners(rect: Rect) -> [Pos2; 6] {
    let at = |fx: f32, fy: f32| Pos2::new(rect.left() + rect.width() * fx, rect.top() + rect.height() * fy);
    [
        at(0.5, 0.0),
        at(0.93, 0.25),
        at(0.93, 0.75),
        at(0.5, 1.0),
        at(0.07, 0.75),
        at(0.07, 0.25),
    ]
}

/// Hexagon filled with a top-left to bottom-right gradient
fn gradient_hex(rect: Rect, (from, to): (Color32, Color32)) -> egui::Shape {
    let color_at = |p: Pos2| {
        let t = ((p.x - rect.left()) / rect.width() + (p.y - rect.top()) / rect.height()) / 2.0;
        lerp_color(from, to, t)
    };
    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(rect.center(), color_at(rect.center()));
    for corner in hex_corners(rect) {
        mesh.colored_vertex(corner, color_at(corner));
    }
    for i in 0..6u32 {
        mesh.add_triangle(0, 1 + i, 1 + (i + 1) % 6);
    }
    egui::Shape::mesh(mesh)
}

fn label_size(hex_size: f32) -> f32 {
    (hex_size / 8.5).clamp(10.0, 14.0)
}

#[derive(Default)]
pub struct SkillsPanel;

impl SkillsPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn ui(&self, ui: &mut egui::Ui, content: &SkillsContent) {
        let layout = HoneycombLayout::for_width(ui.ctx().screen_rect().width());

        ui.heading(egui::RichText::new(&content.title).size(28.0).strong().color(Color32::WHITE));
        ui.add_space(8.0);

        ui.horizontal_wrapped(|ui| {
            for category in Category::ALL {
                let (rect, _) = ui.allocate_exact_size(Vec2::splat(16.0), Sense::hover());
                ui.painter().add(gradient_rect(rect, category_gradient(category)));
                ui.label(egui::RichText::new(category.label()).color(Color32::WHITE));
                ui.add_space(12.0);
            }
        });
        ui.add_space(12.0);

        let rows = chunk_honeycomb(&content.skills, layout.per_row);
        let (area, _) = ui.allocate_exact_size(layout.extent(&rows), Sense::hover());
        for (row, items) in rows.iter().enumerate() {
            for (col, skill) in items.iter().enumerate() {
                let min = area.min + layout.cell_origin(row, col);
                let rect = Rect::from_min_size(min, Vec2::new(layout.size, layout.size * HEX_ASPECT));
                let id = ui.id().with(("hex", row, col));
                let response = ui.interact(rect, id, Sense::hover());
                let hover = ui.ctx().animate_bool_with_time(id, response.hovered(), 0.2);
                let rect = rect.expand2(rect.size() * 0.025 * hover);

                let painter = ui.painter();
                painter.add(gradient_hex(rect, category_gradient(skill.category)));
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    &skill.label,
                    egui::FontId::proportional(label_size(layout.size)),
                    Color32::WHITE,
                );
            }
        }

        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(hint_text(&content.hint))
                    .italics()
                    .color(Color32::from_white_alpha(204)),
            );
        });
    }
}

fn gradient_rect(rect: Rect, (from, to): (Color32, Color32)) -> egui::Shape {
    let mut mesh = egui::Mesh::default();
    let mid = lerp_color(from, to, 0.5);
    mesh.colored_vertex(rect.left_top(), from);
    mesh.colored_vertex(rect.right_top(), mid);
    mesh.colored_vertex(rect.right_bottom(), to);
    mesh.colored_vertex(rect.left_bottom(), mid);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    egui::Shape::mesh(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_alternate_between_full_and_short() {
        let items: Vec<u32> = (0..27).collect();
        let lengths: Vec<usize> = chunk_honeycomb(&items, 6).iter().map(|r| r.len()).collect();
        assert_eq!(lengths, [6, 5, 6, 5, 5]);
        let lengths: Vec<usize> = chunk_honeycomb(&items, 4).iter().map(|r| r.len()).collect();
        assert_eq!(lengths, [4, 3, 4, 3, 4, 3, 4, 2]);
    }

    #[test]
    fn row_length_is_at_least_two() {
        let items = [1, 2, 3, 4];
        let lengths: Vec<usize> = chunk_honeycomb(&items, 0).iter().map(|r| r.len()).collect();
        assert_eq!(lengths, [2, 1, 1]);
    }

    #[test]
    fn chunking_keeps_order_and_count() {
        let items: Vec<u32> = (0..27).collect();
        let flat: Vec<u32> = chunk_honeycomb(&items, 6).concat();
        assert_eq!(flat, items);
        assert!(chunk_honeycomb::<u32>(&[], 6).is_empty());
    }

    #[test]
    fn sizing_breakpoints() {
        assert_eq!(HoneycombLayout::for_width(375.0), HoneycombLayout { size: 80.0, per_row: 4 });
        assert_eq!(HoneycombLayout::for_width(480.0), HoneycombLayout { size: 100.0, per_row: 4 });
        assert_eq!(HoneycombLayout::for_width(767.0), HoneycombLayout { size: 100.0, per_row: 4 });
        assert_eq!(HoneycombLayout::for_width(768.0), HoneycombLayout { size: 120.0, per_row: 6 });
    }

    #[test]
    fn odd_rows_are_indented_half_a_hexagon() {
        let layout = HoneycombLayout { size: 100.0, per_row: 4 };
        assert_eq!(layout.cell_origin(0, 0).x, 0.0);
        assert_eq!(layout.cell_origin(1, 0).x, 50.0);
        assert!((layout.cell_origin(0, 1).x - 87.0).abs() < 1e-4);
        let row_step = layout.cell_origin(1, 0).y;
        assert!(row_step > 0.0 && row_step < 100.0 * HEX_ASPECT);
    }

    #[test]
    fn category_colours() {
        let (from, to) = category_gradient(Category::Frontend);
        assert_eq!(from, Color32::from_rgb(0x1f, 0x59, 0xab));
        assert_eq!(to, Color32::from_rgb(0x1c, 0xa9, 0xc9));
        let (from, to) = category_gradient(Category::Backend);
        assert_eq!(from, to);
        assert_eq!(category_gradient(Category::Devops).1, Color32::from_rgb(0xff, 0x57, 0x22));
    }

    #[test]
    fn colour_lerp_endpoints() {
        let a = Color32::from_rgb(0, 100, 200);
        let b = Color32::from_rgb(200, 100, 0);
        assert_eq!(lerp_color(a, b, 0.0), a);
        assert_eq!(lerp_color(a, b, 1.0), b);
        assert_eq!(lerp_color(a, b, 0.5), Color32::from_rgb(100, 100, 100));
        assert_eq!(lerp_color(a, b, 3.0), b);
    }
}
