//! Vitrine Player - windowed host for the showcase
//!
//! Provides the `ShowcaseApp` application handler: a winit window with a
//! wgpu surface, the mounted `Showcase` scene, and an egui layer for the
//! title, loading progress and the three content popups.

mod app;
pub mod content;
pub mod overlay;
pub mod panels;

pub use app::{wheel_delta_y, ShowcaseApp, WindowOptions};
pub use content::PanelContent;
