//! Gallery screenshot textures
//!
//! Each screenshot is decoded on its own worker thread the first time a card
//! asks for it, then uploaded as an egui texture on the UI thread. A file
//! that fails to load is remembered so the card keeps its text placeholder
//! instead of retrying every frame.

use super::gallery::{screenshot_path, DeviceMode};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use vitrine_asset::{decode_texture, LoadedTexture};

type Key = (DeviceMode, usize);
type Decoded = (Key, vitrine_core::Result<LoadedTexture>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotStatus {
    Loading,
    Ready,
    Failed,
}

enum Slot {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

pub struct ScreenshotCache {
    root: PathBuf,
    slots: HashMap<Key, Slot>,
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
}

impl ScreenshotCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            root: root.into(),
            slots: HashMap::new(),
            tx,
            rx,
        }
    }

    /// File backing screenshot `id` (1-based)
    pub fn resolve(&self, mode: DeviceMode, id: usize) -> PathBuf {
        self.root.join(screenshot_path(mode, id).trim_start_matches('/'))
    }

    pub fn status(&self, mode: DeviceMode, id: usize) -> Option<ScreenshotStatus> {
        self.slots.get(&(mode, id)).map(|slot| match slot {
            Slot::Loading => ScreenshotStatus::Loading,
            Slot::Ready(_) => ScreenshotStatus::Ready,
            Slot::Failed => ScreenshotStatus::Failed,
        })
    }

    /// Texture for screenshot `id`, starting its load on first use.
    ///
    /// `None` while the file is decoding or after it failed to load.
    pub fn texture(&mut self, ctx: &egui::Context, mode: DeviceMode, id: usize) -> Option<egui::TextureHandle> {
        self.poll(ctx);
        if !self.slots.contains_key(&(mode, id)) {
            let slot = self.spawn(mode, id);
            self.slots.insert((mode, id), slot);
        }
        match self.slots.get(&(mode, id)) {
            Some(Slot::Ready(texture)) => Some(texture.clone()),
            Some(Slot::Loading) => {
                ctx.request_repaint();
                None
            }
            _ => None,
        }
    }

    /// Upload finished decodes
    pub fn poll(&mut self, ctx: &egui::Context) {
        for ((mode, id), outcome) in self.rx.try_iter() {
            let slot = match outcome {
                Ok(decoded) => Slot::Ready(upload(ctx, mode, id, &decoded)),
                Err(e) => {
                    tracing::warn!("Screenshot {} unavailable: {}", screenshot_path(mode, id), e);
                    Slot::Failed
                }
            };
            self.slots.insert((mode, id), slot);
        }
    }

    fn spawn(&self, mode: DeviceMode, id: usize) -> Slot {
        let path = self.resolve(mode, id);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("screenshot:{}", screenshot_path(mode, id)))
            .spawn(move || {
                if tx.send(((mode, id), decode_texture(&path))).is_err() {
                    tracing::debug!("Gallery closed before {} decoded", path.display());
                }
            });
        match spawned {
            Ok(_) => Slot::Loading,
            Err(e) => {
                tracing::warn!("Could not start screenshot decode: {}", e);
                Slot::Failed
            }
        }
    }
}

fn upload(ctx: &egui::Context, mode: DeviceMode, id: usize, decoded: &LoadedTexture) -> egui::TextureHandle {
    let image = egui::ColorImage::from_rgba_unmultiplied(
        [decoded.width as usize, decoded.height as usize],
        &decoded.rgba,
    );
    ctx.request_repaint();
    ctx.load_texture(screenshot_path(mode, id), image, egui::TextureOptions::LINEAR)
}
