//! Background asset loading
//!
//! Each request is decoded on its own worker thread; results come back over
//! an mpsc channel and are drained on the UI thread with `poll()`. Dropping
//! the loader drops the receiver, so results that arrive afterwards are
//! discarded by the worker.

use crate::error::AssetLoadError;
use crate::gltf_import::import_gltf;
use crate::texture::{decode_texture, LoadedTexture};
use crate::types::ImportedModel;
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use vitrine_core::CharacterSlot;

/// What a request is for; unique within a loading batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Character(CharacterSlot),
    Background,
    BackgroundTexture,
    MarkerModel,
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(slot) => write!(f, "character:{}", slot.label()),
            Self::Background => write!(f, "background"),
            Self::BackgroundTexture => write!(f, "background-texture"),
            Self::MarkerModel => write!(f, "marker"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    Texture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub key: AssetKey,
    pub kind: AssetKind,
    pub path: PathBuf,
}

impl AssetRequest {
    pub fn model(key: AssetKey, path: impl Into<PathBuf>) -> Self {
        Self {
            key,
            kind: AssetKind::Model,
            path: path.into(),
        }
    }

    pub fn texture(key: AssetKey, path: impl Into<PathBuf>) -> Self {
        Self {
            key,
            kind: AssetKind::Texture,
            path: path.into(),
        }
    }

    /// Path as reported in progress events
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }
}

/// Opaque handle to a decoded asset
#[derive(Debug, Clone)]
pub enum LoadedAsset {
    Model(Box<ImportedModel>),
    Texture(LoadedTexture),
}

/// A finished request, successful or not
#[derive(Debug)]
pub struct LoadResult {
    pub request: AssetRequest,
    pub outcome: Result<LoadedAsset, AssetLoadError>,
}

/// Asynchronous loader seam.
///
/// `load` must not block; every accepted request eventually yields exactly
/// one `LoadResult` from `poll` unless the loader is dropped first.
pub trait AssetLoader {
    fn load(&mut self, request: AssetRequest);
    fn poll(&mut self) -> Vec<LoadResult>;
}

/// Decode a request on the calling thread
pub fn load_blocking(request: &AssetRequest) -> Result<LoadedAsset, AssetLoadError> {
    match request.kind {
        AssetKind::Model => import_gltf(&request.path)
            .map(|m| LoadedAsset::Model(Box::new(m)))
            .map_err(|e| AssetLoadError::new(&request.path, e)),
        AssetKind::Texture => decode_texture(&request.path)
            .map(LoadedAsset::Texture)
            .map_err(|e| AssetLoadError::new(&request.path, e)),
    }
}

/// One worker thread per request
pub struct ThreadedLoader {
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
    in_flight: usize,
}

impl Default for ThreadedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadedLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, in_flight: 0 }
    }

    /// Requests started but not yet returned by `poll`
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl AssetLoader for ThreadedLoader {
    fn load(&mut self, request: AssetRequest) {
        let tx = self.tx.clone();
        let worker_request = request.clone();
        self.in_flight += 1;

        let spawned = thread::Builder::new()
            .name(format!("asset-loader:{}", request.key))
            .spawn(move || {
                let outcome = std::panic::catch_unwind(|| load_blocking(&worker_request))
                    .unwrap_or_else(|_| {
                        Err(AssetLoadError::new(
                            &worker_request.path,
                            "loader thread panicked",
                        ))
                    });
                let result = LoadResult {
                    request: worker_request,
                    outcome,
                };
                if tx.send(result).is_err() {
                    tracing::debug!("Loader dropped before result arrived, discarding");
                }
            });

        if let Err(e) = spawned {
            let _ = self.tx.send(LoadResult {
                outcome: Err(AssetLoadError::new(&request.path, e)),
                request,
            });
        }
    }

    fn poll(&mut self) -> Vec<LoadResult> {
        let results: Vec<LoadResult> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(results.len());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gltf_import::tests::TRIANGLE_GLTF;
    use std::time::{Duration, Instant};

    fn poll_until(loader: &mut ThreadedLoader, count: usize) -> Vec<LoadResult> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut results = Vec::new();
        while results.len() < count && Instant::now() < deadline {
            results.extend(loader.poll());
            thread::sleep(Duration::from_millis(5));
        }
        results
    }

    #[test]
    fn loads_model_and_reports_missing_texture() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("sleeping.gltf");
        std::fs::write(&model_path, TRIANGLE_GLTF).unwrap();

        let mut loader = ThreadedLoader::new();
        loader.load(AssetRequest::model(
            AssetKey::Character(CharacterSlot::Sleeping),
            &model_path,
        ));
        loader.load(AssetRequest::texture(
            AssetKey::BackgroundTexture,
            dir.path().join("missing.hdr"),
        ));
        assert_eq!(loader.in_flight(), 2);

        let results = poll_until(&mut loader, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(loader.in_flight(), 0);

        for result in results {
            match result.request.key {
                AssetKey::Character(_) => {
                    assert!(matches!(result.outcome, Ok(LoadedAsset::Model(_))));
                }
                AssetKey::BackgroundTexture => {
                    let err = result.outcome.unwrap_err();
                    assert!(err.path.ends_with("missing.hdr"));
                }
                other => panic!("unexpected key {other}"),
            }
        }
    }

    #[test]
    fn poll_without_requests_is_empty() {
        let mut loader = ThreadedLoader::default();
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn key_display_names_slot() {
        assert_eq!(
            AssetKey::Character(CharacterSlot::Banging).to_string(),
            "character:banging"
        );
    }
}
