//! Showcase configuration
//!
//! Every field has a default, so an empty (or missing) `vitrine.toml` yields
//! the stock three-character scene. `VITRINE_ASSET_ROOT` overrides the asset
//! root after the file is read.

use crate::error::{Result, VitrineError};
use crate::types::{quat_from_yaw, Transform, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of fixed character slots
pub const CHARACTER_COUNT: usize = 3;

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
    #[serde(default = "default_characters")]
    pub characters: Vec<CharacterConfig>,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default = "default_marker_model")]
    pub marker_model: Option<String>,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub input: InputConfig,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            asset_root: default_asset_root(),
            characters: default_characters(),
            background: BackgroundConfig::default(),
            marker_model: default_marker_model(),
            camera: CameraConfig::default(),
            input: InputConfig::default(),
        }
    }
}

fn default_title() -> String {
    "Im Nivase".to_string()
}
fn default_asset_root() -> PathBuf {
    PathBuf::from("public")
}
fn default_marker_model() -> Option<String> {
    Some("/glb/marker.glb".to_string())
}
fn default_characters() -> Vec<CharacterConfig> {
    ["/glb/sleeping.glb", "/glb/typing.glb", "/glb/banging.glb"]
        .iter()
        .enumerate()
        .map(|(index, path)| CharacterConfig {
            path: path.to_string(),
            position: [index as f32 * 2.0 - 1.5, -0.5, 0.0],
            scale: 1.5,
            yaw: 0.0,
        })
        .collect()
}

/// One animated character model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub path: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_character_scale")]
    pub scale: f32,
    /// Rotation about +Y in radians
    #[serde(default)]
    pub yaw: f32,
}

fn default_character_scale() -> f32 {
    1.5
}

impl CharacterConfig {
    pub fn transform(&self) -> Transform {
        Transform::from_position(Vec3::from_array(self.position))
            .with_rotation(quat_from_yaw(self.yaw))
            .with_scale(Vec3::splat(self.scale))
    }
}

/// Environment model and equirectangular backdrop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub model: String,
    pub texture: Option<String>,
    pub position: [f32; 3],
    pub scale: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            model: "/glb/background.glb".to_string(),
            texture: Some("/models/nebula_field.hdr".to_string()),
            position: [-1.0, -2.0, -3.0],
            scale: 1.7,
        }
    }
}

impl BackgroundConfig {
    pub fn transform(&self) -> Transform {
        Transform::from_position(Vec3::from_array(self.position)).with_scale(Vec3::splat(self.scale))
    }
}

/// Camera placement and the responsive projection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub far: f32,
    /// Viewport widths below this (logical px) use the mobile projection
    pub mobile_breakpoint: f32,
    pub mobile_fov: f32,
    pub mobile_near: f32,
    pub desktop_fov: f32,
    pub desktop_near: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 5.0],
            target: [0.0, 0.0, 0.0],
            far: 2000.0,
            mobile_breakpoint: 768.0,
            mobile_fov: 95.0,
            mobile_near: 0.5,
            desktop_fov: 75.0,
            desktop_near: 0.1,
        }
    }
}

/// Orbit input tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Radians of horizontal rotation per unit of wheel deltaY
    pub wheel_factor: f32,
    pub damping: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            wheel_factor: 0.002,
            damping: 0.05,
        }
    }
}

impl ShowcaseConfig {
    /// Load from a TOML file and apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content).map_err(|e| {
            VitrineError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ShowcaseConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.characters.len() != CHARACTER_COUNT {
            return Err(VitrineError::ConfigError(format!(
                "expected {} characters, found {}",
                CHARACTER_COUNT,
                self.characters.len()
            )));
        }
        if self.input.damping <= 0.0 || self.input.damping > 1.0 {
            return Err(VitrineError::ConfigError(format!(
                "damping must be in (0, 1], got {}",
                self.input.damping
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("VITRINE_ASSET_ROOT") {
            self.asset_root = PathBuf::from(root);
        }
    }

    /// Resolve a site-absolute asset path ("/glb/x.glb") against the asset root
    pub fn resolve_asset(&self, path: &str) -> PathBuf {
        self.asset_root.join(path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_stock_scene() {
        let config = ShowcaseConfig::from_toml_str("").unwrap();
        assert_eq!(config.title, "Im Nivase");
        assert_eq!(config.characters.len(), 3);
        assert_eq!(config.characters[0].position, [-1.5, -0.5, 0.0]);
        assert_eq!(config.characters[2].position, [2.5, -0.5, 0.0]);
        assert_eq!(config.characters[1].path, "/glb/typing.glb");
        assert!((config.background.scale - 1.7).abs() < 1e-6);
        assert!((config.input.wheel_factor - 0.002).abs() < 1e-9);
        assert!((config.camera.far - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ShowcaseConfig::from_toml_str(
            r#"
title = "Portfolio"

[camera]
desktop_fov = 60.0

[input]
wheel_factor = 0.004
"#,
        )
        .unwrap();
        assert_eq!(config.title, "Portfolio");
        assert!((config.camera.desktop_fov - 60.0).abs() < 1e-6);
        assert!((config.camera.mobile_fov - 95.0).abs() < 1e-6);
        assert!((config.input.damping - 0.05).abs() < 1e-6);
    }

    #[test]
    fn wrong_character_count_is_rejected() {
        let err = ShowcaseConfig::from_toml_str(
            r#"
[[characters]]
path = "/glb/only.glb"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, VitrineError::ConfigError(_)));
    }

    #[test]
    fn load_from_file_and_resolve_assets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vitrine.toml");
        std::fs::write(&path, "asset_root = \"site/public\"\n").unwrap();

        let config = ShowcaseConfig::load(&path).unwrap();
        if std::env::var("VITRINE_ASSET_ROOT").is_err() {
            assert_eq!(
                config.resolve_asset("/glb/sleeping.glb"),
                PathBuf::from("site/public/glb/sleeping.glb")
            );
        }

        let missing = ShowcaseConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(missing.characters.len(), 3);
    }

    #[test]
    fn malformed_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "title = [").unwrap();
        let err = ShowcaseConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn sample_config_matches_defaults() {
        let sample = ShowcaseConfig::from_toml_str(include_str!("../../../vitrine.toml")).unwrap();
        let defaults = ShowcaseConfig::default();
        assert_eq!(sample.title, defaults.title);
        assert_eq!(sample.asset_root, defaults.asset_root);
        assert_eq!(sample.characters, defaults.characters);
        assert_eq!(sample.background, defaults.background);
        assert_eq!(sample.marker_model, defaults.marker_model);
        assert_eq!(sample.camera, defaults.camera);
        assert_eq!(sample.input, defaults.input);
    }

    #[test]
    fn character_transform_uses_scale() {
        let c = &ShowcaseConfig::default().characters[1];
        let m = c.transform().to_matrix();
        assert!((m[0][0] - 1.5).abs() < 1e-6);
        assert!((m[3][0] - 0.5).abs() < 1e-6);
    }
}
