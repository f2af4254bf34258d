use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::renderer::{ApplicationOptions, ResizeTo};
use crate::types::Color;

/// Settings of the machine running projects, as opposed to the project's own
/// manifest. Read from `~/.config/tile-runner/host.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default = "default_resize_to")]
    pub resize_to: ResizeTo,
    /// View size in cells when not following the window.
    #[serde(default = "default_width")]
    pub width: u16,
    #[serde(default = "default_height")]
    pub height: u16,
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    #[serde(default = "default_script_file")]
    pub script_file: String,
}

fn default_background() -> Color { Color::Rgb { r: 16, g: 153, b: 187 } }
fn default_resize_to() -> ResizeTo { ResizeTo::Window }
fn default_width() -> u16 { 80 }
fn default_height() -> u16 { 24 }
fn default_target_fps() -> u32 { 60 }
fn default_manifest_file() -> String { "config.json".into() }
fn default_script_file() -> String { "main.rhai".into() }

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            background: default_background(),
            resize_to: default_resize_to(),
            width: default_width(),
            height: default_height(),
            target_fps: default_target_fps(),
            manifest_file: default_manifest_file(),
            script_file: default_script_file(),
        }
    }
}

impl HostConfig {
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("invalid host config ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// The application options every project starts from.
    pub fn application_options(&self) -> ApplicationOptions {
        ApplicationOptions {
            background: Some(self.background.clone()),
            resize_to: Some(self.resize_to),
            width: Some(self.width),
            height: Some(self.height),
        }
    }

    /// Milliseconds per frame at the target rate.
    pub fn frame_millis(&self) -> f64 {
        1000.0 / f64::from(self.target_fps.max(1))
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("tile-runner");
        path.push("host.json");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = HostConfig::from_json(r#"{"targetFps": 30, "resizeTo": "none"}"#);
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.resize_to, ResizeTo::None);
        assert_eq!(config.script_file, "main.rhai");
        assert_eq!(config.background, Color::Rgb { r: 16, g: 153, b: 187 });
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        assert_eq!(HostConfig::from_json("{ nope"), HostConfig::default());
    }

    #[test]
    fn frame_time_follows_target_rate() {
        let config = HostConfig::default();
        assert!((config.frame_millis() - 1000.0 / 60.0).abs() < 1e-9);
    }
}
