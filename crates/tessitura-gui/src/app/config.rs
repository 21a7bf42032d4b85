use std::path::PathBuf;

use tessitura_core::{Viewport, ZoomLimits};

#[derive(serde::Serialize, serde::Deserialize, Default)]
pub(super) struct AppConfig {
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub(super) struct EditorConfig {
    pub snap_to_beat: f64,
    pub bpm: f64,
    pub viewport: Viewport,
    pub limits: ZoomLimits,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_to_beat: 0.25,
            bpm: 120.0,
            viewport: Viewport::default(),
            limits: ZoomLimits::default(),
        }
    }
}

pub(super) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tessitura")
        .join("config.toml")
}

pub(super) fn load_config() -> AppConfig {
    let path = config_path();
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| toml::from_str(&s).ok())
        .unwrap_or_default()
}

pub(super) fn save_config(config: &AppConfig) {
    let path = config_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(s) = toml::to_string_pretty(config) else {
        return;
    };
    let _ = std::fs::write(&path, s);
}
