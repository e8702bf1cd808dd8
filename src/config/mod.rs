use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::Color;
use crate::tools::{BrushOptions, FontSpec, TextOptions, DEFAULT_FONT_FAMILY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "nanoedit";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Font family name to TrueType/OpenType file.
    pub fonts: BTreeMap<String, PathBuf>,
    pub brush_size: u32,
    pub brush_color: Color,
    pub text_size: u32,
    pub text_family: String,
    pub text_color: Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        let brush = BrushOptions::default();
        let text = TextOptions::default();
        Self {
            fonts: BTreeMap::new(),
            brush_size: brush.size,
            brush_color: brush.color,
            text_size: text.font.size,
            text_family: DEFAULT_FONT_FAMILY.to_string(),
            text_color: text.color,
        }
    }
}

impl AppConfig {
    pub fn brush_options(&self) -> BrushOptions {
        BrushOptions::new(self.brush_size, self.brush_color)
    }

    pub fn text_options(&self) -> TextOptions {
        TextOptions {
            color: self.text_color,
            font: FontSpec::new(self.text_family.clone(), self.text_size),
        }
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    load_app_config_from(&path)
}

/// Reads one config file, falling back to defaults when it is unreadable or malformed.
pub fn load_app_config_from(path: &Path) -> AppConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
