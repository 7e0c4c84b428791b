use serde::Deserialize;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use regex::Regex;
use std::fs;
use log::debug;

use crate::error::ConfigError;

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "appdeck", "appdeck")
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    /// Terminal used to host launches on Unix, e.g. `"foot -e"`.
    #[serde(default = "default_terminal")]
    pub terminal: Option<String>,
    /// Global interpreter used when an app has no venv.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

fn default_terminal() -> Option<String> { Some("x-terminal-emulator -e".to_string()) }
fn default_interpreter() -> String { "python".to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            terminal: default_terminal(),
            interpreter: default_interpreter(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ScanConfig {
    /// Folder names that are never applications.
    #[serde(default = "default_ignored_folders")]
    pub ignored_folders: Vec<String>,
    /// Conventional entry points, highest priority first.
    #[serde(default = "default_entry_points")]
    pub entry_points: Vec<String>,
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
    /// Never picked by the fallback heuristic.
    #[serde(default = "default_package_marker")]
    pub package_marker: String,
    /// Regexes matched against folder names.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_ignored_folders() -> Vec<String> {
    [".git", ".idea", "__pycache__", ".vscode", "venv", ".venv", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_entry_points() -> Vec<String> {
    ["main.py", "app.py", "index.py", "start.py", "manage.py"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_script_extension() -> String { "py".to_string() }
fn default_package_marker() -> String { "__init__.py".to_string() }

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignored_folders: default_ignored_folders(),
            entry_points: default_entry_points(),
            script_extension: default_script_extension(),
            package_marker: default_package_marker(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Invalid patterns are dropped rather than failing the scan.
    pub fn exclude_regexes(&self) -> Vec<Regex> {
        self.exclude_patterns
            .iter()
            .filter_map(|s| match Regex::new(s) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::warn!("Ignoring invalid exclude pattern {:?}: {}", s, e);
                    None
                }
            })
            .collect()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct LaunchConfig {
    /// Venv folder names checked inside each app, in order.
    #[serde(default = "default_venv_dirs")]
    pub venv_dirs: Vec<String>,
}

fn default_venv_dirs() -> Vec<String> {
    ["venv", ".venv", "env"].iter().map(|s| s.to_string()).collect()
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            venv_dirs: default_venv_dirs(),
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    if let Some(dirs) = project_dirs() {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config.toml")
    }
}

pub fn default_registry_path() -> PathBuf {
    if let Some(dirs) = project_dirs() {
        dirs.data_dir().join("apps.json")
    } else {
        PathBuf::from("apps.json")
    }
}

/// Loads settings from `path`, or the per-user config file when `None`.
///
/// A missing file yields defaults. A present but malformed file is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings_path = path.map(Path::to_path_buf).unwrap_or_else(default_settings_path);

    if !settings_path.exists() {
        debug!("No settings at {:?}, using defaults", settings_path);
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&settings_path).map_err(|source| ConfigError::SettingsRead {
        path: settings_path.clone(),
        source,
    })?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}
