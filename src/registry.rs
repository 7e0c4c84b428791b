//! Persistent app registry: scan root, manual apps, overrides and ignores.
//!
//! The document is JSON on disk and is owned in memory by a [`ConfigStore`].
//! Reads heal to defaults; writes always replace the whole file. Mutators
//! reload before changing anything, but two stores holding the same file can
//! still race and the later `flush` wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::ManualApp;
use crate::paths::{normalize_key, same_path};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    #[serde(default, alias = "rootDir", skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    #[serde(default, alias = "manualApps")]
    pub manual_apps: Vec<ManualApp>,
    #[serde(default, alias = "appOverrides")]
    pub app_overrides: BTreeMap<String, String>,
    #[serde(default, alias = "ignoredApps")]
    pub ignored_apps: Vec<String>,
    /// Keys this version does not know, carried through rewrites.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ConfigDocument {
    /// Forced entry point for `folder`. Blank values count as absent.
    pub fn override_for(&self, folder: &Path) -> Option<&str> {
        let key = normalize_key(folder);
        self.app_overrides
            .iter()
            .filter(|(_, entry)| !entry.trim().is_empty())
            .find(|(path, _)| normalize_key(Path::new(path)) == key)
            .map(|(_, entry)| entry.as_str())
    }

    /// Matches by normalized path, or by bare folder name for entries
    /// written that way by older versions.
    pub fn is_ignored(&self, folder: &Path) -> bool {
        let key = normalize_key(folder);
        let name = folder.file_name().and_then(|s| s.to_str());
        self.ignored_apps.iter().any(|entry| {
            name.is_some_and(|name| same_name(name, entry))
                || normalize_key(Path::new(entry)) == key
        })
    }

    pub fn manual_app(&self, path: &Path) -> Option<&ManualApp> {
        self.manual_apps
            .iter()
            .find(|app| same_path(Path::new(&app.path), path))
    }
}

/// Folder names compare case-insensitively on Windows, like the paths they end.
fn same_name(a: &str, b: &str) -> bool {
    if cfg!(windows) {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

pub struct ConfigStore {
    path: PathBuf,
    doc: ConfigDocument,
}

impl ConfigStore {
    /// Opens the registry at `path`. Never fails; see [`load_document`].
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = load_document(&path);
        Self { path, doc }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.doc
    }

    pub fn reload(&mut self) {
        self.doc = load_document(&self.path);
    }

    /// Writes the in-memory document over the file.
    pub fn flush(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(&self.doc)?;
        fs::write(&self.path, content).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Registry written to {:?}", self.path);
        Ok(())
    }

    /// Load, apply `f`, and write back if `f` reports a change.
    fn mutate<F>(&mut self, f: F) -> Result<bool, ConfigError>
    where
        F: FnOnce(&mut ConfigDocument) -> bool,
    {
        self.reload();
        let changed = f(&mut self.doc);
        if changed {
            self.flush()?;
        }
        Ok(changed)
    }

    pub fn root(&self) -> Option<PathBuf> {
        self.doc.root_dir.as_ref().map(PathBuf::from)
    }

    pub fn set_root(&mut self, root: &Path) -> Result<(), ConfigError> {
        let root = root.to_string_lossy().into_owned();
        self.mutate(|doc| {
            doc.root_dir = Some(root);
            true
        })?;
        Ok(())
    }

    pub fn manual_apps(&self) -> &[ManualApp] {
        &self.doc.manual_apps
    }

    /// Returns `false` when an app with the same path is already registered.
    pub fn add_manual_app(&mut self, app: ManualApp) -> Result<bool, ConfigError> {
        self.mutate(|doc| {
            if doc.manual_app(Path::new(&app.path)).is_some() {
                return false;
            }
            doc.manual_apps.push(app);
            true
        })
    }

    pub fn remove_manual_app(&mut self, path: &Path) -> Result<bool, ConfigError> {
        self.mutate(|doc| {
            let before = doc.manual_apps.len();
            doc.manual_apps.retain(|app| !same_path(Path::new(&app.path), path));
            doc.manual_apps.len() != before
        })
    }

    pub fn overrides(&self) -> &BTreeMap<String, String> {
        &self.doc.app_overrides
    }

    /// Upserts; an existing key spelled differently for the same folder is replaced.
    pub fn set_override(&mut self, path: &Path, entry_point: &str) -> Result<(), ConfigError> {
        if entry_point.trim().is_empty() {
            return Err(ConfigError::BlankEntryPoint(path.to_path_buf()));
        }
        let key = path.to_string_lossy().into_owned();
        let entry_point = entry_point.to_string();
        self.mutate(|doc| {
            doc.app_overrides.retain(|k, _| !same_path(Path::new(k), path));
            doc.app_overrides.insert(key, entry_point);
            true
        })?;
        Ok(())
    }

    pub fn ignored(&self) -> &[String] {
        &self.doc.ignored_apps
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        self.doc.is_ignored(path)
    }

    pub fn add_ignored(&mut self, path: &Path) -> Result<bool, ConfigError> {
        let entry = path.to_string_lossy().into_owned();
        self.mutate(|doc| {
            if doc.ignored_apps.iter().any(|p| same_path(Path::new(p), path)) {
                return false;
            }
            doc.ignored_apps.push(entry);
            true
        })
    }
}

/// Reads the document, falling back to defaults on any failure.
pub fn load_document(path: &Path) -> ConfigDocument {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Registry {:?} not readable ({}), starting empty", path, e);
            return ConfigDocument::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Registry {:?} is corrupt ({}), starting fresh", path, e);
            ConfigDocument::default()
        }
    }
}
