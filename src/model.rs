use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Entry-point extensions that run as their own executable.
pub const BATCH_EXTENSIONS: &[&str] = &["bat", "cmd"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    /// Run through an interpreter.
    Script,
    /// Run directly by the shell.
    Batch,
}

impl AppKind {
    pub fn from_entry_point(entry_point: &str) -> Self {
        let ext = Path::new(entry_point)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if BATCH_EXTENSIONS.iter().any(|b| ext.eq_ignore_ascii_case(b)) {
            AppKind::Batch
        } else {
            AppKind::Script
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Scanned,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub name: String,          // Folder base name or user-given name
    pub path: PathBuf,         // Absolute folder, the identity key
    pub entry_point: String,   // File name relative to `path`
    pub origin: Origin,
}

impl Application {
    pub fn new(name: String, path: PathBuf, entry_point: String, origin: Origin) -> Self {
        Self {
            name,
            path,
            entry_point,
            origin,
        }
    }

    pub fn kind(&self) -> AppKind {
        AppKind::from_entry_point(&self.entry_point)
    }

    pub fn script_path(&self) -> PathBuf {
        self.path.join(&self.entry_point)
    }
}

/// A user-registered application as persisted in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualApp {
    pub name: String,
    pub path: String,
    #[serde(alias = "entryPoint")]
    pub entry_point: String,
}

impl From<&ManualApp> for Application {
    fn from(app: &ManualApp) -> Self {
        Application::new(
            app.name.clone(),
            PathBuf::from(&app.path),
            app.entry_point.clone(),
            Origin::Manual,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(AppKind::from_entry_point("main.py"), AppKind::Script);
        assert_eq!(AppKind::from_entry_point("run.bat"), AppKind::Batch);
        assert_eq!(AppKind::from_entry_point("RUN.CMD"), AppKind::Batch);
        assert_eq!(AppKind::from_entry_point("no_extension"), AppKind::Script);
        assert_eq!(AppKind::from_entry_point("bat"), AppKind::Script);
    }

    #[test]
    fn test_manual_app_accepts_camel_case() {
        let app: ManualApp =
            serde_json::from_str(r#"{"name":"x","path":"/p","entryPoint":"a.py"}"#).unwrap();
        assert_eq!(app.entry_point, "a.py");
        let app: ManualApp =
            serde_json::from_str(r#"{"name":"x","path":"/p","entry_point":"b.py"}"#).unwrap();
        assert_eq!(app.entry_point, "b.py");
    }
}
