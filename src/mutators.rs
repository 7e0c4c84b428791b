//! Corrections a human makes to discovery, written through the registry.
//!
//! Every operation here makes the previous scan result stale; callers are
//! expected to scan again afterwards.

use std::path::Path;

use log::info;

use crate::error::{ConfigError, MutateError};
use crate::model::{Application, ManualApp};
use crate::registry::ConfigStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    Rescan,
}

/// How [`delete_application`] hid the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Removed from the manual registry.
    Unregistered,
    /// Added to the ignore set; nothing on disk is touched.
    Ignored,
}

pub fn set_override_and_invalidate(
    store: &mut ConfigStore,
    path: &Path,
    entry_point: &str,
) -> Result<Invalidation, ConfigError> {
    store.set_override(path, entry_point)?;
    info!("Override for {:?} set to {}", path, entry_point);
    Ok(Invalidation::Rescan)
}

pub fn delete_application(
    store: &mut ConfigStore,
    app: &Application,
) -> Result<Removal, ConfigError> {
    store.reload();
    if store.document().manual_app(&app.path).is_some() {
        store.remove_manual_app(&app.path)?;
        info!("Unregistered manual app {:?}", app.path);
        Ok(Removal::Unregistered)
    } else {
        store.add_ignored(&app.path)?;
        info!("Ignoring {:?} in future scans", app.path);
        Ok(Removal::Ignored)
    }
}

/// Registers `file` as a manual app: its folder becomes the path and its
/// file name the entry point. A blank `name` defaults to the folder name.
pub fn add_manual_app_from_file(
    store: &mut ConfigStore,
    name: &str,
    file: &Path,
) -> Result<bool, MutateError> {
    if !file.is_file() {
        return Err(MutateError::MissingFile(file.to_path_buf()));
    }
    let file = crate::paths::absolute(file);
    let (Some(folder), Some(entry_point)) = (file.parent(), file.file_name()) else {
        return Err(MutateError::NoParent(file.clone()));
    };

    let name = match name.trim() {
        "" => folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| folder.to_string_lossy().into_owned()),
        trimmed => trimmed.to_string(),
    };

    let added = store.add_manual_app(ManualApp {
        name,
        path: folder.to_string_lossy().into_owned(),
        entry_point: entry_point.to_string_lossy().into_owned(),
    })?;
    Ok(added)
}
