//! Error types shared by the discovery, launch and registry layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the persisted registry and the settings file.
///
/// Read failures of the registry never show up here: a missing or corrupt
/// document heals to defaults. Writes and rejected values surface.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write registry {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to serialize registry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("entry point for {0:?} is blank")]
    BlankEntryPoint(PathBuf),

    #[error("failed to read settings {path:?}: {source}")]
    SettingsRead { path: PathBuf, source: io::Error },

    #[error("invalid settings: {0}")]
    SettingsParse(#[from] toml::de::Error),
}

/// Failures while handing a command to the OS.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    /// `ShellExecuteW` returned a code <= 32, e.g. a denied elevation prompt.
    #[error("shell refused to start {program} (code {code})")]
    ShellExecute { program: String, code: isize },

    #[error("failed to open {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("no terminal configured to host the launch")]
    NoTerminal,
}

/// Failures of the background scan handoff.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("a scan is already running")]
    AlreadyRunning,

    #[error("failed to start scan thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("scan thread exited without a result")]
    WorkerLost,
}

/// Failures of the override/ignore/manual-app mutators.
#[derive(Debug, Error)]
pub enum MutateError {
    #[error("entry point {0:?} does not exist")]
    MissingFile(PathBuf),

    #[error("entry point {0:?} has no parent folder")]
    NoParent(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
