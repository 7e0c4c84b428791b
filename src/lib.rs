//! Discovers runnable app folders under a root directory and launches their
//! entry points in a visible console, optionally elevated.
//!
//! A JSON registry ([`registry::ConfigStore`]) records the scan root, manual
//! apps, entry-point overrides and ignored folders.

pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod model;
pub mod mutators;
pub mod paths;
pub mod platform;
pub mod registry;
pub mod sources;

pub use discovery::{ScanHandle, ScanWorker, scan};
pub use executor::{LaunchPlan, Launcher, open_folder, open_for_edit};
pub use model::{AppKind, Application, ManualApp, Origin};
pub use registry::{ConfigDocument, ConfigStore};
