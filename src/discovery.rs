//! Application discovery: folder scan merged with manual registrations, and
//! a background worker that runs one scan at a time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, info};

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::model::Application;
use crate::paths::normalize_key;
use crate::registry::{ConfigDocument, load_document};
use crate::sources::Source;
use crate::sources::folders::FolderSource;
use crate::sources::manual::ManualSource;

/// Scans `root` and appends manual apps whose path was not found by the scan.
///
/// A missing or unreadable root contributes nothing; manual apps are still
/// returned. Scanned folders come first in file-name order, then manual apps
/// in registration order.
pub fn scan(
    root: Option<&Path>,
    registry: &ConfigDocument,
    config: &ScanConfig,
) -> Vec<Application> {
    let mut apps = match root {
        Some(root) => FolderSource { root, registry, config }
            .scan()
            .unwrap_or_else(|e| {
                debug!("Scan of {:?} failed: {}", root, e);
                Vec::new()
            }),
        None => Vec::new(),
    };

    let mut seen: HashSet<String> = apps.iter().map(|a| normalize_key(&a.path)).collect();
    let manual = ManualSource { apps: &registry.manual_apps }
        .scan()
        .unwrap_or_default();
    for app in manual {
        if seen.insert(normalize_key(&app.path)) {
            apps.push(app);
        }
    }

    info!("Discovery: {} applications", apps.len());
    apps
}

type ScanFn = dyn Fn(Option<&Path>) -> Vec<Application> + Send + Sync;

/// Runs scans off the calling thread, at most one at a time.
pub struct ScanWorker {
    scanner: Arc<ScanFn>,
    in_flight: Arc<AtomicBool>,
}

/// Pending result of a [`ScanWorker::request`].
pub struct ScanHandle {
    rx: Receiver<Vec<Application>>,
}

struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ScanWorker {
    /// Worker that reads the registry at `registry_path` fresh for every scan.
    pub fn new(registry_path: PathBuf, config: ScanConfig) -> Self {
        Self::with_scanner(move |root| {
            let doc = load_document(&registry_path);
            scan(root, &doc, &config)
        })
    }

    pub fn with_scanner<F>(scanner: F) -> Self
    where
        F: Fn(Option<&Path>) -> Vec<Application> + Send + Sync + 'static,
    {
        Self {
            scanner: Arc::new(scanner),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn request(&self, root: Option<PathBuf>) -> Result<ScanHandle, ScanError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ScanError::AlreadyRunning);
        }
        let guard = InFlight(self.in_flight.clone());
        let scanner = self.scanner.clone();
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("appdeck-scan".to_string())
            .spawn(move || {
                // Declared in this order so a panicking scan clears the
                // flag before the sender hangs up.
                let tx = tx;
                let guard = guard;
                let apps = scanner(root.as_deref());
                // A receiver woken by the result must never see a stale busy flag.
                drop(guard);
                let _ = tx.send(apps);
            })?;

        Ok(ScanHandle { rx })
    }
}

impl ScanHandle {
    /// Blocks until the scan completes.
    pub fn wait(self) -> Result<Vec<Application>, ScanError> {
        self.rx.recv().map_err(|_| ScanError::WorkerLost)
    }

    /// `Ok(None)` while the scan is still running.
    pub fn try_result(&self) -> Result<Option<Vec<Application>>, ScanError> {
        match self.rx.try_recv() {
            Ok(apps) => Ok(Some(apps)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ScanError::WorkerLost),
        }
    }
}
