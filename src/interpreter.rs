//! Picks the interpreter that runs a script entry point.

use std::path::{Path, PathBuf};

use log::debug;

/// What the process running this engine is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRuntime {
    /// A standalone launcher binary; its own path is not a runtime.
    Bundled,
    /// A language runtime that can run scripts itself.
    Interpreter(PathBuf),
}

impl HostRuntime {
    /// Treats the current executable as a runtime only when it is named like one.
    pub fn detect() -> Self {
        match std::env::current_exe() {
            Ok(exe) if is_python_binary(&exe) => HostRuntime::Interpreter(exe),
            _ => HostRuntime::Bundled,
        }
    }
}

fn is_python_binary(exe: &Path) -> bool {
    exe.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.to_ascii_lowercase().starts_with("python"))
}

/// Location of the interpreter inside a venv folder.
pub fn venv_interpreter(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

pub struct InterpreterResolver {
    pub venv_dirs: Vec<String>,
    /// Bare command resolved through `PATH` when bundled.
    pub global: String,
    pub host: HostRuntime,
}

impl InterpreterResolver {
    /// Local venv first, then the global command when bundled, then the host runtime.
    pub fn resolve(&self, app_dir: &Path) -> PathBuf {
        if let Some(venv) = self.find_venv(app_dir) {
            debug!("Using venv interpreter {:?}", venv);
            return venv;
        }
        match &self.host {
            HostRuntime::Bundled => PathBuf::from(&self.global),
            HostRuntime::Interpreter(exe) => exe.clone(),
        }
    }

    pub fn find_venv(&self, app_dir: &Path) -> Option<PathBuf> {
        self.venv_dirs
            .iter()
            .map(|v| venv_interpreter(&app_dir.join(v)))
            .find(|candidate| candidate.is_file())
    }
}
