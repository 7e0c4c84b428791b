//! The only OS-specific part of a launch: handing a finished [`LaunchPlan`]
//! to the system. Everything before this point is platform independent.

use std::path::Path;

use crate::error::LaunchError;
use crate::executor::LaunchPlan;

#[cfg(windows)]
mod win;
#[cfg(windows)]
use win as imp;

#[cfg(not(windows))]
mod unix;
#[cfg(not(windows))]
use unix as imp;

pub trait Spawner {
    fn spawn(&self, plan: &LaunchPlan) -> Result<(), LaunchError>;
}

/// New console window, current privileges.
pub struct DirectSpawner {
    /// Terminal hosting the shell on Unix; unused on Windows.
    pub terminal: Option<String>,
}

/// Same command line, run through the OS elevation prompt.
pub struct ElevatedSpawner {
    pub terminal: Option<String>,
}

impl Spawner for DirectSpawner {
    fn spawn(&self, plan: &LaunchPlan) -> Result<(), LaunchError> {
        imp::spawn_console(plan, self.terminal.as_deref())
    }
}

impl Spawner for ElevatedSpawner {
    fn spawn(&self, plan: &LaunchPlan) -> Result<(), LaunchError> {
        imp::spawn_elevated(plan, self.terminal.as_deref())
    }
}

pub fn spawner_for(elevated: bool, terminal: Option<String>) -> Box<dyn Spawner> {
    if elevated {
        Box::new(ElevatedSpawner { terminal })
    } else {
        Box::new(DirectSpawner { terminal })
    }
}

/// Opens a file or folder with the OS default handler.
pub fn open_with_default(path: &Path) -> Result<(), LaunchError> {
    imp::open_with_default(path)
}
