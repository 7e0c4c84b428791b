use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::LaunchError;
use crate::executor::LaunchPlan;

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

pub fn spawn_console(plan: &LaunchPlan, terminal: Option<&str>) -> Result<(), LaunchError> {
    in_terminal(plan, terminal, &[])
}

/// `sudo` inside the visible terminal, so the password prompt is where the
/// user looks.
pub fn spawn_elevated(plan: &LaunchPlan, terminal: Option<&str>) -> Result<(), LaunchError> {
    in_terminal(plan, terminal, &["sudo"])
}

fn in_terminal(
    plan: &LaunchPlan,
    terminal: Option<&str>,
    prefix: &[&str],
) -> Result<(), LaunchError> {
    let mut parts = terminal.unwrap_or_default().split_whitespace();
    let program = parts.next().ok_or(LaunchError::NoTerminal)?;

    let mut command = Command::new(program);
    command
        .args(parts)
        .args(prefix)
        .args([plan.dialect.program(), "-c", plan.command_line.as_str()])
        .current_dir(&plan.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    command.spawn().map_err(|source| LaunchError::Spawn {
        program: program.to_string(),
        source,
    })?;
    Ok(())
}

pub fn open_with_default(path: &Path) -> Result<(), LaunchError> {
    Command::new(OPENER)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| LaunchError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(())
}
