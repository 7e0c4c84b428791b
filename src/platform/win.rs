use std::os::windows::process::CommandExt;
use std::path::Path;
use std::process::Command;

use ::windows::Win32::Foundation::HWND;
use ::windows::Win32::UI::Shell::ShellExecuteW;
use ::windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;
use ::windows::core::{HSTRING, PCWSTR, w};
use log::debug;

use crate::error::LaunchError;
use crate::executor::LaunchPlan;

const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

pub fn spawn_console(plan: &LaunchPlan, _terminal: Option<&str>) -> Result<(), LaunchError> {
    let program = plan.dialect.program();
    // raw_arg: the line is already quoted and must reach cmd.exe untouched.
    Command::new(program)
        .raw_arg(plan.shell_params())
        .current_dir(&plan.cwd)
        .creation_flags(CREATE_NEW_CONSOLE)
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;
    Ok(())
}

pub fn spawn_elevated(plan: &LaunchPlan, _terminal: Option<&str>) -> Result<(), LaunchError> {
    shell_execute(
        w!("runas"),
        plan.dialect.program(),
        Some(plan.shell_params().as_str()),
        Some(plan.cwd.as_path()),
    )
}

pub fn open_with_default(path: &Path) -> Result<(), LaunchError> {
    shell_execute(w!("open"), &path.to_string_lossy(), None, None)
}

fn shell_execute(
    verb: PCWSTR,
    file: &str,
    params: Option<&str>,
    dir: Option<&Path>,
) -> Result<(), LaunchError> {
    let file_w = HSTRING::from(file);
    let params_w = params.map(HSTRING::from);
    let dir_w = dir.map(|d| HSTRING::from(&*d.to_string_lossy()));
    let ptr = |h: &Option<HSTRING>| h.as_ref().map_or(PCWSTR::null(), |h| PCWSTR(h.as_ptr()));

    let instance = unsafe {
        ShellExecuteW(
            HWND::default(),
            verb,
            PCWSTR(file_w.as_ptr()),
            ptr(&params_w),
            ptr(&dir_w),
            SW_SHOWNORMAL,
        )
    };
    debug!("ShellExecuteW({}) returned {}", file, instance.0);

    if instance.0 <= 32 {
        return Err(LaunchError::ShellExecute {
            program: file.to_string(),
            code: instance.0,
        });
    }
    Ok(())
}
