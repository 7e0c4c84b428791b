use std::path::{Path, PathBuf};

use log::{error, info};

use crate::config::Settings;
use crate::error::LaunchError;
use crate::interpreter::{HostRuntime, InterpreterResolver};
use crate::model::{AppKind, Application};
use crate::paths;
use crate::platform::{self, Spawner};

const SEPARATOR: &str = "------------------------------------------------";
const TAG: &str = "[appdeck]";

/// Shell syntax the command line is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellDialect {
    /// `cmd.exe /k "..."`
    Cmd,
    /// `sh -c '...'`
    Posix,
}

impl ShellDialect {
    pub fn host() -> Self {
        if cfg!(windows) {
            ShellDialect::Cmd
        } else {
            ShellDialect::Posix
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            ShellDialect::Cmd => "cmd.exe",
            ShellDialect::Posix => "sh",
        }
    }

    fn quote(self, value: &str) -> String {
        match self {
            ShellDialect::Cmd => format!("\"{}\"", value),
            ShellDialect::Posix => format!("'{}'", value.replace('\'', r"'\''")),
        }
    }

    fn echo(self, text: &str) -> String {
        match self {
            ShellDialect::Cmd => format!("echo {}", text),
            ShellDialect::Posix => format!("echo {}", self.quote(text)),
        }
    }

    fn separator(self) -> &'static str {
        match self {
            ShellDialect::Cmd => " & ",
            ShellDialect::Posix => "; ",
        }
    }

    /// `cmd /k` stays open by itself; a POSIX terminal needs a prompt.
    fn hold_open(self) -> &'static [&'static str] {
        match self {
            ShellDialect::Cmd => &[],
            ShellDialect::Posix => &["printf '\\nPress Enter to close...'", "read _"],
        }
    }
}

/// Everything decided about a launch before the OS is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub kind: AppKind,
    /// `None` for batch files, which run as their own executable.
    pub interpreter: Option<PathBuf>,
    pub script: PathBuf,
    pub cwd: PathBuf,
    pub elevated: bool,
    pub dialect: ShellDialect,
    /// The full line handed to the shell verbatim.
    pub command_line: String,
}

impl LaunchPlan {
    /// Argument string for `cmd.exe`, passed raw so nothing re-quotes it.
    pub fn shell_params(&self) -> String {
        match self.dialect {
            ShellDialect::Cmd => format!("/k \"{}\"", self.command_line),
            ShellDialect::Posix => format!("-c {}", self.dialect.quote(&self.command_line)),
        }
    }

    pub fn display_command(&self) -> String {
        format!("{} {}", self.dialect.program(), self.shell_params())
    }
}

pub fn build_command_line(
    dialect: ShellDialect,
    interpreter: Option<&str>,
    script: &str,
    elevated: bool,
) -> String {
    let what = if interpreter.is_some() {
        "Application"
    } else {
        "Batch File"
    };
    let admin = if elevated { " (Admin)" } else { "" };

    let mut steps = vec![
        dialect.echo(SEPARATOR),
        dialect.echo(&format!("{} Launching {}{}...", TAG, what, admin)),
    ];
    if let Some(interpreter) = interpreter {
        steps.push(dialect.echo(&format!("{} Interpreter: \"{}\"", TAG, interpreter)));
    }
    steps.push(dialect.echo(&format!("{} Script:      \"{}\"", TAG, script)));
    steps.push(dialect.echo(SEPARATOR));
    steps.push(match interpreter {
        Some(interpreter) => format!("{} {}", dialect.quote(interpreter), dialect.quote(script)),
        None => dialect.quote(script),
    });
    steps.extend(dialect.hold_open().iter().map(|s| s.to_string()));

    steps.join(dialect.separator())
}

pub struct Launcher {
    resolver: InterpreterResolver,
    terminal: Option<String>,
    dialect: ShellDialect,
}

impl Launcher {
    pub fn new(settings: &Settings) -> Self {
        let resolver = InterpreterResolver {
            venv_dirs: settings.launch.venv_dirs.clone(),
            global: settings.general.interpreter.clone(),
            host: HostRuntime::detect(),
        };
        Self::with_parts(resolver, settings.general.terminal.clone(), ShellDialect::host())
    }

    pub fn with_parts(
        resolver: InterpreterResolver,
        terminal: Option<String>,
        dialect: ShellDialect,
    ) -> Self {
        Self {
            resolver,
            terminal,
            dialect,
        }
    }

    /// Resolves the interpreter and builds the command line. Batch entry
    /// points never touch the resolver.
    pub fn plan(&self, app: &Application, elevated: bool) -> LaunchPlan {
        let kind = app.kind();
        let script = app.script_path();
        let interpreter = match kind {
            AppKind::Batch => None,
            AppKind::Script => Some(self.resolver.resolve(&app.path)),
        };

        let interpreter_str = interpreter.as_deref().map(paths::native);
        let command_line = build_command_line(
            self.dialect,
            interpreter_str.as_deref(),
            &paths::native(&script),
            elevated,
        );

        LaunchPlan {
            kind,
            interpreter,
            script,
            cwd: app.path.clone(),
            elevated,
            dialect: self.dialect,
            command_line,
        }
    }

    /// Fire-and-forget launch in a new visible console.
    ///
    /// Failures are logged here and returned for the caller to show; they are
    /// never retried.
    pub fn launch(&self, app: &Application, elevated: bool) -> Result<(), LaunchError> {
        let plan = self.plan(app, elevated);
        let spawner = platform::spawner_for(elevated, self.terminal.clone());
        self.launch_with(spawner.as_ref(), &plan)
    }

    pub fn launch_with(&self, spawner: &dyn Spawner, plan: &LaunchPlan) -> Result<(), LaunchError> {
        info!(
            "Launching {:?} (elevated: {}, interpreter: {:?})",
            plan.script, plan.elevated, plan.interpreter
        );
        spawner.spawn(plan).inspect_err(|e| {
            error!("Launch of {:?} failed: {}", plan.script, e);
        })
    }
}

/// Opens the app's folder in the OS file manager.
pub fn open_folder(path: &Path) -> Result<(), LaunchError> {
    platform::open_with_default(path).inspect_err(|e| error!("Error opening directory: {}", e))
}

/// Opens a file with its default handler, usually an editor.
pub fn open_for_edit(path: &Path) -> Result<(), LaunchError> {
    platform::open_with_default(path).inspect_err(|e| error!("Error opening editor: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::venv_interpreter;
    use crate::model::Origin;
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSpawner {
        plans: RefCell<Vec<LaunchPlan>>,
    }

    impl Spawner for RecordingSpawner {
        fn spawn(&self, plan: &LaunchPlan) -> Result<(), LaunchError> {
            self.plans.borrow_mut().push(plan.clone());
            Ok(())
        }
    }

    struct FailingSpawner;

    impl Spawner for FailingSpawner {
        fn spawn(&self, plan: &LaunchPlan) -> Result<(), LaunchError> {
            Err(LaunchError::Spawn {
                program: plan.dialect.program().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no shell"),
            })
        }
    }

    fn launcher(dialect: ShellDialect) -> Launcher {
        let resolver = InterpreterResolver {
            venv_dirs: vec!["venv".into(), ".venv".into(), "env".into()],
            global: "python".into(),
            host: HostRuntime::Bundled,
        };
        Launcher::with_parts(resolver, None, dialect)
    }

    fn app(path: &Path, entry: &str) -> Application {
        Application::new("demo".into(), path.to_path_buf(), entry.into(), Origin::Scanned)
    }

    #[test]
    fn test_batch_plan_never_resolves_interpreter() {
        let dir = TempDir::new().unwrap();
        let venv = venv_interpreter(&dir.path().join("venv"));
        fs::create_dir_all(venv.parent().unwrap()).unwrap();
        fs::write(&venv, "").unwrap();

        for dialect in [ShellDialect::Cmd, ShellDialect::Posix] {
            for elevated in [false, true] {
                let plan = launcher(dialect).plan(&app(dir.path(), "run.BAT"), elevated);
                assert_eq!(plan.kind, AppKind::Batch);
                assert!(plan.interpreter.is_none());
                assert!(!plan.command_line.contains("Interpreter"));
                assert!(!plan.command_line.contains("python"));
                assert!(!plan.command_line.contains(&paths::native(&venv)));
            }
        }
    }

    #[test]
    fn test_script_plan_uses_venv_and_cwd() {
        let dir = TempDir::new().unwrap();
        let venv = venv_interpreter(&dir.path().join(".venv"));
        fs::create_dir_all(venv.parent().unwrap()).unwrap();
        fs::write(&venv, "").unwrap();

        let plan = launcher(ShellDialect::Posix).plan(&app(dir.path(), "main.py"), false);
        assert_eq!(plan.interpreter.as_deref(), Some(venv.as_path()));
        assert_eq!(plan.cwd, dir.path());
        assert_eq!(plan.script, dir.path().join("main.py"));
    }

    #[test]
    fn test_cmd_line_quotes_each_path() {
        let line = build_command_line(
            ShellDialect::Cmd,
            Some(r"C:\My Apps\venv\Scripts\python.exe"),
            r"C:\My Apps\tool\main.py",
            false,
        );
        let python = r#""C:\My Apps\venv\Scripts\python.exe""#;
        assert!(line.ends_with(&format!(r#"{python} "C:\My Apps\tool\main.py""#)));
        assert!(line.starts_with("echo ------------------------------------------------ & "));
        assert!(line.contains(&format!("echo [appdeck] Interpreter: {python}")));
        assert!(!line.contains("(Admin)"));
    }

    #[test]
    fn test_cmd_params_wrap_whole_line_once() {
        let dir = TempDir::new().unwrap();
        let plan = launcher(ShellDialect::Cmd).plan(&app(dir.path(), "main.py"), true);
        assert!(plan.command_line.contains("Launching Application (Admin)..."));
        assert_eq!(plan.shell_params(), format!("/k \"{}\"", plan.command_line));
        assert!(!plan.shell_params().contains("\\\""));
    }

    #[test]
    fn test_posix_line_escapes_single_quotes() {
        let line = build_command_line(ShellDialect::Posix, None, "/srv/it's here/run.sh", false);
        assert!(line.contains(r"'/srv/it'\''s here/run.sh'"));
        assert!(line.contains("Launching Batch File..."));
        assert!(line.ends_with("read _"));
    }

    #[test]
    fn test_launch_hands_plan_to_spawner() {
        let dir = TempDir::new().unwrap();
        let launcher = launcher(ShellDialect::Posix);
        let spawner = RecordingSpawner::default();
        let plan = launcher.plan(&app(dir.path(), "main.py"), false);

        launcher.launch_with(&spawner, &plan).unwrap();
        assert_eq!(spawner.plans.borrow().as_slice(), &[plan]);
    }

    #[test]
    fn test_launch_failure_is_returned_not_panicked() {
        let dir = TempDir::new().unwrap();
        let launcher = launcher(ShellDialect::Cmd);
        let plan = launcher.plan(&app(dir.path(), "main.py"), true);
        let err = launcher.launch_with(&FailingSpawner, &plan).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }
}
