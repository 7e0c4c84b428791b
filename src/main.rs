use anyhow::{Context, Result, anyhow};
use appdeck::config::{Settings, default_registry_path, load_settings};
use appdeck::mutators::{self, Removal};
use appdeck::paths::same_path;
use appdeck::{Application, ConfigStore, Launcher, ScanWorker};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Registry file (defaults to the per-user data directory)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List applications under ROOT, or under the stored root
    Scan {
        root: Option<PathBuf>,
        /// Remember ROOT as the default scan root
        #[arg(long)]
        save: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Launch an application by name or folder path
    Run {
        app: String,
        /// Request elevated privileges
        #[arg(long)]
        admin: bool,
        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Open an application's folder
    Open { app: String },
    /// Open an application's entry point in the default editor
    Edit { app: String },
    /// Show or set the stored scan root
    Root { path: Option<PathBuf> },
    /// Register FILE as a manual application
    Add { name: String, file: PathBuf },
    /// Unregister the manual application at PATH
    Remove { path: PathBuf },
    /// Force ENTRY_POINT for the application folder at PATH
    Override { path: PathBuf, entry_point: String },
    /// Hide the folder at PATH from scans
    Ignore { path: PathBuf },
    /// Unregister a manual app, or hide a scanned one
    Delete { app: String },
    /// List entry-point overrides
    Overrides,
    /// List ignored paths
    Ignored,
}

struct Session {
    store: ConfigStore,
    settings: Settings,
}

impl Session {
    fn discover(&self, root: Option<PathBuf>) -> Result<Vec<Application>> {
        let root = root.or_else(|| self.store.root());
        log::debug!("Scanning {:?}", root);
        let worker = ScanWorker::new(self.store.path().to_path_buf(), self.settings.scan.clone());
        Ok(worker.request(root)?.wait()?)
    }

    fn find(&self, query: &str) -> Result<Application> {
        let apps = self.discover(None)?;
        apps.iter()
            .find(|a| a.name == query)
            .or_else(|| apps.iter().find(|a| same_path(&a.path, Path::new(query))))
            .or_else(|| apps.iter().find(|a| a.name.eq_ignore_ascii_case(query)))
            .cloned()
            .ok_or_else(|| anyhow!("no application named {:?}", query))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = load_settings(args.settings.as_deref())?;
    let registry = args.registry.clone().unwrap_or_else(default_registry_path);
    let mut ctx = Session {
        store: ConfigStore::open(registry),
        settings,
    };

    match args.command {
        Cmd::Scan { root, save, json } => {
            if save {
                let root = root.as_deref().context("--save needs a ROOT")?;
                ctx.store.set_root(&appdeck::paths::absolute(root))?;
            }
            let apps = ctx.discover(root)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&apps)?);
            } else if apps.is_empty() {
                println!("No apps found.");
            } else {
                for app in &apps {
                    println!("{:<24} {:<16} {}", app.name, app.entry_point, app.path.display());
                }
            }
        }
        Cmd::Run { app, admin, dry_run } => {
            let app = ctx.find(&app)?;
            let launcher = Launcher::new(&ctx.settings);
            if dry_run {
                println!("{}", launcher.plan(&app, admin).display_command());
            } else {
                launcher
                    .launch(&app, admin)
                    .with_context(|| format!("could not launch {}", app.name))?;
            }
        }
        Cmd::Open { app } => {
            let app = ctx.find(&app)?;
            appdeck::open_folder(&app.path)?;
        }
        Cmd::Edit { app } => {
            let app = ctx.find(&app)?;
            appdeck::open_for_edit(&app.script_path())?;
        }
        Cmd::Root { path: Some(path) } => {
            ctx.store.set_root(&appdeck::paths::absolute(&path))?;
        }
        Cmd::Root { path: None } => match ctx.store.root() {
            Some(root) => println!("{}", root.display()),
            None => println!("No root set."),
        },
        Cmd::Add { name, file } => {
            if !mutators::add_manual_app_from_file(&mut ctx.store, &name, &file)? {
                println!("Already registered.");
            }
        }
        Cmd::Remove { path } => {
            if !ctx.store.remove_manual_app(&appdeck::paths::absolute(&path))? {
                println!("No manual app at {}.", path.display());
            }
        }
        Cmd::Override { path, entry_point } => {
            let path = appdeck::paths::absolute(&path);
            mutators::set_override_and_invalidate(&mut ctx.store, &path, &entry_point)?;
        }
        Cmd::Ignore { path } => {
            ctx.store.add_ignored(&appdeck::paths::absolute(&path))?;
        }
        Cmd::Delete { app } => {
            let app = ctx.find(&app)?;
            match mutators::delete_application(&mut ctx.store, &app)? {
                Removal::Unregistered => println!("Removed {}.", app.name),
                Removal::Ignored => println!("{} will be skipped by future scans.", app.name),
            }
        }
        Cmd::Overrides => {
            for (path, entry) in ctx.store.overrides() {
                println!("{} -> {}", path, entry);
            }
        }
        Cmd::Ignored => {
            for path in ctx.store.ignored() {
                println!("{}", path);
            }
        }
    }

    Ok(())
}
