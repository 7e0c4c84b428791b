use crate::config::ScanConfig;
use crate::model::{Application, Origin};
use crate::paths;
use crate::registry::ConfigDocument;
use crate::sources::Source;
use anyhow::Result;
use log::{debug, info};
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Immediate subfolders of a root that contain something runnable.
pub struct FolderSource<'a> {
    pub root: &'a Path,
    pub registry: &'a ConfigDocument,
    pub config: &'a ScanConfig,
}

impl Source for FolderSource<'_> {
    fn scan(&self) -> Result<Vec<Application>> {
        let mut entries = Vec::new();

        if !self.root.is_dir() {
            debug!("Scan root {:?} is not a directory, skipping", self.root);
            return Ok(entries);
        }

        let root = paths::absolute(self.root);
        let excludes = self.config.exclude_regexes();

        debug!("Scanning app folders in {:?}", root);
        let walker = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry under {:?}: {}", root, e);
                    continue;
                }
            };
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };

            if self.registry.is_ignored(path) {
                debug!("{:?} is ignored", path);
                continue;
            }
            if !entry.file_type().is_dir() || self.is_tooling_folder(name, &excludes) {
                continue;
            }

            let entry_point = match self.registry.override_for(path) {
                Some(o) => Some(o.to_string()),
                None => detect_entry_point(path, self.config),
            };

            if let Some(entry_point) = entry_point {
                entries.push(Application::new(
                    name.to_string(),
                    path.to_path_buf(),
                    entry_point,
                    Origin::Scanned,
                ));
            }
        }

        info!("FolderSource: found {} entries", entries.len());
        Ok(entries)
    }
}

impl FolderSource<'_> {
    fn is_tooling_folder(&self, name: &str, excludes: &[Regex]) -> bool {
        self.config.ignored_folders.iter().any(|f| f == name)
            || excludes.iter().any(|re| re.is_match(name))
    }
}

/// Conventional name first, then the fallback heuristic.
pub fn detect_entry_point(folder: &Path, config: &ScanConfig) -> Option<String> {
    config
        .entry_points
        .iter()
        .find(|ep| folder.join(ep).is_file())
        .cloned()
        .or_else(|| find_any_script(folder, config))
}

/// Lexicographically first script that is not the package marker.
pub fn find_any_script(folder: &Path, config: &ScanConfig) -> Option<String> {
    let read_dir = fs::read_dir(folder).ok()?;
    let mut candidates: Vec<String> = read_dir
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.') && *name != config.package_marker)
        .filter(|name| {
            Path::new(name)
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&config.script_extension))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "print('hi')\n").unwrap();
    }

    fn scan(root: &Path, doc: &ConfigDocument) -> Vec<Application> {
        let config = ScanConfig::default();
        FolderSource { root, registry: doc, config: &config }.scan().unwrap()
    }

    fn entry_of<'a>(apps: &'a [Application], name: &str) -> Option<&'a str> {
        apps.iter().find(|a| a.name == name).map(|a| a.entry_point.as_str())
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let doc = ConfigDocument::default();
        assert!(scan(&dir.path().join("missing"), &doc).is_empty());

        touch(dir.path(), "file.py");
        assert!(scan(&dir.path().join("file.py"), &doc).is_empty());
    }

    #[test]
    fn test_conventional_entry_point_priority() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/app.py");
        touch(dir.path(), "a/main.py");
        touch(dir.path(), "a/zzz.py");
        touch(dir.path(), "b/manage.py");
        touch(dir.path(), "b/aaa.py");

        let apps = scan(dir.path(), &ConfigDocument::default());
        assert_eq!(entry_of(&apps, "a"), Some("main.py"));
        assert_eq!(entry_of(&apps, "b"), Some("manage.py"));
    }

    #[test]
    fn test_fallback_skips_package_marker_and_is_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "tool/__init__.py");
        touch(dir.path(), "tool/run.py");
        touch(dir.path(), "tool/cli.py");
        touch(dir.path(), "tool/notes.txt");
        touch(dir.path(), "only_init/__init__.py");

        let apps = scan(dir.path(), &ConfigDocument::default());
        assert_eq!(entry_of(&apps, "tool"), Some("cli.py"));
        assert_eq!(entry_of(&apps, "only_init"), None);

        let again = scan(dir.path(), &ConfigDocument::default());
        assert_eq!(apps, again);
    }

    #[test]
    fn test_override_wins_without_existence_check() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/main.py");
        let mut doc = ConfigDocument::default();
        doc.app_overrides.insert(
            paths::absolute(&dir.path().join("a")).to_string_lossy().into_owned(),
            "missing.py".to_string(),
        );

        let apps = scan(dir.path(), &doc);
        assert_eq!(entry_of(&apps, "a"), Some("missing.py"));
    }

    #[test]
    fn test_blank_override_falls_back_to_detection() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/main.py");
        touch(dir.path(), "b/tool.py");
        let mut doc = ConfigDocument::default();
        let key = |name: &str| {
            paths::absolute(&dir.path().join(name)).to_string_lossy().into_owned()
        };
        doc.app_overrides.insert(key("a"), String::new());
        doc.app_overrides.insert(key("b"), "   ".to_string());

        let apps = scan(dir.path(), &doc);
        assert_eq!(entry_of(&apps, "a"), Some("main.py"));
        assert_eq!(entry_of(&apps, "b"), Some("tool.py"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_root_is_empty() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path().join("apps");
        touch(&root, "a/main.py");
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the folder; nothing to check then.
        let listable = fs::read_dir(&root).is_ok();
        let apps = scan(&root, &ConfigDocument::default());
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

        if !listable {
            assert!(apps.is_empty());
        }
    }

    #[test]
    fn test_tooling_folders_and_files_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".git/main.py");
        touch(dir.path(), "venv/main.py");
        touch(dir.path(), "node_modules/index.py");
        touch(dir.path(), "loose.py");
        touch(dir.path(), "real/main.py");

        let apps = scan(dir.path(), &ConfigDocument::default());
        let names: Vec<&str> = apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["real"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "tmp-build/main.py");
        touch(dir.path(), "keep/main.py");
        let config = ScanConfig {
            exclude_patterns: vec!["^tmp-".to_string()],
            ..Default::default()
        };
        let doc = ConfigDocument::default();
        let apps = FolderSource { root: dir.path(), registry: &doc, config: &config }
            .scan()
            .unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "keep");
    }

    #[test]
    fn test_paths_are_absolute_folders() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/main.py");
        let apps = scan(dir.path(), &ConfigDocument::default());
        assert!(apps[0].path.is_absolute());
        assert_eq!(apps[0].path.file_name(), Some(PathBuf::from("a").as_os_str()));
        assert_eq!(apps[0].origin, Origin::Scanned);
    }
}
