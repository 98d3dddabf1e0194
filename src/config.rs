//! Application paths and audit configuration.
//!
//! Everything environment-derived is resolved here, once, at process start.
//! The resulting structs are threaded by parameter; leaf modules never read
//! the process environment themselves.

use std::path::{Path, PathBuf};

use crate::error::{Result, SkdError};

const APP_DIR_NAME: &str = ".skilldock";
const MANIFEST_FILENAME: &str = "manifest.json";
const AUDIT_LOG_FILENAME: &str = "audit.log";

/// Files or directories that mark a project root.
const PROJECT_MARKERS: &[&str] = &[
    ".git",
    "package.json",
    "go.mod",
    "Cargo.toml",
    "pyproject.toml",
];

/// Resolved filesystem layout for one invocation.
#[derive(Debug, Clone)]
pub struct Paths {
    /// User home directory.
    pub home: PathBuf,
    /// `~/.skilldock/`
    pub app_dir: PathBuf,
    /// `~/.skilldock/cache/` (remote skill snapshots)
    pub cache_dir: PathBuf,
    /// `~/.skilldock/manifest.json`
    pub manifest_path: PathBuf,
    /// Local skills repository to scan.
    pub skills_repo: PathBuf,
}

impl Paths {
    /// Build all application paths from the user's home directory.
    ///
    /// `SKD_SKILLS_PATH` overrides the skills repository; it defaults to the
    /// current working directory.
    pub fn resolve() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| SkdError::Config("home directory not found".to_string()))?;

        let app_dir = home.join(APP_DIR_NAME);
        let skills_repo = match std::env::var_os("SKD_SKILLS_PATH") {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => std::env::current_dir()?,
        };

        Ok(Self {
            cache_dir: app_dir.join("cache"),
            manifest_path: app_dir.join(MANIFEST_FILENAME),
            home,
            app_dir,
            skills_repo,
        })
    }

    /// Create the application directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.app_dir, &self.cache_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Default audit log location inside the app directory.
    #[must_use]
    pub fn default_audit_log(&self) -> PathBuf {
        self.app_dir.join(AUDIT_LOG_FILENAME)
    }
}

/// Audit log settings, resolved from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub enabled: bool,
    pub log_path: PathBuf,
    pub max_size_bytes: u64,
    pub max_backups: u32,
}

impl AuditConfig {
    pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5 << 20;
    pub const DEFAULT_MAX_BACKUPS: u32 = 3;

    /// Read `SKD_AUDIT_*` overrides and fall back to defaults.
    ///
    /// Auditing is on unless `SKD_AUDIT_ENABLED` is set to something other
    /// than `1`, `true`, `yes`, or `on`.
    #[must_use]
    pub fn from_env(paths: &Paths) -> Self {
        let enabled = match env_trimmed("SKD_AUDIT_ENABLED") {
            None => true,
            Some(v) => matches!(v.to_lowercase().as_str(), "" | "1" | "true" | "yes" | "on"),
        };

        let log_path = env_trimmed("SKD_AUDIT_LOG_PATH")
            .map_or_else(|| paths.default_audit_log(), PathBuf::from);

        let max_size_bytes = env_trimmed("SKD_AUDIT_MAX_SIZE_MB")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .map_or(Self::DEFAULT_MAX_SIZE_BYTES, |n| n << 20);

        let max_backups = env_trimmed("SKD_AUDIT_MAX_BACKUPS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(Self::DEFAULT_MAX_BACKUPS);

        Self {
            enabled,
            log_path,
            max_size_bytes,
            max_backups,
        }
    }
}

fn env_trimmed(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string())
}

/// Walk up from `start_dir` looking for a project root marker.
#[must_use]
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        if PROJECT_MARKERS.iter().any(|m| dir.join(m).exists()) {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_project_root_detects_git_dir() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repo");
        let nested = root.join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();

        let found = find_project_root(&nested).unwrap();
        assert_eq!(found, root);
    }

    #[test]
    fn find_project_root_none_without_markers() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("plain");
        std::fs::create_dir_all(&dir).unwrap();

        // The tempdir itself has no markers; the walk may still hit one in a
        // parent (e.g. /tmp inside a checkout), so only assert the negative
        // when nothing above us matches.
        if let Some(root) = find_project_root(&dir) {
            assert!(dir.starts_with(&root));
        }
    }

    #[test]
    fn audit_config_defaults() {
        let paths = Paths {
            home: PathBuf::from("/home/u"),
            app_dir: PathBuf::from("/home/u/.skilldock"),
            cache_dir: PathBuf::from("/home/u/.skilldock/cache"),
            manifest_path: PathBuf::from("/home/u/.skilldock/manifest.json"),
            skills_repo: PathBuf::from("/home/u/skills"),
        };
        let cfg = AuditConfig::from_env(&paths);
        assert_eq!(cfg.max_size_bytes, AuditConfig::DEFAULT_MAX_SIZE_BYTES);
        assert_eq!(cfg.log_path.file_name().unwrap(), "audit.log");
    }
}
