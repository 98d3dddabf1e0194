//! Skill model and SKILL.md front-matter parsing.
//!
//! A skill is a directory containing a `SKILL.md` file with YAML front
//! matter, plus optional `reference(s)/`, `examples/`, and `assets/` trees.
//! Skills are immutable snapshots, re-read on every invocation.

mod content;
mod local;
mod updates;

pub use content::read_full_content;
pub use local::{scan_dir, scan_local};
pub use updates::{check_updates, UpdateInfo};

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, SkdError};

/// Version shown for skills that declare none.
pub const UNVERSIONED: &str = "unversioned";

/// Where a skill was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillSource {
    /// A directory in the local skills repository; safe to symlink.
    Local,
    /// A cached snapshot of remote content; must be copied.
    Remote,
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// YAML metadata from the SKILL.md front-matter block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "allowed-tools")]
    pub allowed_tools: Vec<String>,
}

/// A discovered skill with its metadata and content.
#[derive(Debug, Clone)]
pub struct Skill {
    pub meta: Frontmatter,
    /// Directory name, e.g. `5-whys-skill`.
    pub dir_name: String,
    /// Absolute path to the skill directory.
    pub path: PathBuf,
    pub source: SkillSource,
    /// SKILL.md content after the front matter.
    pub markdown_body: String,
    /// Relative paths under `reference/` or `references/`.
    pub reference_files: Vec<PathBuf>,
    /// Relative paths under `examples/`.
    pub example_files: Vec<PathBuf>,
    /// Relative paths under `assets/`.
    pub asset_files: Vec<PathBuf>,
}

impl Skill {
    /// A minimal stand-in for uninstalling a skill that no longer exists in
    /// the repository. Both name and dir name are the recorded skill name so
    /// file-per-skill adapters still resolve their targets.
    #[must_use]
    pub fn stub(name: &str) -> Self {
        Self {
            meta: Frontmatter {
                name: name.to_string(),
                ..Frontmatter::default()
            },
            dir_name: name.to_string(),
            path: PathBuf::new(),
            source: SkillSource::Local,
            markdown_body: String::new(),
            reference_files: Vec::new(),
            example_files: Vec::new(),
            asset_files: Vec::new(),
        }
    }

    /// The declared version, or [`UNVERSIONED`] when absent.
    #[must_use]
    pub fn display_version(&self) -> &str {
        if self.meta.version.is_empty() {
            UNVERSIONED
        } else {
            &self.meta.version
        }
    }

    /// Whether `arg` names this skill by front-matter name or directory name.
    #[must_use]
    pub fn matches(&self, arg: &str) -> bool {
        self.meta.name == arg || self.dir_name == arg
    }
}

/// Split a SKILL.md file into YAML front matter and markdown body.
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String)> {
    let content = content.replace("\r\n", "\n");

    let Some(rest) = content.strip_prefix("---") else {
        return Err(SkdError::InvalidSkill(
            "missing frontmatter delimiter".to_string(),
        ));
    };

    let Some(idx) = rest.find("\n---") else {
        return Err(SkdError::InvalidSkill(
            "missing closing frontmatter delimiter".to_string(),
        ));
    };

    let yaml = &rest[..idx];
    let body = rest[idx + 4..].trim_start_matches('\n').to_string();

    let mut meta: Frontmatter = serde_yaml::from_str(yaml)
        .map_err(|err| SkdError::InvalidSkill(format!("parsing frontmatter YAML: {err}")))?;
    meta.description = meta.description.trim().to_string();

    Ok((meta, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "---\nname: demo\ndescription: |\n  A demo skill.\nversion: 1.0.0\n---\n# Demo\n\nBody text.\n";

    #[test]
    fn parse_frontmatter_splits_meta_and_body() {
        let (meta, body) = parse_frontmatter(SAMPLE).unwrap();
        assert_eq!(meta.name, "demo");
        assert_eq!(meta.description, "A demo skill.");
        assert_eq!(meta.version, "1.0.0");
        assert!(body.starts_with("# Demo"));
    }

    #[test]
    fn parse_frontmatter_normalizes_crlf() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        let (meta, body) = parse_frontmatter(&crlf).unwrap();
        assert_eq!(meta.name, "demo");
        assert!(!body.contains('\r'));
    }

    #[test]
    fn parse_frontmatter_requires_opening_delimiter() {
        assert!(parse_frontmatter("# no frontmatter\n").is_err());
    }

    #[test]
    fn parse_frontmatter_requires_closing_delimiter() {
        assert!(parse_frontmatter("---\nname: x\n").is_err());
    }

    #[test]
    fn display_version_falls_back_to_unversioned() {
        let mut s = Skill::stub("demo");
        assert_eq!(s.display_version(), UNVERSIONED);
        s.meta.version = "2.1.0".to_string();
        assert_eq!(s.display_version(), "2.1.0");
    }

    #[test]
    fn matches_by_name_or_dir_name() {
        let mut s = Skill::stub("five-whys");
        s.dir_name = "5-whys-skill".to_string();
        assert!(s.matches("five-whys"));
        assert!(s.matches("5-whys-skill"));
        assert!(!s.matches("other"));
    }
}
