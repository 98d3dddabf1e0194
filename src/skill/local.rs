//! Skill discovery from a local directory tree.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{parse_frontmatter, Skill, SkillSource};
use crate::error::Result;

/// Discover skills in the local skills repository.
pub fn scan_local(repo_path: &Path) -> Result<Vec<Skill>> {
    scan_dir(repo_path, SkillSource::Local)
}

/// Discover skills one level below `repo_path`.
///
/// A skill is any non-hidden subdirectory containing a parseable `SKILL.md`;
/// everything else is silently skipped.
pub fn scan_dir(repo_path: &Path, source: SkillSource) -> Result<Vec<Skill>> {
    let mut skills = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(repo_path)?
        .filter_map(std::result::Result::ok)
        .collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') || name == "node_modules" {
            continue;
        }
        let skill_dir = entry.path();
        if !skill_dir.is_dir() {
            continue;
        }

        let Ok(raw) = std::fs::read_to_string(skill_dir.join("SKILL.md")) else {
            continue; // no SKILL.md, not a skill directory
        };
        let Ok((meta, body)) = parse_frontmatter(&raw) else {
            continue; // malformed SKILL.md
        };

        let mut reference_files = discover_files(&skill_dir, "reference");
        if reference_files.is_empty() {
            reference_files = discover_files(&skill_dir, "references");
        }

        skills.push(Skill {
            meta,
            dir_name: name,
            source,
            markdown_body: body,
            reference_files,
            example_files: discover_files(&skill_dir, "examples"),
            asset_files: discover_files(&skill_dir, "assets"),
            path: skill_dir,
        });
    }

    Ok(skills)
}

/// List files recursively under `skill_dir/subdir`, as paths relative to the
/// skill directory.
fn discover_files(skill_dir: &Path, subdir: &str) -> Vec<PathBuf> {
    let dir = skill_dir.join(subdir);
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(&dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(skill_dir)
                .map(Path::to_path_buf)
                .ok()
        })
        .collect()
}
