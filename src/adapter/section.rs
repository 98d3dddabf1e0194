//! Marker-delimited sections inside shared markdown files.
//!
//! Each skill owns one region bounded by `<!-- skd:start:<name> -->` /
//! `<!-- skd:end:<name> -->` sentinels. Installing replaces the region in
//! place or appends a new one; removing collapses surrounding content
//! without leaving blank-line drift. Re-running either operation any number
//! of times converges on the same file.

use std::path::Path;

use crate::error::Result;
use crate::skill::{read_full_content, Skill};
use crate::utils::fs::{ensure_dir, read_optional};

use super::{Adapter, InstallOpts};

/// Consolidates a skill into a marker-delimited markdown section appended
/// to a shared instructions file. Used by Gemini CLI, Codex CLI, and
/// VS Code Copilot.
#[derive(Debug, Clone, Copy)]
pub struct SectionAdapter;

impl SectionAdapter {
    fn build_content(skill: &Skill, include_refs: bool) -> Result<String> {
        let mut out = format!("# {}\n\n", skill.meta.name);

        if !skill.meta.description.is_empty() {
            for line in skill.meta.description.lines() {
                out.push_str("> ");
                out.push_str(line.trim());
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(&read_full_content(skill, include_refs)?);
        Ok(out)
    }
}

impl Adapter for SectionAdapter {
    fn install(&self, skill: &Skill, target: &Path, opts: &InstallOpts) -> Result<()> {
        let content = Self::build_content(skill, opts.include_refs)?;
        if let Some(dir) = target.parent() {
            ensure_dir(dir)?;
        }
        upsert_section(target, &skill.meta.name, &content)
    }

    fn uninstall(&self, skill: &Skill, target: &Path) -> Result<()> {
        remove_section(target, &skill.meta.name)
    }

    fn describe(&self, _skill: &Skill, target: &Path, _opts: &InstallOpts) -> String {
        format!("append skill section to {}", target.display())
    }
}

#[must_use]
pub fn section_start(name: &str) -> String {
    format!("<!-- skd:start:{name} -->")
}

#[must_use]
pub fn section_end(name: &str) -> String {
    format!("<!-- skd:end:{name} -->")
}

/// Add or replace the named section in `path`.
///
/// Content outside the marker pair is preserved byte for byte. A new
/// section is appended after exactly one blank line when the file already
/// has content.
pub fn upsert_section(path: &Path, name: &str, content: &str) -> Result<()> {
    let start_marker = section_start(name);
    let end_marker = section_end(name);
    let wrapped = format!("{start_marker}\n{content}\n{end_marker}");

    let Some(existing) = read_optional(path)? else {
        std::fs::write(path, format!("{wrapped}\n"))?;
        return Ok(());
    };

    if let (Some(start), Some(end)) = (existing.find(&start_marker), existing.find(&end_marker)) {
        let new_content = format!(
            "{}{wrapped}{}",
            &existing[..start],
            &existing[end + end_marker.len()..]
        );
        std::fs::write(path, new_content)?;
        return Ok(());
    }

    let mut new_content = existing;
    if !new_content.is_empty() && !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    if !new_content.is_empty() {
        new_content.push('\n');
    }
    new_content.push_str(&wrapped);
    new_content.push('\n');
    std::fs::write(path, new_content)?;
    Ok(())
}

/// Remove the named section from `path`, collapsing the blank-line padding
/// it introduced. Missing file or missing section is a no-op.
pub fn remove_section(path: &Path, name: &str) -> Result<()> {
    let Some(existing) = read_optional(path)? else {
        return Ok(());
    };

    let start_marker = section_start(name);
    let end_marker = section_end(name);
    let (Some(start), Some(end)) = (existing.find(&start_marker), existing.find(&end_marker))
    else {
        return Ok(());
    };

    let before = existing[..start].trim_end_matches('\n');
    let after = existing[end + end_marker.len()..].trim_start_matches('\n');

    let new_content = match (before.is_empty(), after.is_empty()) {
        (true, true) => String::new(),
        (true, false) => format!("{}\n", after.trim_end_matches('\n')),
        (false, true) => format!("{before}\n"),
        (false, false) => format!("{before}\n\n{}\n", after.trim_end_matches('\n')),
    };

    std::fs::write(path, new_content)?;
    Ok(())
}
