//! One self-contained rules file per skill, with fixed front matter.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::skill::{read_full_content, Skill};
use crate::utils::fs::ensure_dir;

use super::{Adapter, InstallOpts};

const DESCRIPTION_MAX: usize = 200;

/// Writes skills as `.mdc` files under a rules directory. Used by Cursor.
#[derive(Debug, Clone, Copy)]
pub struct RulesFileAdapter;

impl RulesFileAdapter {
    fn dest(skill: &Skill, target: &Path) -> PathBuf {
        target.join(format!("{}.mdc", skill.dir_name))
    }

    fn build_content(skill: &Skill, include_refs: bool) -> Result<String> {
        let desc = truncate_description(&skill.meta.description);
        let body = read_full_content(skill, include_refs)?;
        Ok(format!(
            "---\ndescription: {desc}\nglobs:\nalwaysApply: false\n---\n\n{body}"
        ))
    }
}

/// First line only, capped at [`DESCRIPTION_MAX`] characters.
fn truncate_description(description: &str) -> String {
    let first_line = description.lines().next().unwrap_or_default();
    if first_line.chars().count() <= DESCRIPTION_MAX {
        return first_line.to_string();
    }
    let mut out: String = first_line.chars().take(DESCRIPTION_MAX - 3).collect();
    out.push_str("...");
    out
}

impl Adapter for RulesFileAdapter {
    fn install(&self, skill: &Skill, target: &Path, opts: &InstallOpts) -> Result<()> {
        let content = Self::build_content(skill, opts.include_refs)?;
        ensure_dir(target)?;
        std::fs::write(Self::dest(skill, target), content)?;
        Ok(())
    }

    fn uninstall(&self, skill: &Skill, target: &Path) -> Result<()> {
        match std::fs::remove_file(Self::dest(skill, target)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn describe(&self, skill: &Skill, target: &Path, _opts: &InstallOpts) -> String {
        format!("write {}", Self::dest(skill, target).display())
    }
}
