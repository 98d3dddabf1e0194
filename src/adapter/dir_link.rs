//! Directory-mirror installation: symlink local skills, copy remote ones.
//!
//! A symlink is enough for a trusted local repository and always reflects
//! source edits; cached remote content gets a full copy so it survives
//! deletion of its origin.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::skill::{Skill, SkillSource};
use crate::utils::fs::{copy_dir, ensure_dir, remove_tree};

use super::{Adapter, InstallOpts};

/// Installs a skill as a whole directory under the client's skills root.
/// Used by Claude Code.
#[derive(Debug, Clone, Copy)]
pub struct DirLinkAdapter;

impl DirLinkAdapter {
    fn dest(skill: &Skill, target: &Path) -> PathBuf {
        target.join(&skill.dir_name)
    }
}

impl Adapter for DirLinkAdapter {
    fn install(&self, skill: &Skill, target: &Path, _opts: &InstallOpts) -> Result<()> {
        let dest = Self::dest(skill, target);

        ensure_dir(target)?;
        // Replace any prior installation, link or tree.
        remove_tree(&dest)?;

        match skill.source {
            SkillSource::Local => symlink_dir(&skill.path, &dest)?,
            SkillSource::Remote => copy_dir(&skill.path, &dest)?,
        }

        Ok(())
    }

    fn uninstall(&self, skill: &Skill, target: &Path) -> Result<()> {
        remove_tree(&Self::dest(skill, target))
    }

    fn describe(&self, skill: &Skill, target: &Path, _opts: &InstallOpts) -> String {
        let dest = Self::dest(skill, target);
        match skill.source {
            SkillSource::Local => {
                format!("symlink {} -> {}", dest.display(), skill.path.display())
            }
            SkillSource::Remote => {
                format!("copy {} -> {}", skill.path.display(), dest.display())
            }
        }
    }
}

#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}
