//! Scope-dependent installation: per-skill rule files at project scope,
//! one shared section-managed file at global scope. Used by Windsurf.

use std::path::{Path, PathBuf};

use crate::client::Scope;
use crate::error::Result;
use crate::skill::{read_full_content, Skill};
use crate::utils::fs::ensure_dir;

use super::section::{remove_section, upsert_section};
use super::{Adapter, InstallOpts};

#[derive(Debug, Clone, Copy)]
pub struct DualModeAdapter;

impl DualModeAdapter {
    fn project_file(skill: &Skill, target: &Path) -> PathBuf {
        target.join(format!("{}.md", skill.dir_name))
    }

    fn build_content(skill: &Skill, include_refs: bool) -> Result<String> {
        let body = read_full_content(skill, include_refs)?;
        Ok(format!("# {}\n\n{body}", skill.meta.name))
    }
}

impl Adapter for DualModeAdapter {
    fn install(&self, skill: &Skill, target: &Path, opts: &InstallOpts) -> Result<()> {
        let content = Self::build_content(skill, opts.include_refs)?;

        match opts.scope {
            Scope::Global => {
                // The target is the shared rules file itself.
                if let Some(dir) = target.parent() {
                    ensure_dir(dir)?;
                }
                upsert_section(target, &skill.meta.name, &content)
            }
            Scope::Project => {
                ensure_dir(target)?;
                std::fs::write(Self::project_file(skill, target), content)?;
                Ok(())
            }
        }
    }

    fn uninstall(&self, skill: &Skill, target: &Path) -> Result<()> {
        // Project-level file first; fall back to section removal when the
        // recorded target is the shared global file.
        let project_file = Self::project_file(skill, target);
        if project_file.exists() {
            std::fs::remove_file(&project_file)?;
            return Ok(());
        }

        if target.extension().is_some_and(|ext| ext == "md") {
            return remove_section(target, &skill.meta.name);
        }

        Ok(())
    }

    fn describe(&self, skill: &Skill, target: &Path, opts: &InstallOpts) -> String {
        match opts.scope {
            Scope::Global => format!("append skill section to {}", target.display()),
            Scope::Project => format!("write {}", Self::project_file(skill, target).display()),
        }
    }
}
