//! Assembling a skill's full markdown content.

use std::fmt::Write as _;

use super::Skill;
use crate::error::{Result, SkdError};

/// Return the SKILL.md body, optionally inlining reference files under
/// `## Reference:` headers.
pub fn read_full_content(skill: &Skill, include_refs: bool) -> Result<String> {
    let mut out = skill.markdown_body.clone();

    if include_refs && !skill.reference_files.is_empty() {
        out.push_str("\n\n---\n\n");
        for rel in &skill.reference_files {
            let abs = skill.path.join(rel);
            let data = std::fs::read_to_string(&abs).map_err(|err| {
                SkdError::InvalidSkill(format!("reading reference {}: {err}", rel.display()))
            })?;
            let stem = rel
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let _ = write!(out, "## Reference: {stem}\n\n{data}\n\n");
        }
    }

    Ok(out)
}
