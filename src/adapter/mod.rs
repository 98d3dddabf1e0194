//! Per-client installation strategies.
//!
//! Each adapter translates one skill into a client's native on-disk
//! representation. Install is idempotent, uninstall of an absent
//! installation succeeds, and describe previews without touching the
//! filesystem.

mod dir_link;
mod dual;
mod rules_file;
pub mod section;

pub use dir_link::DirLinkAdapter;
pub use dual::DualModeAdapter;
pub use rules_file::RulesFileAdapter;
pub use section::SectionAdapter;

use std::path::Path;

use crate::client::{ClientId, Scope};
use crate::error::Result;
use crate::skill::Skill;

/// Controls how a skill is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOpts {
    pub scope: Scope,
    /// Inline reference files into the generated content.
    pub include_refs: bool,
    pub dry_run: bool,
}

/// Transforms and installs a skill for a specific client.
pub trait Adapter {
    /// Install `skill` at `target`. Idempotent: repeating the call leaves
    /// the same on-disk result as a single call.
    fn install(&self, skill: &Skill, target: &Path, opts: &InstallOpts) -> Result<()>;

    /// Remove `skill` from `target`. Nothing installed there is success,
    /// not an error.
    fn uninstall(&self, skill: &Skill, target: &Path) -> Result<()>;

    /// Human-readable preview of what [`Adapter::install`] would do.
    /// Never touches the filesystem.
    fn describe(&self, skill: &Skill, target: &Path, opts: &InstallOpts) -> String;
}

/// The adapter for the given client.
#[must_use]
pub fn for_client(id: ClientId) -> Box<dyn Adapter> {
    match id {
        ClientId::Claude => Box::new(DirLinkAdapter),
        ClientId::Gemini | ClientId::Codex | ClientId::Copilot => Box::new(SectionAdapter),
        ClientId::Cursor => Box::new(RulesFileAdapter),
        ClientId::Windsurf => Box::new(DualModeAdapter),
    }
}
