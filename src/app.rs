//! Per-invocation application context.
//!
//! Built once from the CLI and the environment, then threaded into every
//! command handler by parameter.

use crate::cli::Cli;
use crate::config::{AuditConfig, Paths};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub paths: Paths,
    pub audit: AuditConfig,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut paths = Paths::resolve()?;
        if let Some(repo) = &cli.skills_repo {
            paths.skills_repo = repo.clone();
        }
        let audit = AuditConfig::from_env(&paths);
        Ok(Self { paths, audit })
    }
}
