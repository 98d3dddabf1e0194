//! skd uninstall - Remove a skill from one or all AI clients.

use std::collections::BTreeSet;
use std::path::Path;

use clap::Args;
use colored::Colorize;
use serde_json::json;
use tracing::warn;

use crate::adapter;
use crate::app::AppContext;
use crate::audit::{Event, Logger};
use crate::client::{ClientId, Scope};
use crate::config::find_project_root;
use crate::error::{Result, SkdError};
use crate::gitignore;
use crate::manifest::{Installation, Manifest, ManifestLock};
use crate::skill::{scan_local, Skill};

use super::LOCK_TIMEOUT;

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Skill to remove (front-matter name or directory name)
    pub skill: String,

    /// Only uninstall from this client
    #[arg(long, value_enum)]
    pub client: Option<ClientId>,
}

pub fn run(ctx: &AppContext, args: &UninstallArgs) -> Result<()> {
    let audit = Logger::new(&ctx.audit, "uninstall");
    audit.log(
        "command.uninstall",
        "started",
        Some(json!({
            "skill": args.skill,
            "client": args.client.map(|c| c.to_string()),
        })),
        None,
    );

    let result = run_uninstall(ctx, args, &audit);
    match &result {
        Ok(()) => audit.log("command.uninstall", "success", None, None),
        Err(err) => audit.log("command.uninstall", "error", None, Some(&err.to_string())),
    }
    result
}

fn run_uninstall(ctx: &AppContext, args: &UninstallArgs, audit: &Logger) -> Result<()> {
    let mut manifest = match Manifest::load(&ctx.paths.manifest_path) {
        Ok(m) => m,
        Err(err) => {
            audit.log("manifest.load", "error", None, Some(&err.to_string()));
            return Err(err);
        }
    };
    audit.log(
        "manifest.load",
        "success",
        Some(json!({"installations": manifest.installations.len()})),
        None,
    );

    // The repository scan is advisory here: it maps a directory-name
    // argument onto the recorded skill name and recovers the real skill for
    // adapters that derive file names from it.
    let skills = scan_local(&ctx.paths.skills_repo).unwrap_or_default();

    let mut skill_name = args.skill.clone();
    let mut installations = manifest.find(&skill_name, args.client);
    if installations.is_empty() {
        if let Some(skill) = skills.iter().find(|s| s.dir_name == args.skill) {
            installations = manifest.find(&skill.meta.name, args.client);
            skill_name.clone_from(&skill.meta.name);
        }
    }

    if installations.is_empty() {
        return Err(SkdError::NothingInstalled(skill_name));
    }

    let skill = skills
        .iter()
        .find(|s| s.matches(&skill_name))
        .cloned()
        .unwrap_or_else(|| Skill::stub(&skill_name));

    let lock = ManifestLock::new(&ctx.paths.manifest_path);
    audit.log(
        "manifest.lock",
        "started",
        Some(json!({"path": lock.path().display().to_string()})),
        None,
    );
    let guard = match lock.acquire(LOCK_TIMEOUT) {
        Ok(guard) => {
            audit.log("manifest.lock", "success", None, None);
            Some(guard)
        }
        Err(err) => {
            audit.log("manifest.lock", "error", None, Some(&err.to_string()));
            warn!("could not acquire lock: {err}");
            eprintln!("{} could not acquire lock: {err}", "warning:".yellow());
            None
        }
    };

    for inst in &installations {
        let apply_event = |status: &str, error: &str| Event {
            action: "uninstall.adapter.apply".to_string(),
            status: status.to_string(),
            skill: inst.skill_name.clone(),
            client_id: inst.client_id.to_string(),
            scope: inst.scope.to_string(),
            target: inst.install_path.display().to_string(),
            error: error.to_string(),
            ..Event::default()
        };

        let adapter = adapter::for_client(inst.client_id);

        audit.log_event(apply_event("started", ""));
        if let Err(err) = adapter.uninstall(&skill, &inst.install_path) {
            // The entry stays in the ledger; nothing is silently dropped.
            eprintln!(
                "{} uninstall from {}: {err}",
                "warning:".yellow(),
                inst.client_id
            );
            audit.log_event(apply_event("error", &err.to_string()));
            continue;
        }

        manifest.remove(&inst.skill_name, inst.client_id, inst.scope);
        println!("Uninstalled {:?} from {}", inst.skill_name, inst.client_id);
        audit.log_event(apply_event("success", ""));
    }

    if let Err(err) = manifest.save() {
        audit.log("manifest.save", "error", None, Some(&err.to_string()));
        return Err(err);
    }
    audit.log(
        "manifest.save",
        "success",
        Some(json!({"installations": manifest.installations.len()})),
        None,
    );

    audit.log("gitignore.cleanup", "started", None, None);
    reconcile_gitignore(&manifest, &installations);
    audit.log("gitignore.cleanup", "success", None, None);

    if guard.is_some() {
        drop(guard);
        audit.log("manifest.lock", "released", None, None);
    }

    Ok(())
}

/// Withdraw .gitignore patterns for clients that no longer have any
/// project-scope installation in this project.
fn reconcile_gitignore(manifest: &Manifest, removed: &[Installation]) {
    let removed_clients: BTreeSet<ClientId> = removed
        .iter()
        .filter(|inst| inst.scope == Scope::Project)
        .map(|inst| inst.client_id)
        .collect();
    if removed_clients.is_empty() {
        return;
    }

    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    let Some(project_root) = find_project_root(&cwd) else {
        return;
    };

    let still_used: BTreeSet<ClientId> = manifest
        .find_by_scope(Scope::Project)
        .iter()
        .filter(|inst| installation_in_project(inst, &project_root))
        .map(|inst| inst.client_id)
        .collect();

    let patterns: Vec<String> = removed_clients
        .iter()
        .filter(|id| !still_used.contains(id))
        .flat_map(|&id| gitignore::patterns_for_client(id))
        .collect();
    if patterns.is_empty() {
        return;
    }

    match gitignore::remove_entries(&project_root.join(".gitignore"), &patterns) {
        Ok(removed_entries) => {
            for entry in removed_entries {
                println!("Removed {entry} from .gitignore");
            }
        }
        Err(err) => {
            eprintln!(
                "{} could not update .gitignore: {err}",
                "warning:".yellow()
            );
        }
    }
}

/// Whether a project-scope installation belongs to the given project.
///
/// Older manifests recorded project-relative install paths; those are
/// assumed to belong to the current project context.
fn installation_in_project(inst: &Installation, project_root: &Path) -> bool {
    if inst.scope != Scope::Project {
        return false;
    }
    if inst.install_path.is_relative() {
        return true;
    }
    inst.install_path.starts_with(project_root)
}
