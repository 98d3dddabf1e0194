//! skd update - Re-install skills with the latest repository version.

use clap::Args;
use colored::Colorize;
use serde_json::json;
use tracing::warn;

use crate::adapter::{self, InstallOpts};
use crate::app::AppContext;
use crate::audit::{details_map, Event, Logger};
use crate::client::ClientId;
use crate::error::Result;
use crate::manifest::{Installation, Manifest, ManifestLock};
use crate::skill::{scan_local, Skill};

use super::LOCK_TIMEOUT;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Skill to update (defaults to every installed skill)
    pub skill: Option<String>,

    /// Only update installations for this client
    #[arg(long, value_enum)]
    pub client: Option<ClientId>,
}

pub fn run(ctx: &AppContext, args: &UpdateArgs) -> Result<()> {
    let audit = Logger::new(&ctx.audit, "update");
    audit.log(
        "command.update",
        "started",
        Some(json!({
            "skill": args.skill,
            "client": args.client.map(|c| c.to_string()),
        })),
        None,
    );

    let result = run_update(ctx, args, &audit);
    match &result {
        Ok(()) => audit.log("command.update", "success", None, None),
        Err(err) => audit.log("command.update", "error", None, Some(&err.to_string())),
    }
    result
}

fn run_update(ctx: &AppContext, args: &UpdateArgs, audit: &Logger) -> Result<()> {
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

    let skills = match scan_local(&ctx.paths.skills_repo) {
        Ok(skills) => skills,
        Err(err) => {
            audit.log(
                "skill.scan_local",
                "error",
                Some(json!({"path": ctx.paths.skills_repo.display().to_string()})),
                Some(&err.to_string()),
            );
            return Err(err);
        }
    };
    audit.log(
        "skill.scan_local",
        "success",
        Some(json!({
            "path": ctx.paths.skills_repo.display().to_string(),
            "count": skills.len(),
        })),
        None,
    );

    let targets = resolve_targets(&manifest, &skills, args);
    if targets.is_empty() {
        println!("No matching installations to update.");
        audit.log(
            "update.targets.resolve",
            "success",
            Some(json!({"count": 0})),
            None,
        );
        return Ok(());
    }
    audit.log(
        "update.targets.resolve",
        "success",
        Some(json!({"count": targets.len()})),
        None,
    );

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

    let mut updated = 0usize;
    for inst in &targets {
        let apply_event = |status: &str, error: &str| Event {
            action: "update.adapter.apply".to_string(),
            status: status.to_string(),
            skill: inst.skill_name.clone(),
            client_id: inst.client_id.to_string(),
            scope: inst.scope.to_string(),
            target: inst.install_path.display().to_string(),
            error: error.to_string(),
            ..Event::default()
        };

        let Some(skill) = skills.iter().find(|s| s.matches(&inst.skill_name)) else {
            eprintln!(
                "{} skill {:?} not found in repo, skipping",
                "warning:".yellow(),
                inst.skill_name
            );
            audit.log_event(apply_event("skipped", "skill not found in local repo"));
            continue;
        };

        let adapter = adapter::for_client(inst.client_id);
        let opts = InstallOpts {
            scope: inst.scope,
            ..InstallOpts::default()
        };

        audit.log_event(apply_event("started", ""));
        if let Err(err) = adapter.install(skill, &inst.install_path, &opts) {
            eprintln!(
                "{} updating {} on {}: {err}",
                "error".red(),
                inst.skill_name,
                inst.client_id
            );
            audit.log_event(apply_event("error", &err.to_string()));
            continue;
        }

        manifest.add(Installation {
            skill_name: inst.skill_name.clone(),
            skill_version: skill.display_version().to_string(),
            client_id: inst.client_id,
            scope: inst.scope,
            // The original install time survives updates.
            installed_at: inst.installed_at,
            updated_at: chrono::Utc::now(),
            install_path: inst.install_path.clone(),
        });

        println!(
            "Updated {:?} on {} ({} -> {})",
            inst.skill_name,
            inst.client_id,
            inst.skill_version,
            skill.display_version()
        );
        audit.log_event(Event {
            details: details_map(json!({
                "from_version": inst.skill_version,
                "to_version": skill.display_version(),
            })),
            ..apply_event("success", "")
        });
        updated += 1;
    }

    if let Err(err) = manifest.save() {
        audit.log("manifest.save", "error", None, Some(&err.to_string()));
        return Err(err);
    }
    audit.log(
        "manifest.save",
        "success",
        Some(json!({
            "installations": manifest.installations.len(),
            "updated": updated,
        })),
        None,
    );

    if guard.is_some() {
        drop(guard);
        audit.log("manifest.lock", "released", None, None);
    }

    println!("\n{updated} installation(s) updated.");
    Ok(())
}

/// The ledger entries selected by the name/client filters.
fn resolve_targets(
    manifest: &Manifest,
    skills: &[Skill],
    args: &UpdateArgs,
) -> Vec<Installation> {
    if let Some(name) = &args.skill {
        let mut targets = manifest.find(name, args.client);
        if targets.is_empty() {
            // The argument may be a directory name rather than the
            // front-matter name the ledger records.
            if let Some(skill) = skills.iter().find(|s| s.matches(name)) {
                targets = manifest.find(&skill.meta.name, args.client);
            }
        }
        return targets;
    }

    match args.client {
        Some(client) => manifest.find_by_client(client),
        None => manifest.installations.clone(),
    }
}
