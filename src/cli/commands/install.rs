//! skd install - Install a skill to one or more AI clients.

use std::collections::BTreeSet;

use clap::Args;
use colored::Colorize;
use serde_json::json;
use tracing::warn;

use crate::adapter::{self, InstallOpts};
use crate::app::AppContext;
use crate::audit::{Event, Logger};
use crate::client::{detect_all, Client, ClientId, Registry, Scope};
use crate::config::find_project_root;
use crate::error::{Result, SkdError};
use crate::gitignore;
use crate::manifest::{Installation, Manifest, ManifestLock};
use crate::skill::scan_local;

use super::LOCK_TIMEOUT;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Skill to install (front-matter name or directory name)
    pub skill: String,

    /// Target client; repeatable, defaults to all detected clients
    #[arg(long = "client", value_enum)]
    pub clients: Vec<ClientId>,

    /// Installation scope
    #[arg(long, value_enum, default_value_t = Scope::Global)]
    pub scope: Scope,

    /// Inline reference files in the generated output
    #[arg(long)]
    pub include_refs: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(ctx: &AppContext, args: &InstallArgs) -> Result<()> {
    let audit = Logger::new(&ctx.audit, "install");
    audit.log(
        "command.install",
        "started",
        Some(json!({
            "skill": args.skill,
            "scope": args.scope.to_string(),
            "clients": args.clients.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "dry_run": args.dry_run,
        })),
        None,
    );

    let result = run_install(ctx, args, &audit);
    match &result {
        Ok(()) => audit.log("command.install", "success", None, None),
        Err(err) => audit.log("command.install", "error", None, Some(&err.to_string())),
    }
    result
}

fn run_install(ctx: &AppContext, args: &InstallArgs, audit: &Logger) -> Result<()> {
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

    let Some(target) = skills.iter().find(|s| s.matches(&args.skill)) else {
        return Err(SkdError::SkillNotFound(args.skill.clone()));
    };

    let mut registry = Registry::new();
    detect_all(&mut registry, &ctx.paths.home);
    let target_clients = resolve_clients(&registry, &args.clients)?;

    ctx.paths.ensure_dirs()?;

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

    let opts = InstallOpts {
        scope: args.scope,
        include_refs: args.include_refs,
        dry_run: args.dry_run,
    };

    let mut installed = 0usize;
    let mut project_clients: BTreeSet<ClientId> = BTreeSet::new();

    for client in &target_clients {
        let apply_event = |status: &str, error: &str| Event {
            action: "install.adapter.apply".to_string(),
            status: status.to_string(),
            skill: target.meta.name.clone(),
            client_id: client.id.to_string(),
            scope: args.scope.to_string(),
            error: error.to_string(),
            ..Event::default()
        };

        let Some(target_path) = client.target_path(args.scope) else {
            eprintln!(
                "  {} does not support {} scope, skipping",
                client.name(),
                args.scope
            );
            audit.log_event(apply_event(
                "skipped",
                &format!("client does not support {} scope", args.scope),
            ));
            continue;
        };
        let target_path = target_path.to_path_buf();

        let adapter = adapter::for_client(client.id);

        if args.dry_run {
            let description = adapter.describe(target, &target_path, &opts);
            println!("{} {}: {description}", "[dry-run]".cyan(), client.name());
            audit.log_event(Event {
                target: target_path.display().to_string(),
                details: crate::audit::details_map(
                    json!({"dry_run": true, "description": description}),
                ),
                ..apply_event("skipped", "")
            });
            installed += 1;
            continue;
        }

        audit.log_event(Event {
            target: target_path.display().to_string(),
            ..apply_event("started", "")
        });
        if let Err(err) = adapter.install(target, &target_path, &opts) {
            eprintln!(
                "  {} installing to {}: {err}",
                "error".red(),
                client.name()
            );
            audit.log_event(Event {
                target: target_path.display().to_string(),
                ..apply_event("error", &err.to_string())
            });
            continue;
        }

        let now = chrono::Utc::now();
        manifest.add(Installation {
            skill_name: target.meta.name.clone(),
            skill_version: target.display_version().to_string(),
            client_id: client.id,
            scope: args.scope,
            installed_at: now,
            updated_at: now,
            install_path: target_path.clone(),
        });

        if args.scope == Scope::Project {
            project_clients.insert(client.id);
        }

        println!(
            "  {} {} -> {}",
            "installed".green(),
            client.name(),
            target_path.display()
        );
        audit.log_event(Event {
            target: target_path.display().to_string(),
            ..apply_event("success", "")
        });
        installed += 1;
    }

    if !args.dry_run {
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

        ensure_project_gitignore(&project_clients, audit);
    }

    if guard.is_some() {
        drop(guard);
        audit.log("manifest.lock", "released", None, None);
    }

    println!("\n{installed} client(s) done.");
    Ok(())
}

fn resolve_clients<'a>(registry: &'a Registry, requested: &[ClientId]) -> Result<Vec<&'a Client>> {
    if requested.is_empty() {
        let detected = registry.detected();
        if detected.is_empty() {
            return Err(SkdError::Config(
                "no AI clients detected on this system".to_string(),
            ));
        }
        return Ok(detected);
    }

    requested
        .iter()
        .map(|&id| {
            let client = registry.get(id);
            if client.detected {
                Ok(client)
            } else {
                Err(SkdError::ClientNotDetected(client.name().to_string()))
            }
        })
        .collect()
}

/// Track project-scope artifacts in the project's .gitignore. Best effort;
/// failures are reported, never fatal.
fn ensure_project_gitignore(project_clients: &BTreeSet<ClientId>, audit: &Logger) {
    if project_clients.is_empty() {
        return;
    }
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    let Some(project_root) = find_project_root(&cwd) else {
        return;
    };

    let patterns: Vec<String> = project_clients
        .iter()
        .flat_map(|&id| gitignore::patterns_for_client(id))
        .collect();

    match gitignore::ensure_entries(&project_root.join(".gitignore"), &patterns) {
        Ok(added) => {
            for entry in &added {
                println!("Added {entry} to .gitignore");
            }
            audit.log(
                "gitignore.update",
                "success",
                Some(json!({"added": added})),
                None,
            );
        }
        Err(err) => {
            eprintln!(
                "{} could not update .gitignore: {err}",
                "warning:".yellow()
            );
            audit.log("gitignore.update", "error", None, Some(&err.to_string()));
        }
    }
}
