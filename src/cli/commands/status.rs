//! skd status - Show installed skills per client.

use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::audit::Logger;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::skill::{check_updates, scan_local};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Check for available updates against the skills repository
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub check_updates: bool,
}

pub fn run(ctx: &AppContext, args: &StatusArgs) -> Result<()> {
    let audit = Logger::new(&ctx.audit, "status");
    audit.log(
        "command.status",
        "started",
        Some(json!({"json": args.json, "check_updates": args.check_updates})),
        None,
    );

    let result = run_status(ctx, args, &audit);
    match &result {
        Ok(()) => audit.log("command.status", "success", None, None),
        Err(err) => audit.log("command.status", "error", None, Some(&err.to_string())),
    }
    result
}

fn run_status(ctx: &AppContext, args: &StatusArgs, audit: &Logger) -> Result<()> {
    let manifest = match Manifest::load(&ctx.paths.manifest_path) {
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

    if manifest.installations.is_empty() {
        println!("No skills installed.");
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest.installations)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<14} {:<10} {:<8} UPDATED",
        "SKILL", "VERSION", "CLIENT", "SCOPE"
    );
    for inst in &manifest.installations {
        println!(
            "{:<24} {:<14} {:<10} {:<8} {}",
            inst.skill_name,
            inst.skill_version,
            inst.client_id,
            inst.scope,
            inst.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    if args.check_updates {
        check_and_print_updates(ctx, &manifest, audit);
    }

    Ok(())
}

fn check_and_print_updates(ctx: &AppContext, manifest: &Manifest, audit: &Logger) {
    let skills = match scan_local(&ctx.paths.skills_repo) {
        Ok(skills) => skills,
        Err(err) => {
            audit.log("update.check", "error", None, Some(&err.to_string()));
            return;
        }
    };

    let updates = check_updates(&manifest.installations, &skills);
    audit.log(
        "update.check",
        "success",
        Some(json!({"available": updates.len()})),
        None,
    );
    if updates.is_empty() {
        return;
    }

    println!("\n{}", "Updates available:".bold());
    for update in updates {
        println!(
            "  {} {} -> {} ({})",
            update.skill_name,
            update.installed_version,
            update.available_version,
            update.affected_clients.join(", ")
        );
    }
    println!("Run `skd update` to apply.");
}
