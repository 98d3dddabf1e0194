//! skd audit - Inspect and prune audit events.

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::audit::{
    filter_events, prune_by_age, read_all_events, remove_backups, tail_events, write_events,
};
use crate::error::{Result, SkdError};

#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: Option<AuditCommand>,

    /// Maximum number of events to show (0 = all)
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Filter by run ID
    #[arg(long)]
    pub run_id: Option<String>,

    /// Filter by action
    #[arg(long)]
    pub action: Option<String>,

    /// Filter by status
    #[arg(long)]
    pub status: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Prune old audit events and compact log files
    Prune(PruneArgs),
}

#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Keep events newer than N days (0 = disable)
    #[arg(long, default_value_t = 30)]
    pub keep_days: u32,

    /// Keep at most N most recent events after filtering (0 = disable)
    #[arg(long, default_value_t = 2000)]
    pub keep: usize,

    /// Preview prune results without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(ctx: &AppContext, args: &AuditArgs) -> Result<()> {
    match &args.command {
        Some(AuditCommand::Prune(prune)) => run_prune(ctx, prune),
        None => run_show(ctx, args),
    }
}

fn run_show(ctx: &AppContext, args: &AuditArgs) -> Result<()> {
    let events = read_all_events(&ctx.audit.log_path, ctx.audit.max_backups)
        .map_err(|err| SkdError::Config(format!("reading audit log: {err}")))?;

    let events = filter_events(
        events,
        args.run_id.as_deref(),
        args.action.as_deref(),
        args.status.as_deref(),
    );
    let events = tail_events(events, args.limit);

    if events.is_empty() {
        println!("No audit events found.");
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    println!(
        "{:<32} {:<10} {:<26} {:<9} {:<20} CLIENT",
        "TIME", "COMMAND", "ACTION", "STATUS", "SKILL"
    );
    for event in &events {
        println!(
            "{:<32} {:<10} {:<26} {:<9} {:<20} {}",
            event.timestamp, event.command, event.action, event.status, event.skill,
            event.client_id
        );
    }

    Ok(())
}

fn run_prune(ctx: &AppContext, args: &PruneArgs) -> Result<()> {
    let events = read_all_events(&ctx.audit.log_path, ctx.audit.max_backups)
        .map_err(|err| SkdError::Config(format!("reading audit log: {err}")))?;

    if events.is_empty() {
        println!("No audit events found.");
        return Ok(());
    }

    let original_count = events.len();
    let events = prune_by_age(events, args.keep_days);
    let events = tail_events(events, args.keep);
    let removed = original_count - events.len();

    if args.dry_run {
        println!(
            "Dry-run: would remove {removed} event(s), keep {} event(s).",
            events.len()
        );
        return Ok(());
    }

    write_events(&ctx.audit.log_path, &events)?;
    remove_backups(&ctx.audit.log_path, ctx.audit.max_backups)?;

    println!("Pruned {removed} event(s); kept {} event(s).", events.len());
    Ok(())
}
