//! CLI module - command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;

/// Install and manage AI assistant skills across coding clients
#[derive(Parser, Debug)]
#[command(name = "skd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Skills repository to scan (default: SKD_SKILLS_PATH or the current
    /// directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub skills_repo: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a skill to one or more AI clients
    Install(commands::install::InstallArgs),

    /// Re-install installed skills with the latest repository version
    Update(commands::update::UpdateArgs),

    /// Remove a skill from one or all AI clients
    Uninstall(commands::uninstall::UninstallArgs),

    /// Show installed skills per client
    Status(commands::status::StatusArgs),

    /// List available skills in the repository
    List(commands::list::ListArgs),

    /// Show detected AI clients
    Clients(commands::clients::ClientsArgs),

    /// Inspect and prune audit events
    Audit(commands::audit::AuditArgs),
}
