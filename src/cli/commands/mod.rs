//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use std::time::Duration;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod audit;
pub mod clients;
pub mod install;
pub mod list;
pub mod status;
pub mod uninstall;
pub mod update;

/// How long mutating flows wait for the manifest lock before degrading to
/// an unlocked run.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Install(args) => install::run(ctx, args),
        Commands::Update(args) => update::run(ctx, args),
        Commands::Uninstall(args) => uninstall::run(ctx, args),
        Commands::Status(args) => status::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Clients(args) => clients::run(ctx, args),
        Commands::Audit(args) => audit::run(ctx, args),
    }
}
