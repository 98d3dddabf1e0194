//! skd clients - Show detected AI clients.

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::client::{detect_all, Registry, Scope};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ClientsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(ctx: &AppContext, args: &ClientsArgs) -> Result<()> {
    let mut registry = Registry::new();
    detect_all(&mut registry, &ctx.paths.home);

    if args.json {
        let items: Vec<_> = registry
            .all()
            .iter()
            .map(|c| {
                json!({
                    "id": c.id.to_string(),
                    "name": c.name(),
                    "detected": c.detected,
                    "global_path": c.target_path(Scope::Global).map(|p| p.display().to_string()),
                    "project_path": c.target_path(Scope::Project).map(|p| p.display().to_string()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!(
        "{:<2} {:<18} {:<42} PROJECT PATH",
        "", "CLIENT", "GLOBAL PATH"
    );
    for client in registry.all() {
        let mark = if client.detected { "*" } else { " " };
        let global = client
            .target_path(Scope::Global)
            .map_or_else(|| "(n/a)".to_string(), |p| p.display().to_string());
        let project = client
            .target_path(Scope::Project)
            .map_or_else(|| "(n/a)".to_string(), |p| p.display().to_string());
        println!("{mark:<2} {:<18} {global:<42} {project}", client.name());
    }

    Ok(())
}
