//! skd list - List available skills in the repository.

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::audit::Logger;
use crate::error::Result;
use crate::skill::scan_local;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let audit = Logger::new(&ctx.audit, "list");
    audit.log(
        "command.list",
        "started",
        Some(json!({"json": args.json})),
        None,
    );

    let result = run_list(ctx, args, &audit);
    match &result {
        Ok(()) => audit.log("command.list", "success", None, None),
        Err(err) => audit.log("command.list", "error", None, Some(&err.to_string())),
    }
    result
}

fn run_list(ctx: &AppContext, args: &ListArgs, audit: &Logger) -> Result<()> {
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

    if args.json {
        let items: Vec<_> = skills
            .iter()
            .map(|s| {
                json!({
                    "name": s.meta.name,
                    "dir_name": s.dir_name,
                    "version": s.display_version(),
                    "description": s.meta.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if skills.is_empty() {
        println!("No skills found in {}.", ctx.paths.skills_repo.display());
        return Ok(());
    }

    println!("{:<28} {:<14} DESCRIPTION", "SKILL", "VERSION");
    for skill in &skills {
        let description: String = skill
            .meta
            .description
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(60)
            .collect();
        println!(
            "{:<28} {:<14} {description}",
            skill.meta.name,
            skill.display_version()
        );
    }

    Ok(())
}
