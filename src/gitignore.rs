//! The managed section of a project's `.gitignore`.
//!
//! Project-scope installs drop client artifacts into the working tree;
//! those paths are kept in one sentinel-delimited block so they can be
//! added and withdrawn without disturbing the rest of the file.

use std::collections::BTreeSet;
use std::path::Path;

use crate::client::ClientId;
use crate::error::Result;
use crate::utils::fs::read_optional;

const SECTION_START: &str = "# skd managed";
const SECTION_END: &str = "# end skd managed";

/// Gitignore patterns covering a client's project-scope artifacts.
#[must_use]
pub fn patterns_for_client(id: ClientId) -> Vec<String> {
    let pattern = match id {
        ClientId::Claude => ".claude/skills/",
        ClientId::Cursor => ".cursor/rules/",
        ClientId::Windsurf => ".windsurf/rules/",
        ClientId::Copilot => ".github/copilot-instructions.md",
        ClientId::Gemini => "GEMINI.md",
        ClientId::Codex => "AGENTS.md",
    };
    vec![pattern.to_string()]
}

/// Add entries to the managed section, creating the file if needed.
/// Returns the entries that were actually added.
pub fn ensure_entries(gitignore_path: &Path, entries: &[String]) -> Result<Vec<String>> {
    let content = read_optional(gitignore_path)?.unwrap_or_default();

    let existing = parse_managed_entries(&content);
    let added: Vec<String> = entries
        .iter()
        .filter(|e| !existing.contains(*e))
        .cloned()
        .collect();
    if added.is_empty() {
        return Ok(added);
    }

    let mut all = existing;
    all.extend(entries.iter().cloned());
    let new_content = replace_managed_section(&content, &all);

    std::fs::write(gitignore_path, new_content)?;
    Ok(added)
}

/// Remove entries from the managed section, dropping the section entirely
/// when it empties out. Returns the entries that were actually removed.
pub fn remove_entries(gitignore_path: &Path, entries: &[String]) -> Result<Vec<String>> {
    let Some(content) = read_optional(gitignore_path)? else {
        return Ok(Vec::new());
    };

    let existing = parse_managed_entries(&content);
    if existing.is_empty() {
        return Ok(Vec::new());
    }

    let remove_set: BTreeSet<&String> = entries.iter().collect();
    let (removed, remaining): (Vec<String>, BTreeSet<String>) = {
        let mut removed = Vec::new();
        let mut remaining = BTreeSet::new();
        for entry in existing {
            if remove_set.contains(&entry) {
                removed.push(entry);
            } else {
                remaining.insert(entry);
            }
        }
        (removed, remaining)
    };

    if removed.is_empty() {
        return Ok(removed);
    }

    let new_content = if remaining.is_empty() {
        remove_managed_section(&content)
    } else {
        replace_managed_section(&content, &remaining)
    };

    std::fs::write(gitignore_path, new_content)?;
    Ok(removed)
}

/// Non-comment entries inside the managed section.
fn parse_managed_entries(content: &str) -> BTreeSet<String> {
    let mut entries = BTreeSet::new();
    let mut in_section = false;
    for line in content.lines() {
        let trimmed = line.trim();
        match trimmed {
            SECTION_START => in_section = true,
            SECTION_END => in_section = false,
            _ if in_section && !trimmed.is_empty() && !trimmed.starts_with('#') => {
                entries.insert(trimmed.to_string());
            }
            _ => {}
        }
    }
    entries
}

fn build_section(entries: &BTreeSet<String>) -> String {
    let mut out = String::from(SECTION_START);
    out.push('\n');
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out.push_str(SECTION_END);
    out
}

fn replace_managed_section(content: &str, entries: &BTreeSet<String>) -> String {
    let section = build_section(entries);

    if let (Some(start), Some(end)) = (content.find(SECTION_START), content.find(SECTION_END)) {
        let before = &content[..start];
        let after = content[end + SECTION_END.len()..].trim_start_matches('\n');
        let mut result = format!("{before}{section}");
        if !after.is_empty() {
            result.push('\n');
            result.push_str(after);
        }
        return result;
    }

    let mut result = content.trim_end_matches('\n').to_string();
    if !result.is_empty() {
        result.push_str("\n\n");
    }
    result.push_str(&section);
    result.push('\n');
    result
}

fn remove_managed_section(content: &str) -> String {
    let (Some(start), Some(end)) = (content.find(SECTION_START), content.find(SECTION_END)) else {
        return content.to_string();
    };

    let before = content[..start].trim_end_matches('\n');
    let after = content[end + SECTION_END.len()..].trim_start_matches('\n');

    match (before.is_empty(), after.is_empty()) {
        (true, true) => String::new(),
        (true, false) => after.to_string(),
        (false, true) => format!("{before}\n"),
        (false, false) => format!("{before}\n\n{after}"),
    }
}
