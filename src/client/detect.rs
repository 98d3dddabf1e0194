//! Client detection: a config directory under `$HOME` or a binary on PATH.

use std::path::{Path, PathBuf};

use super::{ClientId, Registry, ALL_CLIENT_IDS};

/// Run detection for every client in the registry.
pub fn detect_all(reg: &mut Registry, home: &Path) {
    for id in ALL_CLIENT_IDS {
        detect_one(reg, id, home);
    }
}

fn detect_one(reg: &mut Registry, id: ClientId, home: &Path) {
    let (config_dir, binary): (PathBuf, &str) = match id {
        ClientId::Claude => (home.join(".claude"), "claude"),
        ClientId::Gemini => (home.join(".gemini"), "gemini"),
        ClientId::Codex => (home.join(".codex"), "codex"),
        ClientId::Copilot => (home.join(".vscode"), "code"),
        ClientId::Cursor => (home.join(".cursor"), "cursor"),
        ClientId::Windsurf => (home.join(".codeium").join("windsurf"), "windsurf"),
    };

    let detected = config_dir.is_dir() || which::which(binary).is_ok();
    let client = reg.get_mut(id);
    client.detected = detected;
    if !detected {
        return;
    }

    match id {
        ClientId::Claude => {
            client.global_path = Some(config_dir.join("skills"));
            client.project_path = Some(PathBuf::from(".claude").join("skills"));
        }
        ClientId::Gemini => {
            client.global_path = Some(config_dir.join("GEMINI.md"));
            client.project_path = Some(PathBuf::from("GEMINI.md"));
        }
        ClientId::Codex => {
            client.global_path = Some(config_dir.join("instructions.md"));
            client.project_path = Some(PathBuf::from("AGENTS.md"));
        }
        ClientId::Copilot => {
            client.project_path = Some(PathBuf::from(".github").join("copilot-instructions.md"));
        }
        ClientId::Cursor => {
            client.project_path = Some(PathBuf::from(".cursor").join("rules"));
        }
        ClientId::Windsurf => {
            client.global_path = Some(config_dir.join("memories").join("global_rules.md"));
            client.project_path = Some(PathBuf::from(".windsurf").join("rules"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Scope;
    use tempfile::TempDir;

    #[test]
    fn detects_claude_from_config_dir() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir(home.path().join(".claude")).unwrap();

        let mut reg = Registry::new();
        detect_all(&mut reg, home.path());

        let claude = reg.get(ClientId::Claude);
        assert!(claude.detected);
        assert_eq!(
            claude.target_path(Scope::Global).unwrap(),
            home.path().join(".claude").join("skills")
        );
        assert_eq!(
            claude.target_path(Scope::Project).unwrap(),
            Path::new(".claude/skills")
        );
    }

    #[test]
    fn windsurf_global_path_is_the_rules_file() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join(".codeium").join("windsurf")).unwrap();

        let mut reg = Registry::new();
        detect_all(&mut reg, home.path());

        let windsurf = reg.get(ClientId::Windsurf);
        assert!(windsurf.detected);
        assert!(windsurf
            .target_path(Scope::Global)
            .unwrap()
            .ends_with("memories/global_rules.md"));
    }

    #[test]
    fn cursor_never_resolves_a_global_target() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir(home.path().join(".cursor")).unwrap();

        let mut reg = Registry::new();
        detect_all(&mut reg, home.path());

        let cursor = reg.get(ClientId::Cursor);
        assert!(cursor.detected);
        assert!(cursor.target_path(Scope::Global).is_none());
        assert!(cursor.target_path(Scope::Project).is_some());
    }
}
