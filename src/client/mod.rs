//! Supported AI coding clients and their install targets.

mod detect;

pub use detect::detect_all;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SkdError;

/// Installation breadth.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// User-wide installation.
    #[default]
    Global,
    /// Repository-local installation.
    Project,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Project => write!(f, "project"),
        }
    }
}

/// Uniquely identifies an AI coding client.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ClientId {
    Claude,
    Gemini,
    Codex,
    Copilot,
    Cursor,
    Windsurf,
}

/// All supported clients in display order.
pub const ALL_CLIENT_IDS: [ClientId; 6] = [
    ClientId::Claude,
    ClientId::Gemini,
    ClientId::Codex,
    ClientId::Copilot,
    ClientId::Cursor,
    ClientId::Windsurf,
];

impl ClientId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Codex => "codex",
            Self::Copilot => "copilot",
            Self::Cursor => "cursor",
            Self::Windsurf => "windsurf",
        }
    }

    /// Human-readable client name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Claude => "Claude Code",
            Self::Gemini => "Gemini CLI",
            Self::Codex => "Codex CLI",
            Self::Copilot => "VS Code Copilot",
            Self::Cursor => "Cursor",
            Self::Windsurf => "Windsurf",
        }
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientId {
    type Err = SkdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(Self::Claude),
            "gemini" => Ok(Self::Gemini),
            "codex" => Ok(Self::Codex),
            "copilot" => Ok(Self::Copilot),
            "cursor" => Ok(Self::Cursor),
            "windsurf" => Ok(Self::Windsurf),
            other => Err(SkdError::UnknownClient(other.to_string())),
        }
    }
}

/// A known AI coding client, possibly detected on this system.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    pub detected: bool,
    /// Resolved global install path.
    pub global_path: Option<PathBuf>,
    /// Project-relative install path.
    pub project_path: Option<PathBuf>,
    pub supports_global: bool,
    pub supports_project: bool,
}

impl Client {
    /// Human-readable client name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.id.display_name()
    }

    /// The install target path for `scope`, if the client supports that
    /// scope and detection filled in a path.
    #[must_use]
    pub fn target_path(&self, scope: Scope) -> Option<&Path> {
        match scope {
            Scope::Global if self.supports_global => self.global_path.as_deref(),
            Scope::Project if self.supports_project => self.project_path.as_deref(),
            _ => None,
        }
    }
}

/// All known clients, detected or not.
#[derive(Debug)]
pub struct Registry {
    clients: Vec<Client>,
}

impl Registry {
    /// A registry of every supported client, none detected yet.
    #[must_use]
    pub fn new() -> Self {
        let clients = ALL_CLIENT_IDS
            .iter()
            .map(|&id| {
                let (supports_global, supports_project) = match id {
                    ClientId::Copilot | ClientId::Cursor => (false, true),
                    _ => (true, true),
                };
                Client {
                    id,
                    detected: false,
                    global_path: None,
                    project_path: None,
                    supports_global,
                    supports_project,
                }
            })
            .collect();
        Self { clients }
    }

    #[must_use]
    pub fn get(&self, id: ClientId) -> &Client {
        self.clients
            .iter()
            .find(|c| c.id == id)
            .unwrap_or_else(|| unreachable!("registry holds every client id"))
    }

    pub(crate) fn get_mut(&mut self, id: ClientId) -> &mut Client {
        self.clients
            .iter_mut()
            .find(|c| c.id == id)
            .unwrap_or_else(|| unreachable!("registry holds every client id"))
    }

    /// All clients in display order.
    #[must_use]
    pub fn all(&self) -> &[Client] {
        &self.clients
    }

    /// Only the clients detected on this system, in display order.
    #[must_use]
    pub fn detected(&self) -> Vec<&Client> {
        self.clients.iter().filter(|c| c.detected).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
