//! The installation ledger: which skill is installed for which client at
//! which scope and path.
//!
//! The ledger is owned by one process for the duration of a command. Every
//! mutation sequence ends with an explicit [`Manifest::save`], every read
//! sequence begins with [`Manifest::load`], inside a
//! [`lock::ManifestLock`]-guarded critical section.

pub mod lock;

pub use lock::ManifestLock;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{ClientId, Scope};
use crate::error::Result;

/// One tracked skill installation.
///
/// At most one record exists per `(skill_name, client_id, scope)` triple;
/// [`Manifest::add`] enforces this by replacing any collision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    pub skill_name: String,
    pub skill_version: String,
    pub client_id: ClientId,
    pub scope: Scope,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub install_path: PathBuf,
}

impl Installation {
    fn key_matches(&self, skill_name: &str, client_id: ClientId, scope: Scope) -> bool {
        self.skill_name == skill_name && self.client_id == client_id && self.scope == scope
    }
}

/// All tracked installations, in insertion order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub installations: Vec<Installation>,
    #[serde(skip)]
    path: PathBuf,
}

impl Manifest {
    /// Read the manifest from disk. A missing file yields an empty ledger;
    /// any other I/O or parse failure is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    installations: Vec::new(),
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let mut manifest: Self = serde_json::from_str(&data)?;
        manifest.path = path.to_path_buf();
        Ok(manifest)
    }

    /// Write the full ledger to disk, creating parent directories.
    ///
    /// Writes to a sibling temp file and renames it into place so a reader
    /// never observes a truncated manifest.
    pub fn save(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    /// Record an installation, replacing any existing entry with the same
    /// `(skill, client, scope)` key. Pure upsert: the prior entry's
    /// `installed_at` is NOT carried forward. Callers that need it must
    /// re-supply it, as the update flow does.
    pub fn add(&mut self, inst: Installation) {
        self.remove(&inst.skill_name, inst.client_id, inst.scope);
        self.installations.push(inst);
    }

    /// Delete the entry with the given key, if present.
    pub fn remove(&mut self, skill_name: &str, client_id: ClientId, scope: Scope) {
        self.installations
            .retain(|inst| !inst.key_matches(skill_name, client_id, scope));
    }

    /// Delete every entry for a skill.
    pub fn remove_all(&mut self, skill_name: &str) {
        self.installations
            .retain(|inst| inst.skill_name != skill_name);
    }

    /// Installations for a skill, optionally narrowed to one client.
    #[must_use]
    pub fn find(&self, skill_name: &str, client_id: Option<ClientId>) -> Vec<Installation> {
        self.installations
            .iter()
            .filter(|inst| inst.skill_name == skill_name)
            .filter(|inst| client_id.is_none_or(|id| inst.client_id == id))
            .cloned()
            .collect()
    }

    /// All installations for one client.
    #[must_use]
    pub fn find_by_client(&self, client_id: ClientId) -> Vec<Installation> {
        self.installations
            .iter()
            .filter(|inst| inst.client_id == client_id)
            .cloned()
            .collect()
    }

    /// All installations at one scope.
    #[must_use]
    pub fn find_by_scope(&self, scope: Scope) -> Vec<Installation> {
        self.installations
            .iter()
            .filter(|inst| inst.scope == scope)
            .cloned()
            .collect()
    }

    /// Deduplicated installed skill names, first-seen order.
    #[must_use]
    pub fn all_skill_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for inst in &self.installations {
            if !names.contains(&inst.skill_name) {
                names.push(inst.skill_name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str, version: &str, client: ClientId, scope: Scope) -> Installation {
        let now = Utc::now();
        Installation {
            skill_name: name.to_string(),
            skill_version: version.to_string(),
            client_id: client,
            scope,
            installed_at: now,
            updated_at: now,
            install_path: PathBuf::from("/path/to/skill"),
        }
    }

    #[test]
    fn load_missing_file_yields_empty_ledger() {
        let temp = TempDir::new().unwrap();
        let m = Manifest::load(&temp.path().join("manifest.json")).unwrap();
        assert!(m.installations.is_empty());
    }

    #[test]
    fn load_corrupt_manifest_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("manifest.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Manifest::load(&path).is_err());
    }

    #[test]
    fn add_and_find() {
        let temp = TempDir::new().unwrap();
        let mut m = Manifest::load(&temp.path().join("manifest.json")).unwrap();
        m.add(record("test-skill", "1.0.0", ClientId::Claude, Scope::Global));

        let found = m.find("test-skill", Some(ClientId::Claude));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].skill_version, "1.0.0");
    }

    #[test]
    fn add_replaces_existing_key() {
        let temp = TempDir::new().unwrap();
        let mut m = Manifest::load(&temp.path().join("manifest.json")).unwrap();
        m.add(record("s", "1.0", ClientId::Claude, Scope::Global));
        m.add(record("s", "2.0", ClientId::Claude, Scope::Global));

        let found = m.find("s", Some(ClientId::Claude));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].skill_version, "2.0");
    }

    #[test]
    fn same_skill_different_scope_coexists() {
        let temp = TempDir::new().unwrap();
        let mut m = Manifest::load(&temp.path().join("manifest.json")).unwrap();
        m.add(record("s", "1.0", ClientId::Claude, Scope::Global));
        m.add(record("s", "1.0", ClientId::Claude, Scope::Project));

        assert_eq!(m.find("s", None).len(), 2);
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("manifest.json");

        let mut m = Manifest::load(&path).unwrap();
        m.add(record("test", "1.0", ClientId::Claude, Scope::Global));
        m.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with('\n'));
        assert!(raw.contains("\"skill_name\": \"test\""));
        assert!(raw.contains("\"client_id\": \"claude\""));
        assert!(raw.contains("\"scope\": \"global\""));

        let m2 = Manifest::load(&path).unwrap();
        assert_eq!(m2.installations.len(), 1);
        assert_eq!(m2.installations[0].skill_name, "test");
    }

    #[test]
    fn remove_targets_exact_key() {
        let temp = TempDir::new().unwrap();
        let mut m = Manifest::load(&temp.path().join("manifest.json")).unwrap();
        m.add(record("a", "1.0", ClientId::Claude, Scope::Global));
        m.add(record("a", "1.0", ClientId::Gemini, Scope::Global));
        m.add(record("b", "1.0", ClientId::Claude, Scope::Global));

        m.remove("a", ClientId::Claude, Scope::Global);

        assert_eq!(m.find("a", None).len(), 1);
        assert_eq!(m.find("b", None).len(), 1);
    }

    #[test]
    fn remove_all_drops_every_client() {
        let temp = TempDir::new().unwrap();
        let mut m = Manifest::load(&temp.path().join("manifest.json")).unwrap();
        m.add(record("a", "1.0", ClientId::Claude, Scope::Global));
        m.add(record("a", "1.0", ClientId::Gemini, Scope::Global));

        m.remove_all("a");
        assert!(m.installations.is_empty());
    }

    #[test]
    fn all_skill_names_deduplicates_in_first_seen_order() {
        let temp = TempDir::new().unwrap();
        let mut m = Manifest::load(&temp.path().join("manifest.json")).unwrap();
        m.add(record("b", "1.0", ClientId::Claude, Scope::Global));
        m.add(record("a", "1.0", ClientId::Claude, Scope::Global));
        m.add(record("b", "1.0", ClientId::Gemini, Scope::Global));

        assert_eq!(m.all_skill_names(), vec!["b".to_string(), "a".to_string()]);
    }
}
