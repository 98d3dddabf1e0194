//! Comparing installed skill versions against the local repository.

use std::collections::HashMap;

use super::{Skill, UNVERSIONED};
use crate::manifest::Installation;

/// An available update for one installed skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub skill_name: String,
    pub installed_version: String,
    pub available_version: String,
    pub affected_clients: Vec<String>,
}

/// Compare installed versions against available skills, returning mismatches.
///
/// Unversioned installs count as updatable whenever the repository declares a
/// version. Skills missing from the repository are ignored.
#[must_use]
pub fn check_updates(installations: &[Installation], available: &[Skill]) -> Vec<UpdateInfo> {
    let mut avail: HashMap<&str, &str> = HashMap::new();
    for s in available {
        if !s.meta.version.is_empty() {
            avail.insert(s.meta.name.as_str(), s.meta.version.as_str());
            avail.insert(s.dir_name.as_str(), s.meta.version.as_str());
        }
    }

    struct Group {
        version: String,
        clients: Vec<String>,
    }

    let mut groups: HashMap<&str, Group> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for inst in installations {
        let group = groups.entry(inst.skill_name.as_str()).or_insert_with(|| {
            order.push(inst.skill_name.as_str());
            Group {
                version: inst.skill_version.clone(),
                clients: Vec::new(),
            }
        });
        group.clients.push(inst.client_id.to_string());
    }

    let mut updates = Vec::new();
    for name in order {
        let group = &groups[name];
        let Some(&available_version) = avail.get(name) else {
            continue;
        };

        let installed_unversioned = group.version.is_empty() || group.version == UNVERSIONED;
        if installed_unversioned || group.version != available_version {
            updates.push(UpdateInfo {
                skill_name: name.to_string(),
                installed_version: group.version.clone(),
                available_version: available_version.to_string(),
                affected_clients: group.clients.clone(),
            });
        }
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientId;
    use crate::client::Scope;
    use chrono::Utc;
    use std::path::PathBuf;

    fn inst(name: &str, version: &str, client: ClientId) -> Installation {
        let now = Utc::now();
        Installation {
            skill_name: name.to_string(),
            skill_version: version.to_string(),
            client_id: client,
            scope: Scope::Global,
            installed_at: now,
            updated_at: now,
            install_path: PathBuf::from("/tmp"),
        }
    }

    fn avail(name: &str, version: &str) -> Skill {
        let mut s = Skill::stub(name);
        s.meta.version = version.to_string();
        s
    }

    #[test]
    fn reports_version_mismatch_with_affected_clients() {
        let installed = vec![
            inst("demo", "1.0.0", ClientId::Claude),
            inst("demo", "1.0.0", ClientId::Cursor),
        ];
        let updates = check_updates(&installed, &[avail("demo", "2.0.0")]);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].available_version, "2.0.0");
        assert_eq!(updates[0].affected_clients.len(), 2);
    }

    #[test]
    fn up_to_date_skill_is_silent() {
        let installed = vec![inst("demo", "1.0.0", ClientId::Claude)];
        assert!(check_updates(&installed, &[avail("demo", "1.0.0")]).is_empty());
    }

    #[test]
    fn unversioned_install_is_always_updatable() {
        let installed = vec![inst("demo", UNVERSIONED, ClientId::Claude)];
        let updates = check_updates(&installed, &[avail("demo", "1.0.0")]);
        assert_eq!(updates.len(), 1);
    }

    #[test]
    fn skill_missing_from_repo_is_ignored() {
        let installed = vec![inst("gone", "1.0.0", ClientId::Claude)];
        assert!(check_updates(&installed, &[]).is_empty());
    }
}
