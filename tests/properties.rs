//! Property tests for the ledger upsert invariant and the idempotent
//! section primitive.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use proptest::prelude::*;
use tempfile::TempDir;

use skilldock::adapter::section::{remove_section, section_end, section_start, upsert_section};
use skilldock::client::{ClientId, Scope};
use skilldock::manifest::{Installation, Manifest};

fn arb_client() -> impl Strategy<Value = ClientId> {
    prop_oneof![
        Just(ClientId::Claude),
        Just(ClientId::Gemini),
        Just(ClientId::Cursor),
        Just(ClientId::Windsurf),
    ]
}

fn arb_scope() -> impl Strategy<Value = Scope> {
    prop_oneof![Just(Scope::Global), Just(Scope::Project)]
}

proptest! {
    /// For any sequence of adds, the ledger holds at most one record per
    /// (skill, client, scope) key, and it is the most recently added one.
    #[test]
    fn ledger_add_is_upsert_by_key(
        ops in prop::collection::vec(
            (
                prop::sample::select(vec!["alpha", "beta", "gamma"]),
                arb_client(),
                arb_scope(),
                0u32..100,
            ),
            1..40,
        )
    ) {
        let temp = TempDir::new().unwrap();
        let mut manifest = Manifest::load(&temp.path().join("manifest.json")).unwrap();

        let mut expected: HashMap<(String, ClientId, Scope), String> = HashMap::new();
        for (name, client, scope, version) in &ops {
            let now = Utc::now();
            let version = version.to_string();
            manifest.add(Installation {
                skill_name: (*name).to_string(),
                skill_version: version.clone(),
                client_id: *client,
                scope: *scope,
                installed_at: now,
                updated_at: now,
                install_path: PathBuf::from("/p"),
            });
            expected.insert(((*name).to_string(), *client, *scope), version);
        }

        prop_assert_eq!(manifest.installations.len(), expected.len());
        for inst in &manifest.installations {
            let key = (inst.skill_name.clone(), inst.client_id, inst.scope);
            prop_assert_eq!(Some(&inst.skill_version), expected.get(&key));
        }
    }

    /// Installing a section N times leaves exactly one marker pair holding
    /// the latest body; removing it restores the original file.
    #[test]
    fn section_install_is_idempotent_and_round_trips(
        prefix in r"([a-zA-Z0-9 .#]{1,24}\n){0,5}",
        body_one in "[a-zA-Z0-9 .]{1,40}",
        body_two in "[a-zA-Z0-9 .]{1,40}",
        repeats in 1usize..4,
    ) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("NOTES.md");
        std::fs::write(&path, &prefix).unwrap();

        for _ in 0..repeats {
            upsert_section(&path, "demo", &body_one).unwrap();
        }
        upsert_section(&path, "demo", &body_two).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        prop_assert_eq!(content.matches(&section_start("demo")).count(), 1);
        prop_assert_eq!(content.matches(&section_end("demo")).count(), 1);
        prop_assert!(content.contains(&body_two));
        prop_assert!(content.starts_with(&prefix));

        remove_section(&path, "demo").unwrap();
        prop_assert_eq!(std::fs::read_to_string(&path).unwrap(), prefix);
    }
}
