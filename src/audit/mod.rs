//! Append-only structured audit trail.
//!
//! One JSON object per line, size-based rotation into a bounded chain of
//! numbered backups (`.1` = newest backup, highest number = oldest), and
//! secret redaction on every write. Writing is best-effort: the audit log
//! must never fail a command.
//!
//! Concurrent invocations append interleaved single lines; that is safe as
//! long as each line is below the filesystem's atomic write granularity,
//! which is assumed, not enforced.

pub mod redact;

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AuditConfig;
use crate::error::Result;

/// A single structured audit entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skill: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scope: String,
    #[serde(default, skip_serializing_if = "String::is_empty", rename = "target_path")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Writes append-only JSONL audit events for one command invocation.
#[derive(Debug)]
pub struct Logger {
    enabled: bool,
    path: PathBuf,
    run_id: String,
    command: String,
    max_size_bytes: u64,
    max_backups: u32,
}

impl Logger {
    /// A logger stamped with a fresh run ID, or a no-op logger when
    /// auditing is disabled.
    #[must_use]
    pub fn new(cfg: &AuditConfig, command: &str) -> Self {
        if !cfg.enabled {
            return Self::disabled();
        }
        Self {
            enabled: true,
            path: cfg.log_path.clone(),
            run_id: uuid::Uuid::new_v4().simple().to_string(),
            command: command.to_string(),
            max_size_bytes: cfg.max_size_bytes,
            max_backups: cfg.max_backups,
        }
    }

    /// A logger that drops everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: PathBuf::new(),
            run_id: String::new(),
            command: String::new(),
            max_size_bytes: 0,
            max_backups: 0,
        }
    }

    /// This invocation's identifier; empty when auditing is disabled.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Write a bare action/status entry.
    pub fn log(&self, action: &str, status: &str, details: Option<Value>, error: Option<&str>) {
        self.log_event(Event {
            action: action.to_string(),
            status: status.to_string(),
            details: details.and_then(details_map),
            error: error.unwrap_or_default().to_string(),
            ..Event::default()
        });
    }

    /// Write a full event. Errors are intentionally swallowed; auditing
    /// never fails the command it observes.
    pub fn log_event(&self, mut event: Event) {
        if !self.enabled {
            return;
        }

        if let Some(dir) = self.path.parent() {
            if std::fs::create_dir_all(dir).is_err() {
                return;
            }
        }
        if self.rotate_if_needed().is_err() {
            return;
        }

        event.timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        event.run_id = self.run_id.clone();
        event.command = self.command.clone();
        event.error = redact::redact_text(event.error.trim());
        event.target = redact::redact_text(&event.target);
        if let Some(details) = event.details.take() {
            event.details = Some(redact::redact_map(&details));
        }

        let Ok(line) = serde_json::to_string(&event) else {
            return;
        };
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }

    /// Shift backups up a generation and restart the primary once it
    /// reaches the size threshold.
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        let meta = match std::fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };
        if meta.len() < self.max_size_bytes {
            return Ok(());
        }

        if self.max_backups == 0 {
            return std::fs::remove_file(&self.path);
        }

        let oldest = backup_path(&self.path, self.max_backups);
        let _ = std::fs::remove_file(&oldest);
        for generation in (1..self.max_backups).rev() {
            let src = backup_path(&self.path, generation);
            if src.exists() {
                let _ = std::fs::rename(&src, backup_path(&self.path, generation + 1));
            }
        }
        std::fs::rename(&self.path, backup_path(&self.path, 1))
    }
}

/// Convenience for building [`Event::details`] from a `json!` object.
#[must_use]
pub fn details_map(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn backup_path(path: &Path, generation: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{generation}"));
    PathBuf::from(name)
}

/// Existing log files in chronological order: backups oldest to newest,
/// then the primary.
#[must_use]
pub fn candidate_log_paths(primary: &Path, max_backups: u32) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for generation in (1..=max_backups).rev() {
        let p = backup_path(primary, generation);
        if p.exists() {
            paths.push(p);
        }
    }
    if primary.exists() {
        paths.push(primary.to_path_buf());
    }
    paths
}

/// Decode events from one log file, skipping unparseable lines.
pub fn read_events(path: &Path) -> Result<Vec<Event>> {
    let data = std::fs::read_to_string(path)?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

/// Decode the full chronological history across rotation boundaries.
pub fn read_all_events(primary: &Path, max_backups: u32) -> Result<Vec<Event>> {
    let mut all = Vec::new();
    for path in candidate_log_paths(primary, max_backups) {
        all.extend(read_events(&path)?);
    }
    Ok(all)
}

/// Keep events matching every supplied filter.
#[must_use]
pub fn filter_events(
    events: Vec<Event>,
    run_id: Option<&str>,
    action: Option<&str>,
    status: Option<&str>,
) -> Vec<Event> {
    events
        .into_iter()
        .filter(|e| run_id.is_none_or(|v| e.run_id == v))
        .filter(|e| action.is_none_or(|v| e.action == v))
        .filter(|e| status.is_none_or(|v| e.status == v))
        .collect()
}

/// Keep only the most recent `limit` events; `0` keeps everything.
#[must_use]
pub fn tail_events(mut events: Vec<Event>, limit: usize) -> Vec<Event> {
    if limit > 0 && events.len() > limit {
        events.drain(..events.len() - limit);
    }
    events
}

/// Drop events older than `keep_days`; `0` disables the age cutoff.
/// Events with missing or unparseable timestamps are dropped.
#[must_use]
pub fn prune_by_age(events: Vec<Event>, keep_days: u32) -> Vec<Event> {
    if keep_days == 0 {
        return events;
    }
    let cutoff = Utc::now() - chrono::Duration::days(i64::from(keep_days));
    events
        .into_iter()
        .filter(|e| {
            DateTime::parse_from_rfc3339(&e.timestamp)
                .map(|ts| ts.with_timezone(&Utc) >= cutoff)
                .unwrap_or(false)
        })
        .collect()
}

/// Rewrite the primary log with exactly `events`, one JSON object per line.
pub fn write_events(primary: &Path, events: &[Event]) -> Result<()> {
    if let Some(dir) = primary.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut out = String::new();
    for event in events {
        if let Ok(line) = serde_json::to_string(event) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    std::fs::write(primary, out)?;
    Ok(())
}

/// Delete every backup generation, leaving only the primary.
pub fn remove_backups(primary: &Path, max_backups: u32) -> Result<()> {
    for generation in 1..=max_backups {
        let p = backup_path(primary, generation);
        match std::fs::remove_file(&p) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_config(temp: &TempDir, max_size_bytes: u64, max_backups: u32) -> AuditConfig {
        AuditConfig {
            enabled: true,
            log_path: temp.path().join("audit.log"),
            max_size_bytes,
            max_backups,
        }
    }

    #[test]
    fn logger_writes_one_json_object_per_line() {
        let temp = TempDir::new().unwrap();
        let cfg = test_config(&temp, 1 << 20, 3);
        let logger = Logger::new(&cfg, "install");

        logger.log("manifest.load", "success", Some(json!({"count": 2})), None);
        logger.log("manifest.save", "error", None, Some("disk full"));

        let events = read_events(&cfg.log_path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].command, "install");
        assert_eq!(events[0].action, "manifest.load");
        assert_eq!(events[0].run_id, logger.run_id());
        assert_eq!(events[1].run_id, events[0].run_id);
        assert_eq!(events[1].error, "disk full");
        assert!(!events[0].timestamp.is_empty());
    }

    #[test]
    fn disabled_logger_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut cfg = test_config(&temp, 1 << 20, 3);
        cfg.enabled = false;

        let logger = Logger::new(&cfg, "install");
        logger.log("anything", "success", None, None);

        assert_eq!(logger.run_id(), "");
        assert!(!cfg.log_path.exists());
    }

    #[test]
    fn rotation_bounds_the_backup_chain() {
        let temp = TempDir::new().unwrap();
        let cfg = test_config(&temp, 64, 2);
        let logger = Logger::new(&cfg, "install");

        for i in 0..20 {
            logger.log(&format!("action.{i}"), "success", None, None);
        }

        assert!(backup_path(&cfg.log_path, 1).exists());
        assert!(backup_path(&cfg.log_path, 2).exists());
        assert!(!backup_path(&cfg.log_path, 3).exists());

        let chain = candidate_log_paths(&cfg.log_path, cfg.max_backups);
        assert_eq!(
            chain,
            vec![
                backup_path(&cfg.log_path, 2),
                backup_path(&cfg.log_path, 1),
                cfg.log_path.clone(),
            ]
        );
    }

    #[test]
    fn rotation_with_zero_backups_truncates() {
        let temp = TempDir::new().unwrap();
        let cfg = test_config(&temp, 64, 0);
        let logger = Logger::new(&cfg, "install");

        for i in 0..10 {
            logger.log(&format!("action.{i}"), "success", None, None);
        }

        assert!(!backup_path(&cfg.log_path, 1).exists());
    }

    #[test]
    fn replay_spans_rotation_in_chronological_order() {
        let temp = TempDir::new().unwrap();
        let cfg = test_config(&temp, 64, 3);
        let logger = Logger::new(&cfg, "install");

        for i in 0..12 {
            logger.log(&format!("action.{i:02}"), "success", None, None);
        }

        let events = read_all_events(&cfg.log_path, cfg.max_backups).unwrap();
        let actions: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
        let mut sorted = actions.clone();
        sorted.sort_unstable();
        assert_eq!(actions, sorted, "replay must be chronological");
    }

    #[test]
    fn sensitive_details_never_reach_disk() {
        let temp = TempDir::new().unwrap();
        let cfg = test_config(&temp, 1 << 20, 3);
        let logger = Logger::new(&cfg, "install");

        logger.log(
            "remote.fetch",
            "error",
            Some(json!({"github_token": "ghp_supersecret", "repo": "owner/repo"})),
            Some("request failed: Bearer abc.def.ghi"),
        );

        let raw = std::fs::read_to_string(&cfg.log_path).unwrap();
        assert!(!raw.contains("ghp_supersecret"));
        assert!(!raw.contains("abc.def.ghi"));
        assert!(raw.contains(redact::REDACTED));
        assert!(raw.contains("owner/repo"));
    }

    #[test]
    fn corrupt_lines_are_skipped_on_replay() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("audit.log");
        std::fs::write(
            &path,
            "{\"action\":\"ok.one\",\"status\":\"success\"}\nnot json at all\n{\"action\":\"ok.two\",\"status\":\"success\"}\n",
        )
        .unwrap();

        let events = read_events(&path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "ok.one");
        assert_eq!(events[1].action, "ok.two");
    }

    #[test]
    fn filter_and_tail() {
        let mk = |run: &str, action: &str, status: &str| Event {
            run_id: run.to_string(),
            action: action.to_string(),
            status: status.to_string(),
            ..Event::default()
        };
        let events = vec![
            mk("r1", "a.one", "success"),
            mk("r1", "a.two", "error"),
            mk("r2", "a.one", "success"),
        ];

        let by_run = filter_events(events.clone(), Some("r1"), None, None);
        assert_eq!(by_run.len(), 2);

        let by_action_status = filter_events(events.clone(), None, Some("a.one"), Some("success"));
        assert_eq!(by_action_status.len(), 2);

        let tailed = tail_events(events.clone(), 1);
        assert_eq!(tailed.len(), 1);
        assert_eq!(tailed[0].run_id, "r2");

        assert_eq!(tail_events(events, 0).len(), 3);
    }

    #[test]
    fn prune_by_age_drops_old_and_unparseable() {
        let old = Event {
            timestamp: "2001-01-01T00:00:00.000000000Z".to_string(),
            action: "old".to_string(),
            ..Event::default()
        };
        let fresh = Event {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
            action: "fresh".to_string(),
            ..Event::default()
        };
        let broken = Event {
            timestamp: "yesterday-ish".to_string(),
            action: "broken".to_string(),
            ..Event::default()
        };

        let kept = prune_by_age(vec![old.clone(), fresh.clone(), broken], 30);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].action, "fresh");

        let disabled = prune_by_age(vec![old, fresh], 0);
        assert_eq!(disabled.len(), 2);
    }

    #[test]
    fn prune_rewrite_discards_backups() {
        let temp = TempDir::new().unwrap();
        let cfg = test_config(&temp, 64, 2);
        let logger = Logger::new(&cfg, "install");
        for i in 0..20 {
            logger.log(&format!("action.{i}"), "success", None, None);
        }
        assert!(backup_path(&cfg.log_path, 1).exists());

        let events = read_all_events(&cfg.log_path, cfg.max_backups).unwrap();
        let kept = tail_events(events, 3);
        write_events(&cfg.log_path, &kept).unwrap();
        remove_backups(&cfg.log_path, cfg.max_backups).unwrap();

        assert_eq!(read_events(&cfg.log_path).unwrap().len(), 3);
        assert_eq!(
            candidate_log_paths(&cfg.log_path, cfg.max_backups),
            vec![cfg.log_path.clone()]
        );
    }
}
