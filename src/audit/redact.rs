//! Secret redaction for audit events.
//!
//! Defense in depth: callers should never hand secrets to the audit log,
//! but if one arrives anyway it must not reach disk. Map keys that look
//! sensitive are masked wholesale; free text is scrubbed of bearer tokens
//! and `key: value` / `key=value` credential patterns, keeping the key and
//! replacing the value.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Replacement marker for masked values.
pub const REDACTED: &str = "[REDACTED]";

static SENSITIVE_KEY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)token",
        r"(?i)secret",
        r"(?i)password",
        r"(?i)authorization",
        r"(?i)api[_-]?key",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|_| unreachable!("static pattern")))
    .collect()
});

static BEARER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(bearer\s+)[A-Za-z0-9\-\._~\+/]+=*")
        .unwrap_or_else(|_| unreachable!("static pattern"))
});

static KEY_VALUE_SECRET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(token|secret|password|api[_-]?key|authorization)\s*[:=]\s*([^\s,;]+)")
        .unwrap_or_else(|_| unreachable!("static pattern"))
});

/// Whether a details key should have its value masked wholesale.
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY_PATTERNS.iter().any(|p| p.is_match(key))
}

/// Scrub inline secrets from free text, preserving the key or prefix.
#[must_use]
pub fn redact_text(text: &str) -> String {
    let out = BEARER_TOKEN.replace_all(text, format!("${{1}}{REDACTED}"));
    KEY_VALUE_SECRET
        .replace_all(&out, format!("${{1}}={REDACTED}"))
        .into_owned()
}

/// Redact a details map: sensitive keys are masked wholesale, other values
/// are scrubbed recursively.
#[must_use]
pub fn redact_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            if is_sensitive_key(key) {
                (key.clone(), Value::String(REDACTED.to_string()))
            } else {
                (key.clone(), redact_value(value))
            }
        })
        .collect()
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(redact_text(s)),
        Value::Object(m) => Value::Object(redact_map(m)),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sensitive_keys_match_case_insensitively() {
        for key in [
            "token",
            "GITHUB_TOKEN",
            "clientSecret",
            "password",
            "Authorization",
            "api_key",
            "api-key",
            "apikey",
        ] {
            assert!(is_sensitive_key(key), "{key} should be sensitive");
        }
        assert!(!is_sensitive_key("skill_name"));
        assert!(!is_sensitive_key("path"));
    }

    #[test]
    fn bearer_token_value_is_masked_prefix_kept() {
        let out = redact_text("auth failed: Bearer abc123.DEF-456");
        assert!(out.contains("Bearer [REDACTED]"), "{out}");
        assert!(!out.contains("abc123"));
    }

    #[test]
    fn key_value_secret_is_masked_key_kept() {
        let out = redact_text("request with api_key=sk-live-0042 failed");
        assert_eq!(out, "request with api_key=[REDACTED] failed");

        let out = redact_text("token: ghp_abcdef, retrying");
        assert!(out.starts_with("token=[REDACTED]"), "{out}");
        assert!(!out.contains("ghp_abcdef"));
    }

    #[test]
    fn plain_text_is_untouched() {
        let text = "installed demo for claude at ~/.claude/skills";
        assert_eq!(redact_text(text), text);
    }

    #[test]
    fn map_redaction_is_recursive() {
        let details = json!({
            "skill": "demo",
            "github_token": "ghp_secretvalue",
            "nested": {
                "password": "hunter2",
                "note": "uses Bearer xyz.123 internally",
            },
            "list": ["api_key=sk-42", "plain"],
        });
        let Value::Object(map) = details else {
            unreachable!()
        };

        let redacted = Value::Object(redact_map(&map));
        let raw = serde_json::to_string(&redacted).unwrap();

        assert!(!raw.contains("ghp_secretvalue"));
        assert!(!raw.contains("hunter2"));
        assert!(!raw.contains("xyz.123"));
        assert!(!raw.contains("sk-42"));
        assert!(raw.contains("\"skill\":\"demo\""));
        assert!(raw.contains("plain"));
    }
}
