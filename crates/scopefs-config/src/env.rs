//! Environment variable fallbacks.
//!
//! `SCOPEFS_*` variables fill fields that no config file set. They never
//! override a value a file chose explicitly.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

/// Variable name and the dotted config field it falls back into.
const ENV_FIELDS: &[(&str, &str)] = &[
    ("SCOPEFS_ROOT", "vfs.root"),
    ("SCOPEFS_TASK_ID", "vfs.task_id"),
    ("SCOPEFS_RUN_ID", "vfs.run_id"),
    ("SCOPEFS_DEBUG", "vfs.debug"),
    ("SCOPEFS_LOG_LEVEL", "logging.level"),
];

/// Snapshot every `SCOPEFS_*` variable from the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("SCOPEFS_"))
        .collect()
}

/// Apply fallbacks for every field not in `file_set`.
///
/// Returns the dotted names of the fields that were filled.
pub fn apply_env_fallbacks(
    merged: &mut toml::Value,
    file_set: &BTreeSet<String>,
    env_vars: &HashMap<String, String>,
) -> Vec<String> {
    let mut applied = Vec::new();
    for (var, field) in ENV_FIELDS {
        let Some(raw) = env_vars.get(*var) else {
            continue;
        };
        if file_set.contains(*field) {
            continue;
        }
        let Some(value) = parse_value(field, raw) else {
            warn!(var, value = %raw, "ignoring unparseable environment value");
            continue;
        };
        if set_field(merged, field, value) {
            applied.push((*field).to_owned());
        }
    }
    applied
}

fn parse_value(field: &str, raw: &str) -> Option<toml::Value> {
    if field == "vfs.debug" {
        return match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(toml::Value::Boolean(true)),
            "0" | "false" | "no" | "off" | "" => Some(toml::Value::Boolean(false)),
            _ => None,
        };
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(toml::Value::String(trimmed.to_owned()))
}

fn set_field(root: &mut toml::Value, dotted: &str, value: toml::Value) -> bool {
    let mut parts = dotted.split('.').peekable();
    let mut current = root;
    while let Some(part) = parts.next() {
        let Some(table) = current.as_table_mut() else {
            return false;
        };
        if parts.peek().is_none() {
            table.insert(part.to_owned(), value);
            return true;
        }
        current = table
            .entry(part.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_fills_unset_fields() {
        let mut merged: toml::Value = toml::from_str("[vfs]\ntask_id = \"default\"").unwrap();
        let applied = apply_env_fallbacks(
            &mut merged,
            &BTreeSet::new(),
            &env(&[("SCOPEFS_TASK_ID", "t-9"), ("SCOPEFS_DEBUG", "yes")]),
        );
        assert_eq!(applied, vec!["vfs.task_id", "vfs.debug"]);
        assert_eq!(merged["vfs"]["task_id"].as_str(), Some("t-9"));
        assert_eq!(merged["vfs"]["debug"].as_bool(), Some(true));
    }

    #[test]
    fn test_file_values_win() {
        let mut merged: toml::Value = toml::from_str("[logging]\nlevel = \"warn\"").unwrap();
        let file_set = BTreeSet::from(["logging.level".to_owned()]);
        let applied = apply_env_fallbacks(
            &mut merged,
            &file_set,
            &env(&[("SCOPEFS_LOG_LEVEL", "trace")]),
        );
        assert!(applied.is_empty());
        assert_eq!(merged["logging"]["level"].as_str(), Some("warn"));
    }

    #[test]
    fn test_unparseable_debug_ignored() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let applied = apply_env_fallbacks(
            &mut merged,
            &BTreeSet::new(),
            &env(&[("SCOPEFS_DEBUG", "maybe"), ("SCOPEFS_ROOT", "/srv/eco")]),
        );
        assert_eq!(applied, vec!["vfs.root"]);
        assert_eq!(merged["vfs"]["root"].as_str(), Some("/srv/eco"));
    }
}
