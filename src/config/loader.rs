//! Config file loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::merge::merge;

/// Catch-all NATS wildcard, used when no subject is configured at all.
const MATCH_ALL_SUBJECT: &str = ">";

/// Effective runtime configuration, extracted from the merged tree.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub nats_server: NatsServer,
    pub subjects: Vec<String>,
    pub raw_messages: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NatsServer {
    pub host: String,
    /// Kept as a string so it can flow into the server URL unparsed.
    /// Accepts any YAML scalar, so `port: 4444` and `port: '4444'` are
    /// both fine.
    #[serde(deserialize_with = "scalar_to_string")]
    pub port: String,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
}

/// Scalar overrides taken from the command line. These are applied after the
/// YAML-level merge, by direct field assignment, so flags always win over
/// file configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<String>,
    pub raw: Option<bool>,
}

/// A freshly built default configuration tree. Constructed per call so no
/// shared state survives between loads.
pub fn default_tree() -> Value {
    let mut server = Mapping::new();
    server.insert("host".into(), "localhost".into());
    server.insert("port".into(), "4222".into());
    server.insert("cert".into(), Value::Null);
    server.insert("key".into(), Value::Null);

    let mut root = Mapping::new();
    root.insert("natsServer".into(), Value::Mapping(server));
    root.insert("subjects".into(), Value::Sequence(Vec::new()));
    root.insert("rawMessages".into(), Value::Bool(false));
    Value::Mapping(root)
}

/// Load the effective configuration: defaults, deep-merged with the YAML
/// file (explicit `--config` path, otherwise auto-discovered in the current
/// directory), then overridden by CLI flags.
///
/// A missing, unreadable, or malformed config file is never fatal: it is
/// reported and the defaults are used, so the tool stays usable even with a
/// broken override file lying around.
pub fn load_config(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Config> {
    let mut tree = default_tree();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(),
    };

    if let Some(config_file) = discovered {
        match read_overlay(&config_file) {
            Ok(overlay) => merge(&mut tree, overlay, "")?,
            Err(err) => {
                tracing::warn!(
                    "could not load the configuration file [{}]: {err:#}",
                    config_file.display()
                );
            }
        }
    }

    let mut config: Config = serde_yaml::from_value(tree)
        .context("merged configuration does not have the expected shape")?;

    if let Some(host) = &overrides.host {
        config.nats_server.host = host.clone();
    }
    if let Some(port) = &overrides.port {
        config.nats_server.port = port.clone();
    }
    if let Some(raw) = overrides.raw {
        config.raw_messages = raw;
    }

    if config.subjects.is_empty() {
        config.subjects.push(MATCH_ALL_SUBJECT.to_string());
    }

    Ok(config)
}

fn scalar_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, got a {}",
            super::merge::node_kind(&other)
        ))),
    }
}

fn read_overlay(config_file: &Path) -> Result<Value> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("failed reading config file: {}", config_file.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("invalid YAML syntax: {}", config_file.display()))
}

fn discover_config() -> Option<PathBuf> {
    let candidates = ["nats-tap.yaml", ".nats-tap.yaml"];

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_overrides() -> CliOverrides {
        CliOverrides::default()
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let tmp = TempDir::new().expect("tmp");
        let missing = tmp.path().join("nowhere.yaml");
        let cfg = load_config(Some(&missing), &no_overrides()).expect("config");
        assert_eq!(cfg.nats_server.host, "localhost");
        assert_eq!(cfg.nats_server.port, "4222");
        assert!(cfg.nats_server.cert.is_none());
        assert!(!cfg.raw_messages);
        assert_eq!(cfg.subjects, vec![">".to_string()]);
    }

    #[test]
    fn test_defaults_when_yaml_malformed() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "natsServer: [unclosed\n").expect("write");
        let cfg = load_config(Some(&path), &no_overrides()).expect("config");
        assert_eq!(cfg.nats_server.host, "localhost");
    }

    #[test]
    fn test_file_extends_subjects_and_overrides_scalars() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nats-tap.yaml");
        fs::write(
            &path,
            "natsServer:\n  host: broker.example\nsubjects:\n  - events.>\n  - audit.*\n",
        )
        .expect("write");
        let cfg = load_config(Some(&path), &no_overrides()).expect("config");
        assert_eq!(cfg.nats_server.host, "broker.example");
        assert_eq!(cfg.nats_server.port, "4222");
        assert_eq!(cfg.subjects, vec!["events.>".to_string(), "audit.*".to_string()]);
    }

    #[test]
    fn test_numeric_port_in_file_is_accepted() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nats-tap.yaml");
        fs::write(&path, "natsServer:\n  port: 4444\n").expect("write");
        let cfg = load_config(Some(&path), &no_overrides()).expect("config");
        assert_eq!(cfg.nats_server.port, "4444");
        assert_eq!(cfg.nats_server.host, "localhost");
    }

    #[test]
    fn test_cli_flags_win_over_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nats-tap.yaml");
        fs::write(&path, "natsServer:\n  host: broker.example\n  port: '5222'\nrawMessages: true\n")
            .expect("write");
        let overrides = CliOverrides {
            host: Some("cli-host".to_string()),
            port: Some("9999".to_string()),
            raw: Some(false),
        };
        let cfg = load_config(Some(&path), &overrides).expect("config");
        assert_eq!(cfg.nats_server.host, "cli-host");
        assert_eq!(cfg.nats_server.port, "9999");
        assert!(!cfg.raw_messages);
    }

    #[test]
    fn test_raw_flag_absent_keeps_file_value() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nats-tap.yaml");
        fs::write(&path, "rawMessages: true\n").expect("write");
        let cfg = load_config(Some(&path), &no_overrides()).expect("config");
        assert!(cfg.raw_messages);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nats-tap.yaml");
        fs::write(&path, "operatorNotes: keep an eye on audit.*\nsubjects: [audit.*]\n")
            .expect("write");
        let cfg = load_config(Some(&path), &no_overrides()).expect("config");
        assert_eq!(cfg.subjects, vec!["audit.*".to_string()]);
    }

    #[test]
    fn test_configured_subjects_suppress_wildcard_default() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nats-tap.yaml");
        fs::write(&path, "subjects: [metrics.cpu]\n").expect("write");
        let cfg = load_config(Some(&path), &no_overrides()).expect("config");
        assert_eq!(cfg.subjects, vec!["metrics.cpu".to_string()]);
    }
}
