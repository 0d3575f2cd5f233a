//! Configuration for the playback graph controller: an embedded default
//! YAML document, optionally overridden by a file named in an environment
//! variable, exposed as typed getters. Playback configuration does not
//! change once a graph is loaded (`do_store_config` is the only writer, and
//! it reads from the FSM's own arguments, not from here), so unlike the
//! config crate this one is modeled on, there is no mutation API.

use std::env;
use std::fs;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use omx_model::{ComponentRole, GraphKind};
use serde_yaml::Value;
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = include_str!("default.yaml");
const ENV_CONFIG_FILE: &str = "OMX_CONFIG_FILE";
const DEFAULT_LOG_LEVEL: &str = "info";

lazy_static! {
    static ref CONFIG: Config = Config::load().expect("failed to load omx-player configuration");
}

/// Read-only configuration singleton. Built once per process from the
/// embedded default, merged with an optional override file.
#[derive(Debug)]
pub struct Config {
    data: Value,
}

impl Config {
    fn load() -> Result<Self> {
        let mut data: Value =
            serde_yaml::from_str(DEFAULT_CONFIG).context("parsing embedded default config")?;

        if let Ok(path) = env::var(ENV_CONFIG_FILE) {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    let override_value: Value = serde_yaml::from_str(&text)
                        .with_context(|| format!("parsing override config at {path}"))?;
                    merge_yaml(&mut data, &override_value);
                    info!(config_file = %path, "loaded config override");
                }
                Err(e) => {
                    warn!(config_file = %path, error = %e, "config override not readable, using embedded default");
                }
            }
        }

        Ok(Config { data })
    }

    fn get(&self, path: &[&str]) -> Result<&Value> {
        let mut current = &self.data;
        for (i, key) in path.iter().enumerate() {
            let Value::Mapping(map) = current else {
                return Err(anyhow!("path {} is not a mapping", path[..i].join(".")));
            };
            current = map
                .get(Value::String(key.to_string()))
                .ok_or_else(|| anyhow!("path {} does not exist", path[..=i].join(".")))?;
        }
        Ok(current)
    }

    fn get_str(&self, path: &[&str], default: &str) -> String {
        match self.get(path) {
            Ok(Value::String(s)) => s.clone(),
            _ => default.to_string(),
        }
    }

    /// The graph kind to build when no explicit kind is supplied to `load`.
    pub fn default_graph_kind(&self) -> GraphKind {
        match self.get_str(&["graph", "default_kind"], "local").as_str() {
            "streaming" => {
                let service = self.get_str(&["graph", "streaming_service"], "radio");
                GraphKind::Streaming { service }
            }
            _ => GraphKind::LocalFile,
        }
    }

    /// Ordered component roles configured for a given graph kind.
    pub fn roles_for(&self, kind: &GraphKind) -> Vec<ComponentRole> {
        let key = match kind {
            GraphKind::LocalFile => "local",
            GraphKind::Streaming { .. } => "streaming",
        };
        match self.get(&["graph", "roles", key]) {
            Ok(Value::Sequence(seq)) => seq
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| ComponentRole::from_str(s).ok())
                .collect(),
            _ => vec![
                ComponentRole::Source,
                ComponentRole::Demuxer,
                ComponentRole::Decoder,
                ComponentRole::Renderer,
            ],
        }
    }

    /// Minimum `tracing` level for the `EnvFilter` the binary installs.
    pub fn log_min_level(&self) -> String {
        self.get_str(&["logger", "min_level"], DEFAULT_LOG_LEVEL)
    }
}

/// Returns the process-wide configuration singleton, lazily loaded on first
/// access.
pub fn get_config() -> &'static Config {
    &CONFIG
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(yaml: &str) -> Config {
        Config {
            data: serde_yaml::from_str(yaml).unwrap(),
        }
    }

    #[test]
    fn default_graph_kind_falls_back_to_local_file() {
        let config = config_from("graph: {}\n");
        assert_eq!(config.default_graph_kind(), GraphKind::LocalFile);
    }

    #[test]
    fn streaming_kind_carries_configured_service_name() {
        let config = config_from("graph:\n  default_kind: streaming\n  streaming_service: jazz\n");
        assert_eq!(
            config.default_graph_kind(),
            GraphKind::Streaming { service: "jazz".to_string() }
        );
    }

    #[test]
    fn roles_for_local_graph_matches_four_component_shape() {
        let config = config_from(DEFAULT_CONFIG);
        let roles = config.roles_for(&GraphKind::LocalFile);
        assert_eq!(
            roles,
            vec![
                ComponentRole::Source,
                ComponentRole::Demuxer,
                ComponentRole::Decoder,
                ComponentRole::Renderer,
            ]
        );
    }

    #[test]
    fn missing_log_level_falls_back_to_default() {
        let config = config_from("logger: {}\n");
        assert_eq!(config.log_min_level(), DEFAULT_LOG_LEVEL);
    }
}
