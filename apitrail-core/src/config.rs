use crate::endpoint::EndpointConfig;
use crate::registry::EndpointRegistry;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level deployment configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrailConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Fallback logging config for paths with no endpoint entry.
    #[serde(default)]
    pub default: EndpointConfig,
    #[serde(default)]
    pub endpoints: Vec<EndpointEntry>,
}

/// One logging-enabled endpoint: a path pattern plus its config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointEntry {
    pub path: String,
    #[serde(flatten)]
    pub config: EndpointConfig,
}

/// Durable store selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    #[serde(default)]
    pub file: FileStoreConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
}

/// Settings for the JSON-lines file backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStoreConfig {
    #[serde(default = "default_file_path")]
    pub path: PathBuf,
    /// Rotation threshold in bytes. 0 = rotation disabled.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Rotated files kept after rotation. 0 = keep none.
    #[serde(default = "default_max_rotated")]
    pub max_rotated_files: usize,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_backend() -> StoreBackend { StoreBackend::Memory }
fn default_file_path() -> PathBuf { PathBuf::from("requests.log") }
fn default_max_file_size() -> u64 { 100 * 1024 * 1024 }
fn default_max_rotated() -> usize { 10 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            file: FileStoreConfig::default(),
        }
    }
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: default_file_path(),
            max_file_size_bytes: default_max_file_size(),
            max_rotated_files: default_max_rotated(),
        }
    }
}

// ── Impls ─────────────────────────────────────────────────────

impl TrailConfig {
    /// Load configuration from YAML file + env overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: TrailConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("APITRAIL_").split("_"))
            .extract()?;
        Ok(config)
    }

    /// Compile the endpoint entries into a path-pattern registry.
    pub fn registry(&self) -> anyhow::Result<EndpointRegistry> {
        let entries = self
            .endpoints
            .iter()
            .map(|e| (e.path.clone(), e.config.clone()))
            .collect();
        EndpointRegistry::build(entries, self.default.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;
    use crate::policy::LogPolicy;
    use std::io::Write;

    // ── Default values ────────────────────────────────────────────

    #[test]
    fn default_store_is_memory() {
        let cfg = TrailConfig::default();
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert!(cfg.endpoints.is_empty());
    }

    #[test]
    fn default_file_store_config_values() {
        let cfg = FileStoreConfig::default();
        assert_eq!(cfg.path, PathBuf::from("requests.log"));
        assert_eq!(cfg.max_file_size_bytes, 100 * 1024 * 1024);
        assert_eq!(cfg.max_rotated_files, 10);
    }

    #[test]
    fn default_fallback_logs_everything() {
        let cfg = TrailConfig::default();
        assert!(cfg.default.should_log("GET", Some(200)));
    }

    // ── load() ────────────────────────────────────────────────────

    #[test]
    fn load_from_valid_yaml_overrides_defaults() {
        let yaml = r#"
store:
  backend: file
  file:
    path: "/var/log/apitrail/requests.log"
    max_file_size_bytes: 1024
endpoints:
  - path: "/api/items"
    policy: errors_only
    logging_methods: ["POST"]
    sensitive_fields: ["ssn"]
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{yaml}").unwrap();
        let cfg = TrailConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.store.backend, StoreBackend::File);
        assert_eq!(
            cfg.store.file.path,
            PathBuf::from("/var/log/apitrail/requests.log")
        );
        assert_eq!(cfg.store.file.max_file_size_bytes, 1024);
        // Defaults still apply for unspecified fields
        assert_eq!(cfg.store.file.max_rotated_files, 10);

        assert_eq!(cfg.endpoints.len(), 1);
        let entry = &cfg.endpoints[0];
        assert_eq!(entry.path, "/api/items");
        assert_eq!(entry.config.policy, LogPolicy::ErrorsOnly);
        assert_eq!(entry.config.logging_methods, vec![HttpMethod::Post]);
        assert_eq!(entry.config.sensitive_fields, vec!["ssn".to_string()]);
    }

    #[test]
    fn load_empty_yaml_yields_defaults() {
        let tmpfile = tempfile::NamedTempFile::new().unwrap();
        let cfg = TrailConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert!(cfg.endpoints.is_empty());
    }

    // ── registry() ────────────────────────────────────────────────

    #[test]
    fn registry_compiles_entries_and_fallback() {
        let yaml = r#"
default:
  policy: errors_only
endpoints:
  - path: "/api/items/{id}"
    sensitive_fields: ["card"]
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{yaml}").unwrap();
        let cfg = TrailConfig::load(tmpfile.path()).unwrap();
        let registry = cfg.registry().unwrap();
        assert_eq!(
            registry.resolve("/api/items/7").sensitive_fields,
            vec!["card".to_string()]
        );
        assert_eq!(registry.resolve("/other").policy, LogPolicy::ErrorsOnly);
    }

    #[test]
    fn registry_rejects_invalid_pattern() {
        let cfg = TrailConfig {
            endpoints: vec![EndpointEntry {
                path: "/api/{unclosed".to_string(),
                config: EndpointConfig::default(),
            }],
            ..Default::default()
        };
        assert!(cfg.registry().is_err());
    }
}
