// Configuration management for Palisade
//
// Values from every source are kept as flat, dot-separated keys
// (`csrf.param_name`). Later loads override earlier ones, so the usual order
// is: defaults, file, .env, process environment.

pub mod app;
pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use app::{AppConfig, AuthOptions, CsrfOptions, ProtectorKind, SessionOptions};
pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "PALISADE";

/// Main configuration manager
#[derive(Clone, Default)]
pub struct ConfigManager {
    config: Arc<RwLock<BTreeMap<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::default(),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        self.insert_all(loader.load()?);
        Ok(())
    }

    /// Load configuration from the given variable pairs, as if they were the
    /// process environment
    pub fn load_env_from<I>(&self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let loader = EnvLoader::new(self.env_prefix.clone());
        self.insert_all(loader.load_from(vars)?);
        Ok(())
    }

    /// Load variables from a dotenv file without touching the process
    /// environment
    pub fn load_dotenv(&self, path: impl AsRef<Path>) -> Result<()> {
        let iter = dotenvy::from_path_iter(path.as_ref())
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        let vars = iter
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        self.load_env_from(vars)
    }

    /// Load configuration from file, detecting the format from its name
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        if loader.format() == FileFormat::Env {
            return self.load_dotenv(path);
        }
        let data = loader.load_file(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        self.set_value("", data);
        Ok(())
    }

    /// Load configuration from a string in the given format
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).parse(content)?;
        self.set_value("", data);
        Ok(())
    }

    /// Set a configuration value. Objects are flattened into dotted keys.
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        self.set_value(key, json_value);
        Ok(())
    }

    fn set_value(&self, key: &str, value: Value) {
        let mut flat = BTreeMap::new();
        flatten(key, value, &mut flat);
        self.insert_all(flat);
    }

    fn insert_all(&self, values: impl IntoIterator<Item = (String, Value)>) {
        let mut config = self.config.write();
        for (key, value) in values {
            config.insert(key, value);
        }
    }

    /// Get a configuration value. A section prefix such as `csrf` yields
    /// the whole section.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .value(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    fn value(&self, key: &str) -> Option<Value> {
        let config = self.config.read();
        if let Some(value) = config.get(key) {
            return Some(value.clone());
        }

        let prefix = format!("{}.", key);
        let section: BTreeMap<&str, &Value> = config
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(prefix.as_str()).map(|rest| (rest, v)))
            .collect();
        if section.is_empty() {
            return None;
        }
        Some(nest(section))
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Check if a key (or section) exists
    pub fn has(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Get all configuration keys
    pub fn keys(&self) -> Vec<String> {
        self.config.read().keys().cloned().collect()
    }

    /// Merge configuration from another manager
    pub fn merge(&self, other: &ConfigManager) {
        let other_config = other.config.read().clone();
        self.insert_all(other_config);
    }

    /// The whole configuration as a nested JSON object
    pub fn to_value(&self) -> Value {
        let config = self.config.read();
        nest(config.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }

    /// Deserialize and validate the whole configuration
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let validated: T = serde_json::from_value(self.to_value())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;

        Ok(validated)
    }

    /// Typed application configuration
    pub fn app_config(&self) -> Result<AppConfig> {
        self.load_validated()
    }
}

fn flatten(prefix: &str, value: Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let key = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&key, value, out);
            }
        }
        other if !prefix.is_empty() => {
            out.insert(prefix.to_string(), other);
        }
        _ => {}
    }
}

fn nest(flat: BTreeMap<&str, &Value>) -> Value {
    let mut root = Map::new();
    for (key, value) in flat {
        let mut node = &mut root;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                node.insert(part.to_string(), value.clone());
                break;
            }
            let entry = node
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(map) = entry else {
                break;
            };
            node = map;
        }
    }
    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let manager = ConfigManager::new();
        manager.set("test_key", "test_value").unwrap();

        let value: String = manager.get("test_key").unwrap();
        assert_eq!(value, "test_value");
    }

    #[test]
    fn test_get_or_default() {
        let manager = ConfigManager::new();

        let value: String = manager.get_or("missing_key", "default_value".to_string());
        assert_eq!(value, "default_value");
    }

    #[test]
    fn test_sections() {
        let manager = ConfigManager::new();
        manager
            .set("csrf", serde_json::json!({"enabled": false, "param_name": "_t"}))
            .unwrap();

        assert!(manager.has("csrf"));
        assert!(!manager.get_bool("csrf.enabled").unwrap());

        let csrf: CsrfOptions = manager.get("csrf").unwrap();
        assert_eq!(csrf.param_name, "_t");
        assert!(!csrf.enabled);
    }

    #[test]
    fn test_env_overrides_file() {
        let manager = ConfigManager::with_prefix(ENV_PREFIX);
        manager
            .load_str(
                "secret = \"0123456789abcdef0123456789abcdef\"\n[csrf]\nenabled = true\n",
                FileFormat::Toml,
            )
            .unwrap();
        manager
            .load_env_from(vec![(
                "PALISADE_CSRF__ENABLED".to_string(),
                "false".to_string(),
            )])
            .unwrap();

        let config = manager.app_config().unwrap();
        assert!(!config.csrf.enabled);
        assert_eq!(config.csrf.cookie_name, "XSRF-TOKEN");
    }

    #[test]
    fn test_app_config_validation_fails_without_secret() {
        let manager = ConfigManager::new();
        assert!(matches!(
            manager.app_config(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_merge() {
        let a = ConfigManager::new();
        let b = ConfigManager::new();
        a.set("x", 1).unwrap();
        b.set("y", 2).unwrap();
        a.merge(&b);

        assert_eq!(a.keys(), vec!["x".to_string(), "y".to_string()]);
    }
}
