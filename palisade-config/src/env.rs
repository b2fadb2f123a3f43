// Environment variable loading

use crate::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::env;

/// Separator in variable names that marks a nested section.
pub const SECTION_SEPARATOR: &str = "__";

/// Environment variable loader
///
/// `PALISADE_CSRF__PARAM_NAME=_token` with prefix `PALISADE` becomes the key
/// `csrf.param_name`. Values that look like booleans or integers are typed
/// accordingly, everything else stays a string.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching variables from the process environment
    pub fn load(&self) -> Result<HashMap<String, Value>> {
        self.load_from(env::vars())
    }

    /// Load all matching variables from the given pairs
    pub fn load_from<I>(&self, vars: I) -> Result<HashMap<String, Value>>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(vars
            .into_iter()
            .filter_map(|(key, value)| self.key_for(&key).map(|k| (k, typed_value(&value))))
            .collect())
    }

    /// Map a variable name to a dotted configuration key
    pub fn key_for(&self, var: &str) -> Option<String> {
        let rest = match self.prefix {
            Some(ref prefix) => {
                let rest = var.strip_prefix(prefix.as_str())?;
                rest.strip_prefix('_')?
            }
            None => var,
        };
        if rest.is_empty() {
            return None;
        }
        Some(rest.to_lowercase().replace(SECTION_SEPARATOR, "."))
    }
}

/// Interpret a raw string the way a config file would have typed it.
pub(crate) fn typed_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    Value::String(raw.to_string())
}
