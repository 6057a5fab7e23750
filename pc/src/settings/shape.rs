//! Settings shape descriptors

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ConfigError;

/// Describes which settings keys bind to typed fields, and how
pub trait SettingsShape: Clone + std::fmt::Debug + Default + PartialEq + Serialize {
    /// Keys this shape binds to typed fields
    const FIELDS: &'static [&'static str];

    /// Bind the recognized entries of a settings source
    ///
    /// `fields` only ever contains keys listed in [`Self::FIELDS`]. Missing
    /// keys keep their defaults.
    fn bind(fields: Map<String, Value>) -> Result<Self, ConfigError>;

    /// Check whether a key binds to a typed field of this shape
    fn recognizes(key: &str) -> bool {
        Self::FIELDS.contains(&key)
    }
}

/// Shape with no typed fields; every key lands in extension data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UntypedSettings;

impl SettingsShape for UntypedSettings {
    const FIELDS: &'static [&'static str] = &[];

    fn bind(_fields: Map<String, Value>) -> Result<Self, ConfigError> {
        Ok(UntypedSettings)
    }
}

/// Bind fields through a serde struct that uses `#[serde(default)]`
///
/// On failure each entry is retried alone so the error names the field
/// that could not be coerced.
pub fn bind_fields<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, ConfigError> {
    debug!(field_count = fields.len(), "bind_fields: called");
    match serde_json::from_value::<T>(Value::Object(fields.clone())) {
        Ok(bound) => Ok(bound),
        Err(err) => {
            for (key, value) in fields {
                let mut single = Map::new();
                single.insert(key.clone(), value);
                if let Err(field_err) = serde_json::from_value::<T>(Value::Object(single)) {
                    debug!(%key, error = %field_err, "bind_fields: field rejected");
                    return Err(ConfigError::mismatch(key, field_err.to_string()));
                }
            }
            debug!(error = %err, "bind_fields: combination rejected");
            Err(ConfigError::mismatch("execution_settings", err.to_string()))
        }
    }
}
