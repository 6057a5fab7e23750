//! Execution settings bag: typed fields plus extension data

use std::ops::Deref;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use super::shape::{SettingsShape, UntypedSettings};
use crate::error::ConfigError;

/// Key of the settings bucket read from an `execution_settings` block
const DEFAULT_BUCKET: &str = "default";

/// Model-call parameters attached to a prompt template
///
/// Keys recognized by `S` are bound to `settings`; every other key is kept
/// as-is in `extension_data`. No key from the source is dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionSettings<S = UntypedSettings> {
    /// Typed fields bound from the recognized keys
    pub settings: S,

    /// Keys the shape does not recognize, values untouched
    pub extension_data: Map<String, Value>,
}

impl<S: SettingsShape> ExecutionSettings<S> {
    /// Wrap typed settings with empty extension data
    pub fn new(settings: S) -> Self {
        debug!("ExecutionSettings::new: called");
        Self {
            settings,
            extension_data: Map::new(),
        }
    }

    /// Build a bag from free-form named parameters
    ///
    /// Every parameter is kept in extension data. Names the shape recognizes
    /// are also bound to typed fields, so both agree on the value.
    pub fn from_parameters(parameters: Map<String, Value>) -> Result<Self, ConfigError> {
        debug!(key_count = parameters.len(), "ExecutionSettings::from_parameters: called");
        let typed: Map<String, Value> = parameters
            .iter()
            .filter(|(key, _)| S::recognizes(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let settings = S::bind(typed)?;
        Ok(Self {
            settings,
            extension_data: parameters,
        })
    }

    /// Bind a flat settings map
    pub fn from_map(source: &Map<String, Value>) -> Result<Self, ConfigError> {
        debug!(key_count = source.len(), "ExecutionSettings::from_map: called");
        let mut typed = Map::new();
        let mut extension_data = Map::new();

        for (key, value) in source {
            if S::recognizes(key) {
                typed.insert(key.clone(), value.clone());
            } else {
                extension_data.insert(key.clone(), value.clone());
            }
        }
        debug!(
            typed_count = typed.len(),
            extension_count = extension_data.len(),
            "ExecutionSettings::from_map: split keys"
        );

        let settings = S::bind(typed)?;
        Ok(Self {
            settings,
            extension_data,
        })
    }

    /// Bind an `execution_settings` block
    ///
    /// Reads the `default` bucket when present, otherwise the block itself.
    pub fn from_settings_block(block: &Map<String, Value>) -> Result<Self, ConfigError> {
        debug!("ExecutionSettings::from_settings_block: called");
        match block.get(DEFAULT_BUCKET) {
            Some(Value::Object(bucket)) => {
                debug!("ExecutionSettings::from_settings_block: using default bucket");
                if block.len() > 1 {
                    debug!(
                        ignored = block.len() - 1,
                        "ExecutionSettings::from_settings_block: ignoring non-default buckets"
                    );
                }
                Self::from_map(bucket)
            }
            Some(other) => Err(ConfigError::mismatch(
                "execution_settings.default",
                format!("expected an object, found {}", kind_of(other)),
            )),
            None => {
                debug!("ExecutionSettings::from_settings_block: no default bucket, using block");
                Self::from_map(block)
            }
        }
    }

    /// Add an extension entry
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        debug!(%key, "ExecutionSettings::with_extension: called");
        self.extension_data.insert(key, value.into());
        self
    }

    /// Look up a key across typed fields and extension data
    ///
    /// Typed fields take precedence over an extension entry with the same name.
    pub fn value(&self, key: &str) -> Option<Value> {
        if S::recognizes(key) {
            if let Some(value) = self.typed_map().remove(key) {
                return Some(value);
            }
        }
        self.extension_data.get(key).cloned()
    }

    /// Check whether the bag holds nothing but defaults
    pub fn is_empty(&self) -> bool {
        self.extension_data.is_empty() && self.settings == S::default()
    }

    /// Flatten into one map, typed fields over extension data
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extension_data.clone();
        map.extend(self.typed_map());
        map
    }

    fn typed_map(&self) -> Map<String, Value> {
        match serde_json::to_value(&self.settings) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl<S> Deref for ExecutionSettings<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.settings
    }
}

impl<S: SettingsShape> Serialize for ExecutionSettings<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.to_map().serialize(serializer)
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
