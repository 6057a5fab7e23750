//! Prompt template configuration
//!
//! A config is a versioned document describing a prompt template:
//!
//! ```json
//! {
//!   "schema": 1,
//!   "type": "completion",
//!   "description": "Summarize a document",
//!   "execution_settings": {
//!     "default": { "temperature": 0.2, "max_tokens": 512 }
//!   },
//!   "input": {
//!     "parameters": [{ "name": "input", "description": "Text to summarize" }]
//!   }
//! }
//! ```
//!
//! Only the known top-level keys are read; anything else is ignored so that
//! documents written against a newer schema still load. Absent keys resolve to
//! their defaults.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::ConfigError;
use crate::settings::{ExecutionSettings, SettingsShape, UntypedSettings, bind_fields, kind_of};

/// Schema version assumed when a document doesn't say
pub const DEFAULT_SCHEMA: i64 = 1;

/// Template type assumed when a document doesn't say
pub const DEFAULT_TYPE: &str = "completion";

/// Versioned metadata and execution settings for a prompt template
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplateConfig<S = UntypedSettings> {
    /// Schema version of the source document
    pub schema: i64,

    /// Template type, e.g. "completion" or "chat"
    pub template_type: String,

    /// Human-readable description
    pub description: String,

    /// Model-call parameters
    pub execution_settings: ExecutionSettings<S>,

    /// Services to prefer when executing this template
    pub default_services: Vec<String>,

    /// Declared input variables
    pub input: InputConfig,
}

/// Input variables a template expects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub parameters: Vec<InputParameter>,
}

/// One declared input variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputParameter {
    pub name: String,

    pub description: String,

    /// Value used when the caller supplies none
    #[serde(alias = "defaultValue")]
    pub default_value: String,

    #[serde(rename = "type")]
    pub param_type: String,

    pub required: bool,
}

impl Default for InputParameter {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            default_value: String::new(),
            param_type: "string".to_string(),
            required: true,
        }
    }
}

/// Known top-level keys of a config document
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawDocument {
    schema: i64,

    #[serde(rename = "type")]
    template_type: String,

    description: String,

    execution_settings: Option<Map<String, Value>>,

    default_services: Vec<String>,

    input: InputConfig,
}

impl Default for RawDocument {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA,
            template_type: DEFAULT_TYPE.to_string(),
            description: String::new(),
            execution_settings: None,
            default_services: Vec::new(),
            input: InputConfig::default(),
        }
    }
}

impl<S: SettingsShape> Default for PromptTemplateConfig<S> {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA,
            template_type: DEFAULT_TYPE.to_string(),
            description: String::new(),
            execution_settings: ExecutionSettings::default(),
            default_services: Vec::new(),
            input: InputConfig::default(),
        }
    }
}

impl<S: SettingsShape> PromptTemplateConfig<S> {
    /// Build from a parsed mapping
    pub fn from_map(document: &Map<String, Value>) -> Result<Self, ConfigError> {
        debug!(key_count = document.len(), "PromptTemplateConfig::from_map: called");
        let raw: RawDocument = bind_fields(document.clone())?;

        let execution_settings = match &raw.execution_settings {
            Some(block) => {
                debug!("PromptTemplateConfig::from_map: binding execution_settings");
                ExecutionSettings::from_settings_block(block)?
            }
            None => {
                debug!("PromptTemplateConfig::from_map: no execution_settings, using empty bag");
                ExecutionSettings::default()
            }
        };

        Ok(Self {
            schema: raw.schema,
            template_type: raw.template_type,
            description: raw.description,
            execution_settings,
            default_services: raw.default_services,
            input: raw.input,
        })
    }

    /// Build from a parsed value, which must be an object
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        Self::from_parsed(value, "JSON")
    }

    /// Parse JSON text
    ///
    /// Empty text is malformed, never an empty config.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        debug!(text_len = text.len(), "PromptTemplateConfig::from_json: called");
        let value: Value = serde_json::from_str(text).map_err(|e| ConfigError::malformed("JSON", e.to_string()))?;
        Self::from_parsed(&value, "JSON")
    }

    /// Parse YAML text
    ///
    /// Empty text is malformed, never an empty config.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        debug!(text_len = text.len(), "PromptTemplateConfig::from_yaml: called");
        if text.trim().is_empty() {
            return Err(ConfigError::malformed("YAML", "empty document"));
        }
        let value: Value = serde_yaml::from_str(text).map_err(|e| ConfigError::malformed("YAML", e.to_string()))?;
        Self::from_parsed(&value, "YAML")
    }

    /// Build a default-metadata config around explicit settings
    pub fn from_execution_settings(execution_settings: ExecutionSettings<S>) -> Self {
        debug!("PromptTemplateConfig::from_execution_settings: called");
        Self {
            execution_settings,
            ..Self::default()
        }
    }

    /// Build a default-metadata config from named parameters
    ///
    /// Every parameter lands in extension data. Names the typed shape
    /// recognizes are bound as well, and fail with `TypeMismatch` when they
    /// can't be coerced.
    pub fn from_parameters<I, K, V>(parameters: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let parameters: Map<String, Value> = parameters.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        debug!(
            param_count = parameters.len(),
            "PromptTemplateConfig::from_parameters: called"
        );
        Ok(Self::from_execution_settings(ExecutionSettings::from_parameters(parameters)?))
    }

    /// Names of the declared input parameters
    pub fn parameter_names(&self) -> Vec<&str> {
        self.input.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Serialize back into document form
    ///
    /// Settings are written under `execution_settings.default`.
    pub fn to_value(&self) -> Value {
        json!({
            "schema": self.schema,
            "type": self.template_type,
            "description": self.description,
            "execution_settings": { "default": self.execution_settings.to_map() },
            "default_services": self.default_services,
            "input": self.input,
        })
    }

    /// Serialize into pretty-printed JSON text
    pub fn to_json(&self) -> String {
        format!("{:#}", self.to_value())
    }

    fn from_parsed(value: &Value, format: &'static str) -> Result<Self, ConfigError> {
        match value {
            Value::Object(document) => Self::from_map(document),
            other => {
                debug!(kind = kind_of(other), "PromptTemplateConfig::from_parsed: not an object");
                Err(ConfigError::malformed(
                    format,
                    format!("expected an object at the top level, found {}", kind_of(other)),
                ))
            }
        }
    }
}

impl<S: SettingsShape> Serialize for PromptTemplateConfig<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.to_value().serialize(serializer)
    }
}
