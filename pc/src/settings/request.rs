//! Typed completion/chat request settings

use std::collections::BTreeMap;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::shape::{SettingsShape, bind_fields};
use crate::error::ConfigError;

/// Common model-call parameters for completion and chat requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    /// Sampling temperature
    pub temperature: f64,

    /// Nucleus sampling probability mass
    pub top_p: f64,

    pub presence_penalty: f64,

    pub frequency_penalty: f64,

    /// Maximum tokens per response
    #[serde(deserialize_with = "whole_number")]
    pub max_tokens: u32,

    /// How many completions to generate
    #[serde(deserialize_with = "whole_number")]
    pub number_of_responses: u32,

    /// Stop sequences
    pub stop: Vec<String>,

    /// Token id to bias
    pub logit_bias: BTreeMap<String, f64>,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            max_tokens: 256,
            number_of_responses: 1,
            stop: Vec::new(),
            logit_bias: BTreeMap::new(),
        }
    }
}

impl SettingsShape for RequestSettings {
    const FIELDS: &'static [&'static str] = &[
        "temperature",
        "top_p",
        "presence_penalty",
        "frequency_penalty",
        "max_tokens",
        "number_of_responses",
        "stop",
        "logit_bias",
    ];

    fn bind(fields: Map<String, Value>) -> Result<Self, ConfigError> {
        bind_fields(fields)
    }
}

/// Accept `128` and `128.0` alike; anything that is not a whole `u32` is rejected
fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Integer(u64),
        Float(f64),
    }

    match Count::deserialize(deserializer)? {
        Count::Integer(n) => {
            u32::try_from(n).map_err(|_| de::Error::custom(format!("{} is out of range for a count", n)))
        }
        Count::Float(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) => Ok(f as u32),
        Count::Float(f) => Err(de::Error::custom(format!("expected a non-negative whole number, found {}", f))),
    }
}
