//! PromptConfig - versioned prompt template configs
//!
//! Parses a prompt template description (schema version, template type,
//! description, model execution settings) and derives the ordered chat
//! messages it implies. Rendering is deferred: every message carries its raw
//! template text plus the engine that will expand it later.
//!
//! # Core Concepts
//!
//! - **Typed plus lossless settings**: keys a [`SettingsShape`] recognizes bind
//!   to typed fields, everything else is kept verbatim as extension data
//! - **Forward compatible**: unknown top-level keys are ignored, absent keys
//!   take defaults
//! - **Ordered extraction**: a `chat_system_prompt` always precedes authored
//!   `messages`
//!
//! # Modules
//!
//! - [`settings`] - Settings shapes and the execution settings bag
//! - [`config`] - Prompt template config parsing and serialization
//! - [`engine`] - Template engine trait and Handlebars implementation
//! - [`template`] - Content templates and chat message templates
//! - [`chat`] - Chat prompt templates and message extraction
//! - [`loader`] - Prompt directories on disk
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use promptconfig::{ChatPromptTemplate, ExtractOptions, HandlebarsEngine, PromptTemplateConfig, RequestSettings};
//!
//! let config = PromptTemplateConfig::<RequestSettings>::from_json(text)?;
//! let chat = ChatPromptTemplate::with_extraction(
//!     "{{question}}",
//!     Arc::new(HandlebarsEngine::new()),
//!     config,
//!     ExtractOptions::all(),
//! )?;
//! let messages = chat.render_messages(&serde_json::json!({"question": "Why?"}))?;
//! ```

pub mod chat;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod settings;
pub mod template;

// Re-export commonly used types
pub use chat::{ChatPromptTemplate, ExtractOptions};
pub use config::{InputConfig, InputParameter, PromptTemplateConfig};
pub use engine::{HandlebarsEngine, TemplateEngine};
pub use error::{ConfigError, RenderError};
pub use loader::{LoadedPrompt, PromptLoader};
pub use settings::{ExecutionSettings, RequestSettings, SettingsShape, UntypedSettings};
pub use template::{ChatMessageTemplate, PromptTemplate, RenderedMessage};
