//! Chat prompt templates
//!
//! Turns a [`PromptTemplateConfig`] into an ordered list of chat message
//! templates. Two extraction stages run over the same output list, in this
//! order:
//!
//! 1. system prompt: `chat_system_prompt` from extension data becomes a
//!    leading "system" message
//! 2. messages: each `{role, content}` entry of `messages` in extension data
//!    becomes a message, in order
//!
//! Each stage is opt-in via [`ExtractOptions`]. Nothing is rendered until
//! [`ChatPromptTemplate::render_messages`] is called.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::PromptTemplateConfig;
use crate::engine::TemplateEngine;
use crate::error::{ConfigError, RenderError};
use crate::settings::{SettingsShape, UntypedSettings, kind_of};
use crate::template::{ChatMessageTemplate, RenderedMessage};

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Extension data key holding the system prompt
pub const CHAT_SYSTEM_PROMPT_KEY: &str = "chat_system_prompt";

/// Extension data key holding authored messages
pub const MESSAGES_KEY: &str = "messages";

/// Which extraction stages to run at construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Turn `messages` entries into message templates
    pub messages: bool,

    /// Turn `chat_system_prompt` into a leading system message
    pub system_prompt: bool,
}

impl ExtractOptions {
    /// Run both stages
    pub fn all() -> Self {
        Self {
            messages: true,
            system_prompt: true,
        }
    }

    pub fn messages() -> Self {
        Self {
            messages: true,
            system_prompt: false,
        }
    }

    pub fn system_prompt() -> Self {
        Self {
            messages: false,
            system_prompt: true,
        }
    }
}

/// A base template plus an ordered list of chat message templates
#[derive(Debug, Clone)]
pub struct ChatPromptTemplate<S = UntypedSettings> {
    template: String,
    engine: Arc<dyn TemplateEngine>,
    prompt_config: PromptTemplateConfig<S>,
    messages: Vec<ChatMessageTemplate>,
}

impl<S: SettingsShape> ChatPromptTemplate<S> {
    /// Create a chat template without extracting any messages
    pub fn new(
        template: impl Into<String>,
        engine: Arc<dyn TemplateEngine>,
        prompt_config: PromptTemplateConfig<S>,
    ) -> Self {
        debug!("ChatPromptTemplate::new: called");
        Self {
            template: template.into(),
            engine,
            prompt_config,
            messages: Vec::new(),
        }
    }

    /// Create a chat template, extracting messages from the config
    ///
    /// The system prompt, when extracted, always comes first. A missing or
    /// empty source contributes no messages; a source of the wrong kind is a
    /// type mismatch.
    pub fn with_extraction(
        template: impl Into<String>,
        engine: Arc<dyn TemplateEngine>,
        prompt_config: PromptTemplateConfig<S>,
        options: ExtractOptions,
    ) -> Result<Self, ConfigError> {
        debug!(?options, "ChatPromptTemplate::with_extraction: called");
        let mut chat = Self::new(template, engine, prompt_config);
        let extension_data = &chat.prompt_config.execution_settings.extension_data;

        let mut messages = Vec::new();
        if options.system_prompt {
            extract_system_prompt(extension_data, &chat.engine, &mut messages)?;
        }
        if options.messages {
            extract_messages(extension_data, &chat.engine, &mut messages)?;
        }

        debug!(
            message_count = messages.len(),
            "ChatPromptTemplate::with_extraction: extracted"
        );
        chat.messages = messages;
        Ok(chat)
    }

    /// Rebuild a chat template from persisted `(role, message)` pairs
    pub fn restore<I, R, M>(
        messages: I,
        template: impl Into<String>,
        engine: Arc<dyn TemplateEngine>,
        prompt_config: PromptTemplateConfig<S>,
    ) -> Self
    where
        I: IntoIterator<Item = (R, M)>,
        R: Into<String>,
        M: Into<String>,
    {
        debug!("ChatPromptTemplate::restore: called");
        let mut chat = Self::new(template, engine, prompt_config);
        chat.messages = messages
            .into_iter()
            .map(|(role, message)| ChatMessageTemplate::new(role, message, chat.engine.clone()))
            .collect();
        chat
    }

    /// The base template text
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn engine(&self) -> &Arc<dyn TemplateEngine> {
        &self.engine
    }

    pub fn prompt_config(&self) -> &PromptTemplateConfig<S> {
        &self.prompt_config
    }

    /// Message templates in order
    pub fn messages(&self) -> &[ChatMessageTemplate] {
        &self.messages
    }

    /// Render every message, then the base template as a trailing user turn
    ///
    /// The base template is appended when there are no messages or the last
    /// one is a system or assistant turn, and only if it renders to
    /// non-empty text.
    pub fn render_messages(&self, context: &Value) -> Result<Vec<RenderedMessage>, RenderError> {
        debug!(
            message_count = self.messages.len(),
            "ChatPromptTemplate::render_messages: called"
        );
        let mut rendered = self
            .messages
            .iter()
            .map(|message| message.render(context))
            .collect::<Result<Vec<_>, _>>()?;

        let wants_user_turn = self
            .messages
            .last()
            .is_none_or(|m| m.role == ROLE_SYSTEM || m.role == ROLE_ASSISTANT);
        if wants_user_turn && !self.template.is_empty() {
            let content = self.engine.render(&self.template, context)?;
            if content.is_empty() {
                debug!("ChatPromptTemplate::render_messages: base template rendered empty, no user turn");
            } else {
                debug!("ChatPromptTemplate::render_messages: appending base template as user turn");
                rendered.push(RenderedMessage {
                    role: ROLE_USER.to_string(),
                    content,
                });
            }
        }

        Ok(rendered)
    }

    /// Render against any serializable context
    pub fn render_messages_with<C: Serialize>(&self, context: &C) -> Result<Vec<RenderedMessage>, RenderError> {
        let context = serde_json::to_value(context)?;
        self.render_messages(&context)
    }
}

fn extract_system_prompt(
    extension_data: &Map<String, Value>,
    engine: &Arc<dyn TemplateEngine>,
    out: &mut Vec<ChatMessageTemplate>,
) -> Result<(), ConfigError> {
    match extension_data.get(CHAT_SYSTEM_PROMPT_KEY) {
        None | Some(Value::Null) => {
            debug!("extract_system_prompt: no system prompt");
            Ok(())
        }
        Some(Value::String(prompt)) if prompt.is_empty() => {
            debug!("extract_system_prompt: empty system prompt");
            Ok(())
        }
        Some(Value::String(prompt)) => {
            debug!(prompt_len = prompt.len(), "extract_system_prompt: adding system message");
            out.push(ChatMessageTemplate::new(ROLE_SYSTEM, prompt.as_str(), engine.clone()));
            Ok(())
        }
        Some(other) => Err(ConfigError::mismatch(
            CHAT_SYSTEM_PROMPT_KEY,
            format!("expected a string, found {}", kind_of(other)),
        )),
    }
}

fn extract_messages(
    extension_data: &Map<String, Value>,
    engine: &Arc<dyn TemplateEngine>,
    out: &mut Vec<ChatMessageTemplate>,
) -> Result<(), ConfigError> {
    let entries = match extension_data.get(MESSAGES_KEY) {
        None | Some(Value::Null) => {
            debug!("extract_messages: no messages");
            return Ok(());
        }
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(ConfigError::mismatch(
                MESSAGES_KEY,
                format!("expected an array, found {}", kind_of(other)),
            ));
        }
    };

    debug!(entry_count = entries.len(), "extract_messages: converting entries");
    for (index, entry) in entries.iter().enumerate() {
        let (role, content) = message_entry(entry).ok_or_else(|| {
            ConfigError::mismatch(
                MESSAGES_KEY,
                format!("entry {} must be an object with string 'role' and 'content'", index),
            )
        })?;
        out.push(ChatMessageTemplate::new(role, content, engine.clone()));
    }
    Ok(())
}

/// Role and text of one message entry; text may be under `content` or `message`
fn message_entry(entry: &Value) -> Option<(&str, &str)> {
    let role = entry.get("role")?.as_str()?;
    let content = entry.get("content").or_else(|| entry.get("message"))?.as_str()?;
    Some((role, content))
}
