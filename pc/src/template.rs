//! Content templates and chat message templates

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::engine::TemplateEngine;
use crate::error::RenderError;

/// Template text paired with the engine that will render it
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Raw template text, unrendered
    pub template: String,

    engine: Arc<dyn TemplateEngine>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>, engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            template: template.into(),
            engine,
        }
    }

    /// The engine this template renders with
    pub fn engine(&self) -> &Arc<dyn TemplateEngine> {
        &self.engine
    }

    /// Render against a JSON context
    pub fn render(&self, context: &Value) -> Result<String, RenderError> {
        debug!(template_len = self.template.len(), "PromptTemplate::render: called");
        self.engine.render(&self.template, context)
    }

    /// Render against any serializable context
    pub fn render_with<C: Serialize>(&self, context: &C) -> Result<String, RenderError> {
        let context = serde_json::to_value(context)?;
        self.render(&context)
    }
}

/// One chat turn: a role and its not-yet-rendered content
#[derive(Debug, Clone)]
pub struct ChatMessageTemplate {
    /// Role label, e.g. "system", "user", "assistant"
    pub role: String,

    pub content_template: PromptTemplate,
}

impl ChatMessageTemplate {
    pub fn new(role: impl Into<String>, template: impl Into<String>, engine: Arc<dyn TemplateEngine>) -> Self {
        let role = role.into();
        debug!(%role, "ChatMessageTemplate::new: called");
        Self {
            role,
            content_template: PromptTemplate::new(template, engine),
        }
    }

    /// Render the content into a concrete message
    pub fn render(&self, context: &Value) -> Result<RenderedMessage, RenderError> {
        debug!(role = %self.role, "ChatMessageTemplate::render: called");
        Ok(RenderedMessage {
            role: self.role.clone(),
            content: self.content_template.render(context)?,
        })
    }
}

/// A chat message after rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub role: String,
    pub content: String,
}
