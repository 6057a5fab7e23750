//! Template engines
//!
//! Templates are stored next to the engine that will later render them; nothing
//! in config construction ever calls [`TemplateEngine::render`].

use handlebars::Handlebars;
use serde_json::Value;
use tracing::debug;

use crate::error::RenderError;

/// Expands placeholders in template text against a variable context
pub trait TemplateEngine: Send + Sync + std::fmt::Debug {
    /// Render `template` with the variables in `context`
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError>;
}

/// Handlebars-backed template engine
///
/// Output is not HTML-escaped; prompts are plain text.
#[derive(Debug)]
pub struct HandlebarsEngine {
    hbs: Handlebars<'static>,
}

impl HandlebarsEngine {
    /// Create an engine that leaves missing variables blank
    pub fn new() -> Self {
        debug!("HandlebarsEngine::new: called");
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs }
    }

    /// Create an engine that fails on missing variables
    pub fn strict() -> Self {
        debug!("HandlebarsEngine::strict: called");
        let mut engine = Self::new();
        engine.hbs.set_strict_mode(true);
        engine
    }
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError> {
        debug!(template_len = template.len(), "HandlebarsEngine::render: called");
        Ok(self.hbs.render_template(template, context)?)
    }
}
