//! Prompt Loader
//!
//! Loads prompt directories from disk. Each prompt lives in its own directory:
//!
//! ```text
//! prompts/
//! └── summarize/
//!     ├── skprompt.txt   # template text
//!     └── config.json    # optional; config.yml / config.yaml also accepted
//! ```
//!
//! Loading chain:
//! 1. `.promptconfig/prompts/{name}/` (user override)
//! 2. `prompts/{name}/` (repo default)
//!
//! A prompt without a config file gets the default config.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use crate::chat::{ChatPromptTemplate, ExtractOptions};
use crate::config::PromptTemplateConfig;
use crate::engine::TemplateEngine;
use crate::settings::SettingsShape;

/// File holding the template text
pub const PROMPT_FILE: &str = "skprompt.txt";

const JSON_CONFIG_FILE: &str = "config.json";
const YAML_CONFIG_FILES: [&str; 2] = ["config.yml", "config.yaml"];

/// A prompt read from disk
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPrompt<S> {
    pub name: String,

    /// Template text, unrendered
    pub template: String,

    pub config: PromptTemplateConfig<S>,

    /// Directory the prompt was read from
    pub source: PathBuf,
}

/// Finds and reads prompt directories
#[derive(Debug, Clone)]
pub struct PromptLoader {
    /// User override directory (e.g., `.promptconfig/prompts/`)
    user_dir: Option<PathBuf>,
    /// Repo default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader rooted at a project directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, "PromptLoader::new: called");
        Self::with_dirs(
            Some(root.join(".promptconfig/prompts")),
            Some(root.join("prompts")),
        )
    }

    /// Create a loader over explicit directories; missing ones are skipped
    pub fn with_dirs(user_dir: Option<PathBuf>, repo_dir: Option<PathBuf>) -> Self {
        let user_dir = user_dir.filter(|dir| dir.is_dir());
        let repo_dir = repo_dir.filter(|dir| dir.is_dir());
        debug!(?user_dir, ?repo_dir, "PromptLoader::with_dirs: resolved directories");
        Self { user_dir, repo_dir }
    }

    fn search_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.user_dir.iter().chain(self.repo_dir.iter())
    }

    /// Locate a prompt directory, user override first
    fn find(&self, name: &str) -> Option<PathBuf> {
        debug!(%name, "PromptLoader::find: called");
        for dir in self.search_dirs() {
            let candidate = dir.join(name);
            if candidate.join(PROMPT_FILE).is_file() {
                debug!(?candidate, "PromptLoader::find: found");
                return Some(candidate);
            }
            debug!(?candidate, "PromptLoader::find: not here");
        }
        None
    }

    /// Load a prompt by name
    pub fn load<S: SettingsShape>(&self, name: &str) -> Result<LoadedPrompt<S>> {
        debug!(%name, "PromptLoader::load: called");
        let dir = self.find(name).ok_or_else(|| eyre!("Prompt not found: {}", name))?;

        let prompt_path = dir.join(PROMPT_FILE);
        let template = fs::read_to_string(&prompt_path)
            .with_context(|| format!("Failed to read prompt {}", prompt_path.display()))?;
        let config = load_config(&dir)?;

        info!("Loaded prompt '{}' from {}", name, dir.display());
        Ok(LoadedPrompt {
            name: name.to_string(),
            template,
            config,
            source: dir,
        })
    }

    /// Load a prompt as a chat template
    pub fn load_chat<S: SettingsShape>(
        &self,
        name: &str,
        engine: Arc<dyn TemplateEngine>,
        options: ExtractOptions,
    ) -> Result<ChatPromptTemplate<S>> {
        debug!(%name, ?options, "PromptLoader::load_chat: called");
        let prompt = self.load::<S>(name)?;
        ChatPromptTemplate::with_extraction(prompt.template, engine, prompt.config, options)
            .with_context(|| format!("Failed to build chat prompt {}", name))
    }

    /// Names of all loadable prompts, sorted
    pub fn available(&self) -> Result<Vec<String>> {
        debug!("PromptLoader::available: called");
        let mut names = BTreeSet::new();
        for dir in self.search_dirs() {
            let entries = fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
            for entry in entries {
                let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
                let path = entry.path();
                if !path.join(PROMPT_FILE).is_file() {
                    continue;
                }
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names.into_iter().collect())
    }
}

fn load_config<S: SettingsShape>(dir: &Path) -> Result<PromptTemplateConfig<S>> {
    let json_path = dir.join(JSON_CONFIG_FILE);
    if json_path.is_file() {
        debug!(?json_path, "load_config: reading JSON config");
        let text = fs::read_to_string(&json_path)
            .with_context(|| format!("Failed to read config {}", json_path.display()))?;
        return PromptTemplateConfig::from_json(&text)
            .with_context(|| format!("Failed to parse config {}", json_path.display()));
    }

    for file in YAML_CONFIG_FILES {
        let yaml_path = dir.join(file);
        if yaml_path.is_file() {
            debug!(?yaml_path, "load_config: reading YAML config");
            let text = fs::read_to_string(&yaml_path)
                .with_context(|| format!("Failed to read config {}", yaml_path.display()))?;
            return PromptTemplateConfig::from_yaml(&text)
                .with_context(|| format!("Failed to parse config {}", yaml_path.display()));
        }
    }

    debug!(?dir, "load_config: no config file, using defaults");
    Ok(PromptTemplateConfig::default())
}
