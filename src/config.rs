//! Compiler configuration
//!
//! Values come from the environment (after `.env` has been loaded by the
//! binary) and can be overridden by command-line flags.

use crate::error::{Result, SemanticError};
use serde::{Deserialize, Serialize};

/// Dataset under which every semantic view is created.
pub const DEFAULT_SEMANTIC_DATASET: &str = "semantic_views";

pub const DATASET_ENV: &str = "SEMANTIC_VIEWS_DATASET";
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Sub-namespace placed between the project and the view name.
    pub semantic_dataset: String,
    /// Namespace used when a request does not carry one.
    #[serde(default)]
    pub default_namespace: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            semantic_dataset: DEFAULT_SEMANTIC_DATASET.to_string(),
            default_namespace: None,
        }
    }
}

impl CompilerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dataset) = lookup(DATASET_ENV) {
            config = config.with_dataset(dataset)?;
        }
        config.default_namespace = lookup(PROJECT_ENV)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(config)
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Result<Self> {
        let dataset = dataset.into();
        let dataset = dataset.trim();
        if dataset.is_empty() {
            return Err(SemanticError::Config(
                "semantic dataset name must not be empty".to_string(),
            ));
        }
        if dataset.contains('`') || dataset.contains('.') {
            return Err(SemanticError::Config(format!(
                "semantic dataset name '{}' must be a single unquoted identifier",
                dataset
            )));
        }
        self.semantic_dataset = dataset.to_string();
        Ok(self)
    }

    /// Namespace to compile under: the explicit one if given, else the configured default.
    pub fn namespace_or_default<'a>(&'a self, explicit: &'a str) -> &'a str {
        if explicit.is_empty() {
            self.default_namespace.as_deref().unwrap_or(explicit)
        } else {
            explicit
        }
    }
}
