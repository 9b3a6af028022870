//! Configuration loading and types for docweave.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)

mod load;
mod types;

pub use types::{BuildConfig, DocweaveConfig, ModsConfig, PresentationConfig, ProjectConfig};

#[cfg(test)]
pub use types::{CustomSectionConfig, SectionMove};

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "docweave.yaml";

/// Prefix of environment variables overriding config values, e.g.
/// `DOCWEAVE_BUILD__JOBS=8`.
pub const ENV_PREFIX: &str = "DOCWEAVE";

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("config path is not valid UTF-8: {0}")]
    EncodePath(std::path::PathBuf),

    #[error("config file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("{0}")]
    Validation(String),
}

// =============================================================================
// Validation
// =============================================================================

impl DocweaveConfig {
    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'project.name' must not be empty".to_string(),
            ));
        }
        if self.formats.is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'formats' must list at least one output format\n\nExample:\n  formats: [website, markdown]".to_string(),
            ));
        }
        if self.build.jobs == 0 {
            return Err(ConfigError::Validation(
                "invalid config: 'build.jobs' must be at least 1".to_string(),
            ));
        }
        for entry in &self.mods.move_sections {
            if entry.before.is_some() == entry.after.is_some() {
                return Err(ConfigError::Validation(format!(
                    "invalid config: move of section '{}' needs exactly one of 'before' or 'after'",
                    entry.section
                )));
            }
        }
        if let Some(custom) = &self.mods.custom_section {
            if custom.name.trim().is_empty() || custom.element.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "invalid config: 'mods.custom_section' needs a non-empty 'name' and 'element'"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}
