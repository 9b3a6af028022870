//! Configuration loading from files.
//!
//! The YAML file is read through the `config` crate, then `DOCWEAVE_*`
//! environment variables are layered on top (`__` separates nested keys).

use std::path::{Path, PathBuf};

use config::{Environment, File, FileFormat};

use super::{ConfigError, DEFAULT_CONFIG_FILE, DocweaveConfig, ENV_PREFIX};

impl DocweaveConfig {
    /// Resolve the config path from the command line argument, defaulting to
    /// `docweave.yaml` in the current directory.
    pub fn resolve_path(config_file: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        if config_file.is_relative() {
            Ok(std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file))
        } else {
            Ok(config_file.to_path_buf())
        }
    }

    /// Load the config from the command line argument.
    pub async fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = Self::resolve_path(config_file)?;
        Self::load_from_file(&config_file).await
    }

    /// Load and validate the config from a file path.
    pub(crate) async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_environment(path, environment()).await
    }

    async fn load_with_environment(
        path: &Path,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let config = config::Config::builder()
            .add_source(File::new(path_str, FileFormat::Yaml))
            .add_source(environment)
            .build()?
            .try_deserialize::<DocweaveConfig>()?;

        config.validate()?;
        Ok(config)
    }
}

/// `DOCWEAVE_BUILD__JOBS=8` sets `build.jobs`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{OutputFormat, OutputFormats, SectionKind};

    async fn load(yaml: &str) -> Result<DocweaveConfig, ConfigError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docweave.yaml");
        std::fs::write(&path, yaml).unwrap();
        DocweaveConfig::load_from_file(&path).await
    }

    #[tokio::test]
    async fn test_minimal_config_uses_defaults() {
        let config = load("project:\n  name: Sample\n").await.unwrap();

        assert_eq!(config.project.name, "Sample");
        assert_eq!(config.project.output, PathBuf::from("_output"));
        assert_eq!(config.project.language, "en-US");
        assert_eq!(config.formats, vec![OutputFormat::Website]);
        assert_eq!(config.presentation.style_sheet_path, "styles/");
        assert_eq!(config.build.jobs, 4);

        assert!(config.mods.enabled);
        assert_eq!(config.mods.move_sections.len(), 1);
        assert_eq!(config.mods.move_sections[0].section, SectionKind::Remarks);
        assert_eq!(
            config.mods.custom_section.as_ref().map(|c| c.after.clone()),
            Some(SectionKind::Summary)
        );
        assert_eq!(
            config.mods.custom_element.as_ref().map(|c| c.default_style.as_str()),
            Some("Style1")
        );
    }

    #[tokio::test]
    async fn test_full_config() {
        let yaml = r#"
project:
  name: Sample
  topics: src/topics
  language: de-DE
formats: [html_help1, website, markdown]
presentation:
  style_sheet_path: css/
mods:
  move_sections:
    - section: examples
      after: summary
  remove_sections: [exceptions]
  custom_section:
    name: Extras
    element: extras
    after: remarks
build:
  jobs: 2
"#;
        let config = load(yaml).await.unwrap();

        assert_eq!(
            config.format_set(),
            OutputFormats::HTML_HELP_1 | OutputFormats::WEBSITE | OutputFormats::MARKDOWN
        );
        assert_eq!(config.project.language, "de-DE");
        assert_eq!(config.presentation.style_sheet_path, "css/");
        assert_eq!(config.mods.remove_sections, vec![SectionKind::Exceptions]);
        assert_eq!(
            config.mods.move_sections[0].after,
            Some(SectionKind::Summary)
        );
        let custom = config.mods.custom_section.unwrap();
        assert_eq!(custom.name, "Extras");
        assert_eq!(custom.after, SectionKind::Remarks);
        assert_eq!(custom.id_prefix, "CS_");
        assert_eq!(config.build.jobs, 2);
    }

    #[tokio::test]
    async fn test_move_needs_one_anchor() {
        let yaml = "project:\n  name: Sample\nmods:\n  move_sections:\n    - section: remarks\n";
        let err = load(yaml).await.unwrap_err();
        assert!(err.to_string().contains("exactly one of 'before' or 'after'"));
    }

    #[tokio::test]
    async fn test_unknown_section_rejected() {
        let yaml = "project:\n  name: Sample\nmods:\n  remove_sections: [bogus]\n";
        assert!(matches!(load(yaml).await, Err(ConfigError::Deserialize(_))));
    }

    #[tokio::test]
    async fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docweave.yaml");
        std::fs::write(&path, "project:\n  name: Sample\nbuild:\n  jobs: 2\n").unwrap();

        let vars: config::Map<String, String> = [
            ("DOCWEAVE_BUILD__JOBS", "8"),
            ("DOCWEAVE_PROJECT__LANGUAGE", "de-DE"),
            ("OTHER_BUILD__JOBS", "16"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let config = DocweaveConfig::load_with_environment(&path, environment().source(Some(vars)))
            .await
            .unwrap();
        assert_eq!(config.build.jobs, 8);
        assert_eq!(config.project.language, "de-DE");
        assert_eq!(config.project.name, "Sample");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocweaveConfig::load_from_file(&dir.path().join("nope.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
