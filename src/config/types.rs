//! Configuration type definitions.
//!
//! This module contains all the data structures used in `docweave.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::transform::{
    DEFAULT_STYLE_SHEET_PATH, OutputFormat, OutputFormats, SectionKind, StyledSpanElement,
};

// =============================================================================
// Root
// =============================================================================

/// The whole project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocweaveConfig {
    pub project: ProjectConfig,
    /// Output formats to build
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub mods: ModsConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

impl DocweaveConfig {
    /// The configured formats as a set.
    pub fn format_set(&self) -> OutputFormats {
        self.formats.iter().copied().collect()
    }
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Website]
}

// =============================================================================
// Project
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// The name of the documentation project
    pub name: String,
    /// Directory containing topic XML files
    #[serde(default = "default_topics")]
    pub topics: PathBuf,
    /// Output directory for the build
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Language of the resource items, e.g. `en-US`
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_topics() -> PathBuf {
    "topics".into()
}

fn default_output() -> PathBuf {
    "_output".into()
}

pub(crate) fn default_language() -> String {
    "en-US".to_string()
}

// =============================================================================
// Presentation
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Relative path of stylesheets inside HTML output
    #[serde(default = "default_style_sheet_path")]
    pub style_sheet_path: String,
    /// Folder with resource item files and stylesheets
    #[serde(default = "default_resources")]
    pub resources: PathBuf,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            style_sheet_path: default_style_sheet_path(),
            resources: default_resources(),
        }
    }
}

fn default_style_sheet_path() -> String {
    DEFAULT_STYLE_SHEET_PATH.to_string()
}

fn default_resources() -> PathBuf {
    "resources".into()
}

// =============================================================================
// Presentation style modifications
// =============================================================================

/// Changes applied to the default presentation style during setup.
///
/// ```yaml
/// mods:
///   move_sections:
///     - section: remarks
///       before: see_also
///   remove_sections: [exceptions]
///   custom_section:
///     name: PresentationStyleModsCustomSection
///     element: customSection
///     after: summary
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_moves")]
    pub move_sections: Vec<SectionMove>,
    #[serde(default)]
    pub remove_sections: Vec<SectionKind>,
    #[serde(default = "default_custom_section")]
    pub custom_section: Option<CustomSectionConfig>,
    /// Stylesheet linked from HTML output and copied next to it
    #[serde(default = "default_stylesheet")]
    pub stylesheet: Option<String>,
    #[serde(default = "default_custom_element")]
    pub custom_element: Option<CustomElementConfig>,
}

impl Default for ModsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            move_sections: default_moves(),
            remove_sections: Vec::new(),
            custom_section: default_custom_section(),
            stylesheet: default_stylesheet(),
            custom_element: default_custom_element(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_moves() -> Vec<SectionMove> {
    vec![SectionMove {
        section: SectionKind::Remarks,
        before: Some(SectionKind::SeeAlso),
        after: None,
    }]
}

fn default_custom_section() -> Option<CustomSectionConfig> {
    Some(CustomSectionConfig::default())
}

fn default_stylesheet() -> Option<String> {
    Some("PresentationStyleMods.css".to_string())
}

fn default_custom_element() -> Option<CustomElementConfig> {
    Some(CustomElementConfig::default())
}

/// Move one section next to another. Exactly one of `before` and `after`
/// must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMove {
    pub section: SectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<SectionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<SectionKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSectionConfig {
    /// Name of the custom section identity
    #[serde(default = "default_custom_section_name")]
    pub name: String,
    /// Source element rendered by the section
    #[serde(default = "default_custom_section_element")]
    pub element: String,
    /// Section the custom section is placed after
    #[serde(default = "default_custom_section_anchor")]
    pub after: SectionKind,
    /// Prefix of the generated section id
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    /// Resource item used as the section title
    #[serde(default = "default_title_item")]
    pub title_item: Option<String>,
}

impl Default for CustomSectionConfig {
    fn default() -> Self {
        Self {
            name: default_custom_section_name(),
            element: default_custom_section_element(),
            after: default_custom_section_anchor(),
            id_prefix: default_id_prefix(),
            title_item: default_title_item(),
        }
    }
}

fn default_custom_section_name() -> String {
    "PresentationStyleModsCustomSection".to_string()
}

fn default_custom_section_element() -> String {
    "customSection".to_string()
}

fn default_custom_section_anchor() -> SectionKind {
    SectionKind::Summary
}

fn default_id_prefix() -> String {
    "CS_".to_string()
}

fn default_title_item() -> Option<String> {
    Some("title_customSection".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomElementConfig {
    #[serde(default = "default_custom_element_name")]
    pub name: String,
    /// Style class used when the element has no `style` attribute
    #[serde(default = "default_style")]
    pub default_style: String,
}

impl Default for CustomElementConfig {
    fn default() -> Self {
        Self {
            name: default_custom_element_name(),
            default_style: default_style(),
        }
    }
}

fn default_custom_element_name() -> String {
    "customElement".to_string()
}

fn default_style() -> String {
    StyledSpanElement::DEFAULT_STYLE.to_string()
}

// =============================================================================
// Build
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Maximum number of topics rendered at the same time
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
        }
    }
}

fn default_jobs() -> usize {
    4
}
