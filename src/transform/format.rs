//! Output formats and the rendering strategy each combination selects.
//!
//! A build may target several formats at once. The rich HTML formats share
//! one render, while the reduced formats (flow document and markdown) each
//! need their own, because handlers degrade their markup differently for
//! them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RenderError;

bitflags::bitflags! {
    /// A set of output formats.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutputFormats: u32 {
        /// Compiled HTML Help 1 (`.chm`) output.
        const HTML_HELP_1 = 1 << 0;
        /// Website output.
        const WEBSITE = 1 << 1;
        /// Open XML flow document output.
        const OPEN_XML = 1 << 2;
        /// Plain markdown output.
        const MARKDOWN = 1 << 3;

        /// Formats rendered with full structural fidelity.
        const RICH = Self::HTML_HELP_1.bits() | Self::WEBSITE.bits();
    }
}

/// A single output format, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    HtmlHelp1,
    Website,
    OpenXml,
    Markdown,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::HtmlHelp1,
        OutputFormat::Website,
        OutputFormat::OpenXml,
        OutputFormat::Markdown,
    ];

    /// Name of the folder this format's output is written to.
    pub fn folder_name(self) -> &'static str {
        match self {
            OutputFormat::HtmlHelp1 => "HtmlHelp1",
            OutputFormat::Website => "Website",
            OutputFormat::OpenXml => "OpenXml",
            OutputFormat::Markdown => "Markdown",
        }
    }

    /// File extension of a rendered topic (without dot).
    pub fn topic_extension(self) -> &'static str {
        match self {
            OutputFormat::HtmlHelp1 | OutputFormat::Website => "htm",
            OutputFormat::OpenXml => "xml",
            OutputFormat::Markdown => "md",
        }
    }

    /// Whether rendered topics live under an `html/` sub-folder.
    pub fn uses_html_folder(self) -> bool {
        matches!(self, OutputFormat::HtmlHelp1 | OutputFormat::Website)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::HtmlHelp1 => "html_help1",
            OutputFormat::Website => "website",
            OutputFormat::OpenXml => "open_xml",
            OutputFormat::Markdown => "markdown",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('-', "_");
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
            .ok_or_else(|| format!("unknown output format: {s}"))
    }
}

impl From<OutputFormat> for OutputFormats {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::HtmlHelp1 => OutputFormats::HTML_HELP_1,
            OutputFormat::Website => OutputFormats::WEBSITE,
            OutputFormat::OpenXml => OutputFormats::OPEN_XML,
            OutputFormat::Markdown => OutputFormats::MARKDOWN,
        }
    }
}

impl FromIterator<OutputFormat> for OutputFormats {
    fn from_iter<I: IntoIterator<Item = OutputFormat>>(iter: I) -> Self {
        iter.into_iter()
            .fold(OutputFormats::empty(), |set, format| set | format.into())
    }
}

impl OutputFormats {
    /// The individual formats contained in this set, in declaration order.
    pub fn formats(self) -> Vec<OutputFormat> {
        OutputFormat::ALL
            .into_iter()
            .filter(|format| self.contains((*format).into()))
            .collect()
    }

    /// Split the set into combinations that can each be rendered in one pass.
    ///
    /// Rich formats share a pass; each reduced format gets its own.
    pub fn render_passes(self) -> Vec<OutputFormats> {
        let mut passes = Vec::new();
        let rich = self & OutputFormats::RICH;
        if !rich.is_empty() {
            passes.push(rich);
        }
        for reduced in [OutputFormats::OPEN_XML, OutputFormats::MARKDOWN] {
            if self.contains(reduced) {
                passes.push(reduced);
            }
        }
        passes
    }
}

impl fmt::Display for OutputFormats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.formats().into_iter().map(OutputFormat::as_str).collect();
        if names.is_empty() {
            f.write_str("(none)")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// How handlers render for a given format set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Full structural markup with style classes and section wrappers.
    Structured,
    /// Flow document output: no custom styling, no wrapper elements.
    FlowDocument,
    /// Plain markdown output: no custom styling, no wrapper elements.
    Markdown,
}

impl RenderStrategy {
    /// Select the strategy for a format set.
    pub fn for_formats(formats: OutputFormats) -> Result<Self, RenderError> {
        if formats.is_empty() {
            return Err(RenderError::EmptyFormatSet);
        }
        if OutputFormats::RICH.contains(formats) {
            return Ok(RenderStrategy::Structured);
        }
        if formats == OutputFormats::OPEN_XML {
            return Ok(RenderStrategy::FlowDocument);
        }
        if formats == OutputFormats::MARKDOWN {
            return Ok(RenderStrategy::Markdown);
        }
        Err(RenderError::UnsupportedFormatCombination(formats))
    }

    /// Whether this strategy lacks rich structural support.
    pub fn is_reduced(self) -> bool {
        !matches!(self, RenderStrategy::Structured)
    }

    /// Extension of linked topic files, or `None` when the format has no
    /// inter-topic links.
    pub fn link_extension(self) -> Option<&'static str> {
        match self {
            RenderStrategy::Structured => Some("htm"),
            RenderStrategy::FlowDocument => None,
            RenderStrategy::Markdown => Some("md"),
        }
    }
}
