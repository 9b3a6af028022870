//! Setup and render error types.

use std::fmt;

use super::format::OutputFormats;
use super::section::SectionKind;

/// Errors raised while configuring the handler registries.
///
/// These fail the build immediately: they mean the configuration is wrong.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("section '{0}' is already registered (use insert_before/insert_after to move it)")]
    DuplicateSectionIdentity(SectionKind),

    #[error("section '{0}' is not registered")]
    SectionNotFound(SectionKind),

    #[error("custom sections need a non-empty name")]
    EmptyCustomSectionName,

    #[error("handler registries cannot be changed once setup is complete")]
    SetupComplete,
}

/// Errors raised while rendering a topic.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("unsupported output format combination: {0}")]
    UnsupportedFormatCombination(OutputFormats),

    #[error("no output format selected")]
    EmptyFormatSet,

    #[error("rendering started before handler setup was completed")]
    SetupIncomplete,

    #[error("element '{element}' failed: {source}")]
    Element {
        element: String,
        #[source]
        source: Box<RenderError>,
    },

    #[error("{0}")]
    Handler(String),
}

impl RenderError {
    /// Create a free-form handler error.
    #[allow(dead_code)]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    pub(crate) fn in_element(element: &str, source: RenderError) -> Self {
        Self::Element {
            element: element.to_owned(),
            source: Box::new(source),
        }
    }
}

/// A render failure that aborted one topic.
///
/// Carries the topic identity and, when the failure happened inside a
/// section handler, that section. Other topics are unaffected.
#[derive(thiserror::Error, Debug)]
#[error("failed to render topic '{topic}'{}: {source}", section_suffix(.section.as_ref()))]
pub struct FatalRenderFailure {
    pub topic: String,
    pub section: Option<SectionKind>,
    #[source]
    pub source: RenderError,
}

fn section_suffix(section: Option<&SectionKind>) -> String {
    section.map_or_else(String::new, |s| format!(" in section '{s}'"))
}

/// A source node that was missing a required attribute.
///
/// Never fatal: the handler substitutes `fallback` and carries on. The
/// rendered topic keeps a list of these for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedSourceNode {
    pub element: String,
    pub attribute: String,
    pub fallback: String,
}

impl fmt::Display for MalformedSourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}> is missing '{}', using '{}'",
            self.element, self.attribute, self.fallback
        )
    }
}
