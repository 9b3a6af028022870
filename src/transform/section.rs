//! Ordered section handler registry.
//!
//! The output order of an API topic's sections is exactly the order of this
//! registry when the topic is rendered, so every mutation preserves one
//! invariant: no two handlers share a [`SectionKind`]. Inserting a handler
//! whose kind is already present moves it instead of duplicating it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::context::RenderContext;
use super::error::{RenderError, SetupError};

/// Identity of a section: a built-in kind, or a named custom one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SectionKind {
    Summary,
    Parameters,
    Returns,
    Remarks,
    Examples,
    Exceptions,
    SeeAlso,
    Custom(String),
}

impl SectionKind {
    const BUILT_IN: [(SectionKind, &'static str); 7] = [
        (SectionKind::Summary, "summary"),
        (SectionKind::Parameters, "parameters"),
        (SectionKind::Returns, "returns"),
        (SectionKind::Remarks, "remarks"),
        (SectionKind::Examples, "examples"),
        (SectionKind::Exceptions, "exceptions"),
        (SectionKind::SeeAlso, "see_also"),
    ];

    /// A custom section kind. The name must not be empty.
    pub fn custom(name: impl Into<String>) -> Result<Self, SetupError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SetupError::EmptyCustomSectionName);
        }
        Ok(SectionKind::Custom(name))
    }

    /// Rejects a blank custom name, including one built without
    /// [`custom`](Self::custom).
    fn validate(&self) -> Result<(), SetupError> {
        match self {
            SectionKind::Custom(name) if name.trim().is_empty() => {
                Err(SetupError::EmptyCustomSectionName)
            }
            _ => Ok(()),
        }
    }

    /// Name used in configuration and logs.
    pub fn name(&self) -> &str {
        match self {
            SectionKind::Custom(name) => name,
            built_in => Self::BUILT_IN
                .iter()
                .find(|(kind, _)| kind == built_in)
                .map_or("", |(_, name)| *name),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Custom(name) => write!(f, "custom:{name}"),
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for SectionKind {
    type Err = String;

    /// Parses `summary`, `see_also`, ... or `custom:<Name>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("custom:") {
            return SectionKind::custom(name).map_err(|e| e.to_string());
        }
        let normalized = s.to_ascii_lowercase().replace('-', "_");
        let normalized = if normalized == "seealso" {
            "see_also".to_owned()
        } else {
            normalized
        };
        Self::BUILT_IN
            .iter()
            .find(|(_, name)| *name == normalized)
            .map(|(kind, _)| kind.clone())
            .ok_or_else(|| format!("unknown section '{s}' (custom sections are written 'custom:<Name>')"))
    }
}

impl TryFrom<String> for SectionKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        kind.to_string()
    }
}

/// Renders one section of a topic.
///
/// Implementations decide for themselves whether their content is present
/// in the source and do nothing when it is not.
pub trait SectionRenderer: Send + Sync {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError>;
}

impl<F> SectionRenderer for F
where
    F: Fn(&mut RenderContext<'_>) -> Result<(), RenderError> + Send + Sync,
{
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self(ctx)
    }
}

/// A section identity paired with its renderer.
#[derive(Clone)]
pub struct SectionHandler {
    kind: SectionKind,
    renderer: Arc<dyn SectionRenderer>,
}

impl SectionHandler {
    pub fn new<R: SectionRenderer + 'static>(kind: SectionKind, renderer: R) -> Self {
        Self {
            kind,
            renderer: Arc::new(renderer),
        }
    }

    /// Build a handler from a closure.
    pub fn from_fn<F>(kind: SectionKind, render: F) -> Self
    where
        F: Fn(&mut RenderContext<'_>) -> Result<(), RenderError> + Send + Sync + 'static,
    {
        Self::new(kind, render)
    }

    pub fn kind(&self) -> &SectionKind {
        &self.kind
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.renderer.render(ctx)
    }
}

impl fmt::Debug for SectionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionHandler")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered, identity-unique sequence of section handlers.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    handlers: Vec<SectionHandler>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler.
    ///
    /// Fails if its kind is already registered; use
    /// [`insert_before`](Self::insert_before) or
    /// [`insert_after`](Self::insert_after) to move an existing section.
    pub fn register(&mut self, handler: SectionHandler) -> Result<(), SetupError> {
        handler.kind.validate()?;
        if self.position(&handler.kind).is_some() {
            return Err(SetupError::DuplicateSectionIdentity(handler.kind));
        }
        self.handlers.push(handler);
        Ok(())
    }

    /// Place `handler` immediately before the section `anchor`.
    ///
    /// If `handler`'s kind is already registered elsewhere it is moved.
    /// Anchoring a handler to its own kind leaves the registry unchanged.
    pub fn insert_before(
        &mut self,
        anchor: &SectionKind,
        handler: SectionHandler,
    ) -> Result<(), SetupError> {
        self.insert_relative(anchor, handler, 0)
    }

    /// Place `handler` immediately after the section `anchor`.
    ///
    /// Same move semantics as [`insert_before`](Self::insert_before).
    pub fn insert_after(
        &mut self,
        anchor: &SectionKind,
        handler: SectionHandler,
    ) -> Result<(), SetupError> {
        self.insert_relative(anchor, handler, 1)
    }

    fn insert_relative(
        &mut self,
        anchor: &SectionKind,
        handler: SectionHandler,
        offset: usize,
    ) -> Result<(), SetupError> {
        handler.kind.validate()?;
        if self.position(anchor).is_none() {
            return Err(SetupError::SectionNotFound(anchor.clone()));
        }
        if handler.kind == *anchor {
            return Ok(());
        }

        if let Some(existing) = self.position(&handler.kind) {
            self.handlers.remove(existing);
        }

        // The anchor may have shifted after the removal above.
        let target = self
            .position(anchor)
            .ok_or_else(|| SetupError::SectionNotFound(anchor.clone()))?;
        self.handlers.insert(target + offset, handler);
        Ok(())
    }

    /// Remove a section. Absent sections are ignored.
    pub fn remove(&mut self, kind: &SectionKind) -> Option<SectionHandler> {
        self.position(kind).map(|index| self.handlers.remove(index))
    }

    /// The handler registered for `kind`, if any.
    pub fn handler_for(&self, kind: &SectionKind) -> Option<&SectionHandler> {
        self.handlers.iter().find(|h| h.kind == *kind)
    }

    /// Section kinds in render order.
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.handlers.iter().map(|h| h.kind.clone()).collect()
    }

    pub fn handlers(&self) -> &[SectionHandler] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn position(&self, kind: &SectionKind) -> Option<usize> {
        self.handlers.iter().position(|h| h.kind == *kind)
    }
}
