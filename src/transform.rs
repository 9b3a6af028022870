//! The rendering core.
//!
//! A [`TopicTransformation`] holds an ordered section registry and an
//! element registry. Rendering a [`Topic`] creates a fresh
//! [`RenderContext`], runs the render hooks, then walks the section handlers
//! in registry order; each handler renders its content by dispatching source
//! elements to the element handlers.

mod context;
mod element;
mod elements;
mod error;
mod format;
mod node;
mod output;
mod parse;
mod section;
mod sections;
mod strings;
mod transformation;

pub use context::RenderContext;
pub use elements::{NamedSection, StyledSpanElement};
pub use error::{RenderError, SetupError};
pub use format::{OutputFormat, OutputFormats};
pub use node::Topic;
pub use parse::{ParseError, parse_element_tree, parse_topic};
pub use section::{SectionHandler, SectionKind};
pub use strings::StringTable;
pub use transformation::{DEFAULT_STYLE_SHEET_PATH, RenderHook, TopicTransformation};

#[cfg(test)]
pub use node::{Element, TopicKind};
