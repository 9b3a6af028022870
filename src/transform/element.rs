//! Element handler registry.
//!
//! Handlers are looked up by source element name. Registering a name that is
//! already present replaces the previous handler, which is how presentation
//! mods override built-in rendering.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::context::RenderContext;
use super::error::RenderError;
use super::node::Element;

/// Renders one kind of source element.
pub trait ElementHandler: Send + Sync {
    /// The source element name this handler renders.
    fn name(&self) -> &str;

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError>;
}

/// An element handler backed by a closure.
#[allow(dead_code)]
pub struct FnElement<F> {
    name: String,
    render: F,
}

#[allow(dead_code)]
impl<F> FnElement<F>
where
    F: Fn(&mut RenderContext<'_>, &Element) -> Result<(), RenderError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, render: F) -> Self {
        Self {
            name: name.into(),
            render,
        }
    }
}

impl<F> ElementHandler for FnElement<F>
where
    F: Fn(&mut RenderContext<'_>, &Element) -> Result<(), RenderError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        (self.render)(ctx, element)
    }
}

/// Registry of element handlers keyed by element name.
#[derive(Clone, Default)]
pub struct ElementRegistry {
    handlers: HashMap<String, Arc<dyn ElementHandler>>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any handler with the same name.
    pub fn register<H: ElementHandler + 'static>(&mut self, handler: H) {
        let name = handler.name().to_owned();
        if self.handlers.insert(name.clone(), Arc::new(handler)).is_some() {
            tracing::debug!(element = %name, "replaced element handler");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ElementHandler>> {
        self.handlers.get(name)
    }

    /// Registered element names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("names", &self.names())
            .finish()
    }
}
