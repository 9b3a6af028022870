//! Per-topic render state shared by section and element handlers.

use super::element::ElementRegistry;
use super::error::{MalformedSourceNode, RenderError};
use super::format::{OutputFormats, RenderStrategy};
use super::node::{ContentNode, Element, Topic};
use super::output::{NodeId, OutputDocument};
use super::strings::StringTable;

/// Where a topic render currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    NotStarted,
    RenderingSections,
    Complete,
}

/// State for rendering one topic to one set of formats.
///
/// Created fresh for every topic render and never shared between topics.
/// Handlers read the source through [`comments`](Self::comments), write into
/// [`document_mut`](Self::document_mut) and recurse through
/// [`render_children`](Self::render_children).
pub struct RenderContext<'a> {
    topic: &'a Topic,
    formats: OutputFormats,
    strategy: RenderStrategy,
    elements: &'a ElementRegistry,
    strings: &'a StringTable,
    style_sheet_path: &'a str,
    document: OutputDocument,
    current: NodeId,
    state: RenderState,
    diagnostics: Vec<MalformedSourceNode>,
}

impl<'a> RenderContext<'a> {
    /// Fails when `formats` does not map to a single render strategy.
    pub fn new(
        topic: &'a Topic,
        formats: OutputFormats,
        elements: &'a ElementRegistry,
        strings: &'a StringTable,
        style_sheet_path: &'a str,
    ) -> Result<Self, RenderError> {
        let strategy = RenderStrategy::for_formats(formats)?;
        let document = OutputDocument::new();
        let current = document.body();
        Ok(Self {
            topic,
            formats,
            strategy,
            elements,
            strings,
            style_sheet_path,
            document,
            current,
            state: RenderState::NotStarted,
            diagnostics: Vec::new(),
        })
    }

    pub fn topic(&self) -> &'a Topic {
        self.topic
    }

    /// The topic's source root.
    pub fn comments(&self) -> &'a Element {
        self.topic.root()
    }

    pub fn formats(&self) -> OutputFormats {
        self.formats
    }

    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    /// True for OpenXml and Markdown, which have no collapsible sections or
    /// styled spans.
    pub fn is_reduced(&self) -> bool {
        self.strategy.is_reduced()
    }

    pub fn style_sheet_path(&self) -> &'a str {
        self.style_sheet_path
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: RenderState) {
        self.state = state;
    }

    pub fn document(&self) -> &OutputDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut OutputDocument {
        &mut self.document
    }

    /// The output node new content is appended to.
    pub fn current_element(&self) -> NodeId {
        self.current
    }

    /// Render `nodes` into `parent`, then restore the previous insertion point.
    pub fn render_children(
        &mut self,
        parent: NodeId,
        nodes: &[ContentNode],
    ) -> Result<(), RenderError> {
        let saved = self.current;
        self.current = parent;
        let result = nodes.iter().try_for_each(|node| self.render_node(node));
        self.current = saved;
        result
    }

    /// Render one source node at the current insertion point.
    ///
    /// Text is copied. Elements go to their registered handler; elements
    /// without one are transparent and only their children are rendered.
    pub fn render_node(&mut self, node: &ContentNode) -> Result<(), RenderError> {
        match node {
            ContentNode::Text(text) => {
                self.document.append_text(self.current, text);
                Ok(())
            }
            ContentNode::Element(element) => self.dispatch(element),
        }
    }

    /// Render an element through the element registry.
    pub fn dispatch(&mut self, element: &Element) -> Result<(), RenderError> {
        let elements = self.elements;
        match elements.get(element.name()) {
            Some(handler) => handler
                .render(self, element)
                .map_err(|source| RenderError::in_element(element.name(), source)),
            None => {
                let current = self.current;
                self.render_children(current, element.children())
            }
        }
    }

    /// Create a section title and content container.
    ///
    /// Structured output gets an `h2.sectionTitle` and a collapsible
    /// `div` carrying `id`. Reduced output gets a plain heading (with the id
    /// as a bookmark for OpenXml) and no container, so the caller renders
    /// the content at the current insertion point.
    ///
    /// Neither node is attached; the caller appends them.
    pub fn create_section(
        &mut self,
        id: &str,
        title_item: Option<&str>,
    ) -> (Option<NodeId>, Option<NodeId>) {
        let title_text = title_item.map(|item| self.resource_item(item));

        match self.strategy {
            RenderStrategy::Structured => {
                let title = title_text.map(|text| {
                    let h2 = self.document.create_element_with_class("h2", "sectionTitle");
                    self.document.append_text(h2, &text);
                    h2
                });
                let content = self
                    .document
                    .create_element_with_class("div", "collapsibleSection");
                self.document.set_attribute(content, "id", id);
                (title, Some(content))
            }
            RenderStrategy::FlowDocument | RenderStrategy::Markdown => {
                let title = title_text.map(|text| {
                    let h2 = self.document.create_element("h2");
                    if self.strategy == RenderStrategy::FlowDocument {
                        self.document.set_attribute(h2, "id", id);
                    }
                    self.document.append_text(h2, &text);
                    h2
                });
                (title, None)
            }
        }
    }

    /// Create a section at the current insertion point and return the node
    /// its content goes into: the wrapper when one was created, otherwise the
    /// current insertion point itself.
    pub fn open_section(&mut self, id: &str, title_item: Option<&str>) -> NodeId {
        let (title, content) = self.create_section(id, title_item);
        let current = self.current;
        if let Some(title) = title {
            self.document.append(current, title);
        }
        match content {
            Some(content) => {
                self.document.append(current, content);
                content
            }
            None => current,
        }
    }

    /// A document-unique id for an element's output, `prefix` + its unique id.
    pub fn section_id(&mut self, prefix: &str, element: &Element) -> String {
        let candidate = format!("{prefix}{}", element.unique_id());
        self.document.reserve_id(&candidate)
    }

    /// A localized resource item, or a readable fallback for unknown ids.
    pub fn resource_item(&self, id: &str) -> String {
        self.strings.get_or_fallback(id)
    }

    /// Attribute value, recording a malformed node and returning `fallback`
    /// when it is missing or blank.
    pub fn attribute_or_report<'e>(
        &mut self,
        element: &'e Element,
        attribute: &str,
        fallback: &'e str,
    ) -> &'e str {
        match element.attribute(attribute) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                self.report_malformed(element.name(), attribute, fallback);
                fallback
            }
        }
    }

    pub fn report_malformed(&mut self, element: &str, attribute: &str, fallback: &str) {
        let malformed = MalformedSourceNode {
            element: element.to_owned(),
            attribute: attribute.to_owned(),
            fallback: fallback.to_owned(),
        };
        tracing::debug!(topic = %self.topic.id(), "{malformed}");
        self.diagnostics.push(malformed);
    }

    pub fn diagnostics(&self) -> &[MalformedSourceNode] {
        &self.diagnostics
    }

    pub(crate) fn into_parts(self) -> (OutputDocument, Vec<MalformedSourceNode>) {
        (self.document, self.diagnostics)
    }
}
