//! Read-only source content model.
//!
//! A topic's source is a tree of elements and text. Elements are numbered in
//! document order when the [`Topic`] is built, which gives each of them a
//! stable identity used for generated output ids.

use sha2::{Digest, Sha256};

/// Length of the hex id returned by [`Element::unique_id`].
const UNIQUE_ID_LEN: usize = 16;

/// A node in the source content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    Element(Element),
    Text(String),
}

impl ContentNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            ContentNode::Element(element) => Some(element),
            ContentNode::Text(_) => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn inner_text(&self) -> String {
        match self {
            ContentNode::Text(text) => text.clone(),
            ContentNode::Element(element) => element.inner_text(),
        }
    }
}

impl From<Element> for ContentNode {
    fn from(element: Element) -> Self {
        ContentNode::Element(element)
    }
}

/// A source element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<ContentNode>,
    /// Document-order position inside the owning topic.
    ordinal: usize,
    /// Id of the owning topic, set when the topic is built.
    topic_id: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            ordinal: 0,
            topic_id: String::new(),
        }
    }

    /// Set an attribute, replacing any previous value.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<ContentNode>) -> Self {
        self.push_child(child.into());
        self
    }

    pub(crate) fn push_child(&mut self, child: ContentNode) {
        if let ContentNode::Text(text) = &child
            && let Some(ContentNode::Text(last)) = self.children.last_mut()
        {
            last.push_str(text);
            return;
        }
        self.children.push(child);
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.push_child(ContentNode::Text(text.to_owned()));
    }

    /// Drop whitespace-only text that spans a line break, unless it sits
    /// between two inline neighbors, where it becomes a single space.
    pub(crate) fn collapse_layout_whitespace(&mut self, is_inline: impl Fn(&str) -> bool) {
        let inline: Vec<bool> = self
            .children
            .iter()
            .map(|child| match child {
                ContentNode::Text(_) => true,
                ContentNode::Element(element) => is_inline(element.name()),
            })
            .collect();
        let children = std::mem::take(&mut self.children);
        for (index, child) in children.into_iter().enumerate() {
            match child {
                ContentNode::Text(text) if text.trim().is_empty() && text.contains('\n') => {
                    let between_inline = index > 0
                        && inline[index - 1]
                        && inline.get(index + 1).copied().unwrap_or(false);
                    if between_inline {
                        self.push_text(" ");
                    }
                }
                other => self.push_child(other),
            }
        }
    }

    #[must_use]
    #[allow(dead_code)]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(ContentNode::Text(text.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, or `default` when the attribute is missing or blank.
    pub fn attribute_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.attribute(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => default,
        }
    }

    pub fn children(&self) -> &[ContentNode] {
        &self.children
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    /// All child elements with the given name, in order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |e| e.name == name)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(ContentNode::as_element)
    }

    pub fn inner_text(&self) -> String {
        self.children.iter().map(ContentNode::inner_text).collect()
    }

    /// A copy of this element under another name.
    pub fn renamed(&self, name: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// A stable id for this element.
    ///
    /// Derived from the owning topic id, the element's document-order
    /// position and its name, so it is identical across builds of the same
    /// source and distinct for every element of one topic.
    pub fn unique_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}:{}", self.topic_id, self.ordinal, self.name).as_bytes());
        let mut id = hex::encode(hasher.finalize());
        id.truncate(UNIQUE_ID_LEN);
        id
    }

    fn assign_identity(&mut self, topic_id: &str, next: &mut usize) {
        self.ordinal = *next;
        self.topic_id = topic_id.to_owned();
        *next += 1;
        for child in &mut self.children {
            if let ContentNode::Element(element) = child {
                element.assign_identity(topic_id, next);
            }
        }
    }
}

/// File name stem for a topic or member id: `T:Sample.Widget` becomes
/// `T_Sample.Widget`.
pub fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Whether a topic is an API reference topic or a conceptual one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopicKind {
    /// Rendered through the ordered section handlers.
    #[default]
    Api,
    /// Rendered by dispatching the source elements in document order.
    Conceptual,
}

/// One unit of documentation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: String,
    title: Option<String>,
    kind: TopicKind,
    root: Element,
}

impl Topic {
    /// Build a topic, numbering its elements in document order.
    pub fn new(id: impl Into<String>, kind: TopicKind, mut root: Element) -> Self {
        let id = id.into();
        let mut next = 0;
        root.assign_identity(&id, &mut next);
        let title = root.attribute("title").map(str::to_owned);
        Self {
            id,
            title,
            kind,
            root,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Title from the root's `title` attribute, falling back to the id.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn kind(&self) -> TopicKind {
        self.kind
    }

    /// File name stem for this topic's output files.
    pub fn file_stem(&self) -> String {
        file_stem(&self.id)
    }

    /// The comments (API) or document (conceptual) root element.
    pub fn root(&self) -> &Element {
        &self.root
    }
}
