//! The output tree built while rendering a topic.
//!
//! Nodes live in an arena owned by [`OutputDocument`] and are addressed by
//! [`NodeId`]. Handlers create detached elements, fill them, and append them
//! where they belong; the render context tracks the current insertion point
//! as a `NodeId`.

use std::collections::HashSet;
use std::fmt::Write;

/// Handle to a node inside an [`OutputDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputNode {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<NodeId>,
    },
    Text(String),
}

/// A mutable document tree: `html` with `head` and `body`.
#[derive(Debug, Clone)]
pub struct OutputDocument {
    nodes: Vec<OutputNode>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    used_ids: HashSet<String>,
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            used_ids: HashSet::new(),
        };
        doc.root = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.append(doc.root, doc.head);
        doc.append(doc.root, doc.body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push_node(OutputNode::Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Create a detached element with a `class` attribute.
    pub fn create_element_with_class(&mut self, name: &str, class: &str) -> NodeId {
        let id = self.create_element(name);
        self.set_attribute(id, "class", class);
        id
    }

    /// Append `child` to `parent`. Text nodes cannot have children; appending
    /// to one is ignored.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if let OutputNode::Element { children, .. } = &mut self.nodes[parent.0] {
            children.push(child);
        }
    }

    /// Append text to `parent`, merging with a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = match &self.nodes[parent.0] {
            OutputNode::Element { children, .. } => children.last().copied(),
            OutputNode::Text(_) => return,
        };
        if let Some(last) = last
            && let OutputNode::Text(existing) = &mut self.nodes[last.0]
        {
            existing.push_str(text);
            return;
        }
        let node = self.push_node(OutputNode::Text(text.to_owned()));
        self.append(parent, node);
    }

    /// Create an element, append it to `parent` and return it.
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.create_element(name);
        self.append(parent, id);
        id
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let OutputNode::Element { attributes, .. } = &mut self.nodes[node.0] {
            match attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => value.clone_into(existing),
                None => attributes.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    pub fn node(&self, id: NodeId) -> &OutputNode {
        &self.nodes[id.0]
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0] {
            OutputNode::Element { name, .. } => Some(name),
            OutputNode::Text(_) => None,
        }
    }

    pub fn attribute(&self, id: NodeId, attr: &str) -> Option<&str> {
        match &self.nodes[id.0] {
            OutputNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == attr)
                .map(|(_, v)| v.as_str()),
            OutputNode::Text(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0] {
            OutputNode::Element { children, .. } => children,
            OutputNode::Text(_) => &[],
        }
    }

    /// Elements below `from` (depth first, document order) with the given name.
    #[cfg(test)]
    pub fn descendants_named(&self, from: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_named(from, name, &mut found);
        found
    }

    #[cfg(test)]
    fn collect_named(&self, from: NodeId, name: &str, found: &mut Vec<NodeId>) {
        for &child in self.children(from) {
            if self.name(child) == Some(name) {
                found.push(child);
            }
            self.collect_named(child, name, found);
        }
    }

    /// Text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        match &self.nodes[id.0] {
            OutputNode::Text(text) => text.clone(),
            OutputNode::Element { children, .. } => {
                children.iter().map(|c| self.text_content(*c)).collect()
            }
        }
    }

    /// Reserve an element id, suffixing `-1`, `-2`, ... if it is taken.
    pub fn reserve_id(&mut self, candidate: &str) -> String {
        let mut id = candidate.to_owned();
        let mut suffix = 1;
        while self.used_ids.contains(&id) {
            id = format!("{candidate}-{suffix}");
            suffix += 1;
        }
        self.used_ids.insert(id.clone());
        id
    }

    fn push_node(&mut self, node: OutputNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Serialize the attached tree as markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::with_capacity(4096);
        self.write_markup(self.root, &mut out);
        out
    }

    /// Serialize the `body` children as markup.
    #[cfg(test)]
    pub fn body_markup(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.body) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0] {
            OutputNode::Text(text) => out.push_str(&escape_text(text)),
            OutputNode::Element {
                name,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    let _ = write!(out, " {key}=\"{}\"", escape_attr(value));
                }
                if children.is_empty() {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for &child in children {
                    self.write_markup(child, out);
                }
                let _ = write!(out, "</{name}>");
            }
        }
    }

    /// Serialize the `body` as markdown.
    ///
    /// Headings, paragraphs, emphasis, code, lists, links and block quotes
    /// map to markdown syntax; any other element is transparent.
    pub fn to_markdown(&self) -> String {
        let mut writer = MarkdownWriter::default();
        writer.write_children(self, self.body);
        writer.finish()
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for OutputDocument {
    /// Structural equality of the attached trees.
    fn eq(&self, other: &Self) -> bool {
        self.to_markup() == other.to_markup()
    }
}

impl Eq for OutputDocument {}

#[derive(Default)]
struct MarkdownWriter {
    out: String,
    /// Open list kinds, innermost last (`true` = ordered).
    lists: Vec<(bool, usize)>,
    /// Open list items as (output offset after the marker, continuation
    /// indent), innermost last.
    items: Vec<(usize, usize)>,
}

impl MarkdownWriter {
    fn write_children(&mut self, doc: &OutputDocument, id: NodeId) {
        for &child in doc.children(id) {
            self.write_node(doc, child);
        }
    }

    fn write_node(&mut self, doc: &OutputDocument, id: NodeId) {
        let name = match doc.node(id) {
            OutputNode::Text(text) => {
                self.out.push_str(&escape_markdown(text));
                return;
            }
            OutputNode::Element { name, .. } => name.as_str(),
        };

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(2);
                self.block_break();
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.write_children(doc, id);
                self.block_break();
            }
            "p" | "div" => match self.items.last() {
                // Paragraphs inside a list item stay under its marker.
                Some(&(start, indent)) => {
                    if self.out.len() > start && !self.out.ends_with([' ', '\n']) {
                        self.out.push('\n');
                        self.out.push_str(&" ".repeat(indent));
                    }
                    self.write_children(doc, id);
                }
                None => {
                    self.block_break();
                    self.write_children(doc, id);
                    self.block_break();
                }
            },
            "strong" | "b" => self.wrap(doc, id, "**"),
            "em" | "i" => self.wrap(doc, id, "*"),
            "code" => self.out.push_str(&inline_code(&doc.text_content(id))),
            "pre" => {
                let language = doc
                    .children(id)
                    .first()
                    .and_then(|c| doc.attribute(*c, "data-language"))
                    .unwrap_or_default()
                    .to_owned();
                self.block_break();
                let _ = write!(self.out, "```{language}\n{}\n```", doc.text_content(id).trim_end());
                self.block_break();
            }
            "ul" | "ol" => {
                if self.lists.is_empty() {
                    self.block_break();
                }
                self.lists.push((name == "ol", 0));
                self.write_children(doc, id);
                self.lists.pop();
                if self.lists.is_empty() {
                    self.block_break();
                }
            }
            "li" => {
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some((true, counter)) => {
                        *counter += 1;
                        format!("{counter}.")
                    }
                    _ => "-".to_owned(),
                };
                self.line_break();
                let indent = "  ".repeat(depth);
                let _ = write!(self.out, "{indent}{marker} ");
                self.items
                    .push((self.out.len(), indent.len() + marker.len() + 1));
                self.write_children(doc, id);
                self.items.pop();
            }
            "a" => match doc.attribute(id, "href") {
                Some(href) => {
                    let href = href.to_owned();
                    self.out.push('[');
                    self.write_children(doc, id);
                    let _ = write!(self.out, "]({href})");
                }
                None => self.write_children(doc, id),
            },
            "blockquote" => {
                self.block_break();
                let mut inner = MarkdownWriter::default();
                inner.write_children(doc, id);
                for line in inner.finish().lines() {
                    if line.is_empty() {
                        self.out.push_str(">\n");
                    } else {
                        let _ = writeln!(self.out, "> {line}");
                    }
                }
                self.block_break();
            }
            "br" => self.out.push_str("  \n"),
            _ => self.write_children(doc, id),
        }
    }

    fn wrap(&mut self, doc: &OutputDocument, id: NodeId, marker: &str) {
        self.out.push_str(marker);
        self.write_children(doc, id);
        self.out.push_str(marker);
    }

    fn line_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn block_break(&mut self) {
        if self.out.is_empty() {
            return;
        }
        self.line_break();
        if !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        let trimmed = self.out.trim();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}\n")
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Inline code span, fenced with more backticks than the longest run in
/// `text`.
fn inline_code(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let fence = "`".repeat(longest + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{fence} {text} {fence}")
    } else {
        format!("{fence}{text}{fence}")
    }
}

fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '`' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
