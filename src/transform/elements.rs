//! Built-in element handlers.
//!
//! Every handler that emits format-specific markup branches on the render
//! strategy: structured output gets the full markup, flow document and
//! markdown output get a plain simplification.

use super::context::RenderContext;
use super::element::{ElementHandler, ElementRegistry};
use super::error::RenderError;
use super::format::RenderStrategy;
use super::node::{Element, file_stem};
use super::output::NodeId;
use super::section::SectionRenderer;

/// Maps a source element to one output element with the same children.
pub struct SimpleElement {
    name: String,
    tag: String,
}

impl SimpleElement {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

impl ElementHandler for SimpleElement {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        let current = ctx.current_element();
        let node = ctx.document_mut().append_element(current, &self.tag);
        ctx.render_children(node, element.children())
    }
}

/// Inline element rendered as a styled span.
///
/// The style comes from the `style` attribute and falls back to the
/// configured default. Reduced formats drop the span and keep the content.
pub struct StyledSpanElement {
    name: String,
    default_style: String,
}

impl StyledSpanElement {
    pub const DEFAULT_STYLE: &'static str = "Style1";

    pub fn new(name: impl Into<String>, default_style: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_style: default_style.into(),
        }
    }
}

impl ElementHandler for StyledSpanElement {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        let current = ctx.current_element();
        if ctx.is_reduced() {
            return ctx.render_children(current, element.children());
        }

        let style = ctx
            .attribute_or_report(element, "style", &self.default_style)
            .to_owned();
        let span = ctx.document_mut().create_element_with_class("span", &style);
        ctx.document_mut().append(current, span);
        ctx.render_children(span, element.children())
    }
}

/// A named section backed by one source element.
///
/// Used as a section renderer for API topics (the element is looked up
/// under the topic root and the section is skipped when it is absent) and
/// as an element handler for conceptual topics.
#[derive(Debug, Clone)]
pub struct NamedSection {
    element: String,
    id_prefix: String,
    title_item: Option<String>,
}

impl NamedSection {
    pub fn new(
        element: impl Into<String>,
        id_prefix: impl Into<String>,
        title_item: Option<String>,
    ) -> Self {
        Self {
            element: element.into(),
            id_prefix: id_prefix.into(),
            title_item,
        }
    }

    fn render_element(
        &self,
        ctx: &mut RenderContext<'_>,
        element: &Element,
    ) -> Result<(), RenderError> {
        let id = ctx.section_id(&self.id_prefix, element);
        let target = ctx.open_section(&id, self.title_item.as_deref());
        ctx.render_children(target, element.children())
    }
}

impl SectionRenderer for NamedSection {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        match ctx.comments().child(&self.element) {
            Some(element) => self.render_element(ctx, element),
            None => Ok(()),
        }
    }
}

impl ElementHandler for NamedSection {
    fn name(&self) -> &str {
        &self.element
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        self.render_element(ctx, element)
    }
}

/// `<code language="rust">` blocks.
struct CodeElement;

impl ElementHandler for CodeElement {
    fn name(&self) -> &str {
        "code"
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        let current = ctx.current_element();
        let parent = match ctx.strategy() {
            RenderStrategy::Structured => {
                let doc = ctx.document_mut();
                let wrapper = doc.create_element_with_class("div", "codeSnippet");
                doc.append(current, wrapper);
                wrapper
            }
            RenderStrategy::FlowDocument | RenderStrategy::Markdown => current,
        };

        let doc = ctx.document_mut();
        let pre = doc.append_element(parent, "pre");
        let code = doc.append_element(pre, "code");
        if let Some(language) = element.attribute("language").or(element.attribute("lang")) {
            doc.set_attribute(code, "data-language", language);
        }
        doc.append_text(code, &element.inner_text());
        Ok(())
    }
}

/// `<list type="bullet|number|table">` with `<item>`/`<listheader>` children,
/// or the conceptual `<list class="bullet|ordered">` with `<listItem>`.
///
/// Other children render in place so no content is lost.
struct ListElement;

impl ListElement {
    fn render_item(
        ctx: &mut RenderContext<'_>,
        list: NodeId,
        item: &Element,
        header: bool,
    ) -> Result<(), RenderError> {
        let li = ctx.document_mut().append_element(list, "li");
        let target = if header {
            ctx.document_mut().append_element(li, "strong")
        } else {
            li
        };
        match (item.child("term"), item.child("description")) {
            (Some(term), Some(description)) => {
                let term_target = if header {
                    target
                } else {
                    ctx.document_mut().append_element(li, "strong")
                };
                ctx.render_children(term_target, term.children())?;
                ctx.document_mut().append_text(target, ": ");
                ctx.render_children(target, description.children())
            }
            (Some(term), None) => ctx.render_children(target, term.children()),
            (None, Some(description)) => ctx.render_children(target, description.children()),
            (None, None) => ctx.render_children(target, item.children()),
        }
    }
}

impl ElementHandler for ListElement {
    fn name(&self) -> &str {
        "list"
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        let kind = element
            .attribute("type")
            .or(element.attribute("class"))
            .unwrap_or("bullet");
        let tag = match kind {
            "number" | "ordered" => "ol",
            _ => "ul",
        };
        let current = ctx.current_element();
        let list = ctx.document_mut().append_element(current, tag);

        for child in element.children() {
            match child.as_element() {
                Some(item) if matches!(item.name(), "item" | "listItem") => {
                    Self::render_item(ctx, list, item, false)?;
                }
                Some(header) if header.name() == "listheader" => {
                    Self::render_item(ctx, list, header, true)?;
                }
                _ => ctx.render_children(list, std::slice::from_ref(child))?,
            }
        }
        Ok(())
    }
}

/// `<see cref="T:Name"/>`, `<see href="..."/>` and `<see langword="null"/>`.
struct SeeElement;

impl SeeElement {
    /// Display name of a member id: `T:Sample.Widget` becomes `Widget`.
    fn short_name(cref: &str) -> &str {
        let name = cref.split_once(':').map_or(cref, |(_, rest)| rest);
        let name = name.split('(').next().unwrap_or(name);
        name.rsplit('.').next().unwrap_or(name)
    }
}

impl ElementHandler for SeeElement {
    fn name(&self) -> &str {
        "see"
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        let current = ctx.current_element();

        if let Some(word) = element.attribute("langword") {
            let code = ctx.document_mut().append_element(current, "code");
            ctx.document_mut().append_text(code, word);
            return Ok(());
        }

        let target = match (element.attribute("cref"), element.attribute("href")) {
            (Some(cref), _) => ctx
                .strategy()
                .link_extension()
                .map(|ext| format!("{}.{ext}", file_stem(cref)))
                .ok_or(cref),
            (None, Some(href)) => Ok(href.to_owned()),
            (None, None) => {
                ctx.report_malformed(element.name(), "cref", "(plain text)");
                return ctx.render_children(current, element.children());
            }
        };

        let parent = match target {
            Ok(href) => {
                let link = ctx.document_mut().append_element(current, "a");
                ctx.document_mut().set_attribute(link, "href", &href);
                link
            }
            Err(_) => current,
        };

        if element.children().is_empty() {
            let text = element
                .attribute("cref")
                .map(Self::short_name)
                .or(element.attribute("href"))
                .unwrap_or_default();
            ctx.document_mut().append_text(parent, text);
            Ok(())
        } else {
            ctx.render_children(parent, element.children())
        }
    }
}

/// Text shown for a `param` or `paramref` without a name.
pub(crate) const UNNAMED_PARAMETER: &str = "(unnamed)";

/// `<paramref name="value"/>`.
struct ParamRefElement;

impl ElementHandler for ParamRefElement {
    fn name(&self) -> &str {
        "paramref"
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        let name = ctx
            .attribute_or_report(element, "name", UNNAMED_PARAMETER)
            .to_owned();
        let current = ctx.current_element();
        let strategy = ctx.strategy();
        let doc = ctx.document_mut();
        let node = match strategy {
            RenderStrategy::Structured => doc.create_element_with_class("span", "parameter"),
            RenderStrategy::FlowDocument | RenderStrategy::Markdown => doc.create_element("em"),
        };
        doc.append_text(node, &name);
        doc.append(current, node);
        Ok(())
    }
}

/// `<note type="caution">` callouts.
struct NoteElement;

impl ElementHandler for NoteElement {
    fn name(&self) -> &str {
        "note"
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        let kind = element.attribute_or("type", "note");
        let title = ctx.resource_item(&format!("title_{kind}"));
        let current = ctx.current_element();

        let content = match ctx.strategy() {
            RenderStrategy::Structured => {
                let doc = ctx.document_mut();
                let alert = doc.create_element_with_class("div", "alert");
                doc.append(current, alert);
                let heading = doc.create_element_with_class("p", "alertTitle");
                doc.append_text(heading, &title);
                doc.append(alert, heading);
                doc.append_element(alert, "div")
            }
            RenderStrategy::FlowDocument | RenderStrategy::Markdown => {
                let doc = ctx.document_mut();
                let quote = doc.append_element(current, "blockquote");
                let heading = doc.append_element(quote, "p");
                let strong = doc.append_element(heading, "strong");
                doc.append_text(strong, &title);
                quote
            }
        };
        ctx.render_children(content, element.children())
    }
}

/// Conceptual `<section>` with `<title>`, `<content>` and nested `<sections>`.
struct MamlSectionElement;

impl ElementHandler for MamlSectionElement {
    fn name(&self) -> &str {
        "section"
    }

    fn render(&self, ctx: &mut RenderContext<'_>, element: &Element) -> Result<(), RenderError> {
        let id = match element.attribute("address") {
            Some(address) => ctx.document_mut().reserve_id(address),
            None => ctx.section_id("S_", element),
        };
        let current = ctx.current_element();

        let doc = ctx.document_mut();
        let heading = doc.create_element("h3");
        let target = match ctx.strategy() {
            RenderStrategy::Structured => {
                let doc = ctx.document_mut();
                let wrapper = doc.create_element_with_class("div", "section");
                doc.set_attribute(wrapper, "id", &id);
                doc.append(current, wrapper);
                doc.append(wrapper, heading);
                wrapper
            }
            RenderStrategy::FlowDocument => {
                let doc = ctx.document_mut();
                doc.set_attribute(heading, "id", &id);
                doc.append(current, heading);
                current
            }
            RenderStrategy::Markdown => {
                ctx.document_mut().append(current, heading);
                current
            }
        };

        if let Some(title) = element.child("title") {
            ctx.render_children(heading, title.children())?;
        }
        if let Some(content) = element.child("content") {
            ctx.render_children(target, content.children())?;
        }
        if let Some(sections) = element.child("sections") {
            ctx.render_children(target, sections.children())?;
        }
        Ok(())
    }
}

/// The built-in element handlers.
pub fn default_elements() -> ElementRegistry {
    let mut registry = ElementRegistry::new();
    for (name, tag) in [
        ("para", "p"),
        ("b", "strong"),
        ("i", "em"),
        ("c", "code"),
        ("codeInline", "code"),
        ("legacyBold", "strong"),
        ("legacyItalic", "em"),
    ] {
        registry.register(SimpleElement::new(name, tag));
    }
    registry.register(CodeElement);
    registry.register(ListElement);
    registry.register(SeeElement);
    registry.register(ParamRefElement);
    registry.register(NoteElement);
    registry.register(MamlSectionElement);
    registry
}
