//! Topic transformation: the configured registries plus the per-topic
//! render driver.

use std::fmt;
use std::sync::Arc;

use super::context::{RenderContext, RenderState};
use super::element::{ElementHandler, ElementRegistry};
use super::elements::default_elements;
use super::error::{FatalRenderFailure, MalformedSourceNode, RenderError, SetupError};
use super::format::{OutputFormat, OutputFormats, RenderStrategy};
use super::node::{Topic, TopicKind};
use super::output::OutputDocument;
use super::section::{SectionHandler, SectionKind, SectionRegistry};
use super::sections::default_sections;
use super::strings::StringTable;

/// Default relative path of stylesheets inside HTML output.
pub const DEFAULT_STYLE_SHEET_PATH: &str = "styles/";

/// Called before the sections of a topic are rendered.
///
/// Hooks typically add fixed markup to the document head.
pub trait RenderHook: Send + Sync {
    fn render_starting(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError>;
}

impl<F> RenderHook for F
where
    F: Fn(&mut RenderContext<'_>) -> Result<(), RenderError> + Send + Sync,
{
    fn render_starting(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self(ctx)
    }
}

/// Output of one topic render.
#[derive(Debug, Clone)]
pub struct RenderedTopic {
    pub topic_id: String,
    pub file_stem: String,
    pub formats: OutputFormats,
    /// `Complete` for every render that returned.
    pub state: RenderState,
    pub document: OutputDocument,
    pub diagnostics: Vec<MalformedSourceNode>,
}

impl RenderedTopic {
    /// Serialize the document for one format of this render.
    pub fn serialize(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::HtmlHelp1 | OutputFormat::Website => {
                format!("<!DOCTYPE html>\n{}\n", self.document.to_markup())
            }
            OutputFormat::OpenXml => format!(
                "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{}\n",
                self.document.to_markup()
            ),
            OutputFormat::Markdown => self.document.to_markdown(),
        }
    }
}

/// Section and element handlers configured for a build.
///
/// Handlers are changed only during setup. After
/// [`complete_setup`](Self::complete_setup) every mutating call fails and the
/// transformation can be shared (`Arc<TopicTransformation>`) by concurrent
/// topic renders.
pub struct TopicTransformation {
    sections: SectionRegistry,
    elements: ElementRegistry,
    hooks: Vec<Arc<dyn RenderHook>>,
    strings: StringTable,
    style_sheet_path: String,
    setup_complete: bool,
}

impl TopicTransformation {
    /// A transformation with the built-in sections and elements.
    pub fn new() -> Self {
        Self::with_registries(default_sections(), default_elements())
    }

    pub fn with_registries(sections: SectionRegistry, elements: ElementRegistry) -> Self {
        Self {
            sections,
            elements,
            hooks: Vec::new(),
            strings: StringTable::builtin(),
            style_sheet_path: DEFAULT_STYLE_SHEET_PATH.to_owned(),
            setup_complete: false,
        }
    }

    fn ensure_setup(&self) -> Result<(), SetupError> {
        if self.setup_complete {
            Err(SetupError::SetupComplete)
        } else {
            Ok(())
        }
    }

    #[allow(dead_code)]
    pub fn register_section(&mut self, handler: SectionHandler) -> Result<(), SetupError> {
        self.ensure_setup()?;
        self.sections.register(handler)
    }

    pub fn insert_section_before(
        &mut self,
        anchor: &SectionKind,
        handler: SectionHandler,
    ) -> Result<(), SetupError> {
        self.ensure_setup()?;
        self.sections.insert_before(anchor, handler)
    }

    pub fn insert_section_after(
        &mut self,
        anchor: &SectionKind,
        handler: SectionHandler,
    ) -> Result<(), SetupError> {
        self.ensure_setup()?;
        self.sections.insert_after(anchor, handler)
    }

    /// Move an already registered section before `anchor`.
    pub fn move_section_before(
        &mut self,
        kind: &SectionKind,
        anchor: &SectionKind,
    ) -> Result<(), SetupError> {
        let handler = self.registered(kind)?;
        self.insert_section_before(anchor, handler)
    }

    /// Move an already registered section after `anchor`.
    pub fn move_section_after(
        &mut self,
        kind: &SectionKind,
        anchor: &SectionKind,
    ) -> Result<(), SetupError> {
        let handler = self.registered(kind)?;
        self.insert_section_after(anchor, handler)
    }

    fn registered(&self, kind: &SectionKind) -> Result<SectionHandler, SetupError> {
        self.sections
            .handler_for(kind)
            .cloned()
            .ok_or_else(|| SetupError::SectionNotFound(kind.clone()))
    }

    /// Remove a section; absent sections are ignored.
    pub fn remove_section(&mut self, kind: &SectionKind) -> Result<(), SetupError> {
        self.ensure_setup()?;
        if self.sections.remove(kind).is_none() {
            tracing::debug!(section = %kind, "section to remove is not registered");
        }
        Ok(())
    }

    pub fn register_element<H: ElementHandler + 'static>(
        &mut self,
        handler: H,
    ) -> Result<(), SetupError> {
        self.ensure_setup()?;
        self.elements.register(handler);
        Ok(())
    }

    pub fn add_render_hook<H: RenderHook + 'static>(&mut self, hook: H) -> Result<(), SetupError> {
        self.ensure_setup()?;
        self.hooks.push(Arc::new(hook));
        Ok(())
    }

    /// Add a closure as a render hook.
    #[allow(dead_code)]
    pub fn on_render_starting<F>(&mut self, hook: F) -> Result<(), SetupError>
    where
        F: Fn(&mut RenderContext<'_>) -> Result<(), RenderError> + Send + Sync + 'static,
    {
        self.add_render_hook(hook)
    }

    /// Add resource items, replacing existing ids.
    pub fn merge_strings(&mut self, strings: StringTable) -> Result<(), SetupError> {
        self.ensure_setup()?;
        self.strings.merge(strings);
        Ok(())
    }

    pub fn set_style_sheet_path(&mut self, path: impl Into<String>) -> Result<(), SetupError> {
        self.ensure_setup()?;
        self.style_sheet_path = path.into();
        Ok(())
    }

    /// End the setup phase. Idempotent.
    pub fn complete_setup(&mut self) {
        if !self.setup_complete {
            tracing::debug!(
                sections = self.sections.len(),
                elements = self.elements.len(),
                hooks = self.hooks.len(),
                "handler setup complete"
            );
        }
        self.setup_complete = true;
    }

    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete
    }

    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    pub fn elements(&self) -> &ElementRegistry {
        &self.elements
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn style_sheet_path(&self) -> &str {
        &self.style_sheet_path
    }

    /// Render one topic for one format set.
    ///
    /// Render hooks run first, then API topics go through the section
    /// handlers in registry order and conceptual topics through their source
    /// elements in document order. Any handler error aborts this topic only.
    pub fn render_topic(
        &self,
        topic: &Topic,
        formats: OutputFormats,
    ) -> Result<RenderedTopic, FatalRenderFailure> {
        let fatal = |section: Option<&SectionKind>, source: RenderError| FatalRenderFailure {
            topic: topic.id().to_owned(),
            section: section.cloned(),
            source,
        };

        if !self.is_setup_complete() {
            return Err(fatal(None, RenderError::SetupIncomplete));
        }

        let mut ctx = RenderContext::new(
            topic,
            formats,
            &self.elements,
            &self.strings,
            &self.style_sheet_path,
        )
        .map_err(|source| fatal(None, source))?;

        for hook in &self.hooks {
            hook.render_starting(&mut ctx)
                .map_err(|source| fatal(None, source))?;
        }
        write_title(&mut ctx, topic);

        ctx.set_state(RenderState::RenderingSections);
        match topic.kind() {
            TopicKind::Api => {
                // The registry cannot change while `&self` is borrowed, so
                // this slice is the snapshot for the whole render.
                for handler in self.sections.handlers() {
                    tracing::trace!(topic = %topic.id(), section = %handler.kind(), "rendering section");
                    handler
                        .render(&mut ctx)
                        .map_err(|source| fatal(Some(handler.kind()), source))?;
                }
            }
            TopicKind::Conceptual => {
                let body = ctx.document().body();
                ctx.render_children(body, topic.root().children())
                    .map_err(|source| fatal(None, source))?;
            }
        }
        ctx.set_state(RenderState::Complete);

        let state = ctx.state();
        let (document, diagnostics) = ctx.into_parts();
        Ok(RenderedTopic {
            topic_id: topic.id().to_owned(),
            file_stem: topic.file_stem(),
            formats,
            state,
            document,
            diagnostics,
        })
    }
}

impl Default for TopicTransformation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TopicTransformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicTransformation")
            .field("sections", &self.sections.kinds())
            .field("elements", &self.elements)
            .field("hooks", &self.hooks.len())
            .field("style_sheet_path", &self.style_sheet_path)
            .field("setup_complete", &self.setup_complete)
            .finish()
    }
}

/// Page title in `head` (structured output) and as the first body heading.
fn write_title(ctx: &mut RenderContext<'_>, topic: &Topic) {
    let structured = ctx.strategy() == RenderStrategy::Structured;
    let doc = ctx.document_mut();
    if structured {
        let head = doc.head();
        let title = doc.append_element(head, "title");
        doc.append_text(title, topic.title());
    }
    let body = doc.body();
    let h1 = doc.append_element(body, "h1");
    doc.append_text(h1, topic.title());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::elements::{NamedSection, StyledSpanElement};
    use crate::transform::node::Element;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn api_topic() -> Topic {
        Topic::new(
            "T:Sample.Widget",
            TopicKind::Api,
            Element::new("doc")
                .with_attr("title", "Widget Class")
                .with_child(Element::new("summary").with_text("A widget."))
                .with_child(
                    Element::new("customSection").with_child(
                        Element::new("para")
                            .with_text("See ")
                            .with_child(Element::new("customElement").with_text("this")),
                    ),
                )
                .with_child(Element::new("remarks").with_text("Remarks text.")),
        )
    }

    fn styled_transformation() -> TopicTransformation {
        let mut transformation = TopicTransformation::new();
        let kind = SectionKind::custom("PresentationStyleModsCustomSection").unwrap();
        transformation
            .insert_section_after(
                &SectionKind::Summary,
                SectionHandler::new(
                    kind,
                    NamedSection::new("customSection", "CS_", Some("title_customSection".into())),
                ),
            )
            .unwrap();
        transformation
            .register_element(StyledSpanElement::new(
                "customElement",
                StyledSpanElement::DEFAULT_STYLE,
            ))
            .unwrap();
        transformation.complete_setup();
        transformation
    }

    #[test]
    fn test_render_before_setup_fails() {
        let transformation = TopicTransformation::new();
        let err = transformation
            .render_topic(&api_topic(), OutputFormats::WEBSITE)
            .unwrap_err();
        assert!(matches!(err.source, RenderError::SetupIncomplete));
        assert_eq!(err.topic, "T:Sample.Widget");
    }

    #[test]
    fn test_mutation_after_setup_fails() {
        let mut transformation = TopicTransformation::new();
        assert!(!transformation.is_setup_complete());
        transformation.complete_setup();
        transformation.complete_setup();
        assert!(transformation.is_setup_complete());

        assert_eq!(
            transformation.register_section(SectionHandler::from_fn(
                SectionKind::custom("Late").unwrap(),
                |_| Ok(())
            )),
            Err(SetupError::SetupComplete)
        );
        assert_eq!(
            transformation.remove_section(&SectionKind::Remarks),
            Err(SetupError::SetupComplete)
        );
        assert_eq!(
            transformation.register_element(StyledSpanElement::new("x", "Style1")),
            Err(SetupError::SetupComplete)
        );
        assert_eq!(
            transformation.on_render_starting(|_| Ok(())),
            Err(SetupError::SetupComplete)
        );
        assert_eq!(transformation.sections().len(), 7);
    }

    #[test]
    fn test_register_duplicate_section_fails() {
        let mut transformation = TopicTransformation::new();
        let err = transformation
            .register_section(SectionHandler::from_fn(SectionKind::Remarks, |_| Ok(())))
            .unwrap_err();
        assert_eq!(err, SetupError::DuplicateSectionIdentity(SectionKind::Remarks));

        transformation
            .register_section(SectionHandler::from_fn(
                SectionKind::custom("Appendix").unwrap(),
                |_| Ok(()),
            ))
            .unwrap();
        assert_eq!(
            transformation.sections().kinds().last(),
            Some(&SectionKind::custom("Appendix").unwrap())
        );
    }

    #[test]
    fn test_move_section_before() {
        let mut transformation = TopicTransformation::new();
        transformation
            .move_section_before(&SectionKind::Remarks, &SectionKind::SeeAlso)
            .unwrap();
        let kinds = transformation.sections().kinds();
        let remarks = kinds.iter().position(|k| *k == SectionKind::Remarks).unwrap();
        assert_eq!(kinds[remarks + 1], SectionKind::SeeAlso);

        let missing = SectionKind::custom("Missing").unwrap();
        assert_eq!(
            transformation.move_section_after(&missing, &SectionKind::Summary),
            Err(SetupError::SectionNotFound(missing))
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let transformation = styled_transformation();
        let topic = api_topic();
        for formats in [OutputFormats::RICH, OutputFormats::OPEN_XML, OutputFormats::MARKDOWN] {
            let first = transformation.render_topic(&topic, formats).unwrap();
            let second = transformation.render_topic(&topic, formats).unwrap();
            assert_eq!(first.document, second.document);
        }
    }

    #[test]
    fn test_custom_section_follows_summary() {
        let transformation = styled_transformation();
        let rendered = transformation
            .render_topic(&api_topic(), OutputFormats::WEBSITE)
            .unwrap();
        let doc = &rendered.document;

        let titles: Vec<String> = doc
            .descendants_named(doc.body(), "h2")
            .into_iter()
            .map(|h2| doc.text_content(h2))
            .collect();
        assert_eq!(titles, vec!["Custom Section", "Remarks"]);

        let spans = doc.descendants_named(doc.body(), "span");
        assert_eq!(spans.len(), 1);
        assert_eq!(doc.attribute(spans[0], "class"), Some("Style1"));
        assert_eq!(rendered.diagnostics.len(), 1);
    }

    #[test]
    fn test_reduced_formats_have_no_rich_wrappers() {
        let transformation = styled_transformation();
        let topic = api_topic();
        for formats in [OutputFormats::OPEN_XML, OutputFormats::MARKDOWN] {
            let rendered = transformation.render_topic(&topic, formats).unwrap();
            let markup = rendered.document.to_markup();
            assert!(!markup.contains("collapsibleSection"), "{markup}");
            assert!(!markup.contains("Style1"), "{markup}");
            assert!(rendered.document.descendants_named(rendered.document.root(), "span").is_empty());
        }
    }

    #[test]
    fn test_markdown_output() {
        let transformation = styled_transformation();
        let rendered = transformation
            .render_topic(&api_topic(), OutputFormats::MARKDOWN)
            .unwrap();
        assert_eq!(
            rendered.serialize(OutputFormat::Markdown),
            "# Widget Class\n\nA widget.\n\n## Custom Section\n\nSee this\n\n## Remarks\n\nRemarks text.\n"
        );
    }

    #[test]
    fn test_sections_run_once_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut sections = SectionRegistry::new();
        for name in ["A", "B", "C"] {
            let calls = Arc::clone(&calls);
            let kind = SectionKind::custom(name).unwrap();
            let recorded = kind.clone();
            sections
                .register(SectionHandler::from_fn(kind, move |_| {
                    calls.lock().unwrap().push(recorded.clone());
                    Ok(())
                }))
                .unwrap();
        }
        sections
            .insert_before(
                &SectionKind::custom("A").unwrap(),
                SectionHandler::from_fn(SectionKind::custom("C").unwrap(), |_| Ok(())),
            )
            .unwrap();

        let mut transformation = TopicTransformation::with_registries(sections, ElementRegistry::new());
        transformation.complete_setup();
        transformation
            .render_topic(&api_topic(), OutputFormats::WEBSITE)
            .unwrap();

        // C was replaced by a silent handler, so only A and B are recorded.
        assert_eq!(
            *calls.lock().unwrap(),
            vec![SectionKind::custom("A").unwrap(), SectionKind::custom("B").unwrap()]
        );
        assert_eq!(
            transformation.sections().kinds(),
            vec![
                SectionKind::custom("C").unwrap(),
                SectionKind::custom("A").unwrap(),
                SectionKind::custom("B").unwrap()
            ]
        );
    }

    #[test]
    fn test_failing_section_is_fatal_to_topic_only() {
        let mut transformation = TopicTransformation::new();
        transformation
            .insert_section_after(
                &SectionKind::Summary,
                SectionHandler::from_fn(SectionKind::custom("Broken").unwrap(), |ctx| {
                    if ctx.topic().id() == "T:Bad" {
                        Err(RenderError::handler("boom"))
                    } else {
                        Ok(())
                    }
                }),
            )
            .unwrap();
        transformation.complete_setup();

        let bad = Topic::new("T:Bad", TopicKind::Api, Element::new("doc"));
        let err = transformation
            .render_topic(&bad, OutputFormats::WEBSITE)
            .unwrap_err();
        assert_eq!(err.section, Some(SectionKind::custom("Broken").unwrap()));
        assert_eq!(
            err.to_string(),
            "failed to render topic 'T:Bad' in section 'custom:Broken': boom"
        );

        assert!(transformation.render_topic(&api_topic(), OutputFormats::WEBSITE).is_ok());
    }

    #[test]
    fn test_element_failure_names_element() {
        let mut transformation = TopicTransformation::new();
        transformation
            .register_element(crate::transform::element::FnElement::new(
                "summary",
                |_: &mut RenderContext<'_>, _: &Element| Err(RenderError::handler("bad summary")),
            ))
            .unwrap();
        transformation.complete_setup();

        let topic = Topic::new(
            "guide",
            TopicKind::Conceptual,
            Element::new("topic").with_child(Element::new("summary")),
        );
        let err = transformation
            .render_topic(&topic, OutputFormats::WEBSITE)
            .unwrap_err();
        assert_eq!(err.section, None);
        assert_eq!(
            err.to_string(),
            "failed to render topic 'guide': element 'summary' failed: bad summary"
        );
    }

    #[test]
    fn test_unsupported_format_combination_is_fatal() {
        let transformation = styled_transformation();
        let err = transformation
            .render_topic(&api_topic(), OutputFormats::WEBSITE | OutputFormats::OPEN_XML)
            .unwrap_err();
        assert!(matches!(
            err.source,
            RenderError::UnsupportedFormatCombination(_)
        ));
    }

    #[test]
    fn test_render_state_advances() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut transformation = TopicTransformation::new();
        let hook_seen = Arc::clone(&seen);
        transformation
            .on_render_starting(move |ctx| {
                hook_seen.lock().unwrap().push(ctx.state());
                Ok(())
            })
            .unwrap();
        let section_seen = Arc::clone(&seen);
        transformation
            .register_section(SectionHandler::from_fn(
                SectionKind::custom("Tracker").unwrap(),
                move |ctx| {
                    section_seen.lock().unwrap().push(ctx.state());
                    Ok(())
                },
            ))
            .unwrap();
        transformation.complete_setup();

        let rendered = transformation
            .render_topic(&api_topic(), OutputFormats::WEBSITE)
            .unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![RenderState::NotStarted, RenderState::RenderingSections]
        );
        assert_eq!(rendered.state, RenderState::Complete);
    }

    #[test]
    fn test_render_hook_writes_head() {
        let mut transformation = TopicTransformation::new();
        transformation
            .on_render_starting(|ctx| {
                if ctx.formats().intersects(OutputFormats::RICH) {
                    let href = format!("{}extra.css", ctx.style_sheet_path());
                    let doc = ctx.document_mut();
                    let head = doc.head();
                    let link = doc.append_element(head, "link");
                    doc.set_attribute(link, "rel", "stylesheet");
                    doc.set_attribute(link, "href", &href);
                }
                Ok(())
            })
            .unwrap();
        transformation.complete_setup();

        let rich = transformation
            .render_topic(&api_topic(), OutputFormats::WEBSITE)
            .unwrap();
        let links = rich.document.descendants_named(rich.document.head(), "link");
        assert_eq!(links.len(), 1);
        assert_eq!(rich.document.attribute(links[0], "href"), Some("styles/extra.css"));

        let markdown = transformation
            .render_topic(&api_topic(), OutputFormats::MARKDOWN)
            .unwrap();
        assert!(markdown.document.children(markdown.document.head()).is_empty());
    }

    #[test]
    fn test_conceptual_topic_renders_in_document_order() {
        let mut transformation = TopicTransformation::new();
        transformation
            .register_element(NamedSection::new("customSection", "CS_", None))
            .unwrap();
        transformation.complete_setup();

        let topic = Topic::new(
            "guide",
            TopicKind::Conceptual,
            Element::new("topic")
                .with_attr("title", "Guide")
                .with_child(Element::new("para").with_text("first"))
                .with_child(Element::new("customSection").with_text("second"))
                .with_child(Element::new("para").with_text("third")),
        );
        let rendered = transformation
            .render_topic(&topic, OutputFormats::MARKDOWN)
            .unwrap();
        assert_eq!(
            rendered.serialize(OutputFormat::Markdown),
            "# Guide\n\nfirst\n\nsecond\n\nthird\n"
        );
    }
}
