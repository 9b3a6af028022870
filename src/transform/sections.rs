//! Built-in section renderers for API topics.
//!
//! Each renderer looks up its own source element under the topic root and
//! renders nothing when it is absent.

use super::context::RenderContext;
use super::elements::UNNAMED_PARAMETER;
use super::error::RenderError;
use super::format::RenderStrategy;
use super::node::Element;
use super::output::NodeId;
use super::section::{SectionHandler, SectionKind, SectionRegistry};

/// The built-in sections in their default order.
pub fn default_sections() -> SectionRegistry {
    let mut registry = SectionRegistry::new();
    let handlers = [
        SectionHandler::from_fn(SectionKind::Summary, render_summary),
        SectionHandler::from_fn(SectionKind::Parameters, render_parameters),
        SectionHandler::from_fn(SectionKind::Returns, render_returns),
        SectionHandler::from_fn(SectionKind::Remarks, render_remarks),
        SectionHandler::from_fn(SectionKind::Examples, render_examples),
        SectionHandler::from_fn(SectionKind::Exceptions, render_exceptions),
        SectionHandler::from_fn(SectionKind::SeeAlso, render_see_also),
    ];
    for handler in handlers {
        if let Err(err) = registry.register(handler) {
            tracing::error!("built-in section registration failed: {err}");
        }
    }
    registry
}

fn render_summary(ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
    let Some(summary) = ctx.comments().child("summary") else {
        return Ok(());
    };
    let current = ctx.current_element();
    let target = match ctx.strategy() {
        RenderStrategy::Structured => {
            let doc = ctx.document_mut();
            let div = doc.create_element_with_class("div", "summary");
            doc.append(current, div);
            div
        }
        RenderStrategy::FlowDocument | RenderStrategy::Markdown => {
            ctx.document_mut().append_element(current, "p")
        }
    };
    ctx.render_children(target, summary.children())
}

/// Open a titled built-in section and render `content` into it.
fn titled_section(
    ctx: &mut RenderContext<'_>,
    id: &str,
    title_item: &str,
    content: &Element,
) -> Result<(), RenderError> {
    let id = ctx.document_mut().reserve_id(id);
    let target = ctx.open_section(&id, Some(title_item));
    ctx.render_children(target, content.children())
}

fn render_returns(ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
    match ctx.comments().child("returns") {
        Some(returns) => titled_section(ctx, "returns", "title_returns", returns),
        None => Ok(()),
    }
}

fn render_remarks(ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
    match ctx.comments().child("remarks") {
        Some(remarks) => titled_section(ctx, "remarks", "title_remarks", remarks),
        None => Ok(()),
    }
}

fn render_examples(ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
    match ctx.comments().child("example") {
        Some(example) => titled_section(ctx, "examples", "title_examples", example),
        None => Ok(()),
    }
}

/// A titled list of named entries, one per source element.
///
/// Structured output uses a definition list; reduced output a bullet list
/// with `term: description` items.
fn render_entries<'e>(
    ctx: &mut RenderContext<'_>,
    id: &str,
    title_item: &str,
    entries: &[&'e Element],
    term: impl Fn(&mut RenderContext<'_>, NodeId, &'e Element) -> Result<(), RenderError>,
) -> Result<(), RenderError> {
    if entries.is_empty() {
        return Ok(());
    }
    let id = ctx.document_mut().reserve_id(id);
    let target = ctx.open_section(&id, Some(title_item));

    match ctx.strategy() {
        RenderStrategy::Structured => {
            let dl = ctx.document_mut().append_element(target, "dl");
            for &entry in entries {
                let dt = ctx.document_mut().append_element(dl, "dt");
                term(ctx, dt, entry)?;
                let dd = ctx.document_mut().append_element(dl, "dd");
                ctx.render_children(dd, entry.children())?;
            }
        }
        RenderStrategy::FlowDocument | RenderStrategy::Markdown => {
            let ul = ctx.document_mut().append_element(target, "ul");
            for &entry in entries {
                let li = ctx.document_mut().append_element(ul, "li");
                term(ctx, li, entry)?;
                if !entry.children().is_empty() {
                    ctx.document_mut().append_text(li, ": ");
                    ctx.render_children(li, entry.children())?;
                }
            }
        }
    }
    Ok(())
}

fn render_parameters(ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
    let params: Vec<&Element> = ctx.comments().children_named("param").collect();
    render_entries(ctx, "parameters", "title_parameters", &params, |ctx, parent, param| {
        let name = ctx
            .attribute_or_report(param, "name", UNNAMED_PARAMETER)
            .to_owned();
        let tag = if ctx.is_reduced() { "em" } else { "span" };
        let doc = ctx.document_mut();
        let node = doc.append_element(parent, tag);
        if tag == "span" {
            doc.set_attribute(node, "class", "parameter");
        }
        doc.append_text(node, &name);
        Ok(())
    })
}

fn render_exceptions(ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
    let exceptions: Vec<&Element> = ctx.comments().children_named("exception").collect();
    render_entries(ctx, "exceptions", "title_exceptions", &exceptions, |ctx, parent, exception| {
        let cref = ctx.attribute_or_report(exception, "cref", "").to_owned();
        let link = Element::new("see").with_attr("cref", cref);
        ctx.render_children(parent, &[link.into()])
    })
}

fn render_see_also(ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
    let links: Vec<&Element> = ctx.comments().children_named("seealso").collect();
    if links.is_empty() {
        return Ok(());
    }
    let id = ctx.document_mut().reserve_id("seeAlso");
    let target = ctx.open_section(&id, Some("title_seeAlso"));
    let ul = ctx.document_mut().append_element(target, "ul");
    for link in links {
        let li = ctx.document_mut().append_element(ul, "li");
        ctx.render_children(li, &[link.renamed("see").into()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::elements::default_elements;
    use crate::transform::format::OutputFormats;
    use crate::transform::node::{Topic, TopicKind};
    use crate::transform::strings::StringTable;
    use pretty_assertions::assert_eq;

    fn render_sections(root: Element, formats: OutputFormats) -> String {
        let topic = Topic::new("T:Sample.Widget", TopicKind::Api, root);
        let elements = default_elements();
        let strings = StringTable::builtin();
        let mut ctx = RenderContext::new(&topic, formats, &elements, &strings, "").unwrap();
        for handler in default_sections().handlers() {
            handler.render(&mut ctx).unwrap();
        }
        ctx.document().body_markup()
    }

    #[test]
    fn test_default_order() {
        assert_eq!(
            default_sections().kinds(),
            vec![
                SectionKind::Summary,
                SectionKind::Parameters,
                SectionKind::Returns,
                SectionKind::Remarks,
                SectionKind::Examples,
                SectionKind::Exceptions,
                SectionKind::SeeAlso,
            ]
        );
    }

    #[test]
    fn test_absent_sections_render_nothing() {
        assert_eq!(render_sections(Element::new("doc"), OutputFormats::WEBSITE), "");
    }

    #[test]
    fn test_summary_and_remarks_structured() {
        let root = Element::new("doc")
            .with_child(Element::new("summary").with_text("A widget."))
            .with_child(Element::new("remarks").with_child(Element::new("para").with_text("More.")));
        assert_eq!(
            render_sections(root, OutputFormats::WEBSITE),
            "<div class=\"summary\">A widget.</div>\
             <h2 class=\"sectionTitle\">Remarks</h2>\
             <div class=\"collapsibleSection\" id=\"remarks\"><p>More.</p></div>"
        );
    }

    #[test]
    fn test_summary_and_remarks_markdown() {
        let root = Element::new("doc")
            .with_child(Element::new("summary").with_text("A widget."))
            .with_child(Element::new("remarks").with_child(Element::new("para").with_text("More.")));
        assert_eq!(
            render_sections(root, OutputFormats::MARKDOWN),
            "<p>A widget.</p><h2>Remarks</h2><p>More.</p>"
        );
    }

    #[test]
    fn test_parameters() {
        let root = Element::new("doc")
            .with_child(Element::new("param").with_attr("name", "count").with_text("How many."));
        assert_eq!(
            render_sections(root.clone(), OutputFormats::WEBSITE),
            "<h2 class=\"sectionTitle\">Parameters</h2>\
             <div class=\"collapsibleSection\" id=\"parameters\">\
             <dl><dt><span class=\"parameter\">count</span></dt><dd>How many.</dd></dl></div>"
        );
        assert_eq!(
            render_sections(root, OutputFormats::MARKDOWN),
            "<h2>Parameters</h2><ul><li><em>count</em>: How many.</li></ul>"
        );
    }

    #[test]
    fn test_parameter_without_name_is_reported() {
        let topic = Topic::new(
            "T:Sample.Widget",
            TopicKind::Api,
            Element::new("doc").with_child(Element::new("param").with_text("Mystery.")),
        );
        let elements = default_elements();
        let strings = StringTable::builtin();
        let mut ctx =
            RenderContext::new(&topic, OutputFormats::MARKDOWN, &elements, &strings, "").unwrap();
        for handler in default_sections().handlers() {
            handler.render(&mut ctx).unwrap();
        }
        let (document, diagnostics) = ctx.into_parts();

        assert_eq!(
            document.body_markup(),
            "<h2>Parameters</h2><ul><li><em>(unnamed)</em>: Mystery.</li></ul>"
        );
        assert_eq!(
            diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["<param> is missing 'name', using '(unnamed)'".to_string()]
        );
    }

    #[test]
    fn test_exceptions_and_see_also_link() {
        let root = Element::new("doc")
            .with_child(
                Element::new("exception")
                    .with_attr("cref", "T:System.ArgumentException")
                    .with_text("Bad input."),
            )
            .with_child(Element::new("seealso").with_attr("cref", "T:Sample.Gadget"));
        assert_eq!(
            render_sections(root, OutputFormats::MARKDOWN),
            "<h2>Exceptions</h2>\
             <ul><li><a href=\"T_System.ArgumentException.md\">ArgumentException</a>: Bad input.</li></ul>\
             <h2>See Also</h2>\
             <ul><li><a href=\"T_Sample.Gadget.md\">Gadget</a></li></ul>"
        );
    }
}
