//! Presentation style modifications.
//!
//! Applied to a [`TopicTransformation`] during setup: reorders and removes
//! sections, adds a custom section and a styled inline element, links an
//! extra stylesheet from HTML output and loads the localized resource items
//! those additions use.

use crate::config::ModsConfig;
use crate::resources::{ResourceError, ResourceResolver};
use crate::transform::{
    NamedSection, OutputFormats, RenderContext, RenderError, RenderHook, SectionHandler,
    SectionKind, SetupError, StyledSpanElement, TopicTransformation,
};

pub const NAME: &str = "PresentationStyleMods";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base name of the resource item files.
pub const RESOURCE_ITEMS: &str = "PresentationStyleMods";

#[derive(thiserror::Error, Debug)]
pub enum StyleModsError {
    #[error("presentation style mods: {0}")]
    Setup(#[from] SetupError),

    #[error("presentation style mods: {0}")]
    Resource(#[from] ResourceError),
}

/// Adds `<link rel="stylesheet">` to the head of rich HTML output.
#[derive(Debug, Clone)]
pub struct StylesheetLink {
    file_name: String,
}

impl StylesheetLink {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl RenderHook for StylesheetLink {
    fn render_starting(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        if !ctx.formats().intersects(OutputFormats::RICH) {
            return Ok(());
        }
        let href = format!("{}{}", ctx.style_sheet_path(), self.file_name);
        let doc = ctx.document_mut();
        let head = doc.head();
        let link = doc.append_element(head, "link");
        doc.set_attribute(link, "rel", "stylesheet");
        doc.set_attribute(link, "type", "text/css");
        doc.set_attribute(link, "href", &href);
        Ok(())
    }
}

/// Apply the configured modifications.
///
/// Every step is a setup call on `transformation`, so any error here means
/// the configuration does not fit the registered sections.
pub fn apply(
    transformation: &mut TopicTransformation,
    mods: &ModsConfig,
    resources: &ResourceResolver,
    language: &str,
) -> Result<(), StyleModsError> {
    if !mods.enabled {
        tracing::info!("presentation style mods disabled");
        return Ok(());
    }
    tracing::info!("{NAME} version {VERSION} applying presentation style modifications");

    for entry in &mods.move_sections {
        match (&entry.before, &entry.after) {
            (Some(anchor), _) => transformation.move_section_before(&entry.section, anchor)?,
            (None, Some(anchor)) => transformation.move_section_after(&entry.section, anchor)?,
            (None, None) => {}
        }
        tracing::debug!(section = %entry.section, "moved section");
    }

    for kind in &mods.remove_sections {
        transformation.remove_section(kind)?;
    }

    if let Some(custom) = &mods.custom_section {
        let kind = SectionKind::custom(custom.name.as_str())?;
        let section = NamedSection::new(
            custom.element.as_str(),
            custom.id_prefix.as_str(),
            custom.title_item.clone(),
        );
        transformation
            .insert_section_after(&custom.after, SectionHandler::new(kind, section.clone()))?;
        // Conceptual topics reach the same element through dispatch.
        transformation.register_element(section)?;
    }

    if let Some(element) = &mods.custom_element {
        transformation.register_element(StyledSpanElement::new(
            element.name.as_str(),
            element.default_style.as_str(),
        ))?;
    }

    if let Some(stylesheet) = &mods.stylesheet {
        transformation.add_render_hook(StylesheetLink::new(stylesheet.as_str()))?;
    }

    let items = resources.load_items(RESOURCE_ITEMS, language)?;
    transformation.merge_strings(items)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CustomSectionConfig, SectionMove};
    use crate::transform::{Element, OutputFormat, Topic, TopicKind};
    use pretty_assertions::assert_eq;

    fn applied(mods: &ModsConfig) -> TopicTransformation {
        let dir = tempfile::tempdir().unwrap();
        let mut transformation = TopicTransformation::new();
        apply(
            &mut transformation,
            mods,
            &ResourceResolver::new(dir.path()),
            "en-US",
        )
        .unwrap();
        transformation.complete_setup();
        transformation
    }

    fn custom_kind() -> SectionKind {
        SectionKind::custom("PresentationStyleModsCustomSection").unwrap()
    }

    fn topic() -> Topic {
        Topic::new(
            "T:Sample.Widget",
            TopicKind::Api,
            Element::new("doc")
                .with_child(Element::new("summary").with_text("Summary."))
                .with_child(Element::new("seealso").with_attr("cref", "T:Sample.Gadget"))
                .with_child(
                    Element::new("customSection").with_child(
                        Element::new("customElement")
                            .with_attr("style", "Style2")
                            .with_text("styled"),
                    ),
                )
                .with_child(Element::new("remarks").with_text("Remarks.")),
        )
    }

    #[test]
    fn test_default_mods_section_order() {
        let transformation = applied(&ModsConfig::default());
        assert_eq!(
            transformation.sections().kinds(),
            vec![
                SectionKind::Summary,
                custom_kind(),
                SectionKind::Parameters,
                SectionKind::Returns,
                SectionKind::Examples,
                SectionKind::Exceptions,
                SectionKind::Remarks,
                SectionKind::SeeAlso,
            ]
        );
        assert!(transformation.elements().get("customSection").is_some());
        assert!(transformation.elements().get("customElement").is_some());
        assert_eq!(
            transformation.strings().get("title_customSection"),
            Some("Custom Section")
        );
    }

    #[test]
    fn test_disabled_mods_leave_defaults() {
        let mods = ModsConfig {
            enabled: false,
            ..ModsConfig::default()
        };
        let transformation = applied(&mods);
        assert_eq!(transformation.sections().len(), 7);
        assert!(transformation.elements().get("customElement").is_none());
    }

    #[test]
    fn test_move_of_unknown_section_fails() {
        let mods = ModsConfig {
            move_sections: vec![SectionMove {
                section: SectionKind::custom("Nope").unwrap(),
                before: Some(SectionKind::SeeAlso),
                after: None,
            }],
            ..ModsConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let err = apply(
            &mut TopicTransformation::new(),
            &mods,
            &ResourceResolver::new(dir.path()),
            "en-US",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StyleModsError::Setup(SetupError::SectionNotFound(_))
        ));
    }

    #[test]
    fn test_custom_section_anchor_must_exist() {
        let mods = ModsConfig {
            remove_sections: vec![SectionKind::Summary],
            custom_section: Some(CustomSectionConfig::default()),
            ..ModsConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let err = apply(
            &mut TopicTransformation::new(),
            &mods,
            &ResourceResolver::new(dir.path()),
            "en-US",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StyleModsError::Setup(SetupError::SectionNotFound(SectionKind::Summary))
        ));
    }

    #[test]
    fn test_rich_output() {
        let transformation = applied(&ModsConfig::default());
        let rendered = transformation
            .render_topic(&topic(), OutputFormats::WEBSITE)
            .unwrap();
        let doc = &rendered.document;

        let links = doc.descendants_named(doc.head(), "link");
        assert_eq!(links.len(), 1);
        assert_eq!(
            doc.attribute(links[0], "href"),
            Some("styles/PresentationStyleMods.css")
        );

        let titles: Vec<String> = doc
            .descendants_named(doc.body(), "h2")
            .into_iter()
            .map(|h2| doc.text_content(h2))
            .collect();
        assert_eq!(titles, vec!["Custom Section", "Remarks", "See Also"]);

        let html = rendered.serialize(OutputFormat::Website);
        assert!(html.contains("<span class=\"Style2\">styled</span>"));
        assert!(html.contains("class=\"collapsibleSection\" id=\"CS_"));
    }

    #[test]
    fn test_markdown_output() {
        let transformation = applied(&ModsConfig::default());
        let rendered = transformation
            .render_topic(&topic(), OutputFormats::MARKDOWN)
            .unwrap();
        assert!(rendered.document.children(rendered.document.head()).is_empty());
        assert_eq!(
            rendered.serialize(OutputFormat::Markdown),
            "# T:Sample.Widget\n\nSummary.\n\n## Custom Section\n\nstyled\n\n## Remarks\n\nRemarks.\n\n## See Also\n\n- [Gadget](T_Sample.Gadget.md)\n"
        );
    }
}
