//! Localized resource items and static assets.
//!
//! Files are looked up in the project's resource folder first. Localized
//! files are named `<base>-<language>.xml`; when the requested language is
//! missing the `en-US` file is used. The default resources are compiled in,
//! so a project without a resource folder still builds.

use std::path::PathBuf;

use crate::transform::{ParseError, StringTable, parse_element_tree};

/// Language used when a localized file is missing.
pub const FALLBACK_LANGUAGE: &str = "en-US";

const EMBEDDED: &[(&str, &str)] = &[
    (
        "PresentationStyleMods-en-US.xml",
        include_str!("../resources/PresentationStyleMods-en-US.xml"),
    ),
    (
        "PresentationStyleMods.css",
        include_str!("../resources/PresentationStyleMods.css"),
    ),
];

/// The compiled-in resources as `(file name, content)` pairs.
pub fn embedded_resources() -> impl Iterator<Item = (&'static str, &'static str)> {
    EMBEDDED.iter().copied()
}

#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    #[error("resource '{name}' not found for language '{language}'")]
    NotFound { name: String, language: String },

    #[error("failed to read resource {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse resource items in '{name}': {source}")]
    Parse { name: String, source: ParseError },
}

/// Where a resolved resource came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOrigin {
    File(PathBuf),
    Embedded(&'static str),
}

/// A resolved resource.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub origin: ResourceOrigin,
    pub content: String,
}

/// Resolves resources by logical name and language.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    dir: PathBuf,
}

impl ResourceResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve a non-localized resource such as a stylesheet.
    pub fn resolve(&self, name: &str) -> Result<Resource, ResourceError> {
        self.find(name)?.ok_or_else(|| ResourceError::NotFound {
            name: name.to_string(),
            language: String::new(),
        })
    }

    /// Resolve `<base>-<language>.<ext>`, falling back to the `en-US` file.
    pub fn resolve_localized(
        &self,
        base: &str,
        ext: &str,
        language: &str,
    ) -> Result<Resource, ResourceError> {
        let mut candidates = vec![format!("{base}-{language}.{ext}")];
        if !language.eq_ignore_ascii_case(FALLBACK_LANGUAGE) {
            candidates.push(format!("{base}-{FALLBACK_LANGUAGE}.{ext}"));
        }

        for name in &candidates {
            if let Some(resource) = self.find(name)? {
                if name != &candidates[0] {
                    tracing::warn!(
                        resource = %base,
                        %language,
                        "no localized resource, falling back to {FALLBACK_LANGUAGE}"
                    );
                }
                return Ok(resource);
            }
        }
        Err(ResourceError::NotFound {
            name: format!("{base}.{ext}"),
            language: language.to_string(),
        })
    }

    /// Load the resource item file `<base>-<language>.xml` into a string table.
    pub fn load_items(&self, base: &str, language: &str) -> Result<StringTable, ResourceError> {
        let resource = self.resolve_localized(base, "xml", language)?;
        let table = parse_items(&resource.content).map_err(|source| ResourceError::Parse {
            name: resource.name.clone(),
            source,
        })?;
        tracing::debug!(resource = %resource.name, items = table.len(), "loaded resource items");
        Ok(table)
    }

    fn find(&self, name: &str) -> Result<Option<Resource>, ResourceError> {
        let path = self.dir.join(name);
        if path.is_file() {
            let content = std::fs::read_to_string(&path).map_err(|source| ResourceError::Read {
                path: path.clone(),
                source,
            })?;
            return Ok(Some(Resource {
                name: name.to_string(),
                origin: ResourceOrigin::File(path),
                content,
            }));
        }

        Ok(EMBEDDED
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .map(|(embedded, content)| Resource {
                name: name.to_string(),
                origin: ResourceOrigin::Embedded(embedded),
                content: (*content).to_string(),
            }))
    }
}

/// Parse `<content><item id="...">text</item></content>`.
pub fn parse_items(xml: &str) -> Result<StringTable, ParseError> {
    let root = parse_element_tree(xml)?;
    let mut table = StringTable::new();
    for item in root.children_named("item") {
        if let Some(id) = item.attribute("id") {
            table.insert(id, item.inner_text().trim());
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_items() {
        let table = parse_items(
            r#"<content><item id="title_customSection">Custom Section</item><item id="a">A &amp; B</item><item>no id</item></content>"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("title_customSection"), Some("Custom Section"));
        assert_eq!(table.get("a"), Some("A & B"));
    }

    #[test]
    fn test_embedded_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ResourceResolver::new(dir.path());

        let items = resolver.load_items("PresentationStyleMods", "en-US").unwrap();
        assert_eq!(items.get("title_customSection"), Some("Custom Section"));

        let css = resolver.resolve("PresentationStyleMods.css").unwrap();
        assert_eq!(css.origin, ResourceOrigin::Embedded("PresentationStyleMods.css"));
        assert!(css.content.contains(".Style1"));
    }

    #[test]
    fn test_localized_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("PresentationStyleMods-de-DE.xml"),
            r#"<content><item id="title_customSection">Eigener Abschnitt</item></content>"#,
        )
        .unwrap();
        let resolver = ResourceResolver::new(dir.path());

        let items = resolver.load_items("PresentationStyleMods", "de-DE").unwrap();
        assert_eq!(items.get("title_customSection"), Some("Eigener Abschnitt"));
    }

    #[test]
    fn test_missing_language_falls_back_to_en_us() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ResourceResolver::new(dir.path());

        let resource = resolver
            .resolve_localized("PresentationStyleMods", "xml", "fr-FR")
            .unwrap();
        assert_eq!(resource.name, "PresentationStyleMods-en-US.xml");
    }

    #[test]
    fn test_unknown_resource() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ResourceResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve_localized("Missing", "xml", "en-US"),
            Err(ResourceError::NotFound { .. })
        ));
    }
}
