//! Design stylesheets: named CSS styles and their inclusion references.
//!
//! A [`CssStyleSheet`] is compiled from a parsed [`StyleSheet`]: every
//! selector of every rule becomes a named [`CssStyle`] holding typed style
//! property values. Rules that share a selector merge, later declarations
//! overriding earlier ones.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::css::matcher::matches_selector;
use crate::css::model::{Selector, StyleSheet};
use crate::css::parser::{parse_css, ParseError};
use crate::css::properties::style_declaration;
use crate::css::specificity::Specificity;
use crate::design::{DesignTree, ElementId};
use crate::property::{MetaDataDictionary, Value};

/// A named style compiled from one selector.
#[derive(Debug, Clone, PartialEq)]
pub struct CssStyle {
    pub name: String,
    pub selector: Selector,
    /// Style property values in declaration order.
    pub properties: Vec<(String, Value)>,
    pub specificity: Specificity,
}

impl CssStyle {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn merge(&mut self, properties: Vec<(String, Value)>, specificity: Specificity) {
        for (name, value) in properties {
            match self.properties.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = value,
                None => self.properties.push((name, value)),
            }
        }
        self.specificity = self.specificity.max(specificity);
    }
}

/// A declaration the model could not represent.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedDeclaration {
    pub style: String,
    pub property: String,
    pub reason: String,
}

/// A compiled stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CssStyleSheet {
    file_name: String,
    styles: Vec<CssStyle>,
    unsupported: Vec<UnsupportedDeclaration>,
}

impl CssStyleSheet {
    /// Parse and compile CSS text.
    pub fn parse(
        file_name: impl Into<String>,
        text: &str,
        dictionary: &MetaDataDictionary,
    ) -> Result<Self, ParseError> {
        Ok(Self::compile(file_name, &parse_css(text)?, dictionary))
    }

    /// Compile a parsed stylesheet.
    pub fn compile(
        file_name: impl Into<String>,
        sheet: &StyleSheet,
        dictionary: &MetaDataDictionary,
    ) -> Self {
        let file_name = file_name.into();
        let mut styles: Vec<CssStyle> = Vec::new();
        let mut unsupported = Vec::new();

        for (i, rule) in sheet.rules.iter().enumerate() {
            let important = rule.declarations.iter().any(|d| d.important);
            for selector in &rule.selectors {
                let name = selector.style_name();
                let mut properties = Vec::new();
                for declaration in &rule.declarations {
                    match style_declaration(dictionary, declaration) {
                        Ok(pair) => properties.push(pair),
                        Err(err) => {
                            tracing::warn!(
                                file = %file_name,
                                style = %name,
                                property = %declaration.property,
                                error = %err,
                                "unsupported css declaration"
                            );
                            unsupported.push(UnsupportedDeclaration {
                                style: name.clone(),
                                property: declaration.property.clone(),
                                reason: err.to_string(),
                            });
                        }
                    }
                }

                let specificity = Specificity::from_selector(selector, i as u32, important);
                match styles.iter_mut().find(|s| s.name == name) {
                    Some(existing) => existing.merge(properties, specificity),
                    None => styles.push(CssStyle {
                        name,
                        selector: selector.clone(),
                        properties,
                        specificity,
                    }),
                }
            }
        }

        Self {
            file_name,
            styles,
            unsupported,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Styles in first-definition order.
    pub fn styles(&self) -> &[CssStyle] {
        &self.styles
    }

    pub fn style(&self, name: &str) -> Option<&CssStyle> {
        self.styles.iter().find(|s| s.name == name)
    }

    pub fn contains_style(&self, name: &str) -> bool {
        self.style(name).is_some()
    }

    pub fn unsupported(&self) -> &[UnsupportedDeclaration] {
        &self.unsupported
    }

    /// Value of `property` for element `id`: among the styles matching the
    /// element that set the property, the one with the highest specificity.
    pub fn resolve(&self, property: &str, tree: &DesignTree, id: ElementId) -> Option<&Value> {
        self.styles
            .iter()
            .filter_map(|style| style.property(property).map(|v| (style, v)))
            .filter(|(style, _)| matches_selector(&style.selector, tree, id))
            .max_by_key(|(style, _)| style.specificity)
            .map(|(_, v)| v)
    }
}

/// A module's or theme's reference to a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludedCssStyleSheet {
    pub file_name: String,
    /// Location the rendered output links to instead of embedding.
    pub external_uri: Option<String>,
    pub use_external_css: bool,
}

impl IncludedCssStyleSheet {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            external_uri: None,
            use_external_css: false,
        }
    }

    pub fn with_external_uri(mut self, uri: impl Into<String>) -> Self {
        self.external_uri = Some(uri.into());
        self
    }

    pub fn with_use_external_css(mut self, use_external: bool) -> Self {
        self.use_external_css = use_external;
        self
    }
}

/// An inclusion reference together with the sheet it loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludedCss {
    pub reference: IncludedCssStyleSheet,
    pub sheet: Rc<CssStyleSheet>,
}

impl IncludedCss {
    pub fn new(reference: IncludedCssStyleSheet, sheet: CssStyleSheet) -> Self {
        Self {
            reference,
            sheet: Rc::new(sheet),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.reference.file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ContainerRef;
    use crate::property::builtin::{props, slots, types};

    fn compile(css: &str) -> CssStyleSheet {
        CssStyleSheet::parse("test.css", css, &MetaDataDictionary::builtin()).unwrap()
    }

    #[test]
    fn styles_are_named_by_selector() {
        let sheet = compile(".S1 { color: red; } Label, Table > Cell { font-size: 8pt; }");
        let names: Vec<_> = sheet.styles().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["S1", "Label", "Table > Cell"]);
        assert_eq!(sheet.file_name(), "test.css");
    }

    #[test]
    fn same_selector_merges() {
        let sheet = compile(".S1 { color: red; font-weight: bold; } .S1 { color: blue; }");
        let style = sheet.style("S1").unwrap();
        assert_eq!(sheet.styles().len(), 1);
        assert_eq!(style.property("color"), Some(&Value::Color("blue".into())));
        assert_eq!(style.property("fontWeight"), Some(&Value::Choice("bold".into())));
        assert_eq!(style.specificity.source_order, 1);
    }

    #[test]
    fn unsupported_declarations_are_recorded() {
        let sheet = compile(".S1 { margin: 2pt; color: red; font-weight: 700; }");
        assert_eq!(sheet.style("S1").unwrap().properties.len(), 1);
        let skipped: Vec<_> = sheet.unsupported().iter().map(|u| u.property.as_str()).collect();
        assert_eq!(skipped, vec!["margin", "font-weight"]);
    }

    #[test]
    fn resolve_picks_highest_specificity() {
        let mut tree = DesignTree::new(types::REPORT_DESIGN, std::rc::Rc::new(MetaDataDictionary::builtin()));
        let label = tree.create(types::LABEL, Some("title".into()));
        tree.attach(
            label,
            ContainerRef {
                element: tree.root(),
                slot: slots::BODY.into(),
            },
            0,
        );
        tree.get_mut(label)
            .unwrap()
            .properties
            .set(props::STYLE, Some(Value::from("S1")));

        let sheet = compile("#title { color: green; } .S1 { color: red; } Label { color: blue; font-size: 8pt; }");
        assert_eq!(sheet.resolve("color", &tree, label), Some(&Value::Color("green".into())));
        assert_eq!(
            sheet.resolve("fontSize", &tree, label),
            Some(&Value::Dimension(crate::property::Dimension::new(8.0, "pt")))
        );
        assert_eq!(sheet.resolve("textAlign", &tree, label), None);
    }

    #[test]
    fn included_reference_builder() {
        let reference = IncludedCssStyleSheet::new("a.css")
            .with_external_uri("http://cdn/a.css")
            .with_use_external_css(true);
        assert_eq!(reference.external_uri.as_deref(), Some("http://cdn/a.css"));
        assert!(reference.use_external_css);

        let included = IncludedCss::new(reference, compile(""));
        assert_eq!(included.file_name(), "a.css");
    }
}
