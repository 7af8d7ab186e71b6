//! Style cascade: effective style property values and where they come from.
//!
//! Each style property is resolved on its own, highest priority first:
//!
//! 1. the element's local value
//! 2. a style in the module's `styles` slot: the one named by the element's
//!    `style` property, then the one named after the element type
//! 3. stylesheets included by the module root, in inclusion order; the first
//!    sheet that provides the property wins
//! 4. the active theme: its styles, then its own stylesheets
//! 5. the library base element, resolved the same way in its own module
//! 6. the property default

use std::collections::BTreeMap;

use serde::Serialize;

use crate::design::{DesignElement, DesignTree, ElementId};
use crate::error::{DesignError, Result};
use crate::module::{ElementRef, Module};
use crate::property::builtin::{props, slots};
use crate::property::Value;

/// Where an effective value was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ValueSource {
    Local,
    /// A style element in the module's `styles` slot.
    SharedStyle { name: String },
    Css { file_name: String },
    /// A style element of the active theme.
    Theme { theme: String, style: String },
    ThemeCss { theme: String, file_name: String },
    /// Found on the library base element; `via` tells where it came from there.
    Library {
        namespace: Option<String>,
        via: Box<ValueSource>,
    },
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedValue {
    pub value: Value,
    pub source: ValueSource,
}

/// Effective values of every style property of one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComputedStyle {
    values: BTreeMap<String, ResolvedValue>,
}

impl ComputedStyle {
    pub fn get(&self, property: &str) -> Option<&ResolvedValue> {
        self.values.get(property)
    }

    pub fn value(&self, property: &str) -> Option<&Value> {
        self.get(property).map(|r| &r.value)
    }

    pub fn source(&self, property: &str) -> Option<&ValueSource> {
        self.get(property).map(|r| &r.source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Styles in the `styles` slot of `host` that apply to `element`: the one
/// named by its `style` property, then the one named after its type.
fn candidate_styles<'a>(
    tree: &'a DesignTree,
    host: ElementId,
    element: &DesignElement,
) -> Vec<&'a DesignElement> {
    let styles = move || {
        tree.contents(host, slots::STYLES)
            .iter()
            .filter_map(move |&id| tree.get(id))
    };
    let named = element
        .property(props::STYLE)
        .and_then(Value::as_str)
        .and_then(|name| styles().find(|s| s.name() == Some(name)));
    let predefined = styles().find(|s| {
        s.name()
            .is_some_and(|n| n.eq_ignore_ascii_case(element.type_name()))
    });
    named.into_iter().chain(predefined).collect()
}

/// First candidate style providing `property`, with the style's name.
fn style_value<'a>(
    tree: &'a DesignTree,
    host: ElementId,
    element: &DesignElement,
    property: &str,
) -> Option<(&'a str, &'a Value)> {
    candidate_styles(tree, host, element)
        .into_iter()
        .find_map(|style| Some((style.name()?, style.property(property)?)))
}

/// Cascade steps 1 to 5 for `target` in its own module.
fn resolve<'a>(
    target: ElementRef<'a>,
    property: &str,
    depth: usize,
) -> Option<(&'a Value, ValueSource)> {
    let module = target.module;
    let element = target.element()?;

    if let Some(value) = element.property(property) {
        return Some((value, ValueSource::Local));
    }

    if let Some((name, value)) = style_value(module.tree(), module.root(), element, property) {
        return Some((
            value,
            ValueSource::SharedStyle {
                name: name.to_owned(),
            },
        ));
    }

    for css in module.included_csses(module.root()) {
        if let Some(value) = css.sheet.resolve(property, module.tree(), target.id) {
            return Some((
                value,
                ValueSource::Css {
                    file_name: css.file_name().to_owned(),
                },
            ));
        }
    }

    if let Some(theme) = module.resolve_theme() {
        let theme_name = theme
            .element()
            .and_then(|t| t.name())
            .unwrap_or_default()
            .to_owned();
        let found = style_value(theme.module.tree(), theme.id, element, property);
        if let Some((style, value)) = found {
            return Some((
                value,
                ValueSource::Theme {
                    theme: theme_name,
                    style: style.to_owned(),
                },
            ));
        }

        for css in theme.module.included_csses(theme.id) {
            if let Some(value) = css.sheet.resolve(property, module.tree(), target.id) {
                return Some((
                    value,
                    ValueSource::ThemeCss {
                        theme: theme_name,
                        file_name: css.file_name().to_owned(),
                    },
                ));
            }
        }
    }

    if depth < module.config().max_extends_depth {
        let base = target.base()?;
        let namespace = element.extends()?.namespace.clone();
        let (value, via) = resolve(base, property, depth + 1)?;
        return Some((
            value,
            ValueSource::Library {
                namespace,
                via: Box::new(via),
            },
        ));
    }
    None
}

impl Module {
    /// Effective value of one style property of `element`.
    pub fn style_property(&self, element: ElementId, property: &str) -> Option<ResolvedValue> {
        let target = ElementRef {
            module: self,
            id: element,
        };
        let resolved = resolve(target, property, 0)
            .map(|(value, source)| ResolvedValue {
                value: value.clone(),
                source,
            })
            .or_else(|| {
                self.default_value(element, property).map(|value| ResolvedValue {
                    value: value.clone(),
                    source: ValueSource::Default,
                })
            });
        tracing::trace!(?element, property, source = ?resolved.as_ref().map(|r| &r.source), "style resolved");
        resolved
    }

    /// Effective values of every style property the element's type defines.
    pub fn effective_style(&self, element: ElementId) -> Result<ComputedStyle> {
        let target = self
            .element(element)
            .ok_or(DesignError::ElementNotFound(element))?;
        let values = self
            .dictionary()
            .style_properties(target.type_name())
            .into_iter()
            .filter_map(|definition| {
                let resolved = self.style_property(element, &definition.name)?;
                Some((definition.name.clone(), resolved))
            })
            .collect();
        Ok(ComputedStyle { values })
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::ModuleConfig;
    use crate::css::sheet::{CssStyleSheet, IncludedCssStyleSheet};
    use crate::design::ExtendsRef;
    use crate::property::builtin::types;
    use crate::resource::MemoryResources;

    fn design() -> Module {
        let resources = MemoryResources::new()
            .with_file("a.css", ".S1 { color: red; }")
            .with_file("b.css", ".S1 { color: blue; font-size: 14pt; }");
        Module::new_design(ModuleConfig::new().with_resources(Rc::new(resources))).unwrap()
    }

    fn label(m: &mut Module, style: Option<&str>) -> ElementId {
        let id = m.create_element(types::LABEL, None).unwrap();
        let root = m.root();
        m.add_element(id, root, slots::BODY, None).unwrap();
        if let Some(style) = style {
            m.set_property(id, props::STYLE, style).unwrap();
        }
        id
    }

    fn shared_style(m: &mut Module, name: &str, property: &str, value: &str) -> ElementId {
        let id = m.create_element(types::STYLE, Some(name)).unwrap();
        let root = m.root();
        m.add_element(id, root, slots::STYLES, None).unwrap();
        m.set_property(id, property, value).unwrap();
        id
    }

    fn color(m: &Module, id: ElementId) -> (Value, ValueSource) {
        let resolved = m.style_property(id, "color").unwrap();
        (resolved.value, resolved.source)
    }

    #[test]
    fn local_beats_everything() {
        let mut m = design();
        let root = m.root();
        m.add_css(root, "a.css").unwrap();
        let id = label(&mut m, Some("S1"));
        m.set_property(id, "color", "green").unwrap();
        assert_eq!(color(&m, id), (Value::Color("green".into()), ValueSource::Local));

        m.clear_property(id, "color").unwrap();
        assert_eq!(
            color(&m, id),
            (
                Value::Color("red".into()),
                ValueSource::Css {
                    file_name: "a.css".into()
                }
            )
        );
    }

    #[test]
    fn first_included_sheet_wins() {
        let mut m = design();
        let root = m.root();
        m.add_css(root, "a.css").unwrap();
        m.add_css(root, "b.css").unwrap();
        let id = label(&mut m, Some("S1"));

        let style = m.effective_style(id).unwrap();
        assert_eq!(style.value("color"), Some(&Value::Color("red".into())));
        // properties missing from the first sheet still come from the second
        assert_eq!(
            style.source("fontSize"),
            Some(&ValueSource::Css {
                file_name: "b.css".into()
            })
        );
    }

    #[test]
    fn shared_style_beats_css() {
        let mut m = design();
        let root = m.root();
        m.add_css(root, "a.css").unwrap();
        shared_style(&mut m, "S1", "color", "olive");
        let id = label(&mut m, Some("S1"));
        assert_eq!(
            color(&m, id),
            (
                Value::Color("olive".into()),
                ValueSource::SharedStyle { name: "S1".into() }
            )
        );
    }

    #[test]
    fn predefined_style_by_type_name() {
        let mut m = design();
        shared_style(&mut m, "label", "fontWeight", "bold");
        let id = label(&mut m, None);
        assert_eq!(
            m.style_property(id, "fontWeight").unwrap().source,
            ValueSource::SharedStyle {
                name: "label".into()
            }
        );
    }

    #[test]
    fn falls_back_to_default() {
        let mut m = design();
        let id = label(&mut m, Some("Missing"));
        let style = m.effective_style(id).unwrap();
        assert_eq!(style.value("color"), Some(&Value::Color("black".into())));
        assert_eq!(style.source("color"), Some(&ValueSource::Default));
        assert_eq!(style.get("backgroundColor"), None);
        assert!(!style.is_empty());
    }

    #[test]
    fn theme_then_theme_css() {
        let mut lib = Module::new_library(ModuleConfig::new()).unwrap();
        let root = lib.root();
        let theme = lib.create_element(types::THEME, Some("Corporate")).unwrap();
        lib.add_element(theme, root, slots::THEMES, None).unwrap();
        let style = lib.create_element(types::STYLE, Some("S1")).unwrap();
        lib.add_element(style, theme, slots::STYLES, None).unwrap();
        lib.set_property(style, "color", "maroon").unwrap();
        let sheet =
            CssStyleSheet::parse("theme.css", "Label { font-style: italic; }", lib.dictionary())
                .unwrap();
        lib.add_css_sheet(theme, IncludedCssStyleSheet::new("theme.css"), sheet)
            .unwrap();

        let mut m = design();
        m.include_library("lib", Rc::new(lib)).unwrap();
        let root = m.root();
        m.set_property(root, props::THEME, "lib.Corporate").unwrap();
        let id = label(&mut m, Some("S1"));

        assert_eq!(
            color(&m, id),
            (
                Value::Color("maroon".into()),
                ValueSource::Theme {
                    theme: "Corporate".into(),
                    style: "S1".into()
                }
            )
        );
        assert_eq!(
            m.style_property(id, "fontStyle").unwrap().source,
            ValueSource::ThemeCss {
                theme: "Corporate".into(),
                file_name: "theme.css".into()
            }
        );

        // design css outranks the theme
        m.add_css(root, "a.css").unwrap();
        assert_eq!(color(&m, id).0, Value::Color("red".into()));
    }

    #[test]
    fn library_base_after_theme() {
        let mut lib = Module::new_library(ModuleConfig::new()).unwrap();
        let root = lib.root();
        let base = lib.create_element(types::LABEL, Some("Base")).unwrap();
        lib.add_element(base, root, slots::COMPONENTS, None).unwrap();
        lib.set_property(base, "color", "purple").unwrap();
        lib.set_property(base, "textAlign", "center").unwrap();

        let mut m = design();
        m.include_library("lib", Rc::new(lib)).unwrap();
        let id = label(&mut m, None);
        m.set_extends(id, ExtendsRef::library("lib", "Base")).unwrap();

        assert_eq!(
            color(&m, id),
            (
                Value::Color("purple".into()),
                ValueSource::Library {
                    namespace: Some("lib".into()),
                    via: Box::new(ValueSource::Local)
                }
            )
        );

        m.drop_library("lib").unwrap();
        assert_eq!(color(&m, id), (Value::Color("black".into()), ValueSource::Default));
    }

    #[test]
    fn unknown_element() {
        let m = design();
        assert!(matches!(
            m.effective_style(ElementId::default()),
            Err(DesignError::ElementNotFound(_))
        ));
    }
}
