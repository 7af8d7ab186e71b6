//! Declaration conversion: CSS declarations → typed style property values.

use crate::css::model::Declaration;
use crate::property::builtin::types;
use crate::property::{MetaDataDictionary, PropertyError, Value};

/// `background-color` → `backgroundColor`.
pub fn css_property_name(css: &str) -> String {
    let mut name = String::with_capacity(css.len());
    let mut upper = false;
    for c in css.chars() {
        if c == '-' {
            upper = !name.is_empty();
        } else if upper {
            name.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// Convert one declaration into a `(style property, value)` pair.
///
/// The property must be a style property of the `Style` element; the value
/// is validated against its declared kind.
pub fn style_declaration(
    dictionary: &MetaDataDictionary,
    declaration: &Declaration,
) -> Result<(String, Value), PropertyError> {
    let name = css_property_name(&declaration.property);
    let definition = dictionary
        .property(types::STYLE, &name)
        .filter(|p| p.style)
        .ok_or_else(|| PropertyError::UnknownProperty(declaration.property.clone()))?;

    if declaration.values.is_empty() {
        return Err(PropertyError::InvalidValue {
            property: name,
            message: "empty value".into(),
        });
    }
    let value = definition.validate(Value::String(declaration.value_text()))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_css;
    use crate::property::Dimension;

    fn convert(css: &str) -> Result<(String, Value), PropertyError> {
        let sheet = parse_css(&format!(".S {{ {css} }}")).unwrap();
        style_declaration(&MetaDataDictionary::builtin(), &sheet.rules[0].declarations[0])
    }

    #[test]
    fn property_names() {
        assert_eq!(css_property_name("background-color"), "backgroundColor");
        assert_eq!(css_property_name("border-top-style"), "borderTopStyle");
        assert_eq!(css_property_name("color"), "color");
        assert_eq!(css_property_name("-x-color"), "xColor");
    }

    #[test]
    fn typed_values() {
        assert_eq!(
            convert("font-size: 12pt;").unwrap(),
            ("fontSize".into(), Value::Dimension(Dimension::new(12.0, "pt")))
        );
        assert_eq!(
            convert("color: #FF0000;").unwrap(),
            ("color".into(), Value::Color("#ff0000".into()))
        );
        assert_eq!(
            convert("text-align: center;").unwrap(),
            ("textAlign".into(), Value::Choice("center".into()))
        );
        assert_eq!(
            convert("font-family: \"Times New Roman\", serif;").unwrap(),
            ("fontFamily".into(), Value::String("Times New Roman, serif".into()))
        );
    }

    #[test]
    fn unknown_property() {
        assert_eq!(
            convert("margin: 1pt;").unwrap_err(),
            PropertyError::UnknownProperty("margin".into())
        );
    }

    #[test]
    fn invalid_value() {
        assert!(matches!(
            convert("font-weight: 700;"),
            Err(PropertyError::InvalidValue { property, .. }) if property == "fontWeight"
        ));
    }
}
