//! CSS AST: Selector, RuleSet, Declaration.

use std::fmt;

/// A single CSS selector component.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Type selector: matches the element type name (e.g. `Label`).
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector: `.Heading`, matched against the element's style name.
    Class(String),
    /// ID selector: `#title`, matched against the element name.
    Id(String),
    /// Pseudo-class: `:hover`. Never matches a design element.
    PseudoClass(String),
}

impl fmt::Display for SelectorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorComponent::Type(name) => f.write_str(name),
            SelectorComponent::Universal => f.write_str("*"),
            SelectorComponent::Class(name) => write!(f, ".{name}"),
            SelectorComponent::Id(name) => write!(f, "#{name}"),
            SelectorComponent::PseudoClass(name) => write!(f, ":{name}"),
        }
    }
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
}

/// A sequence of components without combinators, e.g. `Label.Heading`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, component: SelectorComponent) {
        self.components.push(component);
    }

    /// Returns `true` if this selector is the universal selector `*` alone.
    pub fn is_universal(&self) -> bool {
        self.components.len() == 1 && matches!(self.components[0], SelectorComponent::Universal)
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

/// One element in a selector chain: either a compound selector or a combinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// A full CSS selector: chain of compound selectors joined by combinators.
///
/// `Table > Cell` has parts `[Compound(Table), Combinator(Child), Compound(Cell)]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    /// Alternating compound selectors and combinators.
    /// Always starts and ends with a `SelectorPart::Compound`.
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name under which the selector's rule is stored in a sheet: the class
    /// name for a lone class selector, the selector text otherwise.
    pub fn style_name(&self) -> String {
        if let [SelectorPart::Compound(compound)] = self.parts.as_slice() {
            if let [SelectorComponent::Class(name)] = compound.components.as_slice() {
                return name.clone();
            }
        }
        self.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            match part {
                SelectorPart::Compound(c) => write!(f, "{c}")?,
                SelectorPart::Combinator(Combinator::Child) => f.write_str(" > ")?,
                SelectorPart::Combinator(Combinator::Descendant) => {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// A value token within a CSS declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    /// An identifier like `red`, `bold`, `center`.
    Ident(String),
    /// A bare number like `700`.
    Number(f32),
    /// A number with a unit suffix like `10pt` or `50%`.
    Dimension(f32, String),
    /// A hex color string (without the `#` prefix), e.g. `"ff00aa"`.
    Color(String),
    /// A quoted string value.
    String(String),
    /// A `,` between alternatives, as in `font-family: Arial, serif`.
    Comma,
}

impl fmt::Display for DeclarationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationValue::Ident(s) | DeclarationValue::String(s) => f.write_str(s),
            DeclarationValue::Number(n) => write!(f, "{n}"),
            DeclarationValue::Dimension(n, unit) => write!(f, "{n}{unit}"),
            DeclarationValue::Color(hex) => write!(f, "#{hex}"),
            DeclarationValue::Comma => f.write_str(","),
        }
    }
}

/// A single CSS property declaration, e.g. `color: red`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub values: Vec<DeclarationValue>,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: String, values: Vec<DeclarationValue>, important: bool) -> Self {
        Self {
            property,
            values,
            important,
        }
    }

    /// The value list as text: tokens joined by spaces, commas kept tight.
    pub fn value_text(&self) -> String {
        let mut text = String::new();
        for value in &self.values {
            match value {
                DeclarationValue::Comma => text.push(','),
                other => {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&other.to_string());
                }
            }
        }
        text
    }
}

/// A CSS rule: one or more selectors paired with declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// A parsed CSS stylesheet: a list of rule sets.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }
}
