//! CSS specificity calculation and comparison.
//!
//! Within one stylesheet, the rule that wins for a property is the matching
//! rule with the highest specificity:
//!
//! ```text
//! (important, id_count, class_count, type_count, source_order)
//! ```
//!
//! Fields are ordered so that the derived `Ord` (lexicographic) gives the
//! cascade result. Across stylesheets, inclusion order decides instead.

use crate::css::model::{Selector, SelectorComponent, SelectorPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    /// 1 if `!important`, 0 otherwise.
    pub important: u8,
    /// Number of ID selectors (`#id`).
    pub id_count: u16,
    /// Number of class + pseudo-class selectors.
    pub class_count: u16,
    /// Number of type selectors (`Label`, `Table`).
    pub type_count: u16,
    /// Rule index in its sheet; later rules win ties.
    pub source_order: u32,
}

impl Specificity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute specificity from a parsed selector.
    pub fn from_selector(selector: &Selector, source_order: u32, important: bool) -> Self {
        let mut spec = Self {
            important: u8::from(important),
            source_order,
            ..Self::default()
        };

        let components = selector.parts.iter().flat_map(|part| match part {
            SelectorPart::Compound(compound) => compound.components.as_slice(),
            SelectorPart::Combinator(_) => &[][..],
        });
        for component in components {
            match component {
                SelectorComponent::Id(_) => spec.id_count += 1,
                SelectorComponent::Class(_) | SelectorComponent::PseudoClass(_) => {
                    spec.class_count += 1
                }
                SelectorComponent::Type(_) => spec.type_count += 1,
                SelectorComponent::Universal => {}
            }
        }
        spec
    }

    /// Same specificity at a different source position.
    pub fn with_source_order(mut self, source_order: u32) -> Self {
        self.source_order = source_order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_css;

    fn spec_of(selector: &str, order: u32) -> Specificity {
        let sheet = parse_css(&format!("{selector} {{ color: red; }}")).unwrap();
        Specificity::from_selector(&sheet.rules[0].selectors[0], order, false)
    }

    #[test]
    fn counts_components() {
        let spec = spec_of("Table > Cell.total#sum", 0);
        assert_eq!(spec.id_count, 1);
        assert_eq!(spec.class_count, 1);
        assert_eq!(spec.type_count, 2);
    }

    #[test]
    fn universal_counts_nothing() {
        assert_eq!(spec_of("*", 3), Specificity::new().with_source_order(3));
    }

    #[test]
    fn id_beats_classes() {
        assert!(spec_of("#title", 0) > spec_of(".a.b.c", 5));
    }

    #[test]
    fn class_beats_type() {
        assert!(spec_of(".Heading", 0) > spec_of("Table Label", 1));
    }

    #[test]
    fn later_rule_wins_tie() {
        assert!(spec_of(".x", 2) > spec_of(".y", 1));
    }

    #[test]
    fn important_beats_everything() {
        let sheet = parse_css("Label { color: red !important; }").unwrap();
        let important = Specificity::from_selector(&sheet.rules[0].selectors[0], 0, true);
        assert!(important > spec_of("#a#b", 9));
    }
}
