//! Selector matching against design elements.
//!
//! - `Type` matches the element type name, ignoring ASCII case.
//! - `Class` matches the name in the element's local `style` property.
//! - `Id` matches the element name.
//! - Pseudo-classes need runtime state and never match.

use crate::css::model::{Combinator, CompoundSelector, Selector, SelectorComponent, SelectorPart};
use crate::design::{DesignElement, DesignTree, ElementId};
use crate::property::builtin::props;

/// Check whether a full selector matches element `id`.
///
/// Walks the selector parts from right to left, matching compound selectors
/// and navigating the containment tree via combinators. A descendant
/// combinator tries every matching ancestor, not only the nearest one.
pub fn matches_selector(selector: &Selector, tree: &DesignTree, id: ElementId) -> bool {
    let parts = &selector.parts;
    !parts.is_empty() && matches_from(parts, parts.len() - 1, tree, id)
}

/// Whether `parts[..=idx]` matches with `parts[idx]` applied to `id`.
fn matches_from(parts: &[SelectorPart], idx: usize, tree: &DesignTree, id: ElementId) -> bool {
    let Some(SelectorPart::Compound(compound)) = parts.get(idx) else {
        return false;
    };
    if !tree.get(id).is_some_and(|e| matches_compound(compound, e)) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    let (Some(SelectorPart::Combinator(combinator)), Some(next)) =
        (parts.get(idx - 1), idx.checked_sub(2))
    else {
        return false;
    };

    match combinator {
        Combinator::Child => tree
            .parent(id)
            .is_some_and(|p| matches_from(parts, next, tree, p)),
        Combinator::Descendant => tree
            .ancestors(id)
            .into_iter()
            .any(|a| matches_from(parts, next, tree, a)),
    }
}

/// Check whether a compound selector matches a single element.
fn matches_compound(compound: &CompoundSelector, element: &DesignElement) -> bool {
    compound.components.iter().all(|component| match component {
        SelectorComponent::Type(name) => element.type_name().eq_ignore_ascii_case(name),
        SelectorComponent::Class(name) => {
            element.property(props::STYLE).and_then(|v| v.as_str()) == Some(name.as_str())
        }
        SelectorComponent::Id(name) => element.name() == Some(name.as_str()),
        SelectorComponent::Universal => true,
        SelectorComponent::PseudoClass(_) => false,
    })
}
