//! Tree queries: collected property values, template-based items, lookups.

use super::element::ElementId;
use super::tree::DesignTree;
use crate::property::builtin::props;

impl DesignTree {
    /// Every element under the root's `slot`, depth-first, the slot's own
    /// contents included.
    pub fn slot_descendants(&self, slot: &str) -> Vec<ElementId> {
        self.contents(self.root(), slot)
            .iter()
            .flat_map(|&top| self.walk_depth_first(top))
            .collect()
    }

    /// String forms of the local values of `property` on every element
    /// under the root's `slot`.
    pub fn collect_property_values(&self, slot: &str, property: &str) -> Vec<String> {
        self.slot_descendants(slot)
            .into_iter()
            .filter_map(|id| self.get(id)?.property(property)?.as_str().map(str::to_owned))
            .collect()
    }

    /// Report items created from a template across `slots`, skipping items
    /// nested inside another template-based item.
    pub fn template_based_items(&self, slots: &[&str]) -> Vec<ElementId> {
        let mut result = Vec::new();
        for slot in slots {
            let mut stack: Vec<ElementId> =
                self.contents(self.root(), slot).iter().rev().copied().collect();
            while let Some(current) = stack.pop() {
                let Some(element) = self.get(current) else {
                    continue;
                };
                if element.property(props::TEMPLATE_PARAMETER).is_some() {
                    result.push(current);
                    continue;
                }
                stack.extend(self.children(current).into_iter().rev());
            }
        }
        result
    }

    /// Attached elements of exactly `type_name`, in tree order.
    pub fn elements_of_type(&self, type_name: &str) -> Vec<ElementId> {
        self.walk_depth_first(self.root())
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|e| e.type_name() == type_name))
            .collect()
    }

    /// First attached element named `name`, in tree order, ignoring name spaces.
    pub fn find_any(&self, name: &str) -> Option<ElementId> {
        self.walk_depth_first(self.root())
            .into_iter()
            .find(|&id| self.get(id).and_then(|e| e.name()) == Some(name))
    }
}
