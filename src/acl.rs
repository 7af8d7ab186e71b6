//! Access-control cascade.
//!
//! An element with `enableACL` set uses its own `aclExpression`. Otherwise
//! the nearest ancestor with `enableACL` set decides: its expression is
//! inherited when its `cascadeACL` is set, and the element is unrestricted
//! when it is not. Values are read through the extends chain and computed
//! on every call.

use serde::Serialize;

use crate::design::ElementId;
use crate::module::Module;
use crate::property::builtin::props;
use crate::property::Value;

/// An ACL expression and the element it was defined on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveAcl {
    pub expression: String,
    pub origin: ElementId,
}

impl Module {
    fn acl_flag(&self, element: ElementId, name: &str) -> bool {
        self.virtual_property(element, name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn acl_expression(&self, element: ElementId) -> Option<EffectiveAcl> {
        let expression = self
            .virtual_property(element, props::ACL_EXPRESSION)?
            .as_str()?;
        Some(EffectiveAcl {
            expression: expression.to_owned(),
            origin: element,
        })
    }

    /// The ACL in force for `element`, or `None` for open access.
    pub fn effective_acl(&self, element: ElementId) -> Option<EffectiveAcl> {
        if self.acl_flag(element, props::ENABLE_ACL) {
            return self.acl_expression(element);
        }
        let ancestor = self
            .tree()
            .ancestors(element)
            .into_iter()
            .find(|&a| self.acl_flag(a, props::ENABLE_ACL))?;
        if self.acl_flag(ancestor, props::CASCADE_ACL) {
            self.acl_expression(ancestor)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::ModuleConfig;
    use crate::design::ExtendsRef;
    use crate::property::builtin::{slots, types};

    /// ```text
    ///   root (ReportDesign)
    ///    └─ body: grid ─ row ─ cell ─ label
    /// ```
    fn build() -> (Module, ElementId, ElementId) {
        let mut m = Module::new_design(ModuleConfig::new()).unwrap();
        let root = m.root();
        let grid = m.create_element(types::GRID, None).unwrap();
        let row = m.create_element(types::ROW, None).unwrap();
        let cell = m.create_element(types::CELL, None).unwrap();
        let label = m.create_element(types::LABEL, None).unwrap();
        m.add_element(grid, root, slots::BODY, None).unwrap();
        m.add_element(row, grid, slots::ROWS, None).unwrap();
        m.add_element(cell, row, slots::CELLS, None).unwrap();
        m.add_element(label, cell, slots::CONTENT, None).unwrap();
        (m, grid, label)
    }

    fn enable(m: &mut Module, id: ElementId, expression: &str) {
        m.set_property(id, props::ENABLE_ACL, true).unwrap();
        m.set_property(id, props::ACL_EXPRESSION, expression).unwrap();
    }

    #[test]
    fn no_acl_anywhere() {
        let (m, _, label) = build();
        assert_eq!(m.effective_acl(label), None);
    }

    #[test]
    fn module_acl_cascades_to_items() {
        let (mut m, _, label) = build();
        let root = m.root();
        enable(&mut m, root, "isManager()");
        let acl = m.effective_acl(label).unwrap();
        assert_eq!(acl.expression, "isManager()");
        assert_eq!(acl.origin, root);

        m.set_property(root, props::CASCADE_ACL, false).unwrap();
        assert_eq!(m.effective_acl(label), None);
        assert_eq!(m.effective_acl(root).unwrap().expression, "isManager()");
    }

    #[test]
    fn nearest_enabled_ancestor_wins() {
        let (mut m, grid, label) = build();
        let root = m.root();
        enable(&mut m, root, "outer");
        enable(&mut m, grid, "inner");
        assert_eq!(m.effective_acl(label).unwrap().origin, grid);

        // a non-cascading nearer ancestor shadows the cascading root
        m.set_property(grid, props::CASCADE_ACL, false).unwrap();
        assert_eq!(m.effective_acl(label), None);
    }

    #[test]
    fn own_acl_beats_ancestors() {
        let (mut m, grid, label) = build();
        enable(&mut m, grid, "inner");
        enable(&mut m, label, "own");
        assert_eq!(m.effective_acl(label).unwrap().expression, "own");
    }

    #[test]
    fn enabled_without_expression_is_open() {
        let (mut m, _, label) = build();
        m.set_property(label, props::ENABLE_ACL, true).unwrap();
        assert_eq!(m.effective_acl(label), None);
    }

    #[test]
    fn acl_read_through_extends() {
        let mut lib = Module::new_library(ModuleConfig::new()).unwrap();
        let base = lib.create_element(types::LABEL, Some("Secret")).unwrap();
        let root = lib.root();
        lib.add_element(base, root, slots::COMPONENTS, None).unwrap();
        enable(&mut lib, base, "hasRole('hr')");

        let (mut m, _, label) = build();
        m.include_library("lib", Rc::new(lib)).unwrap();
        m.set_name(label, Some("mine")).unwrap();
        m.set_extends(label, ExtendsRef::library("lib", "Secret")).unwrap();
        assert_eq!(m.effective_acl(label).unwrap().expression, "hasRole('hr')");
    }
}
