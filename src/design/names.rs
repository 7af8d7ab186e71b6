//! Unique-name generation for elements entering the tree.
//!
//! A colliding (or missing but required) name gets the smallest numeric
//! suffix `1, 2, …` that is free in its scope: `Label` becomes `Label1`.
//! The plan is computed for a whole subtree before anything is attached so
//! that members of the subtree never collide with each other either.

use std::collections::HashSet;

use super::element::{ContainerRef, ElementId};
use super::tree::{DesignTree, NameKey};
use crate::property::NameScope;

/// A rename the caller must apply before attaching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub element: ElementId,
    pub old: Option<String>,
    pub new: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Reserved {
    Module(NameKey),
    Slot(ElementId, String, String),
}

struct Planner<'a> {
    tree: &'a DesignTree,
    subtree_root: ElementId,
    reserved: HashSet<Reserved>,
}

impl Planner<'_> {
    fn reservation(&self, id: ElementId, container: &ContainerRef, name: &str) -> Option<Reserved> {
        match self.tree.slot_scope(container.element, &container.slot) {
            NameScope::None => None,
            NameScope::Slot => Some(Reserved::Slot(
                container.element,
                container.slot.clone(),
                name.to_owned(),
            )),
            NameScope::Module => self.tree.name_key(id, container, name).map(Reserved::Module),
        }
    }

    fn is_taken(&self, id: ElementId, container: &ContainerRef, name: &str) -> bool {
        let Some(reservation) = self.reservation(id, container, name) else {
            return false;
        };
        if self.reserved.contains(&reservation) {
            return true;
        }
        // Slot siblings of inner members are all part of the plan.
        let existing_siblings = id == self.subtree_root;
        match reservation {
            Reserved::Slot(..) if !existing_siblings => false,
            _ => self.tree.name_conflicts(id, container, name),
        }
    }

    fn plan_one(&mut self, id: ElementId, container: &ContainerRef) -> Option<Rename> {
        let element = self.tree.get(id)?;
        let required = self.tree.dictionary().name_required(element.type_name());
        let current = element.name().map(str::to_owned);

        let base = match &current {
            Some(name) if !self.is_taken(id, container, name) => {
                if let Some(r) = self.reservation(id, container, name) {
                    self.reserved.insert(r);
                }
                return None;
            }
            Some(name) => name.clone(),
            None if required => element.type_name().to_owned(),
            None => return None,
        };

        let mut counter = 1usize;
        let new = loop {
            let candidate = format!("{base}{counter}");
            if !self.is_taken(id, container, &candidate) {
                break candidate;
            }
            counter += 1;
        };
        if let Some(r) = self.reservation(id, container, &new) {
            self.reserved.insert(r);
        }
        Some(Rename {
            element: id,
            old: current,
            new,
        })
    }
}

/// Renames needed so that `element` and its subtree can be attached to
/// `container` without name collisions.
pub fn plan_unique_names(
    tree: &DesignTree,
    element: ElementId,
    container: &ContainerRef,
) -> Vec<Rename> {
    let mut planner = Planner {
        tree,
        subtree_root: element,
        reserved: HashSet::new(),
    };
    let mut renames = Vec::new();

    for member in tree.walk_depth_first(element) {
        let slot_ref = if member == element {
            container.clone()
        } else {
            match tree.get(member).and_then(|e| e.container()) {
                Some(c) => c.clone(),
                None => continue,
            }
        };
        if let Some(rename) = planner.plan_one(member, &slot_ref) {
            renames.push(rename);
        }
    }
    renames
}
