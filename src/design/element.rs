//! Element types: ElementId, DesignElement, slots and references.

use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::css::sheet::IncludedCss;
use crate::property::{MetaDataDictionary, PropertyStore, Value};

new_key_type! {
    /// Stable identifier of a design element. Copy, lightweight (u64).
    ///
    /// Ids stay valid while an element is detached, so undo can re-attach
    /// the same element.
    pub struct ElementId;
}

/// Back-reference from an element to the slot that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub element: ElementId,
    pub slot: String,
}

/// By-name reference from an element to its base element.
///
/// Written `Name` for an element of the same module or `ns.Name` for an
/// element of the library included under namespace `ns`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtendsRef {
    pub namespace: Option<String>,
    pub name: String,
}

impl ExtendsRef {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn library(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Parse `"Name"` or `"ns.Name"`.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() => Self::library(ns, name),
            _ => Self::local(text),
        }
    }
}

impl fmt::Display for ExtendsRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A named, ordered containment list.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub contents: Vec<ElementId>,
}

/// A node of the design tree.
#[derive(Debug, Clone)]
pub struct DesignElement {
    pub(crate) type_name: String,
    pub(crate) name: Option<String>,
    pub(crate) properties: PropertyStore,
    pub(crate) container: Option<ContainerRef>,
    pub(crate) slots: Vec<Slot>,
    pub(crate) extends: Option<ExtendsRef>,
    pub(crate) csses: Vec<IncludedCss>,
}

impl DesignElement {
    /// A detached element with one empty slot per slot definition.
    pub(crate) fn new(
        type_name: impl Into<String>,
        name: Option<String>,
        dictionary: &MetaDataDictionary,
    ) -> Self {
        let type_name = type_name.into();
        let slots = dictionary
            .slots(&type_name)
            .into_iter()
            .map(|def| Slot {
                name: def.name.clone(),
                contents: Vec::new(),
            })
            .collect();
        Self {
            type_name,
            name,
            properties: PropertyStore::new(),
            container: None,
            slots,
            extends: None,
            csses: Vec::new(),
        }
    }

    /// Definition name, e.g. `"Label"`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Local value of a property; `None` falls through to the cascade.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn container(&self) -> Option<&ContainerRef> {
        self.container.as_ref()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Contents of a slot; `None` if the type has no such slot.
    pub fn slot(&self, name: &str) -> Option<&[ElementId]> {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.contents.as_slice())
    }

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut Vec<ElementId>> {
        self.slots
            .iter_mut()
            .find(|s| s.name == name)
            .map(|s| &mut s.contents)
    }

    pub fn extends(&self) -> Option<&ExtendsRef> {
        self.extends.as_ref()
    }

    /// Stylesheets included by this element, in cascade order.
    pub fn csses(&self) -> &[IncludedCss] {
        &self.csses
    }
}
