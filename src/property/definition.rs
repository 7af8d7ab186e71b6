//! Declarative element and property definitions.
//!
//! A [`MetaDataDictionary`] maps element type names to [`ElementDefinition`]s.
//! Definitions form a single-inheritance chain (`Label` extends `ReportItem`
//! extends `DesignElement`); property and slot lookups walk that chain, the
//! most derived definition first.

use std::collections::HashMap;

use super::value::{PropertyError, PropertyKind, Value};

/// Static metadata for one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub name: String,
    pub kind: PropertyKind,
    pub default: Option<Value>,
    /// Never settable through the generic setter.
    pub locked: bool,
    /// Lock masks apply to this property.
    pub lockable: bool,
    /// Participates in style resolution.
    pub style: bool,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            locked: false,
            lockable: true,
            style: false,
        }
    }

    /// Set the built-in default (builder).
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn not_lockable(mut self) -> Self {
        self.lockable = false;
        self
    }

    /// Mark as a style property (builder).
    pub fn style(mut self) -> Self {
        self.style = true;
        self
    }

    /// Validate and normalize a value against this definition's kind.
    pub fn validate(&self, value: Value) -> Result<Value, PropertyError> {
        self.kind.normalize(&self.name, value)
    }
}

/// Where the names of a slot's elements must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope {
    /// No uniqueness requirement.
    None,
    /// Unique among the elements of the same slot.
    Slot,
    /// Unique across the module, per element name space.
    Module,
}

/// Static metadata for one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDefinition {
    pub name: String,
    /// Element types (or base types) the slot accepts.
    pub allowed: Vec<String>,
    pub multiple: bool,
    pub scope: NameScope,
}

impl SlotDefinition {
    /// A multi-valued slot with module-wide name uniqueness.
    pub fn new(name: impl Into<String>, allowed: &[&str]) -> Self {
        Self {
            name: name.into(),
            allowed: allowed.iter().map(|s| (*s).to_owned()).collect(),
            multiple: true,
            scope: NameScope::Module,
        }
    }

    /// Hold at most one element (builder).
    pub fn single(mut self) -> Self {
        self.multiple = false;
        self
    }

    pub fn with_scope(mut self, scope: NameScope) -> Self {
        self.scope = scope;
        self
    }
}

/// Static metadata for one element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDefinition {
    pub name: String,
    pub parent: Option<String>,
    pub is_abstract: bool,
    pub name_required: bool,
    /// Name space used by the module-wide name index.
    pub name_space: Option<String>,
    /// Elements of this type may include stylesheets.
    pub css_host: bool,
    pub properties: Vec<PropertyDefinition>,
    pub slots: Vec<SlotDefinition>,
}

impl ElementDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            is_abstract: false,
            name_required: false,
            name_space: None,
            css_host: false,
            properties: Vec::new(),
            slots: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn name_required(mut self) -> Self {
        self.name_required = true;
        self
    }

    pub fn with_name_space(mut self, name_space: impl Into<String>) -> Self {
        self.name_space = Some(name_space.into());
        self
    }

    pub fn css_host(mut self) -> Self {
        self.css_host = true;
        self
    }

    pub fn property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    pub fn slot(mut self, slot: SlotDefinition) -> Self {
        self.slots.push(slot);
        self
    }
}

/// Registry of element definitions.
#[derive(Debug, Clone, Default)]
pub struct MetaDataDictionary {
    elements: HashMap<String, ElementDefinition>,
}

impl MetaDataDictionary {
    /// An empty dictionary. See [`MetaDataDictionary::builtin`] for the
    /// report-design vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a definition.
    pub fn register(&mut self, definition: ElementDefinition) {
        self.elements.insert(definition.name.clone(), definition);
    }

    pub fn element(&self, type_name: &str) -> Option<&ElementDefinition> {
        self.elements.get(type_name)
    }

    /// The definition chain of `type_name`, most derived first.
    ///
    /// Stops at an unknown parent or when the chain revisits a definition.
    pub fn lineage(&self, type_name: &str) -> Vec<&ElementDefinition> {
        let mut chain: Vec<&ElementDefinition> = Vec::new();
        let mut next = self.elements.get(type_name);
        while let Some(def) = next {
            if chain.iter().any(|d| d.name == def.name) {
                break;
            }
            chain.push(def);
            next = def.parent.as_deref().and_then(|p| self.elements.get(p));
        }
        chain
    }

    /// Whether `type_name` is `base` or derives from it.
    pub fn is_kind_of(&self, type_name: &str, base: &str) -> bool {
        self.lineage(type_name).iter().any(|d| d.name == base)
    }

    pub fn property(&self, type_name: &str, property: &str) -> Option<&PropertyDefinition> {
        self.lineage(type_name)
            .into_iter()
            .find_map(|d| d.properties.iter().find(|p| p.name == property))
    }

    /// All properties of `type_name`, base definitions first.
    pub fn properties(&self, type_name: &str) -> Vec<&PropertyDefinition> {
        let mut result: Vec<&PropertyDefinition> = Vec::new();
        for def in self.lineage(type_name).into_iter().rev() {
            for prop in &def.properties {
                match result.iter_mut().find(|p| p.name == prop.name) {
                    Some(existing) => *existing = prop,
                    None => result.push(prop),
                }
            }
        }
        result
    }

    /// Style properties of `type_name`.
    pub fn style_properties(&self, type_name: &str) -> Vec<&PropertyDefinition> {
        self.properties(type_name)
            .into_iter()
            .filter(|p| p.style)
            .collect()
    }

    pub fn slot(&self, type_name: &str, slot: &str) -> Option<&SlotDefinition> {
        self.lineage(type_name)
            .into_iter()
            .find_map(|d| d.slots.iter().find(|s| s.name == slot))
    }

    /// All slots of `type_name`, base definitions first.
    pub fn slots(&self, type_name: &str) -> Vec<&SlotDefinition> {
        self.lineage(type_name)
            .into_iter()
            .rev()
            .flat_map(|d| d.slots.iter())
            .collect()
    }

    pub fn name_space(&self, type_name: &str) -> Option<&str> {
        self.lineage(type_name)
            .into_iter()
            .find_map(|d| d.name_space.as_deref())
    }

    pub fn name_required(&self, type_name: &str) -> bool {
        self.lineage(type_name).iter().any(|d| d.name_required)
    }

    pub fn is_css_host(&self, type_name: &str) -> bool {
        self.lineage(type_name).iter().any(|d| d.css_host)
    }

    /// Whether `type_name` is registered and instantiable.
    pub fn is_concrete(&self, type_name: &str) -> bool {
        self.element(type_name).is_some_and(|d| !d.is_abstract)
    }
}
