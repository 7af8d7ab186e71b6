//! Tree operations: create, attach, detach, rename, walk.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use slotmap::SlotMap;

use super::element::{ContainerRef, DesignElement, ElementId};
use crate::property::{MetaDataDictionary, NameScope};

/// Empty slice constant for returning when a slot does not exist.
const EMPTY_CONTENTS: &[ElementId] = &[];

/// Key of the module-wide name index: `(name space, name)`.
pub(crate) type NameKey = (String, String);

/// The containment tree of one module, backed by a slotmap arena.
///
/// Detached elements stay in the arena with no container. Only attached
/// elements in module-scoped slots appear in the name index.
pub struct DesignTree {
    elements: SlotMap<ElementId, DesignElement>,
    root: ElementId,
    names: HashMap<NameKey, ElementId>,
    dictionary: Rc<MetaDataDictionary>,
}

impl DesignTree {
    /// Create a tree whose root element has type `root_type`.
    pub fn new(root_type: &str, dictionary: Rc<MetaDataDictionary>) -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(DesignElement::new(root_type, None, &dictionary));
        Self {
            elements,
            root,
            names: HashMap::new(),
            dictionary,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn dictionary(&self) -> &MetaDataDictionary {
        &self.dictionary
    }

    pub fn get(&self, id: ElementId) -> Option<&DesignElement> {
        self.elements.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut DesignElement> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Number of elements in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Allocate a detached element.
    pub(crate) fn create(&mut self, type_name: &str, name: Option<String>) -> ElementId {
        self.elements
            .insert(DesignElement::new(type_name, name, &self.dictionary))
    }

    /// Free `id` and everything below it. The caller detaches first.
    pub(crate) fn remove_subtree(&mut self, id: ElementId) -> Vec<ElementId> {
        let removed = self.walk_depth_first(id);
        for &member in &removed {
            self.elements.remove(member);
        }
        removed
    }

    /// The element holding `id`, if any.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements
            .get(id)
            .and_then(|e| e.container.as_ref())
            .map(|c| c.element)
    }

    /// Walk from `id` up to the top of its tree, collecting container ids.
    ///
    /// The returned vec does **not** include `id` itself.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent(current) {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `id` is the root or reaches the root through its containers.
    pub fn is_attached(&self, id: ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        id == self.root || self.ancestors(id).last() == Some(&self.root)
    }

    /// Whether `id` is `ancestor` or lies in its subtree.
    pub fn is_within(&self, id: ElementId, ancestor: ElementId) -> bool {
        id == ancestor || self.ancestors(id).contains(&ancestor)
    }

    /// Contents of one slot. Empty if the element or slot does not exist.
    pub fn contents(&self, id: ElementId, slot: &str) -> &[ElementId] {
        self.elements
            .get(id)
            .and_then(|e| e.slot(slot))
            .unwrap_or(EMPTY_CONTENTS)
    }

    /// Direct children across all slots, in slot order.
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.elements
            .get(id)
            .map(|e| e.slots.iter().flat_map(|s| s.contents.iter().copied()).collect())
            .unwrap_or_default()
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.elements.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for child in self.children(current).into_iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Breadth-first traversal starting from `start`.
    pub fn walk_breadth_first(&self, start: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            if !self.elements.contains_key(current) {
                continue;
            }
            result.push(current);
            queue.extend(self.children(current));
        }
        result
    }

    /// Look up an attached element by name space and name.
    pub fn find(&self, name_space: &str, name: &str) -> Option<ElementId> {
        self.names
            .get(&(name_space.to_owned(), name.to_owned()))
            .copied()
    }

    /// Uniqueness scope of the slot `slot` of `container`.
    pub fn slot_scope(&self, container: ElementId, slot: &str) -> NameScope {
        self.elements
            .get(container)
            .and_then(|c| self.dictionary.slot(&c.type_name, slot))
            .map(|s| s.scope)
            .unwrap_or(NameScope::None)
    }

    /// Index key of `id` if it were named `name` and held by `container.slot`.
    pub(crate) fn name_key(
        &self,
        id: ElementId,
        container: &ContainerRef,
        name: &str,
    ) -> Option<NameKey> {
        if self.slot_scope(container.element, &container.slot) != NameScope::Module {
            return None;
        }
        let element = self.elements.get(id)?;
        let ns = self.dictionary.name_space(&element.type_name)?;
        Some((ns.to_owned(), name.to_owned()))
    }

    /// Index key of `id` in its current position.
    fn index_key(&self, id: ElementId) -> Option<NameKey> {
        let element = self.elements.get(id)?;
        let name = element.name.as_deref()?;
        let container = element.container.as_ref()?;
        self.name_key(id, container, name)
    }

    /// Whether `name` would collide for `id` placed in `container.slot`.
    pub fn name_conflicts(&self, id: ElementId, container: &ContainerRef, name: &str) -> bool {
        match self.slot_scope(container.element, &container.slot) {
            NameScope::None => false,
            NameScope::Slot => self
                .contents(container.element, &container.slot)
                .iter()
                .any(|&s| s != id && self.get(s).and_then(|e| e.name()) == Some(name)),
            NameScope::Module => self
                .name_key(id, container, name)
                .and_then(|key| self.names.get(&key))
                .is_some_and(|&owner| owner != id),
        }
    }

    fn index_subtree(&mut self, id: ElementId) {
        for member in self.walk_depth_first(id) {
            if let Some(key) = self.index_key(member) {
                self.names.insert(key, member);
            }
        }
    }

    fn unindex_subtree(&mut self, id: ElementId) {
        for member in self.walk_depth_first(id) {
            if let Some(key) = self.index_key(member) {
                if self.names.get(&key) == Some(&member) {
                    self.names.remove(&key);
                }
            }
        }
    }

    /// Put `id` into `container.slot` at `index` (clamped to the slot length).
    ///
    /// Callers validate first; this only fails silently on missing elements.
    pub(crate) fn attach(&mut self, id: ElementId, container: ContainerRef, index: usize) {
        let Some(contents) = self
            .elements
            .get_mut(container.element)
            .and_then(|c| c.slot_mut(&container.slot))
        else {
            return;
        };
        let index = index.min(contents.len());
        contents.insert(index, id);

        let parent = container.element;
        if let Some(element) = self.elements.get_mut(id) {
            element.container = Some(container);
        }
        if self.is_attached(parent) {
            self.index_subtree(id);
        }
    }

    /// Take `id` out of its slot, returning where it was.
    pub(crate) fn detach(&mut self, id: ElementId) -> Option<(ContainerRef, usize)> {
        let container = self.elements.get(id)?.container.clone()?;
        if self.is_attached(id) {
            self.unindex_subtree(id);
        }
        let contents = self
            .elements
            .get_mut(container.element)
            .and_then(|c| c.slot_mut(&container.slot))?;
        let index = contents.iter().position(|&c| c == id)?;
        contents.remove(index);
        if let Some(element) = self.elements.get_mut(id) {
            element.container = None;
        }
        Some((container, index))
    }

    /// Replace the name of `id`, keeping the index current.
    pub(crate) fn set_name(&mut self, id: ElementId, name: Option<String>) {
        let indexed = self.is_attached(id);
        if indexed {
            if let Some(key) = self.index_key(id) {
                if self.names.get(&key) == Some(&id) {
                    self.names.remove(&key);
                }
            }
        }
        if let Some(element) = self.elements.get_mut(id) {
            element.name = name;
        }
        if indexed {
            if let Some(key) = self.index_key(id) {
                self.names.insert(key, id);
            }
        }
    }
}

impl std::fmt::Debug for DesignTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignTree")
            .field("root", &self.root)
            .field("elements", &self.elements.len())
            .field("names", &self.names.len())
            .finish()
    }
}
