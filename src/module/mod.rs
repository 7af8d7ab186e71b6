//! The module: one open design or library, its tree, its included
//! libraries and its activity stack.
//!
//! Every mutating operation runs inside a transaction. Operations called
//! outside an explicit [`Module::start_transaction`] open and commit their
//! own; operations called inside one fold into it. A failing operation has
//! rolled back its own changes by the time it returns.

mod cache;
mod css_adapter;
mod dump;
mod library;

use std::fmt;
use std::rc::Rc;

use crate::activity::record::Record;
use crate::activity::stack::ActivityStack;
use crate::activity::{ActivityEvent, ActivityKind, ActivityListener, ListenerId};
use crate::config::ModuleConfig;
use crate::design::names::plan_unique_names;
use crate::design::{ContainerRef, DesignElement, DesignTree, ElementId};
use crate::error::{ContentError, DesignError, Result};
use crate::property::builtin::{name_spaces, props, slots, types};
use crate::property::{MaskState, MetaDataDictionary, PropertyError, Value};

pub use cache::{ElementSnapshot, ValueCache, ValueSnapshot};
pub use library::ElementRef;

/// A library included by a module under a namespace.
#[derive(Debug, Clone)]
pub struct IncludedLibrary {
    pub namespace: String,
    pub module: Rc<Module>,
}

/// Everything records act on.
#[derive(Debug)]
pub(crate) struct ModuleState {
    pub(crate) tree: DesignTree,
    pub(crate) libraries: Vec<IncludedLibrary>,
}

pub struct Module {
    state: ModuleState,
    stack: ActivityStack,
    listeners: Vec<(ListenerId, Box<dyn ActivityListener>)>,
    next_listener_id: u64,
    notifying: bool,
    /// Listeners taken out for the notification round in progress.
    notified: Vec<ListenerId>,
    pending_removals: Vec<ListenerId>,
    config: ModuleConfig,
}

impl Module {
    /// A module whose root element has type `root_type`, which must be a
    /// concrete kind of `Module`.
    pub fn new(root_type: &str, config: ModuleConfig) -> Result<Self> {
        let dictionary = Rc::clone(&config.dictionary);
        if !dictionary.is_concrete(root_type) || !dictionary.is_kind_of(root_type, types::MODULE) {
            return Err(DesignError::UnknownElementType(root_type.to_owned()));
        }
        tracing::debug!(root_type, "module opened");
        Ok(Self {
            state: ModuleState {
                tree: DesignTree::new(root_type, dictionary),
                libraries: Vec::new(),
            },
            stack: ActivityStack::new(config.max_undo_levels),
            listeners: Vec::new(),
            next_listener_id: 0,
            notifying: false,
            notified: Vec::new(),
            pending_removals: Vec::new(),
            config,
        })
    }

    /// A new report design.
    pub fn new_design(config: ModuleConfig) -> Result<Self> {
        Self::new(types::REPORT_DESIGN, config)
    }

    /// A new library.
    pub fn new_library(config: ModuleConfig) -> Result<Self> {
        Self::new(types::LIBRARY, config)
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &MetaDataDictionary {
        self.state.tree.dictionary()
    }

    pub fn tree(&self) -> &DesignTree {
        &self.state.tree
    }

    pub fn root(&self) -> ElementId {
        self.state.tree.root()
    }

    pub fn element(&self, id: ElementId) -> Option<&DesignElement> {
        self.state.tree.get(id)
    }

    fn existing(&self, id: ElementId) -> Result<&DesignElement> {
        self.state
            .tree
            .get(id)
            .ok_or(DesignError::ElementNotFound(id))
    }

    // ── Transactions ────────────────────────────────────────────────

    fn ensure_mutable(&self) -> Result<()> {
        if self.notifying {
            return Err(DesignError::ReentrantMutation);
        }
        Ok(())
    }

    /// Record `record` in the open transaction and apply it.
    pub(crate) fn execute(&mut self, record: Record) -> Result<()> {
        self.stack.record(record.clone())?;
        record.apply(&mut self.state);
        Ok(())
    }

    /// Run `f` in its own (possibly nested) transaction, rolling back on error.
    pub(crate) fn transact<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.start_transaction(label)?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(label, error = %err, "operation rolled back");
                self.rollback()?;
                Err(err)
            }
        }
    }

    pub fn start_transaction(&mut self, label: &str) -> Result<()> {
        self.ensure_mutable()?;
        self.stack.start(label);
        tracing::trace!(label, depth = self.stack.depth(), "transaction started");
        Ok(())
    }

    /// Close the innermost transaction. Closing the outermost one makes its
    /// changes one undoable unit and notifies listeners.
    pub fn commit(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        if let Some(unit) = self.stack.commit()? {
            tracing::debug!(label = %unit.label, records = unit.records.len(), "committed");
            self.notify(unit.event(ActivityKind::Commit));
        }
        Ok(())
    }

    /// Revert everything recorded since the matching `start_transaction`.
    pub fn rollback(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        let unit = self.stack.take_rollback()?;
        for record in unit.records.iter().rev() {
            record.inverse().apply(&mut self.state);
        }
        tracing::debug!(label = %unit.label, records = unit.records.len(), "rolled back");
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        if self.stack.depth() > 0 {
            return Err(DesignError::TransactionOpen("undo"));
        }
        let unit = self.stack.pop_undo().ok_or(DesignError::NothingToUndo)?;
        for record in unit.records.iter().rev() {
            record.inverse().apply(&mut self.state);
        }
        tracing::debug!(label = %unit.label, "undone");
        let event = unit.event(ActivityKind::Undo);
        self.stack.push_redo(unit);
        self.notify(event);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        if self.stack.depth() > 0 {
            return Err(DesignError::TransactionOpen("redo"));
        }
        let unit = self.stack.pop_redo().ok_or(DesignError::NothingToRedo)?;
        for record in &unit.records {
            record.apply(&mut self.state);
        }
        tracing::debug!(label = %unit.label, "redone");
        let event = unit.event(ActivityKind::Redo);
        self.stack.push_undo(unit);
        self.notify(event);
        Ok(())
    }

    /// Number of open transactions.
    pub fn transaction_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.stack.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.stack.redo_label()
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.stack.clear_history();
        Ok(())
    }

    // ── Listeners ───────────────────────────────────────────────────

    pub fn add_listener(&mut self, listener: impl ActivityListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener. Removal requested during a notification takes
    /// effect once the notification round is over.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        if self.notifying {
            let known = (self.notified.contains(&id)
                || self.listeners.iter().any(|(l, _)| *l == id))
                && !self.pending_removals.contains(&id);
            if known {
                self.pending_removals.push(id);
            }
            return known;
        }
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: ActivityEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        self.notified = listeners.iter().map(|(id, _)| *id).collect();
        self.notifying = true;
        for (_, listener) in listeners.iter_mut() {
            listener.on_activity(&event, self);
        }
        self.notifying = false;
        self.notified.clear();

        let added = std::mem::replace(&mut self.listeners, listeners);
        self.listeners.extend(added);
        let removed = std::mem::take(&mut self.pending_removals);
        self.listeners.retain(|(id, _)| !removed.contains(id));
    }

    // ── Elements ────────────────────────────────────────────────────

    /// Allocate a detached element. Not a tree change, so not undoable.
    pub fn create_element(&mut self, type_name: &str, name: Option<&str>) -> Result<ElementId> {
        self.ensure_mutable()?;
        if !self.dictionary().is_concrete(type_name) {
            return Err(DesignError::UnknownElementType(type_name.to_owned()));
        }
        Ok(self.state.tree.create(type_name, name.map(str::to_owned)))
    }

    /// Insert `element` into `slot` of `container` at `index` (appended if
    /// `None`). Colliding names in the added subtree are made unique.
    pub fn add_element(
        &mut self,
        element: ElementId,
        container: ElementId,
        slot: &str,
        index: Option<usize>,
    ) -> Result<()> {
        self.ensure_mutable()?;
        let index = self.check_add(element, container, slot, index)?;
        let target = ContainerRef {
            element: container,
            slot: slot.to_owned(),
        };

        self.transact("add element", |m| {
            for rename in plan_unique_names(&m.state.tree, element, &target) {
                tracing::debug!(old = ?rename.old, new = %rename.new, "name made unique");
                m.execute(Record::NameSet {
                    element: rename.element,
                    old: rename.old,
                    new: Some(rename.new),
                })?;
            }
            m.execute(Record::ContentAdded {
                element,
                container: target.clone(),
                index,
            })?;
            m.check_extends_acyclic()?;
            tracing::debug!(?element, ?container, slot = %target.slot, index, "element added");
            Ok(())
        })
    }

    /// Validate an add and return the insertion index.
    fn check_add(
        &self,
        element: ElementId,
        container: ElementId,
        slot: &str,
        index: Option<usize>,
    ) -> Result<usize> {
        let tree = &self.state.tree;
        let dictionary = tree.dictionary();
        let added = self.existing(element)?;
        let host = self.existing(container)?;

        let definition =
            dictionary
                .slot(host.type_name(), slot)
                .ok_or_else(|| ContentError::UnknownSlot {
                    slot: slot.to_owned(),
                    element_type: host.type_name().to_owned(),
                })?;
        if !definition
            .allowed
            .iter()
            .any(|t| dictionary.is_kind_of(added.type_name(), t))
        {
            return Err(ContentError::WrongType {
                slot: slot.to_owned(),
                element_type: added.type_name().to_owned(),
            }
            .into());
        }
        let len = tree.contents(container, slot).len();
        if !definition.multiple && len > 0 {
            return Err(ContentError::SlotFull {
                slot: slot.to_owned(),
            }
            .into());
        }
        if added.container().is_some() || element == tree.root() {
            return Err(ContentError::AlreadyContained.into());
        }
        if tree.is_within(container, element) {
            return Err(ContentError::WouldCycle.into());
        }
        if !tree.is_attached(container) {
            return Err(ContentError::DetachedContainer.into());
        }
        let index = index.unwrap_or(len);
        if index > len {
            return Err(ContentError::IndexOutOfRange { index, len }.into());
        }
        Ok(index)
    }

    /// Take `element` and its subtree out of the tree. The element stays
    /// valid and can be added again.
    pub fn drop_element(&mut self, element: ElementId) -> Result<()> {
        self.ensure_mutable()?;
        let container = self
            .existing(element)?
            .container()
            .cloned()
            .ok_or(ContentError::NotContained)?;
        let index = self
            .state
            .tree
            .contents(container.element, &container.slot)
            .iter()
            .position(|&c| c == element)
            .ok_or(ContentError::NotContained)?;

        self.transact("drop element", |m| {
            m.execute(Record::ContentDropped {
                element,
                container,
                index,
            })?;
            tracing::debug!(?element, "element dropped");
            Ok(())
        })
    }

    /// Drop and re-add in one step; if the add fails the drop is undone.
    pub fn move_element(
        &mut self,
        element: ElementId,
        container: ElementId,
        slot: &str,
        index: Option<usize>,
    ) -> Result<()> {
        self.transact("move element", |m| {
            m.drop_element(element)?;
            m.add_element(element, container, slot, index)
        })
    }

    /// Free a detached element and its subtree. History units mentioning
    /// any freed element can no longer be replayed and are dropped, along
    /// with the units queued behind them.
    pub fn discard_element(&mut self, element: ElementId) -> Result<()> {
        self.ensure_mutable()?;
        if self.stack.depth() > 0 {
            return Err(DesignError::TransactionOpen("discard element"));
        }
        if element == self.root() || self.existing(element)?.container().is_some() {
            return Err(ContentError::AlreadyContained.into());
        }
        let removed = self.state.tree.remove_subtree(element);
        let forgotten = self.stack.forget(&removed);
        tracing::debug!(?element, removed = removed.len(), forgotten, "element discarded");
        Ok(())
    }

    /// Explicit rename. Unlike add, a taken name is an error.
    pub fn set_name(&mut self, element: ElementId, name: Option<&str>) -> Result<()> {
        self.ensure_mutable()?;
        let current = self.existing(element)?;
        let old = current.name().map(str::to_owned);
        if name.is_none() && self.dictionary().name_required(current.type_name()) {
            return Err(PropertyError::InvalidValue {
                property: "name".into(),
                message: format!("{} elements must be named", current.type_name()),
            }
            .into());
        }
        if let (Some(name), Some(container)) = (name, current.container()) {
            if self.state.tree.is_attached(element)
                && self.state.tree.name_conflicts(element, container, name)
            {
                return Err(DesignError::NameConflict {
                    name: name.to_owned(),
                });
            }
        }
        if old.as_deref() == name {
            return Ok(());
        }

        let new = name.map(str::to_owned);
        self.transact("rename element", |m| {
            m.execute(Record::NameSet { element, old, new })?;
            m.check_extends_acyclic()
        })
    }

    // ── Properties ──────────────────────────────────────────────────

    /// Local value of `name` on `element`; `None` when unset.
    pub fn property(&self, element: ElementId, name: &str) -> Option<&Value> {
        self.state.tree.get(element)?.property(name)
    }

    /// Check that `name` exists on the element and may be changed.
    fn check_writable(&self, element: ElementId, name: &str) -> Result<()> {
        let target = self.existing(element)?;
        let definition = self
            .dictionary()
            .property(target.type_name(), name)
            .ok_or_else(|| PropertyError::UnknownProperty(name.to_owned()))?;
        if definition.locked || (definition.lockable && self.is_lock_masked(element, name)) {
            return Err(DesignError::LockedProperty {
                element,
                property: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Validate and set a local value.
    pub fn set_property(
        &mut self,
        element: ElementId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.ensure_mutable()?;
        self.check_writable(element, name)?;
        let target = self.existing(element)?;
        let value = self
            .dictionary()
            .property(target.type_name(), name)
            .ok_or_else(|| PropertyError::UnknownProperty(name.to_owned()))?
            .validate(value.into())?;
        let old = target.property(name).cloned();
        if old.as_ref() == Some(&value) {
            return Ok(());
        }

        self.transact("set property", |m| {
            m.execute(Record::PropertySet {
                element,
                name: name.to_owned(),
                old,
                new: Some(value),
            })?;
            tracing::debug!(?element, property = name, "property set");
            Ok(())
        })
    }

    /// Remove the local value so the cascade applies again.
    pub fn clear_property(&mut self, element: ElementId, name: &str) -> Result<()> {
        self.ensure_mutable()?;
        self.check_writable(element, name)?;
        let Some(old) = self.existing(element)?.property(name).cloned() else {
            return Ok(());
        };

        self.transact("clear property", |m| {
            m.execute(Record::PropertySet {
                element,
                name: name.to_owned(),
                old: Some(old),
                new: None,
            })
        })
    }

    pub fn set_property_mask(
        &mut self,
        element: ElementId,
        name: &str,
        mask: Option<MaskState>,
    ) -> Result<()> {
        self.ensure_mutable()?;
        let target = self.existing(element)?;
        if self.dictionary().property(target.type_name(), name).is_none() {
            return Err(PropertyError::UnknownProperty(name.to_owned()).into());
        }
        let old = target.properties().mask(name);
        if old == mask {
            return Ok(());
        }

        self.transact("set property mask", |m| {
            m.execute(Record::MaskSet {
                element,
                name: name.to_owned(),
                old,
                new: mask,
            })
        })
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Attached report item named `name`.
    pub fn find_element(&self, name: &str) -> Option<ElementId> {
        self.state.tree.find(name_spaces::ELEMENT, name)
    }

    /// Style named `name` in the module's `styles` slot.
    pub fn find_style(&self, name: &str) -> Option<ElementId> {
        self.state.tree.find(name_spaces::STYLE, name)
    }

    pub fn find_theme(&self, name: &str) -> Option<ElementId> {
        self.state.tree.find(name_spaces::THEME, name)
    }

    pub fn find_master_page(&self, name: &str) -> Option<ElementId> {
        self.state.tree.find(name_spaces::MASTER_PAGE, name)
    }

    /// Bookmark expressions of every item in the body.
    pub fn all_bookmarks(&self) -> Vec<String> {
        self.state
            .tree
            .collect_property_values(slots::BODY, props::BOOKMARK)
    }

    /// TOC expressions of every item in the body.
    pub fn all_tocs(&self) -> Vec<String> {
        self.state.tree.collect_property_values(slots::BODY, props::TOC)
    }

    /// Template-based items in the body and page setup, outermost only.
    pub fn template_based_items(&self) -> Vec<ElementId> {
        self.state
            .tree
            .template_based_items(&[slots::BODY, slots::PAGE_SETUP])
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("tree", &self.state.tree)
            .field(
                "libraries",
                &self
                    .state
                    .libraries
                    .iter()
                    .map(|l| l.namespace.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("transaction_depth", &self.stack.depth())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::activity::Change;

    fn design() -> Module {
        Module::new_design(ModuleConfig::new()).unwrap()
    }

    fn label(m: &mut Module, name: Option<&str>) -> ElementId {
        let id = m.create_element(types::LABEL, name).unwrap();
        let root = m.root();
        m.add_element(id, root, slots::BODY, None).unwrap();
        id
    }

    fn body_names(m: &Module) -> Vec<Option<String>> {
        m.tree()
            .contents(m.root(), slots::BODY)
            .iter()
            .map(|&id| m.element(id).unwrap().name().map(str::to_owned))
            .collect()
    }

    // ── Construction ────────────────────────────────────────────────

    #[test]
    fn root_must_be_concrete_module() {
        assert!(matches!(
            Module::new(types::LABEL, ModuleConfig::new()),
            Err(DesignError::UnknownElementType(_))
        ));
        assert!(matches!(
            Module::new(types::MODULE, ModuleConfig::new()),
            Err(DesignError::UnknownElementType(_))
        ));
        assert!(Module::new_library(ModuleConfig::new()).is_ok());
    }

    #[test]
    fn create_rejects_abstract_types() {
        let mut m = design();
        assert!(matches!(
            m.create_element(types::REPORT_ITEM, None),
            Err(DesignError::UnknownElementType(t)) if t == "ReportItem"
        ));
        assert!(m.create_element("Widget", None).is_err());
    }

    // ── Structure ───────────────────────────────────────────────────

    #[test]
    fn add_appends_and_inserts() {
        let mut m = design();
        let a = label(&mut m, Some("a"));
        let b = m.create_element(types::LABEL, Some("b")).unwrap();
        let root = m.root();
        m.add_element(b, root, slots::BODY, Some(0)).unwrap();
        assert_eq!(m.tree().contents(root, slots::BODY), &[b, a]);
        assert_eq!(m.find_element("a"), Some(a));
    }

    #[test]
    fn add_validations() {
        let mut m = design();
        let root = m.root();
        let style = m.create_element(types::STYLE, Some("S")).unwrap();
        assert!(matches!(
            m.add_element(style, root, slots::BODY, None),
            Err(DesignError::Content(ContentError::WrongType { .. }))
        ));
        assert!(matches!(
            m.add_element(style, root, "nowhere", None),
            Err(DesignError::Content(ContentError::UnknownSlot { .. }))
        ));
        assert!(matches!(
            m.add_element(style, root, slots::STYLES, Some(3)),
            Err(DesignError::Content(ContentError::IndexOutOfRange { index: 3, len: 0 }))
        ));

        let a = label(&mut m, Some("a"));
        assert!(matches!(
            m.add_element(a, root, slots::BODY, None),
            Err(DesignError::Content(ContentError::AlreadyContained))
        ));
        assert!(matches!(
            m.add_element(root, root, slots::BODY, None),
            Err(DesignError::Content(ContentError::WrongType { .. }))
        ));
    }

    #[test]
    fn add_into_detached_container_or_own_subtree_fails() {
        let mut m = design();
        let root = m.root();
        let grid = m.create_element(types::GRID, None).unwrap();
        let row = m.create_element(types::ROW, None).unwrap();
        assert!(matches!(
            m.add_element(row, grid, slots::ROWS, None),
            Err(DesignError::Content(ContentError::DetachedContainer))
        ));

        m.add_element(grid, root, slots::BODY, None).unwrap();
        m.add_element(row, grid, slots::ROWS, None).unwrap();
        let cell = m.create_element(types::CELL, None).unwrap();
        m.add_element(cell, row, slots::CELLS, None).unwrap();
        let inner = m.create_element(types::GRID, None).unwrap();
        m.add_element(inner, cell, slots::CONTENT, None).unwrap();

        assert!(matches!(
            m.move_element(grid, cell, slots::CONTENT, None),
            Err(DesignError::Content(ContentError::WouldCycle))
        ));
        // the failed move left the grid where it was
        assert_eq!(m.tree().contents(root, slots::BODY), &[grid]);
    }

    #[test]
    fn single_slot_holds_one_element() {
        use crate::property::{ElementDefinition, SlotDefinition};

        let mut dictionary = MetaDataDictionary::builtin();
        dictionary.register(
            ElementDefinition::new("Frame")
                .extends(types::REPORT_ITEM)
                .slot(SlotDefinition::new("inner", &[types::REPORT_ITEM]).single()),
        );
        let config = ModuleConfig::new().with_dictionary(Rc::new(dictionary));
        let mut m = Module::new_design(config).unwrap();
        let root = m.root();
        let frame = m.create_element("Frame", None).unwrap();
        m.add_element(frame, root, slots::BODY, None).unwrap();

        let first = m.create_element(types::LABEL, None).unwrap();
        let second = m.create_element(types::LABEL, None).unwrap();
        m.add_element(first, frame, "inner", None).unwrap();
        assert!(matches!(
            m.add_element(second, frame, "inner", None),
            Err(DesignError::Content(ContentError::SlotFull { slot })) if slot == "inner"
        ));
    }

    #[test]
    fn colliding_names_are_suffixed() {
        let mut m = design();
        label(&mut m, Some("Title"));
        label(&mut m, Some("Title"));
        label(&mut m, Some("Title"));
        label(&mut m, None);
        assert_eq!(
            body_names(&m),
            vec![
                Some("Title".into()),
                Some("Title1".into()),
                Some("Title2".into()),
                None
            ]
        );
    }

    #[test]
    fn explicit_rename_conflict_fails() {
        let mut m = design();
        label(&mut m, Some("a"));
        let b = label(&mut m, Some("b"));
        assert!(matches!(
            m.set_name(b, Some("a")),
            Err(DesignError::NameConflict { name }) if name == "a"
        ));
        m.set_name(b, Some("c")).unwrap();
        assert_eq!(m.find_element("c"), Some(b));
        assert_eq!(m.find_element("b"), None);
    }

    #[test]
    fn required_name_cannot_be_cleared() {
        let mut m = design();
        let style = m.create_element(types::STYLE, None).unwrap();
        let root = m.root();
        m.add_element(style, root, slots::STYLES, None).unwrap();
        assert_eq!(m.element(style).unwrap().name(), Some("Style1"));
        assert!(m.set_name(style, None).is_err());
    }

    #[test]
    fn drop_detaches_and_keeps_element() {
        let mut m = design();
        let a = label(&mut m, Some("a"));
        m.drop_element(a).unwrap();
        assert!(m.tree().contents(m.root(), slots::BODY).is_empty());
        assert!(m.element(a).is_some());
        assert_eq!(m.find_element("a"), None);
        assert!(matches!(
            m.drop_element(a),
            Err(DesignError::Content(ContentError::NotContained))
        ));
    }

    #[test]
    fn move_between_slots() {
        let mut m = design();
        let a = label(&mut m, Some("a"));
        let root = m.root();
        m.move_element(a, root, slots::SCRATCH_PAD, None).unwrap();
        assert!(m.tree().contents(root, slots::BODY).is_empty());
        assert_eq!(m.tree().contents(root, slots::SCRATCH_PAD), &[a]);

        m.undo().unwrap();
        assert_eq!(m.tree().contents(root, slots::BODY), &[a]);
    }

    // ── Properties ──────────────────────────────────────────────────

    #[test]
    fn set_normalizes_and_validates() {
        let mut m = design();
        let a = label(&mut m, None);
        m.set_property(a, "fontSize", "12pt").unwrap();
        assert_eq!(
            m.property(a, "fontSize"),
            Some(&Value::Dimension(crate::property::Dimension::new(12.0, "pt")))
        );
        assert!(matches!(
            m.set_property(a, "fontWeight", "heavy"),
            Err(DesignError::Property(PropertyError::InvalidValue { .. }))
        ));
        assert!(matches!(
            m.set_property(a, "rowSpan", 2i64),
            Err(DesignError::Property(PropertyError::UnknownProperty(_)))
        ));
    }

    #[test]
    fn locked_definition_rejects_set() {
        let mut m = design();
        let root = m.root();
        assert!(matches!(
            m.set_property(root, "createdBy", "me"),
            Err(DesignError::LockedProperty { .. })
        ));
    }

    #[test]
    fn lock_mask_rejects_set_and_clear() {
        let mut m = design();
        let a = label(&mut m, None);
        m.set_property(a, props::TEXT, "x").unwrap();
        m.set_property_mask(a, props::TEXT, Some(MaskState::Lock)).unwrap();
        assert!(matches!(
            m.set_property(a, props::TEXT, "y"),
            Err(DesignError::LockedProperty { .. })
        ));
        assert!(m.clear_property(a, props::TEXT).is_err());

        m.set_property_mask(a, props::TEXT, Some(MaskState::Hide)).unwrap();
        m.set_property(a, props::TEXT, "y").unwrap();
        m.clear_property(a, props::TEXT).unwrap();
        assert_eq!(m.property(a, props::TEXT), None);
    }

    // ── Transactions ────────────────────────────────────────────────

    #[test]
    fn commit_undo_redo() {
        let mut m = design();
        m.start_transaction("add label").unwrap();
        let a = label(&mut m, None);
        m.set_property(a, props::TEXT, "Hello").unwrap();
        m.commit().unwrap();
        assert_eq!(m.undo_label(), Some("add label"));

        m.undo().unwrap();
        assert!(m.tree().contents(m.root(), slots::BODY).is_empty());
        assert_eq!(m.property(a, props::TEXT), None);
        assert_eq!(m.redo_label(), Some("add label"));

        m.redo().unwrap();
        assert_eq!(m.tree().contents(m.root(), slots::BODY), &[a]);
        assert_eq!(m.property(a, props::TEXT), Some(&Value::from("Hello")));
    }

    #[test]
    fn rollback_reverts_since_matching_start() {
        let mut m = design();
        let a = label(&mut m, None);
        m.start_transaction("outer").unwrap();
        m.set_property(a, props::TEXT, "one").unwrap();
        m.start_transaction("inner").unwrap();
        m.set_property(a, props::TEXT, "two").unwrap();
        m.rollback().unwrap();
        assert_eq!(m.property(a, props::TEXT), Some(&Value::from("one")));
        m.rollback().unwrap();
        assert_eq!(m.property(a, props::TEXT), None);
        assert_eq!(m.undo_label(), Some("add element"));
    }

    #[test]
    fn empty_history_errors() {
        let mut m = design();
        assert!(matches!(m.undo(), Err(DesignError::NothingToUndo)));
        assert!(matches!(m.redo(), Err(DesignError::NothingToRedo)));
        assert!(matches!(m.commit(), Err(DesignError::NoOpenTransaction)));
        assert!(matches!(m.rollback(), Err(DesignError::NoOpenTransaction)));
    }

    #[test]
    fn undo_rejected_while_transaction_open() {
        let mut m = design();
        label(&mut m, None);
        m.start_transaction("open").unwrap();
        assert!(matches!(m.undo(), Err(DesignError::TransactionOpen("undo"))));
        assert!(matches!(m.redo(), Err(DesignError::TransactionOpen("redo"))));
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut m = design();
        let a = label(&mut m, None);
        m.set_property(a, props::TEXT, "x").unwrap();
        m.undo().unwrap();
        assert!(m.can_redo());
        m.set_property(a, props::TEXT, "y").unwrap();
        assert!(!m.can_redo());
    }

    #[test]
    fn undo_restores_generated_names() {
        let mut m = design();
        label(&mut m, Some("Title"));
        let second = label(&mut m, Some("Title"));
        m.undo().unwrap();
        assert_eq!(m.element(second).unwrap().name(), Some("Title"));
        assert!(m.element(second).unwrap().container().is_none());
    }

    // ── Listeners ───────────────────────────────────────────────────

    #[test]
    fn listeners_see_top_level_commits_only() {
        let mut m = design();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        m.add_listener(move |event: &ActivityEvent, _: &mut Module| {
            sink.borrow_mut().push((event.kind, event.label.clone(), event.changes.len()));
        });

        m.start_transaction("batch").unwrap();
        let a = label(&mut m, None);
        m.set_property(a, props::TEXT, "Hello").unwrap();
        assert!(seen.borrow().is_empty());
        m.commit().unwrap();
        m.undo().unwrap();
        m.redo().unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                (ActivityKind::Commit, "batch".to_owned(), 2),
                (ActivityKind::Undo, "batch".to_owned(), 2),
                (ActivityKind::Redo, "batch".to_owned(), 2),
            ]
        );
    }

    #[test]
    fn listener_gets_old_and_new_values() {
        let mut m = design();
        let a = label(&mut m, None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        m.add_listener(move |event: &ActivityEvent, _: &mut Module| {
            sink.borrow_mut().extend(event.changes.clone());
        });
        m.set_property(a, props::TEXT, "Hello").unwrap();
        assert_eq!(
            seen.borrow()[0],
            Change::Property {
                element: a,
                name: props::TEXT.into(),
                old: None,
                new: Some(Value::from("Hello")),
            }
        );
    }

    #[test]
    fn reentrant_mutation_is_rejected() {
        let mut m = design();
        let outcome = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&outcome);
        m.add_listener(move |_: &ActivityEvent, module: &mut Module| {
            let root = module.root();
            let result = module.set_property(root, "title", "nested");
            *sink.borrow_mut() = Some(matches!(result, Err(DesignError::ReentrantMutation)));
        });
        let root = m.root();
        m.set_property(root, "title", "Report").unwrap();
        assert_eq!(*outcome.borrow(), Some(true));
        assert_eq!(m.property(root, "title"), Some(&Value::from("Report")));
    }

    #[test]
    fn removed_listener_is_silent() {
        let mut m = design();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = m.add_listener(move |_: &ActivityEvent, _: &mut Module| {
            *sink.borrow_mut() += 1;
        });
        label(&mut m, None);
        assert!(m.remove_listener(id));
        label(&mut m, None);
        assert_eq!(*count.borrow(), 1);
        assert!(!m.remove_listener(id));
    }

    #[test]
    fn removal_during_notification_reports_membership() {
        let mut m = design();
        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&results);
        let stranger = m.add_listener(|_: &ActivityEvent, _: &mut Module| {});
        assert!(m.remove_listener(stranger));
        let own = ListenerId(m.next_listener_id);
        m.add_listener(move |_: &ActivityEvent, module: &mut Module| {
            sink.borrow_mut().push(module.remove_listener(stranger));
            sink.borrow_mut().push(module.remove_listener(own));
            sink.borrow_mut().push(module.remove_listener(own));
        });

        label(&mut m, None);
        assert_eq!(*results.borrow(), vec![false, true, false]);
        assert!(m.listeners.is_empty());
    }

    // ── Discard ─────────────────────────────────────────────────────

    #[test]
    fn discard_frees_detached_subtree() {
        let mut m = design();
        let root = m.root();
        let before = m.tree().len();
        let grid = m.create_element(types::GRID, None).unwrap();
        let row = m.create_element(types::ROW, None).unwrap();
        m.add_element(grid, root, slots::BODY, None).unwrap();
        m.add_element(row, grid, slots::ROWS, None).unwrap();
        m.drop_element(grid).unwrap();
        assert_eq!(m.tree().len(), before + 2);

        m.discard_element(grid).unwrap();
        assert_eq!(m.tree().len(), before);
        assert!(m.element(row).is_none());
        // every unit mentioned the grid or its row
        assert!(!m.can_undo());
    }

    #[test]
    fn discard_keeps_unrelated_history() {
        let mut m = design();
        let root = m.root();
        m.set_property(root, "title", "Report").unwrap();
        let orphan = m.create_element(types::LABEL, None).unwrap();
        let kept = label(&mut m, None);
        m.discard_element(orphan).unwrap();
        assert_eq!(m.undo_label(), Some("add element"));

        m.undo().unwrap();
        assert!(m.element(kept).unwrap().container().is_none());
        m.undo().unwrap();
        assert_eq!(m.property(root, "title"), None);
    }

    #[test]
    fn discard_rejects_contained_elements() {
        let mut m = design();
        let a = label(&mut m, None);
        let root = m.root();
        assert!(matches!(
            m.discard_element(a),
            Err(DesignError::Content(ContentError::AlreadyContained))
        ));
        assert!(matches!(
            m.discard_element(root),
            Err(DesignError::Content(ContentError::AlreadyContained))
        ));
        m.start_transaction("open").unwrap();
        let b = m.create_element(types::LABEL, None).unwrap();
        assert!(matches!(
            m.discard_element(b),
            Err(DesignError::TransactionOpen(_))
        ));
        m.commit().unwrap();
        m.discard_element(b).unwrap();
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[test]
    fn bookmarks_and_tocs() {
        let mut m = design();
        let a = label(&mut m, None);
        let b = label(&mut m, None);
        m.set_property(a, props::BOOKMARK, "row[\"id\"]").unwrap();
        m.set_property(b, props::TOC, "\"Summary\"").unwrap();
        assert_eq!(m.all_bookmarks(), vec!["row[\"id\"]".to_owned()]);
        assert_eq!(m.all_tocs(), vec!["\"Summary\"".to_owned()]);
    }
}
