//! Reversible mutation records.
//!
//! Every change to a module goes through a [`Record`]. Applying a record
//! performs the change; its [`inverse`](Record::inverse) undoes it. Records
//! are validated before they are created, so applying one never fails.

use crate::css::sheet::IncludedCss;
use crate::design::{ContainerRef, ElementId, ExtendsRef};
use crate::module::{IncludedLibrary, ModuleState};
use crate::property::{MaskState, Value};

use super::listener::Change;

#[derive(Debug, Clone)]
pub(crate) enum Record {
    PropertySet {
        element: ElementId,
        name: String,
        old: Option<Value>,
        new: Option<Value>,
    },
    MaskSet {
        element: ElementId,
        name: String,
        old: Option<MaskState>,
        new: Option<MaskState>,
    },
    NameSet {
        element: ElementId,
        old: Option<String>,
        new: Option<String>,
    },
    ExtendsSet {
        element: ElementId,
        old: Option<ExtendsRef>,
        new: Option<ExtendsRef>,
    },
    ContentAdded {
        element: ElementId,
        container: ContainerRef,
        index: usize,
    },
    ContentDropped {
        element: ElementId,
        container: ContainerRef,
        index: usize,
    },
    CssInserted {
        host: ElementId,
        index: usize,
        css: IncludedCss,
    },
    CssRemoved {
        host: ElementId,
        index: usize,
        css: IncludedCss,
    },
    CssReplaced {
        host: ElementId,
        index: usize,
        old: IncludedCss,
        new: IncludedCss,
    },
    LibraryInserted {
        index: usize,
        library: IncludedLibrary,
    },
    LibraryRemoved {
        index: usize,
        library: IncludedLibrary,
    },
    LibraryReplaced {
        index: usize,
        old: IncludedLibrary,
        new: IncludedLibrary,
    },
}

impl Record {
    /// Perform the change on `state`.
    pub(crate) fn apply(&self, state: &mut ModuleState) {
        match self {
            Record::PropertySet {
                element, name, new, ..
            } => {
                if let Some(e) = state.tree.get_mut(*element) {
                    e.properties.set(name, new.clone());
                }
            }
            Record::MaskSet {
                element, name, new, ..
            } => {
                if let Some(e) = state.tree.get_mut(*element) {
                    e.properties.set_mask(name, *new);
                }
            }
            Record::NameSet { element, new, .. } => {
                state.tree.set_name(*element, new.clone());
            }
            Record::ExtendsSet { element, new, .. } => {
                if let Some(e) = state.tree.get_mut(*element) {
                    e.extends = new.clone();
                }
            }
            Record::ContentAdded {
                element,
                container,
                index,
            } => {
                state.tree.attach(*element, container.clone(), *index);
            }
            Record::ContentDropped { element, .. } => {
                state.tree.detach(*element);
            }
            Record::CssInserted { host, index, css } => {
                if let Some(e) = state.tree.get_mut(*host) {
                    let index = (*index).min(e.csses.len());
                    e.csses.insert(index, css.clone());
                }
            }
            Record::CssRemoved { host, index, .. } => {
                if let Some(e) = state.tree.get_mut(*host) {
                    if *index < e.csses.len() {
                        e.csses.remove(*index);
                    }
                }
            }
            Record::CssReplaced {
                host, index, new, ..
            } => {
                if let Some(slot) = state
                    .tree
                    .get_mut(*host)
                    .and_then(|e| e.csses.get_mut(*index))
                {
                    *slot = new.clone();
                }
            }
            Record::LibraryInserted { index, library } => {
                let index = (*index).min(state.libraries.len());
                state.libraries.insert(index, library.clone());
            }
            Record::LibraryRemoved { index, .. } => {
                if *index < state.libraries.len() {
                    state.libraries.remove(*index);
                }
            }
            Record::LibraryReplaced { index, new, .. } => {
                if let Some(slot) = state.libraries.get_mut(*index) {
                    *slot = new.clone();
                }
            }
        }
    }

    /// Whether the record mentions any of `ids`.
    pub(crate) fn touches(&self, ids: &[ElementId]) -> bool {
        match self {
            Record::PropertySet { element, .. }
            | Record::MaskSet { element, .. }
            | Record::NameSet { element, .. }
            | Record::ExtendsSet { element, .. } => ids.contains(element),
            Record::ContentAdded {
                element, container, ..
            }
            | Record::ContentDropped {
                element, container, ..
            } => ids.contains(element) || ids.contains(&container.element),
            Record::CssInserted { host, .. }
            | Record::CssRemoved { host, .. }
            | Record::CssReplaced { host, .. } => ids.contains(host),
            Record::LibraryInserted { .. }
            | Record::LibraryRemoved { .. }
            | Record::LibraryReplaced { .. } => false,
        }
    }

    /// The record that undoes this one.
    pub(crate) fn inverse(&self) -> Record {
        match self.clone() {
            Record::PropertySet {
                element,
                name,
                old,
                new,
            } => Record::PropertySet {
                element,
                name,
                old: new,
                new: old,
            },
            Record::MaskSet {
                element,
                name,
                old,
                new,
            } => Record::MaskSet {
                element,
                name,
                old: new,
                new: old,
            },
            Record::NameSet { element, old, new } => Record::NameSet {
                element,
                old: new,
                new: old,
            },
            Record::ExtendsSet { element, old, new } => Record::ExtendsSet {
                element,
                old: new,
                new: old,
            },
            Record::ContentAdded {
                element,
                container,
                index,
            } => Record::ContentDropped {
                element,
                container,
                index,
            },
            Record::ContentDropped {
                element,
                container,
                index,
            } => Record::ContentAdded {
                element,
                container,
                index,
            },
            Record::CssInserted { host, index, css } => Record::CssRemoved { host, index, css },
            Record::CssRemoved { host, index, css } => Record::CssInserted { host, index, css },
            Record::CssReplaced {
                host,
                index,
                old,
                new,
            } => Record::CssReplaced {
                host,
                index,
                old: new,
                new: old,
            },
            Record::LibraryInserted { index, library } => {
                Record::LibraryRemoved { index, library }
            }
            Record::LibraryRemoved { index, library } => {
                Record::LibraryInserted { index, library }
            }
            Record::LibraryReplaced { index, old, new } => Record::LibraryReplaced {
                index,
                old: new,
                new: old,
            },
        }
    }

    /// Listener-facing description of the change.
    pub(crate) fn change(&self) -> Change {
        match self {
            Record::PropertySet {
                element,
                name,
                old,
                new,
            } => Change::Property {
                element: *element,
                name: name.clone(),
                old: old.clone(),
                new: new.clone(),
            },
            Record::MaskSet {
                element,
                name,
                old,
                new,
            } => Change::Mask {
                element: *element,
                name: name.clone(),
                old: *old,
                new: *new,
            },
            Record::NameSet { element, old, new } => Change::Name {
                element: *element,
                old: old.clone(),
                new: new.clone(),
            },
            Record::ExtendsSet { element, old, new } => Change::Extends {
                element: *element,
                old: old.clone(),
                new: new.clone(),
            },
            Record::ContentAdded {
                element, container, ..
            } => Change::Content {
                container: container.clone(),
                element: *element,
                added: true,
            },
            Record::ContentDropped {
                element, container, ..
            } => Change::Content {
                container: container.clone(),
                element: *element,
                added: false,
            },
            Record::CssInserted { host, css, .. } | Record::CssRemoved { host, css, .. } => {
                Change::Css {
                    host: *host,
                    file_name: css.file_name().to_owned(),
                }
            }
            Record::CssReplaced { host, new, .. } => Change::Css {
                host: *host,
                file_name: new.file_name().to_owned(),
            },
            Record::LibraryInserted { library, .. } | Record::LibraryRemoved { library, .. } => {
                Change::Library {
                    namespace: library.namespace.clone(),
                }
            }
            Record::LibraryReplaced { new, .. } => Change::Library {
                namespace: new.namespace.clone(),
            },
        }
    }
}

/// Changes of a unit as observed after applying it (`reverted == false`) or
/// after reverting it.
pub(crate) fn changes(records: &[Record], reverted: bool) -> Vec<Change> {
    if reverted {
        records.iter().rev().map(|r| r.inverse().change()).collect()
    } else {
        records.iter().map(Record::change).collect()
    }
}
