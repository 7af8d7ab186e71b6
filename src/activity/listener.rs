//! Activity notifications.

use crate::design::{ContainerRef, ElementId, ExtendsRef};
use crate::module::Module;
use crate::property::{MaskState, Value};

/// What produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Commit,
    Undo,
    Redo,
}

/// One observable change, described in the direction it was just applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Property {
        element: ElementId,
        name: String,
        old: Option<Value>,
        new: Option<Value>,
    },
    Mask {
        element: ElementId,
        name: String,
        old: Option<MaskState>,
        new: Option<MaskState>,
    },
    Name {
        element: ElementId,
        old: Option<String>,
        new: Option<String>,
    },
    Extends {
        element: ElementId,
        old: Option<ExtendsRef>,
        new: Option<ExtendsRef>,
    },
    /// `added` is false when the element left the slot.
    Content {
        container: ContainerRef,
        element: ElementId,
        added: bool,
    },
    Css {
        host: ElementId,
        file_name: String,
    },
    Library {
        namespace: String,
    },
}

impl Change {
    /// The element the change is about, if it concerns one.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Change::Property { element, .. }
            | Change::Mask { element, .. }
            | Change::Name { element, .. }
            | Change::Extends { element, .. }
            | Change::Content { element, .. } => Some(*element),
            Change::Css { host, .. } => Some(*host),
            Change::Library { .. } => None,
        }
    }
}

/// Delivered after a top-level commit, an undo or a redo.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub label: String,
    pub changes: Vec<Change>,
}

/// Handle returned by [`Module::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Observer of module activity.
///
/// The module is handed out mutably so that listeners can query it, but
/// every mutating operation fails with
/// [`DesignError::ReentrantMutation`](crate::error::DesignError::ReentrantMutation)
/// while notifications are delivered.
pub trait ActivityListener {
    fn on_activity(&mut self, event: &ActivityEvent, module: &mut Module);
}

impl<F> ActivityListener for F
where
    F: FnMut(&ActivityEvent, &mut Module),
{
    fn on_activity(&mut self, event: &ActivityEvent, module: &mut Module) {
        self(event, module)
    }
}
