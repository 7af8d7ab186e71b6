//! Activity stack: reversible records, nested transactions, undo/redo
//! history and listener notification.

pub(crate) mod record;
pub(crate) mod stack;

pub mod listener;

pub use listener::{ActivityEvent, ActivityKind, ActivityListener, Change, ListenerId};
