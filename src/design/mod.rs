//! Design tree: slotmap-backed element arena with named slots.

pub mod element;
pub mod names;
pub mod query;
pub mod tree;

pub use element::{ContainerRef, DesignElement, ElementId, ExtendsRef, Slot};
pub use tree::DesignTree;
