//! Property model: typed values, declarative definitions, per-element storage.

pub mod builtin;
pub mod definition;
pub mod store;
pub mod value;

pub use definition::{
    ElementDefinition, MetaDataDictionary, NameScope, PropertyDefinition, SlotDefinition,
};
pub use store::{MaskState, PropertyStore};
pub use value::{Dimension, PropertyError, PropertyKind, Structure, Value};
