//! # folio
//!
//! A structural document model for report designs: a tree of typed elements
//! whose properties are edited transactionally, undone and redone, and whose
//! effective values come from a cascade of local values, shared styles,
//! included CSS, themes, library base elements and defaults.
//!
//! ## Core Systems
//!
//! - **[`property`]**: typed values, declarative element and property definitions
//! - **[`design`]**: slotmap-backed element arena with named slots and a name index
//! - **[`activity`]**: reversible records, nested transactions, undo/redo, listeners
//! - **[`module`]**: the open design or library and every edit operation
//! - **[`css`]**: tokenizer, parser, specificity and matching of design stylesheets
//! - **[`style`]**: the style cascade
//! - **[`acl`]**: the access-control cascade
//!
//! ```
//! use folio::{Module, ModuleConfig, Value};
//! use folio::property::builtin::{props, slots, types};
//!
//! let mut design = Module::new_design(ModuleConfig::new()).unwrap();
//! let root = design.root();
//!
//! design.start_transaction("add label").unwrap();
//! let label = design.create_element(types::LABEL, Some("greeting")).unwrap();
//! design.add_element(label, root, slots::BODY, None).unwrap();
//! design.set_property(label, props::TEXT, "Hello").unwrap();
//! design.commit().unwrap();
//!
//! design.undo().unwrap();
//! assert!(design.tree().contents(root, slots::BODY).is_empty());
//! design.redo().unwrap();
//! assert_eq!(design.property(label, props::TEXT), Some(&Value::from("Hello")));
//! ```

// Foundation
pub mod config;
pub mod error;
pub mod logging;
pub mod resource;

// Model
pub mod design;
pub mod property;

// Editing
pub mod activity;
pub mod module;

// Resolution
pub mod acl;
pub mod css;
pub mod style;

pub use acl::EffectiveAcl;
pub use config::ModuleConfig;
pub use design::{ElementId, ExtendsRef};
pub use error::{ContentError, DesignError, Result};
pub use module::{ElementRef, IncludedLibrary, Module};
pub use property::{MaskState, Value};
pub use style::{ComputedStyle, ValueSource};
