//! Error taxonomy for design mutations and queries.
//!
//! Every mutating operation on a [`Module`](crate::module::Module) returns
//! [`Result<T>`]. When an operation fails, the transaction it opened has
//! already been rolled back by the time the error reaches the caller.

use crate::css::parser::ParseError;
use crate::design::ElementId;
use crate::property::PropertyError;
use crate::resource::ResourceError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DesignError>;

/// Structurally invalid add or move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// The slot does not accept elements of this type.
    #[error("slot '{slot}' does not accept elements of type {element_type}")]
    WrongType { slot: String, element_type: String },

    /// A single-valued slot already holds an element.
    #[error("slot '{slot}' can hold only one element")]
    SlotFull { slot: String },

    /// The container type does not define a slot with this name.
    #[error("element type {element_type} has no slot '{slot}'")]
    UnknownSlot { slot: String, element_type: String },

    /// The element already sits in a slot (or is the module root).
    #[error("element is already contained in the design")]
    AlreadyContained,

    /// The target container is not attached to the module tree.
    #[error("target container is detached from the design")]
    DetachedContainer,

    /// The target container lives inside the element being added.
    #[error("element cannot be added inside its own subtree")]
    WouldCycle,

    /// Insertion index past the end of the slot.
    #[error("index {index} out of range for slot of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The element is not in any slot.
    #[error("element is not contained in any slot")]
    NotContained,
}

/// Errors surfaced by [`Module`](crate::module::Module) operations.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// No element with this id exists in the module arena.
    #[error("element {0:?} not found")]
    ElementNotFound(ElementId),

    /// The element type is unknown or abstract.
    #[error("unknown or abstract element type: {0}")]
    UnknownElementType(String),

    /// Explicit rename to a name that is already taken in its scope.
    #[error("name '{name}' is already in use")]
    NameConflict { name: String },

    /// Structurally invalid add or move.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The property is locked by its definition or by a lock mask on the
    /// element or its extends chain.
    #[error("property '{property}' is locked on element {element:?}")]
    LockedProperty { element: ElementId, property: String },

    /// Setting this extends reference would form a cycle.
    #[error("extends reference to '{name}' would form a cycle")]
    CyclicExtends { name: String },

    /// A listener tried to mutate the module while being notified.
    #[error("module mutated while listeners are being notified")]
    ReentrantMutation,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    /// Property name or value rejected by the definition.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// `commit` or `rollback` without a matching `start_transaction`.
    #[error("no open transaction")]
    NoOpenTransaction,

    /// The operation is not permitted while a transaction is open.
    #[error("cannot {0} while a transaction is open")]
    TransactionOpen(&'static str),

    /// The extends target could not be found.
    #[error("extends target '{name}' does not resolve")]
    UnresolvedExtends { name: String },

    /// An element may only extend an element of the same type.
    #[error("element of type {element_type} cannot extend {base_type}")]
    ExtendsTypeMismatch {
        element_type: String,
        base_type: String,
    },

    /// The element cannot host included stylesheets.
    #[error("element {0:?} cannot include stylesheets")]
    NotACssHost(ElementId),

    #[error("stylesheet '{0}' is not included")]
    CssNotFound(String),

    #[error("stylesheet '{0}' is already included")]
    CssAlreadyIncluded(String),

    /// The stylesheet defines a style still referenced by the design.
    #[error("stylesheet '{file_name}' still provides style '{style}'")]
    CssInUse { file_name: String, style: String },

    #[error("no library included under namespace '{0}'")]
    LibraryNotFound(String),

    #[error("a library is already included under namespace '{0}'")]
    LibraryAlreadyIncluded(String),

    /// The included module is not a library.
    #[error("module included as '{0}' is not a library")]
    NotALibrary(String),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
