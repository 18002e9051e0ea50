//! Trackable objects and the capabilities the graph core consumes from them.
//!
//! This module provides the core abstractions for objects participating in a
//! dependency graph: the [`Trackable`] trait, edge references, and
//! object-identity keyed collections.
//!
//! # Design Principles
//!
//! - **Capabilities, not implementations**: the graph core only asks objects
//!   to enumerate dependencies, attribute factories, and (optionally) slot
//!   variables. How an object stores those is its own business.
//! - **Reference identity**: two value-equal objects are distinct graph
//!   nodes. Identity is derived from the allocation behind a
//!   [`TrackableHandle`], never from `PartialEq`.
//! - **Deterministic enumeration**: dependency and attribute order reported
//!   by an object is authoritative and must be stable across repeated calls
//!   within one save operation.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use trackgraph::node::{
//!     CapabilityError, SaveMode, Trackable, TrackableHandle, TrackableReference,
//! };
//! use trackgraph::saveable::AttributeFactory;
//!
//! struct Leaf;
//!
//! impl Trackable for Leaf {
//!     fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError> {
//!         Ok(vec![])
//!     }
//!
//!     fn attribute_factories(
//!         &self,
//!         _mode: SaveMode,
//!     ) -> Result<Vec<AttributeFactory>, CapabilityError> {
//!         Ok(vec![])
//!     }
//! }
//!
//! struct Root {
//!     child: TrackableHandle,
//! }
//!
//! impl Trackable for Root {
//!     fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError> {
//!         Ok(vec![TrackableReference::new("child", self.child.clone())])
//!     }
//!
//!     fn attribute_factories(
//!         &self,
//!         _mode: SaveMode,
//!     ) -> Result<Vec<AttributeFactory>, CapabilityError> {
//!         Ok(vec![])
//!     }
//! }
//!
//! let root = Root { child: Arc::new(Leaf) };
//! assert_eq!(root.dependencies().unwrap().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::saveable::AttributeFactory;

// ============================================================================
// Handles & Identity
// ============================================================================

/// Shared handle to an object participating in the dependency graph.
pub type TrackableHandle = Arc<dyn Trackable>;

/// Opaque error type for collaborator capability calls.
///
/// Failures from dependency listing or factory building are treated as black
/// boxes: they abort the in-progress save and propagate to the caller
/// unchanged and uninterpreted.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable identity key for a trackable object.
///
/// Derived from the data pointer behind a [`TrackableHandle`], so two handles
/// to the same allocation compare equal while two structurally identical but
/// distinct objects do not. Keys are only meaningful while some handle to the
/// object is alive; the graph core holds handles for every keyed object for
/// the duration of a save.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObjectKey(usize);

impl ObjectKey {
    /// Identity key of the object behind `handle`.
    pub fn of(handle: &TrackableHandle) -> Self {
        // Cast drops the vtable half of the fat pointer; identity is the
        // allocation address alone.
        ObjectKey(Arc::as_ptr(handle) as *const () as usize)
    }
}

/// Map keyed by object identity rather than structural equality.
pub type IdentityMap<V> = FxHashMap<ObjectKey, V>;

/// Set keyed by object identity.
pub type IdentitySet = FxHashSet<ObjectKey>;

// ============================================================================
// Edges
// ============================================================================

/// A named dependency edge: a local name paired with the target object.
///
/// Local names are object-supplied labels and are not guaranteed path-safe;
/// they are escaped by [`crate::naming`] before entering a composite key.
#[derive(Clone)]
pub struct TrackableReference {
    /// Label the owning object uses for this dependency.
    pub local_name: String,
    /// The dependency itself.
    pub target: TrackableHandle,
}

impl TrackableReference {
    pub fn new(local_name: impl Into<String>, target: TrackableHandle) -> Self {
        Self {
            local_name: local_name.into(),
            target,
        }
    }
}

impl fmt::Debug for TrackableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackableReference")
            .field("local_name", &self.local_name)
            .field("target", &ObjectKey::of(&self.target))
            .finish()
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Which persisted-attribute surface an object should report.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SaveMode {
    /// Persisted-state save/restore (the normal checkpoint path).
    #[default]
    Checkpoint,
    /// Portable export: attributes suitable for a self-contained artifact.
    Export,
}

/// Core capability trait for objects reachable from a checkpoint root.
///
/// Implementations must report dependencies and attributes in a deterministic
/// order that is stable across repeated calls within one save operation; the
/// reported order is authoritative for traversal tie-breaking and for cache
/// correctness.
pub trait Trackable: Send + Sync {
    /// Ordered, named dependencies of this object.
    ///
    /// Failures propagate unchanged and abort the in-progress save.
    fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError>;

    /// Ordered mapping of attribute name to saveable factory for `mode`.
    fn attribute_factories(
        &self,
        mode: SaveMode,
    ) -> Result<Vec<AttributeFactory>, CapabilityError>;

    /// Declares the optimizer-slot capability, if this object has one.
    ///
    /// Resolved once per node at slot-naming time rather than probed ad hoc.
    /// The default implementation opts out.
    fn as_optimizer(&self) -> Option<&dyn OptimizerSlots> {
        None
    }
}

/// Capability of an optimizing process that shadows tracked variables with
/// auxiliary slot variables (momentum, accumulators, and the like).
pub trait OptimizerSlots: Send + Sync {
    /// Ordered list of slot names this optimizer maintains.
    fn slot_names(&self) -> Vec<String>;

    /// The slot variable for `(original, slot_name)`, or `None` when this
    /// optimizer keeps no such slot.
    fn slot_for(&self, original: &TrackableHandle, slot_name: &str) -> Option<TrackableHandle>;
}
