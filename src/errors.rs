//! Error types for graph-view serialization.
//!
//! Every variant is fatal at the point raised: a detected inconsistency is a
//! programming or data error, never retried, and no partial graph record is
//! returned. Collaborator capability failures travel through
//! [`GraphViewError::Capability`] uninterpreted.

use miette::Diagnostic;
use thiserror::Error;

use crate::node::CapabilityError;

/// Errors raised while naming the object graph and building its record.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphViewError {
    /// A slot variable reported dependencies of its own.
    #[error("slot variable for slot '{slot_name}' has its own dependencies; only leaf slot variables can be saved")]
    #[diagnostic(
        code(trackgraph::slots::unsupported_dependency),
        help("Slot variables must be leaf objects. Move nested state off the slot variable.")
    )]
    UnsupportedSlotDependency { slot_name: String },

    /// A slot variable is already a node elsewhere in the graph.
    #[error("slot variable for slot '{slot_name}' was re-used as a dependency of a trackable object")]
    #[diagnostic(
        code(trackgraph::slots::aliasing),
        help("A slot variable cannot also be reachable as a normal dependency of the root.")
    )]
    IllegalSlotAliasing { slot_name: String },

    /// A factory produced an adapter whose name does not contain its key.
    #[error("saveable '{produced}' built for attribute '{attribute}' does not contain its checkpoint key '{expected}'")]
    #[diagnostic(
        code(trackgraph::saveables::key_mismatch),
        help("The attribute's factory is misbehaving: built adapters must embed the checkpoint key they were given.")
    )]
    AdapterKeyMismatch {
        attribute: String,
        produced: String,
        expected: String,
    },

    /// Two adapters tried to feed a value under the same key in one save.
    #[error("a saveable tried to feed a value for '{key}', but another saveable is already feeding it")]
    #[diagnostic(code(trackgraph::saveables::feed_collision))]
    FeedKeyCollision { key: String },

    /// The weakly held root was dropped while the view was still in use.
    #[error("the root trackable has been dropped")]
    #[diagnostic(
        code(trackgraph::view::dangling_root),
        help("Keep a strong reference to the root alive for the lifetime of the graph view.")
    )]
    DanglingRoot,

    /// JSON serialization of the graph record failed.
    #[error(transparent)]
    #[diagnostic(code(trackgraph::serde_json))]
    Serde(#[from] serde_json::Error),

    /// A collaborator capability call failed; carried through unchanged.
    #[error("capability call failed: {0}")]
    #[diagnostic(code(trackgraph::capability))]
    Capability(CapabilityError),
}

impl From<CapabilityError> for GraphViewError {
    fn from(err: CapabilityError) -> Self {
        GraphViewError::Capability(err)
    }
}
