//! # Trackgraph: Checkpoint Naming for Object Graphs
//!
//! Trackgraph assigns stable, human-readable checkpoint keys to every
//! persistent variable (and nested sub-object) reachable from a root object,
//! then serializes the resulting dependency graph and variable references
//! into a record usable to save and restore state.
//!
//! ## Core Concepts
//!
//! - **Trackables**: Objects reporting named dependencies and persisted
//!   attributes through capability traits
//! - **Checkpoint keys**: Slash-delimited names derived from each object's
//!   shortest path from the root
//! - **Slot variables**: Optimizer-owned auxiliary state, named relative to
//!   both the shadowed variable and the optimizer
//! - **Saveables**: Adapters bridging a persisted attribute to its concrete
//!   serialized representation, with caller-owned caching
//! - **Graph record**: The serializable structure capturing nodes, edges,
//!   and attribute references
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use trackgraph::node::{
//!     CapabilityError, SaveMode, Trackable, TrackableHandle, TrackableReference,
//! };
//! use trackgraph::saveable::AttributeFactory;
//! use trackgraph::view::ObjectGraphView;
//!
//! struct Counter;
//!
//! impl Trackable for Counter {
//!     fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError> {
//!         Ok(vec![])
//!     }
//!     fn attribute_factories(
//!         &self,
//!         _mode: SaveMode,
//!     ) -> Result<Vec<AttributeFactory>, CapabilityError> {
//!         Ok(vec![])
//!     }
//! }
//!
//! struct Model {
//!     counter: TrackableHandle,
//! }
//!
//! impl Trackable for Model {
//!     fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError> {
//!         Ok(vec![TrackableReference::new("counter", self.counter.clone())])
//!     }
//!     fn attribute_factories(
//!         &self,
//!         _mode: SaveMode,
//!     ) -> Result<Vec<AttributeFactory>, CapabilityError> {
//!         Ok(vec![])
//!     }
//! }
//!
//! let root: TrackableHandle = Arc::new(Model {
//!     counter: Arc::new(Counter),
//! });
//! let view = ObjectGraphView::new(root);
//! let serialization = view.serialize_object_graph(None).unwrap();
//!
//! // Node 0 is the root; its only child edge carries the local name.
//! assert_eq!(serialization.record.nodes[0].children[0].local_name, "counter");
//! ```
//!
//! ## Error Handling
//!
//! Every detected inconsistency (bad slot variable, checkpoint-key mismatch,
//! feed-key collision) is a programming or data error: it aborts the save and
//! surfaces as a [`errors::GraphViewError`], never retried. Collaborator
//! capability failures propagate unchanged.
//!
//! ## Module Guide
//!
//! - [`naming`] - Checkpoint-key construction and interop constants
//! - [`node`] - Trackable capability traits, handles, identity maps
//! - [`saveable`] - Saveable adapters, factories, and the saveables cache
//! - [`view`] - Graph traversal, slot resolution, and record serialization
//! - [`record`] - The serializable graph record
//! - [`errors`] - Fatal error catalogue
//! - [`telemetry`] - Tracing subscriber bootstrap

pub mod errors;
pub mod naming;
pub mod node;
pub mod record;
pub mod saveable;
pub mod telemetry;
pub mod view;
