//! Object-graph views: traversal, naming, and record serialization.
//!
//! [`ObjectGraphView`] gathers every trackable object reachable from a root,
//! assigns each a stable checkpoint name derived from its shortest root path,
//! folds in optimizer slot variables, and serializes the result into a
//! [`GraphRecord`](crate::record::GraphRecord) plus a flat list of saveable
//! adapters.
//!
//! # Pipeline
//!
//! 1. Breadth-first traversal assigns ids and canonical paths
//!    ([`traversal`]).
//! 2. Slot variables are named and appended to the node list ([`slots`]).
//! 3. Each node reports its attribute factories, which get full checkpoint
//!    keys ([`attributes`]).
//! 4. Factories are materialized into adapters, with caching and
//!    volatile-state handling ([`materialize`]).
//! 5. Node descriptors are assembled into the final record.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use trackgraph::node::{CapabilityError, SaveMode, Trackable, TrackableHandle, TrackableReference};
//! use trackgraph::saveable::AttributeFactory;
//! use trackgraph::view::ObjectGraphView;
//!
//! struct Leaf;
//! impl Trackable for Leaf {
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
//! struct Root {
//!     v: TrackableHandle,
//! }
//! impl Trackable for Root {
//!     fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError> {
//!         Ok(vec![TrackableReference::new("v", self.v.clone())])
//!     }
//!     fn attribute_factories(
//!         &self,
//!         _mode: SaveMode,
//!     ) -> Result<Vec<AttributeFactory>, CapabilityError> {
//!         Ok(vec![])
//!     }
//! }
//!
//! let root: TrackableHandle = Arc::new(Root { v: Arc::new(Leaf) });
//! let view = ObjectGraphView::new(root);
//! let serialization = view.serialize_object_graph(None).unwrap();
//! assert_eq!(serialization.record.nodes.len(), 2);
//! assert_eq!(serialization.record.nodes[0].children[0].local_name, "v");
//! ```

mod attributes;
mod materialize;
mod slots;
mod traversal;


use std::sync::{Arc, Weak};

use crate::errors::GraphViewError;
use crate::naming;
use crate::node::{
    IdentityMap, ObjectKey, SaveMode, Trackable, TrackableHandle, TrackableReference,
};
use crate::record::{
    AttributeRecord, ChildReference, GraphRecord, NodeRecord, SlotVariableReference,
};
use crate::saveable::{FeedAdditions, FixedValueSaveable, SaveableHandle, SaveablesCache};

/// Root reference held by a view.
///
/// A view usually owns its root, but callers embedding views inside the very
/// objects being tracked can hold the root weakly to break the cycle. Weak
/// roots come with a liveness contract: the owning reference must outlive
/// every use of the view, and a violated contract surfaces as
/// [`GraphViewError::DanglingRoot`] rather than silent use-after-free.
#[derive(Clone)]
enum RootRef {
    Strong(TrackableHandle),
    Weak(Weak<dyn Trackable>),
}

/// Gathers and serializes an object graph rooted at a single trackable.
///
/// The graph (nodes, paths, record) is rebuilt per save operation; only the
/// caller-owned [`SaveablesCache`] persists across saves.
pub struct ObjectGraphView {
    root: RootRef,
    attached_dependencies: Vec<TrackableReference>,
}

// Cloning a view re-creates the root relationship against the same
// underlying object: strong stays strong, weak stays weak.
impl Clone for ObjectGraphView {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            attached_dependencies: self.attached_dependencies.clone(),
        }
    }
}

/// Everything the traversal and naming phases produce, before attributes are
/// materialized.
pub struct GraphIndex {
    /// All graph members: BFS order first, then slot variables in discovery
    /// order. A node's index is its id.
    pub nodes: Vec<TrackableHandle>,
    /// Canonical root path per non-slot node.
    pub path_to_root: IdentityMap<Vec<TrackableReference>>,
    /// Node id per graph member.
    pub node_ids: IdentityMap<usize>,
    /// Assigned checkpoint name per graph member.
    pub object_names: IdentityMap<String>,
    /// Slot-variable references grouped by owning optimizer.
    pub slot_variables: IdentityMap<Vec<SlotVariableReference>>,
}

impl std::fmt::Debug for GraphIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphIndex")
            .field("nodes", &self.nodes.len())
            .field("path_to_root", &self.path_to_root)
            .field("node_ids", &self.node_ids)
            .field("object_names", &self.object_names)
            .field("slot_variables", &self.slot_variables)
            .finish()
    }
}

/// Artifact of one save operation, handed to the persistence layer.
pub struct Serialization {
    /// Concrete adapters in node-then-attribute order.
    pub saveables: Vec<SaveableHandle>,
    /// The serialized object graph.
    pub record: GraphRecord,
    /// Feed map for volatile state; `Some` exactly when a cache was supplied.
    pub feed_additions: Option<FeedAdditions>,
}

impl std::fmt::Debug for Serialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serialization")
            .field(
                "saveables",
                &self.saveables.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("record", &self.record)
            .field("feed_additions", &self.feed_additions)
            .finish()
    }
}

impl ObjectGraphView {
    /// Creates a view owning its root.
    pub fn new(root: TrackableHandle) -> Self {
        Self {
            root: RootRef::Strong(root),
            attached_dependencies: Vec::new(),
        }
    }

    /// Creates a view holding its root weakly.
    ///
    /// The caller keeps ownership and must keep the root alive for the
    /// lifetime of the view; see [`RootRef`] for the contract.
    pub fn new_weak(root: Weak<dyn Trackable>) -> Self {
        Self {
            root: RootRef::Weak(root),
            attached_dependencies: Vec::new(),
        }
    }

    /// Attaches dependencies to the root that are not reachable through its
    /// normal links.
    ///
    /// Attached dependencies are appended to the root's own dependency list
    /// and treated exactly like normal children for naming and traversal,
    /// without being materialized as back-links on the root object.
    #[must_use]
    pub fn with_attached_dependencies(mut self, dependencies: Vec<TrackableReference>) -> Self {
        self.attached_dependencies = dependencies;
        self
    }

    /// Dependencies attached to the root beyond its own links.
    pub fn attached_dependencies(&self) -> &[TrackableReference] {
        &self.attached_dependencies
    }

    /// The root object.
    ///
    /// # Errors
    ///
    /// [`GraphViewError::DanglingRoot`] when a weakly held root has already
    /// been dropped.
    pub fn root(&self) -> Result<TrackableHandle, GraphViewError> {
        match &self.root {
            RootRef::Strong(root) => Ok(root.clone()),
            RootRef::Weak(root) => root.upgrade().ok_or(GraphViewError::DanglingRoot),
        }
    }

    /// Named dependencies of `node`, with attached dependencies appended when
    /// `node` is the root.
    pub fn list_dependencies(
        &self,
        node: &TrackableHandle,
    ) -> Result<Vec<TrackableReference>, GraphViewError> {
        let mut dependencies = node.dependencies()?;
        if !self.attached_dependencies.is_empty()
            && ObjectKey::of(node) == ObjectKey::of(&self.root()?)
        {
            dependencies.extend(self.attached_dependencies.iter().cloned());
        }
        Ok(dependencies)
    }

    /// Traverses the graph and assigns ids, names, and slot variables.
    ///
    /// Slot variables are included only when the variable they shadow and
    /// their optimizer are both dependencies of the root, i.e. when they
    /// would be saved with a checkpoint anyway.
    pub fn objects_ids_and_slot_variables_and_paths(
        &self,
    ) -> Result<GraphIndex, GraphViewError> {
        let traversal = self.breadth_first_traversal()?;
        let mut nodes = traversal.bfs_sorted;
        let path_to_root = traversal.path_to_root;

        let mut object_names: IdentityMap<String> = IdentityMap::default();
        for node in &nodes {
            let key = ObjectKey::of(node);
            object_names.insert(key, naming::object_prefix_from_path(&path_to_root[&key]));
        }
        let mut node_ids: IdentityMap<usize> = IdentityMap::default();
        for (node_id, node) in nodes.iter().enumerate() {
            node_ids.insert(ObjectKey::of(node), node_id);
        }

        let slot_variables =
            slots::name_slot_variables(&mut nodes, &mut node_ids, &mut object_names)?;

        Ok(GraphIndex {
            nodes,
            path_to_root,
            node_ids,
            object_names,
            slot_variables,
        })
    }

    /// Traverses the graph and lists every accessible object, slot variables
    /// included.
    pub fn list_objects(&self) -> Result<Vec<TrackableHandle>, GraphViewError> {
        Ok(self.objects_ids_and_slot_variables_and_paths()?.nodes)
    }

    /// Determines checkpoint keys for every persisted attribute and builds a
    /// serialized graph record, using [`SaveMode::Checkpoint`].
    ///
    /// Non-slot variables are keyed on the shortest path from the root to the
    /// object owning them; slot variables on the shortest paths to both the
    /// variable being slotted for and the optimizer, plus the slot name.
    ///
    /// `cache` is caller-owned and optional. When supplied, adapters whose
    /// checkpoint key is unchanged are reused instead of rebuilt, and
    /// volatile state is collected into a feed map instead of frozen.
    pub fn serialize_object_graph(
        &self,
        cache: Option<&mut SaveablesCache>,
    ) -> Result<Serialization, GraphViewError> {
        self.serialize_object_graph_for(SaveMode::Checkpoint, cache)
    }

    /// [`Self::serialize_object_graph`] with an explicit attribute-surface
    /// mode.
    pub fn serialize_object_graph_for(
        &self,
        mode: SaveMode,
        cache: Option<&mut SaveablesCache>,
    ) -> Result<Serialization, GraphViewError> {
        let index = self.objects_ids_and_slot_variables_and_paths()?;
        let checkpoint_factory_map =
            attributes::checkpoint_factories_and_keys(&index.nodes, &index.object_names, mode)?;
        let materialization = materialize::materialize_saveables(
            &index.nodes,
            &index.node_ids,
            &checkpoint_factory_map,
            cache,
        )?;
        let record = self.fill_graph_record(&index, materialization.attributes)?;

        tracing::debug!(
            nodes = record.nodes.len(),
            saveables = materialization.saveables.len(),
            "serialized object graph"
        );
        Ok(Serialization {
            saveables: materialization.saveables,
            record,
            feed_additions: materialization.feed_additions,
        })
    }

    /// Serializes the graph immediately and appends the JSON-encoded record
    /// itself as one fixed-value saveable under
    /// [`naming::OBJECT_GRAPH_KEY`].
    pub fn frozen_saveables(&self) -> Result<Vec<SaveableHandle>, GraphViewError> {
        let Serialization {
            mut saveables,
            record,
            ..
        } = self.serialize_object_graph(None)?;
        let encoded = serde_json::to_value(&record)?;
        saveables.push(Arc::new(FixedValueSaveable::new(
            naming::OBJECT_GRAPH_KEY,
            encoded,
        )));
        Ok(saveables)
    }

    /// Assembles node descriptors in id order.
    fn fill_graph_record(
        &self,
        index: &GraphIndex,
        mut attributes: IdentityMap<Vec<materialize::MaterializedAttribute>>,
    ) -> Result<GraphRecord, GraphViewError> {
        let mut record = GraphRecord::default();
        for (checkpoint_id, node) in index.nodes.iter().enumerate() {
            let node_key = ObjectKey::of(node);
            // Positional id and assigned id must agree; anything else means
            // the node list was mutated mid-save.
            assert_eq!(index.node_ids[&node_key], checkpoint_id);

            let mut descriptor = NodeRecord {
                slot_variables: index
                    .slot_variables
                    .get(&node_key)
                    .cloned()
                    .unwrap_or_default(),
                ..Default::default()
            };
            for child in self.list_dependencies(node)? {
                descriptor.children.push(ChildReference {
                    node_id: index.node_ids[&ObjectKey::of(&child.target)],
                    local_name: child.local_name,
                });
            }
            for attribute in attributes.remove(&node_key).unwrap_or_default() {
                descriptor.attributes.push(AttributeRecord {
                    name: attribute.name,
                    checkpoint_key: attribute.checkpoint_key,
                    optional_restore: attribute.optional_restore,
                    full_name: attribute.full_name,
                });
            }
            record.nodes.push(descriptor);
        }
        Ok(record)
    }
}
