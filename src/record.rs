//! Serializable object-graph record.
//!
//! The [`GraphRecord`] is the artifact handed to the persistence layer: one
//! descriptor per node in traversal order, each carrying its child edges,
//! attribute references, and slot-variable references. Node ids are implicit
//! in descriptor position and explicit in edge targets, so a restored record
//! can rebuild the dependency topology without the original objects.

use serde::{Deserialize, Serialize};

/// Serialized view of one save operation's object graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Node descriptors, indexed by node id.
    pub nodes: Vec<NodeRecord>,
}

impl GraphRecord {
    /// JSON encoding of the record, as embedded into the checkpoint under
    /// [`crate::naming::OBJECT_GRAPH_KEY`].
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Descriptor of a single graph node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Slot variables this node (an optimizing process) owns. Empty for
    /// everything else.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slot_variables: Vec<SlotVariableReference>,
    /// Dependency edges in the order the object reported them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildReference>,
    /// Persisted attributes in collection order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

/// One dependency edge: the owner's local name for the child plus the child's
/// node id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildReference {
    pub node_id: usize,
    pub local_name: String,
}

/// One persisted attribute of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Attribute name as the owning object reports it.
    pub name: String,
    /// Full checkpoint key addressing the attribute's serialized value.
    pub checkpoint_key: String,
    /// Whether every adapter for this attribute agreed restore is optional.
    #[serde(default)]
    pub optional_restore: bool,
    /// Adapter-reported display name, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Links an optimizing process to one of its slot variables and the variable
/// it shadows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotVariableReference {
    pub slot_name: String,
    pub original_variable_node_id: usize,
    pub slot_variable_node_id: usize,
}
