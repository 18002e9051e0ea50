//! Per-node attribute factory collection.
//!
//! Once every node has a checkpoint name, each one is asked for its
//! attribute-to-factory mapping and every attribute gets a full checkpoint
//! key. Attribute order follows the order the object reports, which must be
//! deterministic across repeated calls for cache correctness.

use crate::errors::GraphViewError;
use crate::naming;
use crate::node::{IdentityMap, ObjectKey, SaveMode, TrackableHandle};
use crate::saveable::SaveableFactoryFn;

/// Factory and naming info for one attribute of one node.
pub(crate) struct CheckpointFactoryData {
    /// Builder for the attribute's saveables.
    pub factory: SaveableFactoryFn,
    /// Attribute name as reported by the object.
    pub name: String,
    /// Full checkpoint key assigned to the attribute.
    pub checkpoint_key: String,
}

/// Collects `(factory, name, checkpoint key)` records for every node.
pub(crate) fn checkpoint_factories_and_keys(
    nodes: &[TrackableHandle],
    object_names: &IdentityMap<String>,
    mode: SaveMode,
) -> Result<IdentityMap<Vec<CheckpointFactoryData>>, GraphViewError> {
    let mut checkpoint_factory_map: IdentityMap<Vec<CheckpointFactoryData>> =
        IdentityMap::default();
    for node in nodes {
        let node_key = ObjectKey::of(node);
        let object_name = &object_names[&node_key];
        let mut records = Vec::new();
        for attribute in node.attribute_factories(mode)? {
            let checkpoint_key = naming::attribute_key(object_name, &attribute.attribute_name);
            records.push(CheckpointFactoryData {
                factory: attribute.factory,
                name: attribute.attribute_name,
                checkpoint_key,
            });
        }
        checkpoint_factory_map.insert(node_key, records);
    }
    Ok(checkpoint_factory_map)
}
