//! Slot-variable naming and inclusion.
//!
//! Slot variables are auxiliary state an optimizing process keeps per tracked
//! variable. They are not dependencies of anything, so a plain traversal
//! never finds them; instead they are synthesized onto the node list after
//! traversal, named relative to both the variable they shadow and the
//! optimizer that owns them. A slot variable is included only when both of
//! those are already graph members.

use crate::errors::GraphViewError;
use crate::naming;
use crate::node::{IdentityMap, ObjectKey, TrackableHandle};
use crate::record::SlotVariableReference;

/// Extends `nodes` with every nameable slot variable and returns the
/// slot-variable references grouped by owning optimizer.
///
/// The node list is snapshotted up front: slot variables appended here are
/// never themselves scanned for further slots. For each optimizer-capable
/// node, each slot name, and each pre-existing node (in index order) the
/// optimizer is asked for a slot variable; present ones are named
/// `<variable path>/.OPTIMIZER_SLOT/<optimizer path>/<slot name>` and
/// assigned the next sequential node id.
///
/// # Errors
///
/// - [`GraphViewError::UnsupportedSlotDependency`] when a slot variable has
///   dependencies of its own.
/// - [`GraphViewError::IllegalSlotAliasing`] when a slot variable is already
///   a registered node.
pub(crate) fn name_slot_variables(
    nodes: &mut Vec<TrackableHandle>,
    node_ids: &mut IdentityMap<usize>,
    object_names: &mut IdentityMap<String>,
) -> Result<IdentityMap<Vec<SlotVariableReference>>, GraphViewError> {
    let non_slot_objects: Vec<TrackableHandle> = nodes.clone();
    let mut slot_variables: IdentityMap<Vec<SlotVariableReference>> = IdentityMap::default();

    for owner in &non_slot_objects {
        let Some(optimizer) = owner.as_optimizer() else {
            continue;
        };
        let owner_key = ObjectKey::of(owner);
        let optimizer_path = object_names[&owner_key].clone();

        for slot_name in optimizer.slot_names() {
            for (original_variable_node_id, original) in non_slot_objects.iter().enumerate() {
                let Some(slot_variable) = optimizer.slot_for(original, &slot_name) else {
                    continue;
                };
                if !slot_variable.dependencies()?.is_empty() {
                    return Err(GraphViewError::UnsupportedSlotDependency {
                        slot_name: slot_name.clone(),
                    });
                }
                let slot_key = ObjectKey::of(&slot_variable);
                if node_ids.contains_key(&slot_key) {
                    return Err(GraphViewError::IllegalSlotAliasing {
                        slot_name: slot_name.clone(),
                    });
                }

                let checkpoint_name = naming::slot_variable_key(
                    &object_names[&ObjectKey::of(original)],
                    &optimizer_path,
                    &slot_name,
                );
                tracing::trace!(slot = %slot_name, name = %checkpoint_name, "named slot variable");
                object_names.insert(slot_key, checkpoint_name);

                let slot_variable_node_id = nodes.len();
                node_ids.insert(slot_key, slot_variable_node_id);
                nodes.push(slot_variable);

                slot_variables
                    .entry(owner_key)
                    .or_default()
                    .push(SlotVariableReference {
                        slot_name: slot_name.clone(),
                        original_variable_node_id,
                        slot_variable_node_id,
                    });
            }
        }
    }
    Ok(slot_variables)
}
