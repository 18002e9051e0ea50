//! Checkpoint-key construction for the trackgraph object graph.
//!
//! Every persisted value is addressed by a slash-delimited *checkpoint key*
//! derived from the shortest path between the graph root and the object that
//! owns the value. Local edge names are user-supplied and may contain `/` or
//! the escape character, so they are escaped before being joined into a key.
//!
//! The constants in this module are part of the on-disk naming scheme and must
//! not change: checkpoints written with one set of markers are unreadable with
//! another.
//!
//! # Key shapes
//!
//! - Normal attribute: `<object path>/.ATTRIBUTES/<escaped attribute name>`
//! - Slot variable: `<variable path>/.OPTIMIZER_SLOT/<optimizer path>/<escaped slot name>`
//!
//! # Examples
//!
//! ```
//! use trackgraph::naming::{attribute_key, escape_local_name};
//!
//! assert_eq!(escape_local_name("dense/kernel"), "dense.Skernel");
//! assert_eq!(attribute_key("v", "value"), "v/.ATTRIBUTES/value");
//! ```

use crate::node::TrackableReference;

/// Escape character prefixed to reserved tokens, avoiding collisions with
/// user-specified local names.
pub const ESCAPE_CHAR: char = '.';

/// Marker token announcing that the next key segments describe a slot
/// variable: `<variable path>/.OPTIMIZER_SLOT/<optimizer path>/<slot name>`.
pub const OPTIMIZER_SLOT_NAME: &str = ".OPTIMIZER_SLOT";

/// Marker token separating an object's path from one of its attribute names:
/// `<object path>/.ATTRIBUTES/<attribute name>`.
pub const OBJECT_ATTRIBUTES_NAME: &str = ".ATTRIBUTES";

/// Well-known checkpoint key under which the serialized [`GraphRecord`]
/// (see [`crate::record::GraphRecord`]) itself is stored by the persistence
/// layer.
pub const OBJECT_GRAPH_KEY: &str = "_CHECKPOINTABLE_OBJECT_GRAPH";

/// Escapes a local edge name so it can appear inside a composite key.
///
/// Slashes are reserved for edge separators and the escape character for
/// markers, so every literal escape character is doubled and every `/` becomes
/// escape-char + `S`. The replacement order matters: doubling the escape
/// character first guarantees the `.S` sequences introduced afterwards cannot
/// be confused with a user-written `.S`.
///
/// This function is pure and total.
pub fn escape_local_name(name: &str) -> String {
    name.replace(ESCAPE_CHAR, "..").replace('/', ".S")
}

/// Joins a root-to-object path into an escaped, slash-delimited key prefix.
///
/// The root's own path is empty and produces an empty prefix.
pub fn object_prefix_from_path(path_to_root: &[TrackableReference]) -> String {
    path_to_root
        .iter()
        .map(|reference| escape_local_name(&reference.local_name))
        .collect::<Vec<_>>()
        .join("/")
}

/// Full checkpoint key for a named attribute of the object at `object_prefix`.
pub fn attribute_key(object_prefix: &str, attribute_name: &str) -> String {
    format!(
        "{object_prefix}/{OBJECT_ATTRIBUTES_NAME}/{}",
        escape_local_name(attribute_name)
    )
}

/// Full checkpoint key for a slot variable.
///
/// `variable_path` is the checkpoint name of the variable being slotted for
/// and `optimizer_path` the checkpoint name of the optimizer owning the slot.
/// Slot variables are addressed relative to both so that the same variable can
/// carry slots for several optimizers without collisions.
pub fn slot_variable_key(variable_path: &str, optimizer_path: &str, slot_name: &str) -> String {
    format!(
        "{variable_path}/{OPTIMIZER_SLOT_NAME}/{optimizer_path}/{}",
        escape_local_name(slot_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Names without reserved characters pass through untouched.
    fn escape_plain_name_is_identity() {
        assert_eq!(escape_local_name("kernel"), "kernel");
        assert_eq!(escape_local_name("layer_1"), "layer_1");
    }

    #[test]
    /// Escape characters are doubled and slashes become `.S`.
    fn escape_reserved_characters() {
        assert_eq!(escape_local_name("a.b"), "a..b");
        assert_eq!(escape_local_name("a/b"), "a.Sb");
        assert_eq!(escape_local_name("a./b"), "a...Sb");
    }

    #[test]
    /// A literal `.S` in the input stays distinguishable from an escaped `/`.
    fn escape_is_unambiguous() {
        // "a.S" escapes to "a..S" while "a/" escapes to "a.S".
        assert_ne!(escape_local_name("a.S"), escape_local_name("a/"));
    }

    #[test]
    fn empty_path_produces_empty_prefix() {
        assert_eq!(object_prefix_from_path(&[]), "");
    }

    #[test]
    fn attribute_key_shape() {
        assert_eq!(attribute_key("v", "value"), "v/.ATTRIBUTES/value");
        // Root-owned attributes have an empty prefix component.
        assert_eq!(attribute_key("", "step"), "/.ATTRIBUTES/step");
    }

    #[test]
    fn slot_variable_key_shape() {
        assert_eq!(
            slot_variable_key("v", "opt", "momentum"),
            "v/.OPTIMIZER_SLOT/opt/momentum"
        );
        assert_eq!(
            slot_variable_key("layer/kernel", "opt", "m/v"),
            "layer/kernel/.OPTIMIZER_SLOT/opt/m.Sv"
        );
    }
}
