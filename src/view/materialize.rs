//! Saveable materialization: factories into concrete adapters.
//!
//! This is where the cache earns its keep. A cached adapter is reused only
//! while its internal identifier still contains the attribute's current
//! checkpoint key; anything stale is evicted and rebuilt. Freshly built
//! adapters are validated the same way, since a factory that drops the key
//! would silently corrupt the checkpoint layout.
//!
//! Volatile adapters (state that lives outside the graph until save time) are
//! handled in one of two ways. Without a cache the save is immediate, so the
//! adapter's current value is frozen into a fixed snapshot. With a cache a
//! feed map is built instead, and each volatile adapter contributes key/value
//! pairs to be supplied when the save actually runs.

use crate::errors::GraphViewError;
use crate::node::{IdentityMap, ObjectKey, TrackableHandle};
use crate::saveable::{FeedAdditions, SaveableHandle, SaveablesCache};

use super::attributes::CheckpointFactoryData;

/// Per-attribute metadata destined for the node's record descriptor.
pub(crate) struct MaterializedAttribute {
    pub name: String,
    pub checkpoint_key: String,
    pub optional_restore: bool,
    pub full_name: Option<String>,
}

/// Output of one materialization pass.
pub(crate) struct Materialization {
    /// Concrete adapters in node-then-attribute order.
    pub saveables: Vec<SaveableHandle>,
    /// Attribute metadata per node.
    pub attributes: IdentityMap<Vec<MaterializedAttribute>>,
    /// Feed map for volatile state; `Some` exactly when caching was enabled.
    pub feed_additions: Option<FeedAdditions>,
}

/// Builds concrete saveables for every `(node, attribute)` pair.
pub(crate) fn materialize_saveables(
    nodes: &[TrackableHandle],
    node_ids: &IdentityMap<usize>,
    checkpoint_factory_map: &IdentityMap<Vec<CheckpointFactoryData>>,
    mut cache: Option<&mut SaveablesCache>,
) -> Result<Materialization, GraphViewError> {
    // Without a cache this is an immediate save; volatile state is frozen
    // in place instead of fed at save time.
    let mut feed_additions: Option<FeedAdditions> =
        cache.is_some().then(FeedAdditions::default);
    let mut named_saveables: Vec<SaveableHandle> = Vec::new();
    let mut attributes: IdentityMap<Vec<MaterializedAttribute>> = IdentityMap::default();

    for (checkpoint_id, node) in nodes.iter().enumerate() {
        let node_key = ObjectKey::of(node);
        debug_assert_eq!(node_ids[&node_key], checkpoint_id);

        let mut node_attributes = Vec::new();
        for factory_data in &checkpoint_factory_map[&node_key] {
            let key = &factory_data.checkpoint_key;

            // See if we can skip rebuilding this attribute's adapters.
            let mut saveables: Option<Vec<SaveableHandle>> = None;
            if let Some(cache) = cache.as_deref_mut() {
                if let Some(cached) = cache.saveables_for(node_key, &factory_data.name) {
                    if cached.iter().all(|saveable| saveable.name().contains(key)) {
                        saveables = Some(cached.to_vec());
                    } else {
                        // The checkpoint key moved; the cached adapters are
                        // for the old location.
                        cache.evict(node_key, &factory_data.name);
                    }
                }
            }

            let saveables = match saveables {
                Some(cached) => {
                    tracing::trace!(key = %key, "reusing cached saveables");
                    cached
                }
                None => {
                    let built = (factory_data.factory)(key)?;
                    for saveable in &built {
                        if !saveable.name().contains(key.as_str()) {
                            return Err(GraphViewError::AdapterKeyMismatch {
                                attribute: factory_data.name.clone(),
                                produced: saveable.name().to_string(),
                                expected: key.clone(),
                            });
                        }
                    }
                    if let Some(cache) = cache.as_deref_mut() {
                        cache.store(node_key, &factory_data.name, built.clone());
                    }
                    built
                }
            };

            let mut optional_restore: Option<bool> = None;
            let mut full_name: Option<String> = None;
            for saveable in saveables {
                optional_restore = Some(match optional_restore {
                    None => saveable.optional_restore(),
                    Some(so_far) => so_far && saveable.optional_restore(),
                });
                if let Some(name) = saveable.full_name() {
                    full_name = Some(name.to_string());
                }

                let saveable = match saveable.as_volatile() {
                    None => saveable,
                    Some(volatile) => match feed_additions.as_mut() {
                        // Immediate save: embed the current value rather than
                        // relying on a feed.
                        None => volatile.freeze(),
                        Some(feed) => {
                            for (feed_key, value) in volatile.feed_additions() {
                                if feed.contains_key(&feed_key) {
                                    return Err(GraphViewError::FeedKeyCollision {
                                        key: feed_key,
                                    });
                                }
                                feed.insert(feed_key, value);
                            }
                            saveable
                        }
                    },
                };
                named_saveables.push(saveable);
            }

            node_attributes.push(MaterializedAttribute {
                name: factory_data.name.clone(),
                checkpoint_key: factory_data.checkpoint_key.clone(),
                optional_restore: optional_restore.unwrap_or(false),
                full_name,
            });
        }
        attributes.insert(node_key, node_attributes);
    }

    Ok(Materialization {
        saveables: named_saveables,
        attributes,
        feed_additions,
    })
}
