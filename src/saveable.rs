//! Saveable adapters: the bridge between a persisted attribute and its
//! concrete serialized representation.
//!
//! A [`Saveable`] is built on demand from an [`AttributeFactory`] once the
//! attribute's checkpoint key is known. Building adapters can be expensive,
//! so a caller-owned [`SaveablesCache`] lets repeated saves of an unchanged
//! graph reuse previously built adapters as long as their checkpoint keys
//! still match.
//!
//! Adapters for *volatile* state (values that only exist outside the graph at
//! save time) implement [`VolatileSaveable`] in addition: without a cache they
//! are frozen into a fixed snapshot, with a cache they contribute key/value
//! pairs to a feed map supplied at save time instead.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::node::{CapabilityError, IdentityMap, ObjectKey};

/// Shared handle to a built saveable adapter.
pub type SaveableHandle = Arc<dyn Saveable>;

/// Key/value pairs a volatile adapter wants supplied at save time.
pub type FeedAdditions = FxHashMap<String, serde_json::Value>;

/// Factory closure building the adapters for one attribute, given the
/// attribute's full checkpoint key.
///
/// Every adapter the factory produces must embed the checkpoint key in its
/// [`Saveable::name`]; the materializer treats a violation as a fatal
/// consistency error.
pub type SaveableFactoryFn =
    Arc<dyn Fn(&str) -> Result<Vec<SaveableHandle>, CapabilityError> + Send + Sync>;

/// One attribute an object wants persisted: its name plus the factory that
/// builds the concrete adapters once a checkpoint key is assigned.
#[derive(Clone)]
pub struct AttributeFactory {
    /// Attribute name as the owning object reports it (unescaped).
    pub attribute_name: String,
    /// Builder for the attribute's adapters.
    pub factory: SaveableFactoryFn,
}

impl AttributeFactory {
    pub fn new(attribute_name: impl Into<String>, factory: SaveableFactoryFn) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            factory,
        }
    }
}

/// A built save/restore adapter for one persisted value.
pub trait Saveable: Send + Sync {
    /// Internal identifier of this adapter. Must contain the checkpoint key
    /// the adapter was built for.
    fn name(&self) -> &str;

    /// Whether restoring this value may be skipped when it is absent from a
    /// checkpoint. Defaults to mandatory restore.
    fn optional_restore(&self) -> bool {
        false
    }

    /// Display name reported into the graph record, when the adapter has one.
    fn full_name(&self) -> Option<&str> {
        None
    }

    /// Declares the volatile-state capability, if this adapter has it.
    fn as_volatile(&self) -> Option<&dyn VolatileSaveable> {
        None
    }
}

/// Capability of adapters whose value lives outside the graph and is only
/// known at save time.
pub trait VolatileSaveable: Send + Sync {
    /// Captures the current value into a fixed, self-contained adapter.
    ///
    /// Used in immediate execution mode, where no feed mechanism exists.
    fn freeze(&self) -> SaveableHandle;

    /// Key/value pairs to merge into the shared feed map for this save.
    fn feed_additions(&self) -> FeedAdditions;
}

/// A fixed-value, non-restoring saveable.
///
/// Used to embed values that are computed at serialization time and never
/// restored through an adapter, most notably the serialized graph record
/// itself under [`crate::naming::OBJECT_GRAPH_KEY`].
pub struct FixedValueSaveable {
    name: String,
    value: serde_json::Value,
}

impl FixedValueSaveable {
    pub fn new(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The frozen value this saveable carries.
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }
}

impl Saveable for FixedValueSaveable {
    fn name(&self) -> &str {
        &self.name
    }

    fn optional_restore(&self) -> bool {
        true
    }
}

/// Cache of built adapters, keyed by (object identity, attribute name).
///
/// Owned by the caller and passed into each save; it persists across saves of
/// the same root so unchanged attributes skip adapter reconstruction. The
/// core assumes exclusive access for the duration of one save; concurrent
/// saves sharing one cache must be serialized by the caller.
#[derive(Default)]
pub struct SaveablesCache {
    entries: IdentityMap<FxHashMap<String, Vec<SaveableHandle>>>,
}

impl SaveablesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached adapters for `(object, attribute)`, if any.
    pub fn saveables_for(&self, object: ObjectKey, attribute: &str) -> Option<&[SaveableHandle]> {
        self.entries
            .get(&object)
            .and_then(|attributes| attributes.get(attribute))
            .map(Vec::as_slice)
    }

    /// Drops a stale entry whose checkpoint key no longer matches.
    pub fn evict(&mut self, object: ObjectKey, attribute: &str) {
        if let Some(attributes) = self.entries.get_mut(&object) {
            attributes.remove(attribute);
        }
    }

    /// Stores freshly built adapters for `(object, attribute)`.
    pub fn store(&mut self, object: ObjectKey, attribute: &str, saveables: Vec<SaveableHandle>) {
        self.entries
            .entry(object)
            .or_default()
            .insert(attribute.to_string(), saveables);
    }

    /// Number of objects with at least one cached attribute.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
