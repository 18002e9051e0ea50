#![allow(dead_code)]

//! Shared trackable fixtures for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use trackgraph::node::{
    CapabilityError, ObjectKey, OptimizerSlots, SaveMode, Trackable, TrackableHandle,
    TrackableReference,
};
use trackgraph::saveable::{
    AttributeFactory, FeedAdditions, FixedValueSaveable, Saveable, SaveableHandle,
    VolatileSaveable,
};

/// A plain saveable whose name embeds the checkpoint key it was built for.
pub struct TestSaveable {
    name: String,
    optional: bool,
    full_name: Option<String>,
}

impl Saveable for TestSaveable {
    fn name(&self) -> &str {
        &self.name
    }

    fn optional_restore(&self) -> bool {
        self.optional
    }

    fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }
}

/// A saveable for state that only exists outside the graph at save time.
pub struct VolatileValue {
    name: String,
    feed_key: String,
    value: serde_json::Value,
}

impl Saveable for VolatileValue {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_volatile(&self) -> Option<&dyn VolatileSaveable> {
        Some(self)
    }
}

impl VolatileSaveable for VolatileValue {
    fn freeze(&self) -> SaveableHandle {
        Arc::new(FixedValueSaveable::new(self.name.clone(), self.value.clone()))
    }

    fn feed_additions(&self) -> FeedAdditions {
        let mut additions = FeedAdditions::default();
        additions.insert(self.feed_key.clone(), self.value.clone());
        additions
    }
}

/// Declarative description of one persisted attribute of a [`TestVariable`].
#[derive(Clone)]
pub struct AttributeSpec {
    pub name: String,
    /// How many saveables the factory produces (usually one).
    pub saveable_count: usize,
    /// `optional_restore` flag for every produced saveable.
    pub optional: bool,
    /// Per-part `optional_restore` overrides, cycled when shorter than the
    /// saveable count.
    pub part_optional: Option<Vec<bool>>,
    /// Adapter-reported display name.
    pub full_name: Option<String>,
    /// Produce saveables whose names drop the checkpoint key (misbehaving
    /// factory).
    pub corrupt_key: bool,
    /// Produce a volatile saveable feeding `(key, value)` instead of plain
    /// ones.
    pub feed: Option<(String, serde_json::Value)>,
    /// Number of factory invocations, shared across clones.
    pub builds: Arc<AtomicUsize>,
}

impl AttributeSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            saveable_count: 1,
            optional: false,
            part_optional: None,
            full_name: None,
            corrupt_key: false,
            feed: None,
            builds: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn saveables(mut self, count: usize) -> Self {
        self.saveable_count = count;
        self
    }

    pub fn optional_parts(mut self, parts: Vec<bool>) -> Self {
        self.part_optional = Some(parts);
        self
    }

    pub fn full_name(mut self, full_name: &str) -> Self {
        self.full_name = Some(full_name.to_string());
        self
    }

    pub fn corrupt_key(mut self) -> Self {
        self.corrupt_key = true;
        self
    }

    pub fn feeding(mut self, feed_key: &str, value: serde_json::Value) -> Self {
        self.feed = Some((feed_key.to_string(), value));
        self
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn factory(&self) -> AttributeFactory {
        let spec = self.clone();
        AttributeFactory::new(
            self.name.clone(),
            Arc::new(move |checkpoint_key: &str| {
                spec.builds.fetch_add(1, Ordering::SeqCst);
                if let Some((feed_key, value)) = &spec.feed {
                    let volatile: SaveableHandle = Arc::new(VolatileValue {
                        name: checkpoint_key.to_string(),
                        feed_key: feed_key.clone(),
                        value: value.clone(),
                    });
                    return Ok(vec![volatile]);
                }
                let mut saveables: Vec<SaveableHandle> = Vec::new();
                for part in 0..spec.saveable_count {
                    let name = if spec.corrupt_key {
                        format!("bogus_part_{part}")
                    } else if spec.saveable_count > 1 {
                        format!("{checkpoint_key}_part_{part}")
                    } else {
                        checkpoint_key.to_string()
                    };
                    let optional = spec
                        .part_optional
                        .as_ref()
                        .map_or(spec.optional, |parts| parts[part % parts.len()]);
                    saveables.push(Arc::new(TestSaveable {
                        name,
                        optional,
                        full_name: spec.full_name.clone(),
                    }));
                }
                Ok(saveables)
            }),
        )
    }
}

/// General-purpose trackable: rewirable dependencies plus declarative
/// attributes.
pub struct TestVariable {
    pub dependencies: RwLock<Vec<TrackableReference>>,
    pub attributes: Vec<AttributeSpec>,
    pub export_attributes: Vec<AttributeSpec>,
}

impl TestVariable {
    pub fn leaf() -> Arc<Self> {
        Arc::new(Self {
            dependencies: RwLock::new(Vec::new()),
            attributes: Vec::new(),
            export_attributes: Vec::new(),
        })
    }

    pub fn with_attributes(attributes: Vec<AttributeSpec>) -> Arc<Self> {
        Arc::new(Self {
            dependencies: RwLock::new(Vec::new()),
            attributes,
            export_attributes: Vec::new(),
        })
    }

    pub fn with_export_attributes(
        attributes: Vec<AttributeSpec>,
        export_attributes: Vec<AttributeSpec>,
    ) -> Arc<Self> {
        Arc::new(Self {
            dependencies: RwLock::new(Vec::new()),
            attributes,
            export_attributes,
        })
    }

    pub fn with_children(children: Vec<(&str, TrackableHandle)>) -> Arc<Self> {
        let object = Self::leaf();
        for (name, target) in children {
            object.add_child(name, target);
        }
        object
    }

    pub fn add_child(&self, local_name: &str, target: TrackableHandle) {
        self.dependencies
            .write()
            .unwrap()
            .push(TrackableReference::new(local_name, target));
    }

    pub fn set_children(&self, children: Vec<(&str, TrackableHandle)>) {
        *self.dependencies.write().unwrap() = children
            .into_iter()
            .map(|(name, target)| TrackableReference::new(name, target))
            .collect();
    }
}

impl Trackable for TestVariable {
    fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError> {
        Ok(self.dependencies.read().unwrap().clone())
    }

    fn attribute_factories(
        &self,
        mode: SaveMode,
    ) -> Result<Vec<AttributeFactory>, CapabilityError> {
        let specs = match mode {
            SaveMode::Checkpoint => &self.attributes,
            SaveMode::Export => &self.export_attributes,
        };
        Ok(specs.iter().map(AttributeSpec::factory).collect())
    }
}

/// Trackable whose dependency listing always fails.
pub struct BrokenVariable;

impl Trackable for BrokenVariable {
    fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError> {
        Err("dependency listing exploded".into())
    }

    fn attribute_factories(
        &self,
        _mode: SaveMode,
    ) -> Result<Vec<AttributeFactory>, CapabilityError> {
        Ok(vec![])
    }
}

/// An optimizing process tracking slot variables per original variable.
pub struct TestOptimizer {
    pub dependencies: RwLock<Vec<TrackableReference>>,
    slots: RwLock<Vec<SlotEntry>>,
}

struct SlotEntry {
    original: TrackableHandle,
    slot_name: String,
    slot_variable: TrackableHandle,
}

impl TestOptimizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            dependencies: RwLock::new(Vec::new()),
            slots: RwLock::new(Vec::new()),
        })
    }

    pub fn add_child(&self, local_name: &str, target: TrackableHandle) {
        self.dependencies
            .write()
            .unwrap()
            .push(TrackableReference::new(local_name, target));
    }

    pub fn track_slot(
        &self,
        original: &TrackableHandle,
        slot_name: &str,
        slot_variable: TrackableHandle,
    ) {
        self.slots.write().unwrap().push(SlotEntry {
            original: original.clone(),
            slot_name: slot_name.to_string(),
            slot_variable,
        });
    }
}

impl Trackable for TestOptimizer {
    fn dependencies(&self) -> Result<Vec<TrackableReference>, CapabilityError> {
        Ok(self.dependencies.read().unwrap().clone())
    }

    fn attribute_factories(
        &self,
        _mode: SaveMode,
    ) -> Result<Vec<AttributeFactory>, CapabilityError> {
        Ok(vec![])
    }

    fn as_optimizer(&self) -> Option<&dyn OptimizerSlots> {
        Some(self)
    }
}

impl OptimizerSlots for TestOptimizer {
    fn slot_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for entry in self.slots.read().unwrap().iter() {
            if !names.contains(&entry.slot_name) {
                names.push(entry.slot_name.clone());
            }
        }
        names
    }

    fn slot_for(&self, original: &TrackableHandle, slot_name: &str) -> Option<TrackableHandle> {
        self.slots
            .read()
            .unwrap()
            .iter()
            .find(|entry| {
                entry.slot_name == slot_name
                    && ObjectKey::of(&entry.original) == ObjectKey::of(original)
            })
            .map(|entry| entry.slot_variable.clone())
    }
}

/// Upcasts a concrete fixture into a trackable handle.
pub fn handle<T: Trackable + 'static>(object: Arc<T>) -> TrackableHandle {
    object
}
