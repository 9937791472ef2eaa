use std::collections::BTreeMap;

/// Opaque key for a host layer.
///
/// The host adapter owns the mapping from ids to real layers; the engine only passes ids back.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub u64);

/// Host-side layer collection as seen by the engine.
///
/// Attributes are string key/value pairs grouped by namespace. Names are unique.
pub trait LayerStore {
    /// All layers, in host order.
    fn layer_ids(&self) -> Vec<LayerId>;
    /// Display name of a layer.
    fn layer_name(&self, id: LayerId) -> Option<String>;
    /// Look a layer up by its unique name.
    fn find_by_name(&self, name: &str) -> Option<LayerId>;
    /// Return the layer named `name`, creating it when missing.
    fn get_or_create(&mut self, name: &str) -> LayerId;
    /// Read one attribute.
    fn attribute(&self, id: LayerId, namespace: &str, key: &str) -> Option<String>;
    /// Write one attribute.
    fn set_attribute(&mut self, id: LayerId, namespace: &str, key: &str, value: &str);
    /// Remove one attribute. Removing a missing attribute is a no-op.
    fn delete_attribute(&mut self, id: LayerId, namespace: &str, key: &str);
    /// Current visibility.
    fn is_visible(&self, id: LayerId) -> bool;
    /// Show or hide a layer.
    fn set_visible(&mut self, id: LayerId, visible: bool);
}

#[derive(Clone, Debug, Default)]
struct LayerRecord {
    name: String,
    visible: bool,
    attributes: BTreeMap<(String, String), String>,
}

/// In-memory [`LayerStore`] for tools and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryLayers {
    layers: Vec<LayerRecord>,
}

impl MemoryLayers {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection holding the given (visible, untagged) layer names.
    pub fn with_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut out = Self::new();
        for name in names {
            out.get_or_create(name);
        }
        out
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// `true` when there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn record(&self, id: LayerId) -> Option<&LayerRecord> {
        self.layers.get(usize::try_from(id.0).ok()?)
    }

    fn record_mut(&mut self, id: LayerId) -> Option<&mut LayerRecord> {
        self.layers.get_mut(usize::try_from(id.0).ok()?)
    }
}

impl LayerStore for MemoryLayers {
    fn layer_ids(&self) -> Vec<LayerId> {
        (0..self.layers.len() as u64).map(LayerId).collect()
    }

    fn layer_name(&self, id: LayerId) -> Option<String> {
        self.record(id).map(|r| r.name.clone())
    }

    fn find_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .position(|r| r.name == name)
            .map(|i| LayerId(i as u64))
    }

    fn get_or_create(&mut self, name: &str) -> LayerId {
        if let Some(id) = self.find_by_name(name) {
            return id;
        }
        self.layers.push(LayerRecord {
            name: name.to_owned(),
            visible: true,
            attributes: BTreeMap::new(),
        });
        LayerId((self.layers.len() - 1) as u64)
    }

    fn attribute(&self, id: LayerId, namespace: &str, key: &str) -> Option<String> {
        self.record(id)?
            .attributes
            .get(&(namespace.to_owned(), key.to_owned()))
            .cloned()
    }

    fn set_attribute(&mut self, id: LayerId, namespace: &str, key: &str, value: &str) {
        if let Some(r) = self.record_mut(id) {
            r.attributes
                .insert((namespace.to_owned(), key.to_owned()), value.to_owned());
        }
    }

    fn delete_attribute(&mut self, id: LayerId, namespace: &str, key: &str) {
        if let Some(r) = self.record_mut(id) {
            r.attributes.remove(&(namespace.to_owned(), key.to_owned()));
        }
    }

    fn is_visible(&self, id: LayerId) -> bool {
        self.record(id).is_some_and(|r| r.visible)
    }

    fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(r) = self.record_mut(id) {
            r.visible = visible;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/store.rs"]
mod tests;
