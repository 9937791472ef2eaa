use crate::foundation::error::LitResult;
use crate::interchange::json::{TimeLayersMap, collect_named, import_map};
use crate::layer::store::{LayerId, LayerStore};
use crate::layer::tagged::ATTRIBUTE_NAMESPACE;
use crate::session::Session;

/// Definition attribute holding the component's own layer name.
pub const COMPONENT_LAYER_KEY: &str = "layer";
/// Definition attribute holding the compact time-layers JSON.
pub const COMPONENT_TIME_LAYERS_KEY: &str = "timeLayers";

/// Opaque key for a host component definition.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct DefinitionId(pub u64);

/// Attribute access on host component definitions.
pub trait DefinitionStore {
    /// Read one attribute.
    fn attribute(&self, def: DefinitionId, namespace: &str, key: &str) -> Option<String>;
    /// Write one attribute.
    fn set_attribute(&mut self, def: DefinitionId, namespace: &str, key: &str, value: &str);
    /// Remove one attribute.
    fn delete_attribute(&mut self, def: DefinitionId, namespace: &str, key: &str);
}

/// Time layers travelling with a saved component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentBundle {
    /// Layer the component instance itself sits on.
    pub layer: Option<String>,
    /// Time data of the component's layer and its sub-components' layers.
    pub time_layers: TimeLayersMap,
}

/// What happened when a component was placed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// The definition carries no time data.
    NoBundle,
    /// The bundle was already offered in this document.
    AlreadySeen,
    /// The user declined the import.
    Declined,
    /// Time layers were imported.
    Imported {
        /// Layer the placed instance should be moved to.
        layer: Option<LayerId>,
        /// Number of imported entries.
        count: usize,
    },
}

impl ComponentBundle {
    /// Bundle for a component on `component_layer` whose sub-components sit on `sub_layers`.
    ///
    /// `None` when none of those layers is time-tagged.
    pub fn collect<'a, S: LayerStore + ?Sized>(
        store: &S,
        component_layer: &'a str,
        sub_layers: impl IntoIterator<Item = &'a str>,
    ) -> Option<Self> {
        let time_layers = collect_named(store, std::iter::once(component_layer).chain(sub_layers));
        (!time_layers.is_empty()).then(|| Self {
            layer: Some(component_layer.to_owned()),
            time_layers,
        })
    }

    /// Read the bundle stored on `def`, if any.
    pub fn read<D: DefinitionStore + ?Sized>(defs: &D, def: DefinitionId) -> LitResult<Option<Self>> {
        let Some(json) = defs.attribute(def, ATTRIBUTE_NAMESPACE, COMPONENT_TIME_LAYERS_KEY) else {
            return Ok(None);
        };
        Ok(Some(Self {
            layer: defs.attribute(def, ATTRIBUTE_NAMESPACE, COMPONENT_LAYER_KEY),
            time_layers: serde_json::from_str(&json)?,
        }))
    }

    /// Store the bundle on `def` before the host saves it.
    pub fn attach<D: DefinitionStore + ?Sized>(&self, defs: &mut D, def: DefinitionId) -> LitResult<()> {
        let json = serde_json::to_string(&self.time_layers)?;
        if let Some(layer) = &self.layer {
            defs.set_attribute(def, ATTRIBUTE_NAMESPACE, COMPONENT_LAYER_KEY, layer);
        }
        defs.set_attribute(def, ATTRIBUTE_NAMESPACE, COMPONENT_TIME_LAYERS_KEY, &json);
        Ok(())
    }

    /// Remove bundle attributes from `def` once the host has saved it.
    pub fn detach<D: DefinitionStore + ?Sized>(defs: &mut D, def: DefinitionId) {
        defs.delete_attribute(def, ATTRIBUTE_NAMESPACE, COMPONENT_LAYER_KEY);
        defs.delete_attribute(def, ATTRIBUTE_NAMESPACE, COMPONENT_TIME_LAYERS_KEY);
    }
}

/// Offer the bundle of a newly placed component once per definition and document.
///
/// `confirm` is only asked for bundles not seen before. A declined bundle is not offered again.
#[tracing::instrument(skip(session, defs, store, confirm))]
pub fn consume_on_place<D, S>(
    session: &mut Session,
    defs: &D,
    def: DefinitionId,
    store: &mut S,
    confirm: impl FnOnce(&ComponentBundle) -> bool,
) -> LitResult<PlaceOutcome>
where
    D: DefinitionStore + ?Sized,
    S: LayerStore + ?Sized,
{
    let Some(bundle) = ComponentBundle::read(defs, def)? else {
        return Ok(PlaceOutcome::NoBundle);
    };
    if !session.mark_definition_seen(def) {
        return Ok(PlaceOutcome::AlreadySeen);
    }
    if !confirm(&bundle) {
        return Ok(PlaceOutcome::Declined);
    }

    let layer = bundle.layer.as_deref().map(|name| store.get_or_create(name));
    let count = import_map(store, &bundle.time_layers);
    tracing::info!(count, "imported component time layers");
    Ok(PlaceOutcome::Imported { layer, count })
}

#[cfg(test)]
#[path = "../../tests/unit/interchange/component.rs"]
mod tests;
