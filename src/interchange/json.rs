use std::collections::BTreeMap;

use crate::foundation::error::LitResult;
use crate::layer::store::LayerStore;
use crate::layer::tagged::TaggedLayer;

/// Time data of one layer in interchange form.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerTimeData {
    /// `MM/DD - MM/DD`, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<String>,
    /// `HH:MM - HH:MM`, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
}

impl LayerTimeData {
    /// Interchange form of a loaded layer.
    pub fn of(layer: &TaggedLayer) -> Self {
        Self {
            dates: layer.is_dates_layer().then(|| layer.dates().to_string()),
            hours: layer.is_hours_layer().then(|| layer.hours().to_string()),
        }
    }
}

/// Layer name to time data.
pub type TimeLayersMap = BTreeMap<String, LayerTimeData>;

/// Every time-tagged layer of `store`, by name.
pub fn collect_time_layers<S: LayerStore + ?Sized>(store: &S) -> TimeLayersMap {
    TaggedLayer::load_all(store)
        .iter()
        .filter(|l| l.is_time_layer())
        .filter_map(|l| Some((store.layer_name(l.id())?, LayerTimeData::of(l))))
        .collect()
}

/// Time-tagged layers among `names`, skipping unknown names.
pub fn collect_named<'a, S: LayerStore + ?Sized>(
    store: &S,
    names: impl IntoIterator<Item = &'a str>,
) -> TimeLayersMap {
    names
        .into_iter()
        .filter_map(|name| {
            let layer = TaggedLayer::load(store, store.find_by_name(name)?);
            layer
                .is_time_layer()
                .then(|| (name.to_owned(), LayerTimeData::of(&layer)))
        })
        .collect()
}

/// Serialize the time-tagged layers of `store`.
pub fn export_json<S: LayerStore + ?Sized>(store: &S, pretty: bool) -> LitResult<String> {
    let map = collect_time_layers(store);
    Ok(if pretty {
        serde_json::to_string_pretty(&map)?
    } else {
        serde_json::to_string(&map)?
    })
}

/// Apply `map` to `store`, creating missing layers.
///
/// Each entry sets both windows: a key that is absent or does not parse unsets that window.
/// Returns the number of entries.
pub fn import_map<S: LayerStore + ?Sized>(store: &mut S, map: &TimeLayersMap) -> usize {
    for (name, data) in map {
        let id = store.get_or_create(name);
        let mut layer = TaggedLayer::load(&*store, id);
        layer.set_dates(store, data.dates.as_deref().unwrap_or(""));
        layer.set_hours(store, data.hours.as_deref().unwrap_or(""));
    }
    map.len()
}

/// Parse and apply interchange JSON. Returns the number of entries.
#[tracing::instrument(skip_all, fields(bytes = json.len()))]
pub fn import_json<S: LayerStore + ?Sized>(store: &mut S, json: &str) -> LitResult<usize> {
    let map: TimeLayersMap = serde_json::from_str(json)?;
    let n = import_map(store, &map);
    tracing::info!(entries = n, "imported time layers");
    Ok(n)
}

#[cfg(test)]
#[path = "../../tests/unit/interchange/json.rs"]
mod tests;
