use chrono::NaiveDateTime;

use crate::layer::store::{LayerId, LayerStore};
use crate::layer::tagged::TaggedLayer;

/// Applies time windows to host layer visibility.
///
/// Layers without a window are never touched, so ordinary layers keep whatever visibility the
/// user gave them.
pub struct VisibilityEngine;

impl VisibilityEngine {
    /// Visibility of every time-tagged layer at `instant`, in input order.
    pub fn decide(layers: &[TaggedLayer], instant: NaiveDateTime) -> Vec<(LayerId, bool)> {
        layers
            .iter()
            .filter(|l| l.is_time_layer())
            .map(|l| (l.id(), l.matches(instant)))
            .collect()
    }

    /// Show or hide every time-tagged layer of `store` for `instant`.
    ///
    /// Returns how many layers were updated.
    #[tracing::instrument(level = "debug", skip(store))]
    pub fn update_all<S: LayerStore + ?Sized>(store: &mut S, instant: NaiveDateTime) -> usize {
        let layers = TaggedLayer::load_all(&*store);
        Self::apply(store, &layers, instant)
    }

    /// Like [`Self::update_all`] with layers already loaded.
    pub fn apply<S: LayerStore + ?Sized>(
        store: &mut S,
        layers: &[TaggedLayer],
        instant: NaiveDateTime,
    ) -> usize {
        let decisions = Self::decide(layers, instant);
        for &(id, visible) in &decisions {
            store.set_visible(id, visible);
        }
        decisions.len()
    }

    /// Number of layers carrying at least one window.
    pub fn count_time_layers(layers: &[TaggedLayer]) -> usize {
        layers.iter().filter(|l| l.is_time_layer()).count()
    }

    /// [`Self::count_time_layers`] over a whole store.
    pub fn count_in_store<S: LayerStore + ?Sized>(store: &S) -> usize {
        Self::count_time_layers(&TaggedLayer::load_all(store))
    }
}

#[cfg(test)]
#[path = "../tests/unit/visibility.rs"]
mod tests;
