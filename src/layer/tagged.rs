use chrono::NaiveDateTime;

use crate::layer::store::{LayerId, LayerStore};
use crate::window::time_window::TimeWindow;

/// Attribute namespace holding time data on host layers.
pub const ATTRIBUTE_NAMESPACE: &str = "LayersInTime";
/// Attribute key for the dates window.
pub const DATES_KEY: &str = "dates";
/// Attribute key for the hours window.
pub const HOURS_KEY: &str = "hours";

/// A host layer seen through its two time windows.
///
/// A layer may carry both a dates and an hours window; it is then visible when either matches.
/// Use [`TaggedLayer::assign_dates`]/[`TaggedLayer::assign_hours`] for the one-window-per-layer
/// editing convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaggedLayer {
    id: LayerId,
    dates: TimeWindow,
    hours: TimeWindow,
}

impl TaggedLayer {
    /// Read the stored windows of layer `id`.
    ///
    /// Stored values that no longer parse read back as [`TimeWindow::None`].
    pub fn load<S: LayerStore + ?Sized>(store: &S, id: LayerId) -> Self {
        let read = |key: &str| store.attribute(id, ATTRIBUTE_NAMESPACE, key);
        Self {
            id,
            dates: read(DATES_KEY)
                .map(|raw| TimeWindow::parse_dates(&raw))
                .unwrap_or_default(),
            hours: read(HOURS_KEY)
                .map(|raw| TimeWindow::parse_hours(&raw))
                .unwrap_or_default(),
        }
    }

    /// Load every layer of the store, tagged or not, in host order.
    pub fn load_all<S: LayerStore + ?Sized>(store: &S) -> Vec<Self> {
        store
            .layer_ids()
            .into_iter()
            .map(|id| Self::load(store, id))
            .collect()
    }

    /// Host layer this entry refers to.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Dates window.
    pub fn dates(&self) -> TimeWindow {
        self.dates
    }

    /// Hours window.
    pub fn hours(&self) -> TimeWindow {
        self.hours
    }

    /// Carries a valid dates window.
    pub fn is_dates_layer(&self) -> bool {
        self.dates.as_dates().is_some()
    }

    /// Carries a valid hours window.
    pub fn is_hours_layer(&self) -> bool {
        self.hours.as_hours().is_some()
    }

    /// Carries at least one window.
    pub fn is_time_layer(&self) -> bool {
        self.is_dates_layer() || self.is_hours_layer()
    }

    /// Visibility this layer should have at `instant`.
    pub fn matches(&self, instant: NaiveDateTime) -> bool {
        self.dates.matches(instant) || self.hours.matches(instant)
    }

    /// Store a dates window, or delete the attribute when `raw` does not parse.
    ///
    /// The hours window is left as is.
    pub fn set_dates<S: LayerStore + ?Sized>(&mut self, store: &mut S, raw: &str) {
        self.dates = TimeWindow::parse_dates(raw);
        write_window(store, self.id, DATES_KEY, &self.dates);
    }

    /// Store an hours window, or delete the attribute when `raw` does not parse.
    ///
    /// The dates window is left as is.
    pub fn set_hours<S: LayerStore + ?Sized>(&mut self, store: &mut S, raw: &str) {
        self.hours = TimeWindow::parse_hours(raw);
        write_window(store, self.id, HOURS_KEY, &self.hours);
    }

    /// Like [`Self::set_dates`], and clears the hours window when the dates are valid.
    pub fn assign_dates<S: LayerStore + ?Sized>(&mut self, store: &mut S, raw: &str) {
        self.set_dates(store, raw);
        if self.is_dates_layer() {
            self.set_hours(store, "");
        }
    }

    /// Like [`Self::set_hours`], and clears the dates window when the hours are valid.
    pub fn assign_hours<S: LayerStore + ?Sized>(&mut self, store: &mut S, raw: &str) {
        self.set_hours(store, raw);
        if self.is_hours_layer() {
            self.set_dates(store, "");
        }
    }

    /// Remove both windows.
    pub fn clear<S: LayerStore + ?Sized>(&mut self, store: &mut S) {
        self.set_dates(store, "");
        self.set_hours(store, "");
    }
}

fn write_window<S: LayerStore + ?Sized>(store: &mut S, id: LayerId, key: &str, w: &TimeWindow) {
    if w.is_none() {
        store.delete_attribute(id, ATTRIBUTE_NAMESPACE, key);
    } else {
        store.set_attribute(id, ATTRIBUTE_NAMESPACE, key, &w.to_string());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/tagged.rs"]
mod tests;
