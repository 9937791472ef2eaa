use super::*;
use crate::layer::store::MemoryLayers;
use chrono::NaiveDate;

fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn sample_store() -> MemoryLayers {
    let mut store = MemoryLayers::with_names(["Layer0", "Summer", "Night", "Hidden"]);
    for (name, dates, hours) in [
        ("Summer", "06/01 - 08/31", ""),
        ("Night", "", "20:00 - 06:00"),
    ] {
        let id = store.find_by_name(name).unwrap();
        let mut layer = TaggedLayer::load(&store, id);
        layer.set_dates(&mut store, dates);
        layer.set_hours(&mut store, hours);
    }
    let hidden = store.find_by_name("Hidden").unwrap();
    store.set_visible(hidden, false);
    store
}

#[test]
fn updates_only_time_layers() {
    let mut store = sample_store();
    let updated = VisibilityEngine::update_all(&mut store, at(1, 15, 12));
    assert_eq!(updated, 2);

    let vis = |name: &str| store.is_visible(store.find_by_name(name).unwrap());
    assert!(vis("Layer0"));
    assert!(!vis("Hidden"));
    assert!(!vis("Summer"));
    assert!(!vis("Night"));
}

#[test]
fn follows_the_clock() {
    let mut store = sample_store();
    VisibilityEngine::update_all(&mut store, at(7, 4, 22));
    let vis = |name: &str| store.is_visible(store.find_by_name(name).unwrap());
    assert!(vis("Summer"));
    assert!(vis("Night"));
}

#[test]
fn counts_time_layers() {
    let store = sample_store();
    assert_eq!(VisibilityEngine::count_in_store(&store), 2);
    assert_eq!(VisibilityEngine::count_in_store(&MemoryLayers::new()), 0);
}

#[test]
fn decide_skips_untagged_layers() {
    let store = sample_store();
    let layers = TaggedLayer::load_all(&store);
    let decisions = VisibilityEngine::decide(&layers, at(7, 4, 12));
    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions[0], (store.find_by_name("Summer").unwrap(), true));
    assert_eq!(decisions[1], (store.find_by_name("Night").unwrap(), false));
}
