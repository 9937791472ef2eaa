use super::*;
use crate::layer::store::MemoryLayers;

fn tagged_store() -> MemoryLayers {
    let mut store = MemoryLayers::with_names(["Layer0", "Snow", "Lamps"]);
    let snow = store.find_by_name("Snow").unwrap();
    TaggedLayer::load(&store, snow).set_dates(&mut store, "12/01 - 02/28");
    let lamps = store.find_by_name("Lamps").unwrap();
    TaggedLayer::load(&store, lamps).set_hours(&mut store, "18:30 - 06:15");
    store
}

#[test]
fn export_lists_only_time_layers() {
    let json = export_json(&tagged_store(), false).unwrap();
    assert_eq!(
        json,
        r#"{"Lamps":{"hours":"18:30 - 06:15"},"Snow":{"dates":"12/01 - 02/28"}}"#
    );
}

#[test]
fn pretty_export_is_indented() {
    let json = export_json(&tagged_store(), true).unwrap();
    assert!(json.contains("\n  \"Lamps\": {"));
}

#[test]
fn import_creates_layers_and_clears_missing_keys() {
    let mut store = tagged_store();
    let n = import_json(
        &mut store,
        r#"{"Snow":{"hours":"05:00 - 07:00"},"New":{"dates":"07/01 - 07/31"}}"#,
    )
    .unwrap();
    assert_eq!(n, 2);

    let snow = TaggedLayer::load(&store, store.find_by_name("Snow").unwrap());
    assert!(!snow.is_dates_layer());
    assert_eq!(snow.hours().to_string(), "05:00 - 07:00");

    let new = TaggedLayer::load(&store, store.find_by_name("New").unwrap());
    assert_eq!(new.dates().to_string(), "07/01 - 07/31");
    assert_eq!(store.len(), 4);
}

#[test]
fn invalid_windows_import_as_unset() {
    let mut store = MemoryLayers::new();
    import_json(&mut store, r#"{"Odd":{"dates":"02/30 - 03/01"}}"#).unwrap();
    let odd = TaggedLayer::load(&store, store.find_by_name("Odd").unwrap());
    assert!(!odd.is_time_layer());
    assert_eq!(export_json(&store, false).unwrap(), "{}");
}

#[test]
fn malformed_json_is_a_serde_error() {
    let mut store = MemoryLayers::new();
    let err = import_json(&mut store, "[1, 2").unwrap_err();
    assert!(matches!(err, crate::LitError::Serde(_)));
    assert!(store.is_empty());
}

#[test]
fn collect_named_skips_unknown_and_untagged() {
    let store = tagged_store();
    let map = collect_named(&store, ["Snow", "Layer0", "Missing"]);
    assert_eq!(map.len(), 1);
    assert!(map.contains_key("Snow"));
}
