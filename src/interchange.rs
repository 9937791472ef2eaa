/// Time bundles carried by component definitions.
pub(crate) mod component;
/// JSON import/export of time layers.
pub(crate) mod json;
