pub(crate) mod calendar;
pub(crate) mod error;
