pub(crate) mod time_window;
