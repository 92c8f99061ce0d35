//! UI layer: the app shell and the four views (list, builder, viewer,
//! responses) plus modal dialogs.

pub mod app;

pub use app::{AppPaths, FormsApp};
