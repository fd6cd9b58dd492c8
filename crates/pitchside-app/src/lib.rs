// Presentation layer: screen presenters, the front-end protocol and the
// event loop that ties them to the preference store and the directory.

pub mod app;
pub mod presenter;
pub mod protocol;
