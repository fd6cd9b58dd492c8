// Library root: data model, local preference store, directory source,
// avatar selection, and configuration shared by the app and front ends.

pub mod avatar;
pub mod config;
pub mod db;
pub mod directory;
pub mod player;
pub mod store;
