pub mod catalog;
pub mod models;

pub use catalog::{PresetCatalog, PresetError};
pub use models::{Preset, PresetSource};
