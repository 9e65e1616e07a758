//! Repository implementations for the Images domain

pub mod images;

pub use images::{ImageRepository, SCHEMA_VERSION};
