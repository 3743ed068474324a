//! Work-item data model.

pub mod item;

pub use item::{ItemType, ParseEnumError, Schedule, Status, WorkItem};
