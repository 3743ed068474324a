//! docket-core library.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for configuration loading and typed
//!   `thiserror` enums at storage boundaries.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;
pub mod storage;

pub use model::{ItemType, Schedule, Status, WorkItem};
pub use storage::{ItemStore, MarkdownStore, StoreError};
