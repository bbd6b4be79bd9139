//! Load/save facade, atomic writer, and validation reporter for Bannerlord
//! `.sav` files.
//!
//! [`SaveEngine`] ties `save-codec`'s frame/segment layer and
//! `save-model`'s object graph together: decode on load, validate, and
//! atomically write on save, optionally snapshotting through `save-backup`
//! first.

mod atomic_writer;
mod cancellation;
mod config;
mod engine;
mod error;
mod validation;

pub use atomic_writer::write_atomic;
pub use cancellation::CancellationToken;
pub use config::{LoadOptions, SaveEngineConfig, SaveOptions};
pub use engine::SaveEngine;
pub use error::{Error, Result};
pub use validation::{validate, Finding, Severity, ValidationReport};
