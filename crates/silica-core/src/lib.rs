//! # silica-core
//!
//! Core types for the silica job service: the error type, run-parameter
//! validation, compound result identifiers, result records and the
//! stateless paginator.
//!
//! Nothing in this crate touches the network or spawns processes; the job
//! store and tool invoker live in `silica-jobs`.

pub mod config;
pub mod defaults;
pub mod error;
pub mod identifier;
pub mod models;
pub mod pagination;
pub mod params;

// Re-export commonly used types at crate root
pub use config::{SilicaConfig, ToolConfig};
pub use error::{Error, ExecutionFailure, Result};
pub use identifier::CompoundId;
pub use models::*;
pub use pagination::{window, Focus, Page, ResultView, ViewRequest, Window};
pub use params::{
    resolve_genome, sanitize_float, sanitize_int, validate, ParameterRecord, SubmissionForm,
    Validation,
};
