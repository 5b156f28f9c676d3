//! # silica-jobs
//!
//! Job lifecycle for the silica service:
//! - Sharded on-disk job store
//! - External tool invocation with captured log streams
//! - Artifact retrieval and result merging
//! - The submission pipeline tying them together

pub mod codec;
pub mod invoker;
pub mod pipeline;
pub mod store;

pub use codec::{load, load_results, merge, Artifact};
pub use invoker::{InvocationResult, ToolInvoker};
pub use pipeline::{JobView, Pipeline, Submission};
pub use store::{JobPaths, JobStore};
