//! HTTP handlers for silica-api.

pub mod genome_index;
pub mod health;
pub mod results;
pub mod upload;
