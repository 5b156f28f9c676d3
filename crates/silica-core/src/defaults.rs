//! Centralized default constants for the silica job service.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const HOST: &str = "0.0.0.0";

/// Default bind port.
pub const PORT: u16 = 3300;

/// Maximum accepted request body (8 MiB).
///
/// Configurable via `SILICA_MAX_UPLOAD_SIZE_BYTES`.
pub const MAX_UPLOAD_SIZE_BYTES: usize = 8 * 1024 * 1024;

// =============================================================================
// STORAGE
// =============================================================================

/// Root directory for job shards.
pub const DATA_DIR: &str = "./data";

/// Root directory holding genome indices and the genome index listing.
pub const GENOME_DIR: &str = "./fm";

/// File name of the static genome index listing inside the genome root.
pub const GENOME_INDEX_LISTING: &str = "genomeindexindex.json";

/// Prefix shared by every per-job file name.
pub const JOB_FILE_PREFIX: &str = "silica_";

/// Number of leading job id characters naming the shard directory.
pub const SHARD_PREFIX_LEN: usize = 2;

// =============================================================================
// EXTERNAL TOOL
// =============================================================================

/// Executable name of the external search tool.
pub const TOOL: &str = "silica";

// =============================================================================
// PAGINATION
// =============================================================================

/// Step size for the interactive result view (items per window).
pub const PAGE_STEP: usize = 30;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DATA_DIR: &str = "SILICA_DATA_DIR";
pub const ENV_GENOME_DIR: &str = "SILICA_GENOME_DIR";
pub const ENV_TOOL: &str = "SILICA_TOOL";
pub const ENV_TOOL_ARGS: &str = "SILICA_TOOL_ARGS";
pub const ENV_PRIMER3_CONFIG: &str = "SILICA_PRIMER3_CONFIG";
pub const ENV_OUTPUT_FORMAT: &str = "SILICA_OUTPUT_FORMAT";
pub const ENV_MAX_UPLOAD_SIZE_BYTES: &str = "SILICA_MAX_UPLOAD_SIZE_BYTES";
pub const ENV_PAGE_STEP: &str = "SILICA_PAGE_STEP";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
