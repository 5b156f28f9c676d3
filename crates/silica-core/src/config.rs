//! Service configuration.
//!
//! Built once at startup and shared read-only with every component.

use std::path::PathBuf;

use tracing::warn;

use crate::defaults;
use crate::models::Encoding;

/// How to launch the external search tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Executable (name on `PATH` or absolute path).
    pub program: PathBuf,
    /// Arguments placed before the generated ones (e.g. a `search`
    /// subcommand).
    pub prefix_args: Vec<String>,
    /// Primer3 thermodynamic parameter directory passed with `-i`.
    pub primer3_config: Option<PathBuf>,
    /// Encoding the tool is asked to write.
    pub output_encoding: Encoding,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(defaults::TOOL),
            prefix_args: Vec::new(),
            primer3_config: None,
            output_encoding: Encoding::Structured,
        }
    }
}

/// Immutable service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilicaConfig {
    pub host: String,
    pub port: u16,
    /// Root of the sharded job directories.
    pub data_dir: PathBuf,
    /// Directory holding genome indices and the index listing.
    pub genome_dir: PathBuf,
    pub tool: ToolConfig,
    pub max_upload_bytes: usize,
    /// Default window size of the interactive view.
    pub page_step: usize,
    /// CORS origins; empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for SilicaConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            data_dir: PathBuf::from(defaults::DATA_DIR),
            genome_dir: PathBuf::from(defaults::GENOME_DIR),
            tool: ToolConfig::default(),
            max_upload_bytes: defaults::MAX_UPLOAD_SIZE_BYTES,
            page_step: defaults::PAGE_STEP,
            allowed_origins: Vec::new(),
        }
    }
}

impl SilicaConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `HOST` | `0.0.0.0` | Bind host |
    /// | `PORT` | `3300` | Bind port |
    /// | `SILICA_DATA_DIR` | `./data` | Job shard root |
    /// | `SILICA_GENOME_DIR` | `./fm` | Genome index root |
    /// | `SILICA_TOOL` | `silica` | External tool executable |
    /// | `SILICA_TOOL_ARGS` | (none) | Whitespace-separated prefix arguments |
    /// | `SILICA_PRIMER3_CONFIG` | (none) | Primer3 config directory |
    /// | `SILICA_OUTPUT_FORMAT` | `json` | `json` or `csv` |
    /// | `SILICA_MAX_UPLOAD_SIZE_BYTES` | `8388608` | Request body limit |
    /// | `SILICA_PAGE_STEP` | `30` | Interactive view window size |
    /// | `ALLOWED_ORIGINS` | (any) | Comma-separated CORS origins |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(&lookup, defaults::ENV_PORT, base.port);
        let max_upload_bytes =
            parse_or(&lookup, defaults::ENV_MAX_UPLOAD_SIZE_BYTES, base.max_upload_bytes);
        let page_step = parse_or(&lookup, defaults::ENV_PAGE_STEP, base.page_step).max(1);

        let output_encoding = match non_empty(defaults::ENV_OUTPUT_FORMAT) {
            Some(v) => v.parse().unwrap_or_else(|e| {
                warn!(variable = defaults::ENV_OUTPUT_FORMAT, error = %e, "Falling back to json output");
                Encoding::Structured
            }),
            None => base.tool.output_encoding,
        };

        let tool = ToolConfig {
            program: non_empty(defaults::ENV_TOOL)
                .map(PathBuf::from)
                .unwrap_or(base.tool.program),
            prefix_args: non_empty(defaults::ENV_TOOL_ARGS)
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            primer3_config: non_empty(defaults::ENV_PRIMER3_CONFIG).map(PathBuf::from),
            output_encoding,
        };

        let allowed_origins = non_empty(defaults::ENV_ALLOWED_ORIGINS)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty() && *s != "*")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: non_empty(defaults::ENV_HOST).unwrap_or(base.host),
            port,
            data_dir: non_empty(defaults::ENV_DATA_DIR)
                .map(PathBuf::from)
                .unwrap_or(base.data_dir),
            genome_dir: non_empty(defaults::ENV_GENOME_DIR)
                .map(PathBuf::from)
                .unwrap_or(base.genome_dir),
            tool,
            max_upload_bytes,
            page_step,
            allowed_origins,
        }
    }

    /// Path of the static genome index listing.
    pub fn genome_listing_path(&self) -> PathBuf {
        self.genome_dir.join(defaults::GENOME_INDEX_LISTING)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = key, value = %raw, "Invalid value, using default");
            default
        }),
        _ => default,
    }
}
