//! Domain types shared by the job store, the codec and the API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// =============================================================================
// JOB IDENTITY
// =============================================================================

/// Identifier of one submission.
///
/// Random 128-bit value, always rendered as the hyphenated lowercase form
/// (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Mint a fresh random job id.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Name of the shard directory holding this job's files.
    pub fn shard(&self) -> String {
        self.to_string()[..crate::defaults::SHARD_PREFIX_LEN].to_string()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

// =============================================================================
// ARTIFACTS
// =============================================================================

/// Which result list an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Primer,
    Amplicon,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Primer, ArtifactKind::Amplicon];

    /// Single-letter flag used in compound identifiers.
    pub fn flag(&self) -> char {
        match self {
            ArtifactKind::Primer => 'p',
            ArtifactKind::Amplicon => 'a',
        }
    }

    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'p' => Some(ArtifactKind::Primer),
            'a' => Some(ArtifactKind::Amplicon),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Primer => "primer",
            ArtifactKind::Amplicon => "amplicon",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk representation of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// JSON array of records.
    #[default]
    #[serde(rename = "json")]
    Structured,
    /// CSV with a header row.
    #[serde(rename = "csv")]
    Tabular,
}

impl Encoding {
    /// Single-letter flag used in compound identifiers.
    pub fn flag(&self) -> char {
        match self {
            Encoding::Structured => 'j',
            Encoding::Tabular => 'c',
        }
    }

    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'j' => Some(Encoding::Structured),
            'c' => Some(Encoding::Tabular),
            _ => None,
        }
    }

    /// File extension, also the value passed to the tool's `--format` flag.
    pub fn extension(&self) -> &'static str {
        match self {
            Encoding::Structured => "json",
            Encoding::Tabular => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Encoding::Structured => "application/json",
            Encoding::Tabular => "text/csv",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" | "structured" => Ok(Encoding::Structured),
            "csv" | "tabular" => Ok(Encoding::Tabular),
            other => Err(Error::Config(format!("unknown output format '{}'", other))),
        }
    }
}

// =============================================================================
// RESULT RECORDS
// =============================================================================

/// Strand a primer binds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Forward,
    Reverse,
}

/// One primer binding site reported by the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Primer {
    pub id: u64,
    /// Melting temperature in °C.
    pub tm: f64,
    pub chrom: String,
    pub pos: u64,
    pub ori: Orientation,
    pub name: String,
    pub seq: String,
    /// Genome sequence context around the binding site.
    pub genome: String,
}

/// One predicted PCR product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Amplicon {
    pub id: u64,
    pub length: u64,
    pub penalty: f64,
    pub chrom: String,
    pub for_pos: u64,
    pub for_tm: f64,
    pub for_name: String,
    pub for_seq: String,
    pub rev_pos: u64,
    pub rev_tm: f64,
    pub rev_name: String,
    pub rev_seq: String,
    pub seq: String,
}

// =============================================================================
// RESPONSE PAYLOADS
// =============================================================================

/// One user-visible error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub title: String,
}

impl ErrorEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Error-only response body (`{"errors": [...]}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorEntry>,
}

impl ErrorResponse {
    pub fn single(title: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorEntry::new(title)],
        }
    }
}

/// Both result lists of one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    pub primer: Vec<Primer>,
    pub amplicon: Vec<Amplicon>,
}

/// Combined payload returned for a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub uuid: JobId,
    pub data: ResultData,
    pub errors: Vec<ErrorEntry>,
}

impl CombinedResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
