//! Compound result identifiers.
//!
//! A compound identifier addresses one artifact of one job:
//!
//! ```text
//! <job id>[-<kind><encoding>]
//!
//! kind      a = amplicon, p = primer      (default p)
//! encoding  c = tabular,  j = structured  (default j)
//! ```
//!
//! Either flag may be omitted, but a `-` must be followed by at least one
//! flag. Anything else is rejected as a whole before the filesystem is
//! touched.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{ArtifactKind, Encoding, JobId};

static COMPOUND_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})(?:-(?:([ap])([cj])?|([cj])))?$",
    )
    .expect("compound identifier pattern is valid")
});

/// A decoded compound result identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompoundId {
    pub job_id: JobId,
    pub kind: ArtifactKind,
    pub encoding: Encoding,
}

impl CompoundId {
    pub fn new(job_id: JobId, kind: ArtifactKind, encoding: Encoding) -> Self {
        Self {
            job_id,
            kind,
            encoding,
        }
    }

    /// Decode a raw identifier, applying the flag defaults.
    pub fn parse(raw: &str) -> Result<Self> {
        let caps = COMPOUND_ID_RE
            .captures(raw)
            .ok_or_else(|| Error::MalformedIdentifier(raw.to_string()))?;

        let uuid = Uuid::parse_str(&caps[1])
            .map_err(|_| Error::MalformedIdentifier(raw.to_string()))?;

        let kind = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .and_then(ArtifactKind::from_flag)
            .unwrap_or(ArtifactKind::Primer);

        let encoding = caps
            .get(3)
            .or_else(|| caps.get(4))
            .and_then(|m| m.as_str().chars().next())
            .and_then(Encoding::from_flag)
            .unwrap_or_default();

        Ok(Self::new(JobId::from_uuid(uuid), kind, encoding))
    }

    /// Parse a bare job id (no flags allowed).
    pub fn parse_job_id(raw: &str) -> Result<JobId> {
        let id = Self::parse(raw)?;
        if raw.len() != 36 {
            return Err(Error::MalformedIdentifier(raw.to_string()));
        }
        Ok(id.job_id)
    }
}

/// Canonical form: both flags always written.
impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}{}",
            self.job_id,
            self.kind.flag(),
            self.encoding.flag()
        )
    }
}
