//! Sharded on-disk job store.
//!
//! Every job owns a fixed set of files inside a shard directory named after
//! the first characters of its id:
//!
//! ```text
//! {root}/{id[0..2]}/silica_{id}_input.fa
//! {root}/{id[0..2]}/silica_{id}_parameter.txt
//! {root}/{id[0..2]}/silica_{id}.log
//! {root}/{id[0..2]}/silica_{id}.err
//! {root}/{id[0..2]}/silica_{id}_{primer|amplicon}.{json|csv}
//! ```
//!
//! Path derivation is pure; only the async helpers touch the filesystem.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use silica_core::defaults::JOB_FILE_PREFIX;
use silica_core::{ArtifactKind, Encoding, JobId, Result};

/// Every file path belonging to one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub job_id: JobId,
    pub shard: PathBuf,
    /// Submitted primer sequences.
    pub input: PathBuf,
    /// Sanitized `key=value` parameter log.
    pub parameters: PathBuf,
    /// Tool standard output.
    pub log: PathBuf,
    /// Tool standard error.
    pub error_log: PathBuf,
}

impl JobPaths {
    fn new(shard: PathBuf, job_id: JobId) -> Self {
        let stem = format!("{}{}", JOB_FILE_PREFIX, job_id);
        Self {
            job_id,
            input: shard.join(format!("{}_input.fa", stem)),
            parameters: shard.join(format!("{}_parameter.txt", stem)),
            log: shard.join(format!("{}.log", stem)),
            error_log: shard.join(format!("{}.err", stem)),
            shard,
        }
    }

    /// Output artifact path for a kind and encoding.
    pub fn artifact(&self, kind: ArtifactKind, encoding: Encoding) -> PathBuf {
        self.shard.join(format!(
            "{}{}_{}.{}",
            JOB_FILE_PREFIX,
            self.job_id,
            kind.as_str(),
            encoding.extension()
        ))
    }
}

/// Filesystem-backed job store rooted at the configured data directory.
#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shard directory of a job. Does not touch the filesystem.
    pub fn shard_path_for(&self, job_id: &JobId) -> PathBuf {
        self.root.join(job_id.shard())
    }

    /// All file paths of a job. Does not touch the filesystem.
    pub fn paths_for(&self, job_id: &JobId) -> JobPaths {
        JobPaths::new(self.shard_path_for(job_id), *job_id)
    }

    /// Mint a fresh job id and make sure its shard directory exists.
    pub async fn create_job(&self) -> Result<JobId> {
        let job_id = JobId::new_random();
        let shard = self.shard_path_for(&job_id);
        fs::create_dir_all(&shard).await.map_err(|e| {
            warn!(%job_id, shard = %shard.display(), error = %e, "job_store: create_dir_all failed");
            e
        })?;
        debug!(%job_id, shard = %shard.display(), "job_store: created job");
        Ok(job_id)
    }

    /// Persist the submitted sequences.
    pub async fn write_input(&self, paths: &JobPaths, sequences: &str) -> Result<()> {
        write_closed(&paths.input, sequences.as_bytes()).await
    }

    /// Persist the parameter log.
    pub async fn write_parameters(&self, paths: &JobPaths, lines: &str) -> Result<()> {
        write_closed(&paths.parameters, lines.as_bytes()).await
    }

    /// Whether the tool was run for this job.
    ///
    /// Jobs rejected before invocation leave input and parameter files but
    /// never an error log.
    pub async fn job_exists(&self, job_id: &JobId) -> Result<bool> {
        let paths = self.paths_for(job_id);
        Ok(fs::try_exists(&paths.error_log).await?)
    }

    /// Raw bytes of an artifact, `None` if the shard or file is absent.
    pub async fn read_artifact(
        &self,
        job_id: &JobId,
        kind: ArtifactKind,
        encoding: Encoding,
    ) -> Result<Option<Vec<u8>>> {
        let path = self.paths_for(job_id).artifact(kind, encoding);
        read_optional(&path).await
    }

    /// Content of the tool's error stream, `None` if it was never written.
    pub async fn read_error_log(&self, job_id: &JobId) -> Result<Option<String>> {
        let path = self.paths_for(job_id).error_log;
        Ok(read_optional(&path)
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Write, flush and close before returning.
async fn write_closed(path: &Path, data: &[u8]) -> Result<()> {
    debug!(path = %path.display(), size = data.len(), "job_store: write");
    let mut file = fs::File::create(path).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "job_store: File::create failed");
        e
    })?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);
    Ok(())
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "job_store: read failed");
            Err(e.into())
        }
    }
}
