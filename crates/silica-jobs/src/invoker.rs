//! External search tool invocation.
//!
//! The tool is run once per job as a child process. Its standard output and
//! standard error go straight to the job's `.log` and `.err` files; the
//! error stream is read back after exit to classify the outcome.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tracing::{debug, info, warn};

use silica_core::{
    ArtifactKind, Error, ExecutionFailure, ParameterRecord, Result, ToolConfig,
};

use crate::store::JobPaths;

/// What a finished invocation left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Process exit code; -1 when terminated by a signal.
    pub exit_code: i32,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
    /// Error stream content as written by the tool.
    pub stderr: String,
}

impl InvocationResult {
    /// Success requires exit 0 and a blank error stream.
    pub fn outcome(&self) -> std::result::Result<(), ExecutionFailure> {
        let exit_code = (self.exit_code != 0).then_some(self.exit_code);
        let diagnostics = (!self.stderr.trim().is_empty()).then(|| self.stderr.clone());
        if exit_code.is_none() && diagnostics.is_none() {
            Ok(())
        } else {
            Err(ExecutionFailure {
                exit_code,
                diagnostics,
            })
        }
    }
}

/// Runs the configured tool against one job's files.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    config: ToolConfig,
}

impl ToolInvoker {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Argument vector for one run. Built only from typed values.
    pub fn build_args(&self, record: &ParameterRecord, paths: &JobPaths) -> Vec<OsString> {
        let encoding = self.config.output_encoding;
        let mut args: Vec<OsString> = self.config.prefix_args.iter().map(OsString::from).collect();

        if let Some(ref dir) = self.config.primer3_config {
            args.push("-i".into());
            args.push(dir.into());
        }
        args.push("-g".into());
        args.push(record.genome.clone().into());
        args.push("-o".into());
        args.push(paths.artifact(ArtifactKind::Amplicon, encoding).into());
        args.push("-p".into());
        args.push(paths.artifact(ArtifactKind::Primer, encoding).into());
        args.push("--format".into());
        args.push(encoding.extension().into());

        let numeric: [(&str, String); 12] = [
            ("--maxProdSize", record.max_product_size.to_string()),
            ("--cutTemp", record.melting_temp_cutoff.to_string()),
            ("--kmer", record.seed_length.to_string()),
            ("--distance", record.max_mismatches.to_string()),
            ("--cutoffPenalty", record.cutoff_penalty.to_string()),
            ("--penaltyTmDiff", record.penalty_tm_diff.to_string()),
            ("--penaltyTmMismatch", record.penalty_tm_mismatch.to_string()),
            ("--penaltyLength", record.penalty_length.to_string()),
            ("--monovalent", record.monovalent_conc.to_string()),
            ("--divalent", record.divalent_conc.to_string()),
            ("--dna", record.oligo_conc.to_string()),
            ("--dntp", record.dntp_conc.to_string()),
        ];
        for (flag, value) in numeric {
            args.push(flag.into());
            args.push(value.into());
        }

        args.push(paths.input.clone().into());
        args
    }

    /// Run the tool to completion. No timeout and no retry.
    ///
    /// Launch failures return [`Error::Launch`]; a tool that ran but failed
    /// still yields an [`InvocationResult`] for the caller to classify.
    pub async fn run(&self, record: &ParameterRecord, paths: &JobPaths) -> Result<InvocationResult> {
        let args = self.build_args(record, paths);
        let program = &self.config.program;
        let job_id = paths.job_id;

        let stdout = tokio::fs::File::create(&paths.log).await?.into_std().await;
        let stderr = tokio::fs::File::create(&paths.error_log).await?.into_std().await;

        debug!(%job_id, program = %program.display(), arg_count = args.len(), "invoker: launching tool");
        let start = Instant::now();

        let status = {
            let mut cmd = Command::new(program);
            cmd.args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::from(stdout))
                .stderr(Stdio::from(stderr));
            cmd.status()
                .await
                .map_err(|e| launch_error(program, e))?
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = status.code().unwrap_or(-1);
        let stderr_text = read_diagnostics(&paths.error_log).await?;

        if exit_code == 0 {
            info!(%job_id, exit_code, duration_ms, "invoker: tool finished");
        } else {
            warn!(%job_id, exit_code, duration_ms, "invoker: tool exited non-zero");
        }

        Ok(InvocationResult {
            exit_code,
            stdout_log: paths.log.clone(),
            stderr_log: paths.error_log.clone(),
            stderr: stderr_text,
        })
    }
}

/// Error stream content after exit. An unreadable stream is an I/O error,
/// never a blank one.
async fn read_diagnostics(path: &Path) -> Result<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invoker: error stream read-back failed");
            Err(e.into())
        }
    }
}

fn launch_error(program: &Path, e: std::io::Error) -> Error {
    warn!(program = %program.display(), error = %e, "invoker: launch failed");
    match e.kind() {
        std::io::ErrorKind::NotFound => {
            Error::Launch(format!("Binary {} not found!", program.display()))
        }
        std::io::ErrorKind::PermissionDenied => {
            Error::Launch(format!("Binary {} is not executable!", program.display()))
        }
        _ => Error::Launch(format!("Failed to launch {}: {}", program.display(), e)),
    }
}
