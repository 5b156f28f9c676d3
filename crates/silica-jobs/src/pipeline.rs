//! Submission pipeline: form → job store → tool → merged results.
//!
//! Each step completes (files flushed and closed) before the next one
//! starts. The submitting request awaits the whole run.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use silica_core::{
    params, CombinedResult, Error, ErrorEntry, ExecutionFailure, JobId, ResultData, ResultView,
    Result, SilicaConfig, SubmissionForm, ViewRequest,
};

use crate::codec;
use crate::invoker::ToolInvoker;
use crate::store::JobStore;

/// Outcome of a submission that reached the tool.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Merged payload, with execution problems already listed in `errors`.
    pub result: CombinedResult,
    pub failure: Option<ExecutionFailure>,
}

impl Submission {
    pub fn job_id(&self) -> JobId {
        self.result.uuid
    }

    /// `Err(Error::Execution)` when the tool did not succeed.
    pub fn check(&self) -> Result<()> {
        match self.failure {
            Some(ref failure) => Err(Error::Execution(failure.clone())),
            None => Ok(()),
        }
    }
}

/// Paginated view of a finished job.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub uuid: JobId,
    #[serde(flatten)]
    pub view: ResultView,
    /// Diagnostics recorded in the job's error log.
    pub errors: Vec<ErrorEntry>,
}

/// Wires the job store and tool invoker together.
#[derive(Debug, Clone)]
pub struct Pipeline {
    store: JobStore,
    invoker: ToolInvoker,
    genome_root: PathBuf,
}

impl Pipeline {
    pub fn new(store: JobStore, invoker: ToolInvoker, genome_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            invoker,
            genome_root: genome_root.into(),
        }
    }

    pub fn from_config(config: &SilicaConfig) -> Self {
        Self::new(
            JobStore::new(&config.data_dir),
            ToolInvoker::new(config.tool.clone()),
            &config.genome_dir,
        )
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn invoker(&self) -> &ToolInvoker {
        &self.invoker
    }

    /// Run one submission end to end.
    ///
    /// Input and validation problems are returned as errors before the
    /// tool is launched. A tool that ran but failed yields a
    /// [`Submission`] carrying the failure.
    pub async fn submit(&self, fields: HashMap<String, String>) -> Result<Submission> {
        let form = SubmissionForm::from_fields(fields)?;
        let job_id = self.store.create_job().await?;
        let paths = self.store.paths_for(&job_id);

        let (sequences, genome) = form.check_inputs(&self.genome_root).map_err(|e| {
            info!(%job_id, error = %e, "pipeline: input rejected");
            e
        })?;
        self.store.write_input(&paths, &sequences).await?;

        let validation = params::validate(&form, &genome);
        self.store
            .write_parameters(&paths, &validation.log_lines())
            .await?;
        let record = validation.outcome.map_err(|e| {
            info!(%job_id, error = %e, "pipeline: parameters rejected");
            e
        })?;

        let invocation = self.invoker.run(&record, &paths).await?;
        let failure = invocation.outcome().err();
        let encoding = self.invoker.config().output_encoding;

        let mut result = match codec::load_results(&self.store, &job_id, encoding).await {
            Ok(result) => result,
            Err(e) if failure.is_some() => {
                warn!(%job_id, error = %e, "pipeline: unreadable artifacts after failed run");
                CombinedResult {
                    uuid: job_id,
                    data: ResultData::default(),
                    errors: Vec::new(),
                }
            }
            Err(e) => return Err(e),
        };

        match failure {
            Some(ref f) => {
                warn!(%job_id, error = %Error::Execution(f.clone()), "pipeline: execution failed");
                result
                    .errors
                    .extend(f.titles().into_iter().map(ErrorEntry::new));
            }
            None => info!(
                %job_id,
                primer_count = result.data.primer.len(),
                amplicon_count = result.data.amplicon.len(),
                "pipeline: submission complete"
            ),
        }

        Ok(Submission { result, failure })
    }

    /// Windowed view over a stored job.
    pub async fn view(&self, job_id: &JobId, request: &ViewRequest, default_step: usize) -> Result<JobView> {
        if !self.store.job_exists(job_id).await? {
            return Err(Error::NotFound(job_id.to_string()));
        }
        let encoding = self.invoker.config().output_encoding;
        let result = codec::load_results(&self.store, job_id, encoding).await?;

        let errors = match self.store.read_error_log(job_id).await? {
            Some(text) if !text.trim().is_empty() => {
                vec![ErrorEntry::new(format!("Error in running silica: {}", text))]
            }
            _ => Vec::new(),
        };

        debug!(%job_id, ?request, "pipeline: building view");
        Ok(JobView {
            uuid: *job_id,
            view: ResultView::build(&result.data, request, default_step),
            errors,
        })
    }
}
