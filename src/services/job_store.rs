use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::analysis::WeaknessAnalysisResult;
use crate::models::job::{AnalysisJob, JobStatus};

/// In-memory job records for the lifetime of the process.
///
/// Each record is written only by the task running its job; readers get a
/// cloned snapshot. Records in a terminal state are never modified again.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, AnalysisJob>>,
}

/// Job counts grouped by lifecycle stage.
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct JobCounts {
    pub queued: usize,
    pub processing: usize,
    pub rate_limited: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new queued job
    pub fn create(&self) -> AnalysisJob {
        let job = AnalysisJob::new();
        self.jobs.write().insert(job.id, job.clone());
        job
    }

    /// Get a job by ID
    pub fn get(&self, job_id: Uuid) -> Result<AnalysisJob, JobStoreError> {
        self.jobs
            .read()
            .get(&job_id)
            .cloned()
            .ok_or(JobStoreError::NotFound(job_id))
    }

    /// Update a non-terminal job status
    pub fn update_status(&self, job_id: Uuid, status: JobStatus) -> Result<(), JobStoreError> {
        if status.is_terminal() {
            return Err(JobStoreError::InvalidTransition { job_id, status });
        }

        self.mutate(job_id, |job| {
            if status == JobStatus::Processing && job.started_at.is_none() {
                job.started_at = Some(job.now_after_submission());
            }
            if let JobStatus::RateLimitedRetry(_) = status {
                job.retry_count += 1;
            }
            job.status = status;
        })
    }

    /// Store the result and mark the job completed
    pub fn complete(&self, job_id: Uuid, result: WeaknessAnalysisResult) -> Result<(), JobStoreError> {
        self.mutate(job_id, |job| {
            job.completed_at = Some(job.now_after_submission());
            job.result = Some(result);
            job.error = None;
            job.status = JobStatus::Completed;
        })
    }

    /// Store the error and mark the job failed
    pub fn fail(&self, job_id: Uuid, error: impl Into<String>) -> Result<(), JobStoreError> {
        let error = error.into();
        self.mutate(job_id, |job| {
            job.failed_at = Some(job.now_after_submission());
            job.error = Some(error);
            job.result = None;
            job.status = JobStatus::Failed;
        })
    }

    pub fn counts(&self) -> JobCounts {
        let jobs = self.jobs.read();
        jobs.values().fold(JobCounts::default(), |mut counts, job| {
            match job.status {
                JobStatus::Queued => counts.queued += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::RateLimitedRetry(_) => counts.rate_limited += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
            counts
        })
    }

    fn mutate(
        &self,
        job_id: Uuid,
        apply: impl FnOnce(&mut AnalysisJob),
    ) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&job_id).ok_or(JobStoreError::NotFound(job_id))?;
        if job.status.is_terminal() {
            return Err(JobStoreError::Terminal {
                job_id,
                status: job.status,
            });
        }
        apply(job);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum JobStoreError {
    #[error("Analysis job {0} not found")]
    NotFound(Uuid),

    #[error("Analysis job {job_id} is already {status}")]
    Terminal { job_id: Uuid, status: JobStatus },

    #[error("Cannot set analysis job {job_id} to {status} without a result or error")]
    InvalidTransition { job_id: Uuid, status: JobStatus },
}
