use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::analysis::{Category, WeaknessAnalysisResult};
use crate::models::job::JobStatus;
use crate::models::startup::{prepare_inputs, StartupInput};
use crate::services::backend::{AnalysisBackend, BackendError, TaskOutput};
use crate::services::job_store::{JobStore, JobStoreError};
use crate::services::rate_limiter::RateLimiter;
use crate::services::retry::{run_with_retry, RetryPolicy};
use crate::services::tasks::task_definitions;

/// Runs analysis jobs in the background and records their outcome in the
/// job store, which is the only channel back to callers.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<JobStore>,
    limiter: Arc<RateLimiter>,
    backend: Arc<dyn AnalysisBackend>,
    policy: RetryPolicy,
}

impl Orchestrator {
    pub fn new(
        store: Arc<JobStore>,
        limiter: Arc<RateLimiter>,
        backend: Arc<dyn AnalysisBackend>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            limiter,
            backend,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Queue an analysis and return its job id immediately.
    pub fn submit(&self, input: StartupInput) -> Uuid {
        let job = self.store.create();
        metrics::counter!("analysis_jobs_total").increment(1);
        info!(job_id = %job.id, "Analysis job queued");

        let this = self.clone();
        let job_id = job.id;
        tokio::spawn(async move {
            this.run(job_id, input).await;
        });

        job_id
    }

    /// Run a queued job to a terminal state.
    pub async fn run(&self, job_id: Uuid, input: StartupInput) {
        let start = Instant::now();

        match self.execute(job_id, &input).await {
            Ok(result) => {
                let total = result.total();
                match self.store.complete(job_id, result) {
                    Ok(()) => {
                        metrics::counter!("analysis_jobs_completed").increment(1);
                        info!(job_id = %job_id, weaknesses = total, "Analysis job completed");
                    }
                    Err(e) => error!(job_id = %job_id, error = %e, "Failed to store analysis result"),
                }
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Analysis job failed");
                metrics::counter!("analysis_jobs_failed").increment(1);
                if let Err(store_err) = self.store.fail(job_id, e.to_string()) {
                    error!(job_id = %job_id, error = %store_err, "Failed to record job failure");
                }
            }
        }

        metrics::histogram!("analysis_processing_seconds").record(start.elapsed().as_secs_f64());
    }

    async fn execute(
        &self,
        job_id: Uuid,
        input: &StartupInput,
    ) -> Result<WeaknessAnalysisResult, AnalysisError> {
        self.store.update_status(job_id, JobStatus::Processing)?;

        let inputs = prepare_inputs(input);
        let tasks = task_definitions();

        let outputs = run_with_retry(
            &self.policy,
            &self.limiter,
            |retry, _delay| {
                metrics::counter!("analysis_rate_limited_retries_total").increment(1);
                if let Err(e) = self.store.update_status(job_id, JobStatus::RateLimitedRetry(retry)) {
                    warn!(job_id = %job_id, error = %e, "Could not record retry status");
                }
            },
            || self.backend.invoke(tasks, &inputs),
        )
        .await?;

        info!(job_id = %job_id, outputs = outputs.len(), "Backend returned task outputs");
        Ok(assign_categories(job_id, &outputs))
    }
}

/// Map task outputs to categories by position.
///
/// Outputs beyond the known categories are dropped; categories without an
/// output stay empty.
pub fn assign_categories(job_id: Uuid, outputs: &[TaskOutput]) -> WeaknessAnalysisResult {
    if outputs.len() != Category::ORDER.len() {
        warn!(
            job_id = %job_id,
            expected = Category::ORDER.len(),
            received = outputs.len(),
            "Task output count does not match category count"
        );
    }

    let mut result = WeaknessAnalysisResult::default();
    for (idx, output) in outputs.iter().enumerate() {
        let Some(category) = Category::ORDER.get(idx).copied() else {
            warn!(job_id = %job_id, index = idx, agent = %output.agent, "Discarding unexpected extra task output");
            continue;
        };

        let weaknesses = output.weaknesses();
        if weaknesses.is_empty() {
            warn!(job_id = %job_id, category = %category, agent = %output.agent, "No weaknesses extracted");
        }
        metrics::histogram!("analysis_weaknesses_extracted", "category" => category.as_ref().to_string())
            .record(weaknesses.len() as f64);
        info!(job_id = %job_id, category = %category, count = weaknesses.len(), "Assigned weaknesses");

        result.set(category, weaknesses);
    }
    result
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] JobStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(raw: &str) -> TaskOutput {
        TaskOutput::from_raw("advisor", raw)
    }

    #[test]
    fn test_positional_assignment() {
        let outputs: Vec<TaskOutput> = (0..5)
            .map(|i| output(&format!(r#"{{"weaknesses": ["w{i}"]}}"#)))
            .collect();

        let result = assign_categories(Uuid::new_v4(), &outputs);
        assert_eq!(result.marketing_weaknesses, vec!["w0".to_string()]);
        assert_eq!(result.org_hr_weaknesses, vec!["w2".to_string()]);
        assert_eq!(result.finance_weaknesses, vec!["w4".to_string()]);
    }

    #[test]
    fn test_short_output_leaves_categories_empty() {
        let outputs: Vec<TaskOutput> = (0..3)
            .map(|i| output(&format!(r#"{{"weaknesses": ["w{i}"]}}"#)))
            .collect();

        let result = assign_categories(Uuid::new_v4(), &outputs);
        assert_eq!(result.org_hr_weaknesses, vec!["w2".to_string()]);
        assert!(result.competitive_weaknesses.is_empty());
        assert!(result.finance_weaknesses.is_empty());
    }

    #[test]
    fn test_surplus_outputs_discarded() {
        let outputs: Vec<TaskOutput> = (0..7)
            .map(|i| output(&format!(r#"{{"weaknesses": ["w{i}"]}}"#)))
            .collect();

        let result = assign_categories(Uuid::new_v4(), &outputs);
        assert_eq!(result.finance_weaknesses, vec!["w4".to_string()]);
        assert_eq!(result.total(), 5);
    }

    #[test]
    fn test_unparseable_output_yields_empty_category() {
        let outputs = vec![output("I could not complete this analysis.")];
        let result = assign_categories(Uuid::new_v4(), &outputs);
        assert!(result.marketing_weaknesses.is_empty());
    }
}
