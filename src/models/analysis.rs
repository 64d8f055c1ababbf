use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};
use uuid::Uuid;

use crate::models::job::{AnalysisJob, JobStatus};
use crate::models::startup::StartupInput;

/// Weakness categories, in the order the backend executes their tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Marketing,
    Tech,
    OrgHr,
    Competitive,
    Finance,
}

impl Category {
    /// Fixed positional order of task outputs.
    pub const ORDER: [Category; 5] = [
        Category::Marketing,
        Category::Tech,
        Category::OrgHr,
        Category::Competitive,
        Category::Finance,
    ];
}

/// Structured output an advisor is asked to produce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentWeaknessOutput {
    #[serde(default)]
    pub agent_name: String,
    pub weaknesses: Vec<String>,
}

/// Complete weakness analysis across all advisors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeaknessAnalysisResult {
    pub marketing_weaknesses: Vec<String>,
    pub tech_weaknesses: Vec<String>,
    pub org_hr_weaknesses: Vec<String>,
    pub competitive_weaknesses: Vec<String>,
    pub finance_weaknesses: Vec<String>,
}

impl WeaknessAnalysisResult {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Marketing => &self.marketing_weaknesses,
            Category::Tech => &self.tech_weaknesses,
            Category::OrgHr => &self.org_hr_weaknesses,
            Category::Competitive => &self.competitive_weaknesses,
            Category::Finance => &self.finance_weaknesses,
        }
    }

    pub fn set(&mut self, category: Category, weaknesses: Vec<String>) {
        let slot = match category {
            Category::Marketing => &mut self.marketing_weaknesses,
            Category::Tech => &mut self.tech_weaknesses,
            Category::OrgHr => &mut self.org_hr_weaknesses,
            Category::Competitive => &mut self.competitive_weaknesses,
            Category::Finance => &mut self.finance_weaknesses,
        };
        *slot = weaknesses;
    }

    pub fn total(&self) -> usize {
        Category::ORDER.iter().map(|c| self.get(*c).len()).sum()
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[garde(dive)]
    pub startup_data: StartupInput,
}

/// Response after submitting a startup for analysis.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub job_id: Uuid,
    pub status: String,
    pub message: String,
}

/// Response for querying job status.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<WeaknessAnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
}

impl From<AnalysisJob> for JobStatusResponse {
    fn from(job: AnalysisJob) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            submitted_at: job.submitted_at,
            result: job.result,
            completed_at: job.completed_at,
            error: job.error,
            failed_at: job.failed_at,
        }
    }
}
