use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::models::analysis::AgentWeaknessOutput;
use crate::services::extractor;
use crate::services::tasks::TaskDefinition;

/// Text-generation backend that runs the advisor tasks.
///
/// Implementations return one output per task, in task order.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn invoke(
        &self,
        tasks: &[TaskDefinition],
        inputs: &BTreeMap<String, String>,
    ) -> Result<Vec<TaskOutput>, BackendError>;
}

/// Output already parsed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    /// Matched the advisor output schema exactly.
    Structured(AgentWeaknessOutput),
    /// Some other JSON object.
    Dictionary(Map<String, Value>),
}

/// The result of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub agent: String,
    pub raw: String,
    pub parsed: Option<ParsedOutput>,
}

impl TaskOutput {
    /// Wrap raw model text, recognising output that is already clean JSON.
    pub fn from_raw(agent: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();

        let parsed = if let Ok(structured) = serde_json::from_str::<AgentWeaknessOutput>(trimmed) {
            Some(ParsedOutput::Structured(structured))
        } else if let Ok(map) = serde_json::from_str::<Map<String, Value>>(trimmed) {
            Some(ParsedOutput::Dictionary(map))
        } else {
            None
        };

        Self {
            agent: agent.into(),
            raw,
            parsed,
        }
    }

    /// Weaknesses for this task: structured output first, then a parsed
    /// dictionary exposing `weaknesses`, then extraction from the raw text.
    pub fn weaknesses(&self) -> Vec<String> {
        match &self.parsed {
            Some(ParsedOutput::Structured(output)) => return output.weaknesses.clone(),
            Some(ParsedOutput::Dictionary(map)) => {
                if let Some(weaknesses) = extractor::weaknesses_field(map) {
                    return weaknesses;
                }
            }
            None => {}
        }
        extractor::extract(&self.raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request to LLM backend failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM backend returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM backend returned no content for {agent}")]
    EmptyResponse { agent: String },

    #[error("{0}")]
    Upstream(String),
}
