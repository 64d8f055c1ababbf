//! Test helpers: scripted backends and orchestrator wiring.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use board_panel::services::backend::{AnalysisBackend, BackendError, TaskOutput};
use board_panel::services::job_store::JobStore;
use board_panel::services::orchestrator::Orchestrator;
use board_panel::services::rate_limiter::RateLimiter;
use board_panel::services::retry::RetryPolicy;
use board_panel::services::tasks::TaskDefinition;

/// One scripted backend reply.
pub enum Reply {
    Outputs(Vec<(&'static str, String)>),
    Error(&'static str),
}

/// Backend that replays scripted replies in order and counts invocations.
/// The last reply repeats once the script runs out.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    calls: AtomicU32,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Result<Vec<TaskOutput>, BackendError> {
        let mut replies = self.replies.lock();
        let mut last = self.last.lock();
        if let Some(reply) = replies.pop_front() {
            *last = Some(reply);
        }

        match last.as_ref() {
            Some(Reply::Outputs(outputs)) => Ok(outputs
                .iter()
                .map(|(agent, raw)| TaskOutput::from_raw(*agent, raw.clone()))
                .collect()),
            Some(Reply::Error(message)) => Err(BackendError::Upstream(message.to_string())),
            None => Err(BackendError::Upstream("no scripted reply".to_string())),
        }
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn invoke(
        &self,
        tasks: &[TaskDefinition],
        _inputs: &BTreeMap<String, String>,
    ) -> Result<Vec<TaskOutput>, BackendError> {
        assert_eq!(tasks.len(), 5, "orchestrator must pass all five tasks");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.next_reply()
    }
}

/// Orchestrator over `backend` with production limiter and retry settings.
pub fn orchestrator(backend: Arc<ScriptedBackend>) -> Orchestrator {
    Orchestrator::new(
        Arc::new(JobStore::new()),
        Arc::new(RateLimiter::new(20, Duration::from_secs(1))),
        backend,
        RetryPolicy::default(),
    )
}
