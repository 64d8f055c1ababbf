pub mod backend;
pub mod crew;
pub mod extractor;
pub mod job_store;
pub mod orchestrator;
pub mod rate_limiter;
pub mod retry;
pub mod tasks;
