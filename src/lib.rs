//! Board Panel weakness analysis service
//!
//! This library provides the core functionality for the board-panel system,
//! which runs a panel of LLM advisors over a startup description and collects
//! the weaknesses each one reports, asynchronously by job id.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
