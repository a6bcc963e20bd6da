//! Lectern Janitor - Quota Housekeeping Service
//!
//! Resets the free daily regeneration allowance of every user once per UTC
//! day, in the background or on demand.
//!
//! # Components
//!
//! - **Janitor**: a single sweep over a [`lectern_domain::QuotaMaintenance`] backend
//! - **JanitorWorker**: runs sweeps on a tokio interval until Ctrl+C
//! - **JanitorMetrics**: counters accumulated across sweeps
//!
//! Dry-run mode counts the allowances due for reset without touching them.

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;
mod worker;

pub use config::JanitorConfig;
pub use error::JanitorError;
pub use janitor::Janitor;
pub use metrics::JanitorMetrics;
pub use worker::JanitorWorker;
