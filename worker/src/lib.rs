pub mod client;
pub mod config;
pub mod error;
pub mod worker;

pub use client::CoordinatorClient;
pub use config::WorkerConfig;
pub use error::WorkerError;
pub use crate::worker::{run, Backoff, WorkerSummary};
