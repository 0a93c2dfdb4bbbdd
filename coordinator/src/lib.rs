pub mod config;
pub mod failover;
pub mod handlers;
pub mod state;

pub use config::CoordinatorConfig;
pub use state::{Coordinator, TaskStatus};
