pub mod apps;
pub mod artifact;
pub mod engine;
pub mod error;
pub mod job;
pub mod kv;
pub mod rpc;
pub mod task;

pub use apps::MapReduceApp;
pub use error::{ConfigError, EngineError};
pub use job::{JobStatus, Phase};
pub use kv::KeyValue;
pub use rpc::{Assignment, CompletionAck, DoneResponse, TaskRequest, WorkerId};
pub use task::{Task, TaskId, TaskInput, TaskKind};
