pub mod client;
pub mod config;
mod worker;

pub use client::{CoordinatorClient, RpcError};
pub use config::WorkerConfig;
pub use worker::{execute, run, WorkerStats};
