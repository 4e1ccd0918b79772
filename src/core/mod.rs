// src/core/mod.rs
//! Shared infrastructure: configuration, persistence, errors and outbound clients

pub mod config_manager;
pub mod database;
pub mod error;
pub mod fs_ops;
pub mod memory_store;
pub mod service_client;
pub mod store;

pub use config_manager::ConfigManager;
pub use database::Database;
pub use error::PipelineError;
pub use fs_ops::FsOps;
pub use memory_store::MemoryStore;
pub use service_client::{GeminiClient, ReasoningClient};
pub use store::JobStore;
