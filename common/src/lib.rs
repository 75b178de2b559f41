pub mod agent;
pub mod cache;
pub mod config;
pub mod console;
pub mod credential;
pub mod error;
pub mod llm;
pub mod persist;
pub mod schema;
pub mod session;
pub mod tracing;

pub use error::{Result, SqlGenError};
