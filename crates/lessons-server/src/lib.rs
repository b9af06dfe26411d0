//! Lessons Server: configuration loading and wiring of the lessons
//! service onto a SurrealDB connection.

pub mod app;
pub mod cli;
pub mod config;

pub use app::App;
pub use config::ServiceConfig;
