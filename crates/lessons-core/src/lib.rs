//! Lessons Core: domain models, error types and the trait seams
//! between the lesson service, its storage and its collaborators.

pub mod collaborator;
pub mod context;
pub mod error;
pub mod models;
pub mod repository;
