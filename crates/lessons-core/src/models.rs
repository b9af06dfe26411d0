//! Domain models for the lessons service.

pub mod collection;
pub mod event;
pub mod group;
pub mod lesson;
pub mod permission;
pub mod principal;
pub mod section;
pub mod view;
