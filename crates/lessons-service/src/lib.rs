//! Lessons Service: permission evaluation, default group provisioning
//! and the lesson lifecycle, generic over the storage and collaborator
//! traits of `lessons-core`.

pub mod cleanup;
pub mod config;
pub mod course;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod membership;
pub mod permissions;
pub mod provisioner;
pub mod retention;
pub mod sections;
pub mod shaper;
pub mod token;

pub use config::{
    AccessPolicy, AuthConfig, CourseServiceConfig, LessonServiceConfig, PaginationConfig,
    ProvisioningConfig, RetentionConfig, SubGroupAccess,
};
pub use error::AuthError;
pub use events::EventBus;
pub use lifecycle::LessonService;
pub use permissions::PermissionEvaluator;
