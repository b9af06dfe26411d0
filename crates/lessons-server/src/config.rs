//! Top-level service configuration, read from TOML.

use std::path::Path;

use anyhow::Context;
use lessons_db::DbConfig;
use lessons_service::config::{
    AccessPolicy, AuthConfig, CourseServiceConfig, LessonServiceConfig, PaginationConfig,
    ProvisioningConfig, RetentionConfig,
};
use serde::Deserialize;

use crate::cli::Args;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Events buffered per subscriber before the oldest are dropped.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Every configuration section; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub database: DbConfig,
    pub course_service: CourseServiceConfig,
    pub provisioning: ProvisioningConfig,
    pub access: AccessPolicy,
    pub pagination: PaginationConfig,
    pub auth: AuthConfig,
    pub retention: RetentionConfig,
    pub events: EventsConfig,
}

impl ServiceConfig {
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("invalid configuration")
    }

    /// Load the file named on the command line (if any), then apply the
    /// individual overrides.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = &args.database_url {
            config.database.url.clone_from(url);
        }
        if let Some(url) = &args.course_service_url {
            config.course_service.base_url.clone_from(url);
        }
        if let Some(path) = &args.jwt_public_key_file {
            config.auth.jwt_public_key_pem = std::fs::read_to_string(path)
                .with_context(|| format!("reading public key {}", path.display()))?;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        Self::from_toml(&raw)
    }

    pub fn lesson_service(&self) -> LessonServiceConfig {
        LessonServiceConfig {
            access: self.access.clone(),
            pagination: self.pagination,
            provisioning: self.provisioning.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use lessons_service::config::SubGroupAccess;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ServiceConfig::from_toml("").unwrap();
        assert_eq!(config.course_service.timeout_ms, 1000);
        assert_eq!(config.pagination.max_limit, 100);
        assert_eq!(config.retention.group_retention_days, 30);
        assert_eq!(config.provisioning.write_permissions, vec!["LESSONS_CREATE"]);
    }

    #[test]
    fn sections_override_independently() {
        let config = ServiceConfig::from_toml(
            r#"
            [database]
            url = "mem://"

            [access]
            bypass_actor_types = ["system", "service_account"]
            sub_group_access = "delegated"

            [provisioning]
            read_permissions = ["LESSONS_VIEW", "COURSE_VIEW"]
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url, "mem://");
        assert_eq!(config.database.namespace, "lessons");
        assert_eq!(config.access.bypass_actor_types.len(), 2);
        assert_eq!(config.access.sub_group_access, SubGroupAccess::Delegated);
        assert!(config.access.write_implies_read);
        assert_eq!(config.provisioning.read_permissions.len(), 2);
        assert_eq!(config.provisioning.write_permissions, vec!["LESSONS_CREATE"]);
    }

    #[test]
    fn negative_retention_is_rejected() {
        assert!(ServiceConfig::from_toml("[retention]\ngroup_retention_days = -5").is_err());
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(ServiceConfig::from_toml("[access]\nsub_group_access = \"everyone\"").is_err());
    }
}
