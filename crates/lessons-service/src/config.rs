//! Configuration sections consumed by the lessons service.
//!
//! Every section deserializes with defaults for missing keys, so an
//! empty configuration file yields a working setup.

use lessons_core::models::principal::ActorType;
use serde::Deserialize;

/// How sub-group membership counts towards group containment.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubGroupAccess {
    /// Sub-groups only organize members; they grant nothing.
    #[default]
    Informational,
    /// Members of a sub-group are treated as members of the group.
    Delegated,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessPolicy {
    /// Actor types that pass every read check. Write is never bypassed.
    pub bypass_actor_types: Vec<ActorType>,
    /// Whether a write entry also grants read.
    pub write_implies_read: bool,
    pub sub_group_access: SubGroupAccess,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            bypass_actor_types: vec![ActorType::System],
            write_implies_read: true,
            sub_group_access: SubGroupAccess::Informational,
        }
    }
}

/// Course role permissions mapped onto the default lesson groups.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Holding any of these puts a user in the write group.
    pub write_permissions: Vec<String>,
    /// Holding any of these (and none of the above) puts a user in the
    /// read group.
    pub read_permissions: Vec<String>,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            write_permissions: vec!["LESSONS_CREATE".into()],
            read_permissions: vec!["LESSONS_VIEW".into()],
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CourseServiceConfig {
    /// Base URL of the course service, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in milliseconds (default: 1000).
    pub timeout_ms: u64,
}

impl Default for CourseServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3030".into(),
            timeout_ms: 1000,
        }
    }
}

/// Bearer token verification.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// PEM-encoded Ed25519 private key. Only read by the `issue-token`
    /// command of the server binary.
    pub jwt_private_key_pem: Option<String>,
    /// Expected `iss` claim.
    pub jwt_issuer: String,
    /// Lifetime of issued tokens in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_public_key_pem: String::new(),
            jwt_private_key_pem: None,
            jwt_issuer: "lessons".into(),
            access_token_lifetime_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetentionConfig {
    /// Days a soft-deleted group is kept before it is purged.
    pub group_retention_days: u32,
    /// Seconds between two purge sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            group_retention_days: 30,
            sweep_interval_secs: 3600,
        }
    }
}

impl RetentionConfig {
    /// The retention window. Saturates instead of overflowing.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::try_days(i64::from(self.group_retention_days))
            .unwrap_or(chrono::Duration::MAX)
    }
}

/// Settings of the lesson lifecycle and its section sub-resource.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LessonServiceConfig {
    pub access: AccessPolicy,
    pub pagination: PaginationConfig,
    pub provisioning: ProvisioningConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_policy_defaults() {
        let policy = AccessPolicy::default();
        assert_eq!(policy.bypass_actor_types, vec![ActorType::System]);
        assert!(policy.write_implies_read);
        assert_eq!(policy.sub_group_access, SubGroupAccess::Informational);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let policy: AccessPolicy =
            serde_json::from_str(r#"{ "sub_group_access": "delegated" }"#).unwrap();
        assert_eq!(policy.sub_group_access, SubGroupAccess::Delegated);
        assert!(policy.write_implies_read);

        let pagination: PaginationConfig = serde_json::from_str(r#"{ "max_limit": 20 }"#).unwrap();
        assert_eq!(pagination.default_limit, 50);
        assert_eq!(pagination.max_limit, 20);
    }

    #[test]
    fn retention_window_never_goes_negative() {
        assert!(
            serde_json::from_str::<RetentionConfig>(r#"{ "group_retention_days": -1 }"#).is_err()
        );

        let huge = RetentionConfig {
            group_retention_days: u32::MAX,
            ..RetentionConfig::default()
        };
        assert!(huge.retention() > chrono::Duration::days(365));
        assert_eq!(RetentionConfig::default().retention(), chrono::Duration::days(30));
    }
}
