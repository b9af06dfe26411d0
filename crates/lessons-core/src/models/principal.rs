//! The authenticated caller of an operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    #[default]
    User,
    ServiceAccount,
    System,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub actor_type: ActorType,
}

impl Principal {
    pub fn user(id: Uuid) -> Self {
        Self {
            id,
            actor_type: ActorType::User,
        }
    }
}
