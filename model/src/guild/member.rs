use serde::{Deserialize, Serialize};

use crate::user::User;
use crate::{ImageHash, PermissionBitSet, Snowflake};
use chrono::{DateTime, Utc};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(flatten)]
    pub partial: PartialMember,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
}

/// Member fields shared by full members and the entries of an interaction's resolved
/// member table, which carry neither the user nor voice state.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PartialMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<ImageHash>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionBitSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_disabled_until: Option<DateTime<Utc>>,
}

impl Member {
    pub fn nick(&self) -> Option<&str> {
        self.partial.nick.as_deref()
    }

    pub fn permissions(&self) -> Option<PermissionBitSet> {
        self.partial.permissions
    }
}
