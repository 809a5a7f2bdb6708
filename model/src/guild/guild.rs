use serde::{Deserialize, Serialize};

use super::Role;
use crate::{ImageHash, PermissionBitSet, Snowflake};

/// Guild object as returned by `GET /guilds/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Guild {
    pub id: Snowflake,
    pub name: Box<str>,
    pub icon: Option<ImageHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<ImageHash>,
    pub owner_id: Snowflake,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub features: Vec<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_locale: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_member_count: Option<u32>,
}

impl PartialEq for Guild {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Entry of `GET /users/@me/guilds`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PartialGuild {
    pub id: Snowflake,
    pub name: Box<str>,
    pub icon: Option<ImageHash>,
    #[serde(default)]
    pub owner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionBitSet>,
    #[serde(default)]
    pub features: Vec<Box<str>>,
}
