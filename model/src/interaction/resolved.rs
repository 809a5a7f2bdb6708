use crate::channel::message::{Attachment, Message};
use crate::channel::PartialChannel;
use crate::guild::{PartialMember, Role};
use crate::user::User;
use crate::Snowflake;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Side table of full objects the platform sends alongside id-only option references.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResolvedEntities {
    #[serde(default)]
    pub users: HashMap<Snowflake, User>,
    #[serde(default)]
    pub members: HashMap<Snowflake, PartialMember>,
    #[serde(default)]
    pub roles: HashMap<Snowflake, Role>,
    #[serde(default)]
    pub channels: HashMap<Snowflake, PartialChannel>,
    #[serde(default)]
    pub messages: HashMap<Snowflake, Message>,
    #[serde(default)]
    pub attachments: HashMap<Snowflake, Attachment>,
}

impl ResolvedEntities {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.members.is_empty()
            && self.roles.is_empty()
            && self.channels.is_empty()
            && self.messages.is_empty()
            && self.attachments.is_empty()
    }
}
