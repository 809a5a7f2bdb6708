//! Request bodies for the guild, channel and thread endpoints.

use model::channel::message::MessageReference;
use model::channel::{ChannelType, PermissionOverwrite, PermissionOverwriteType};
use model::interaction::MessageBody;
use model::{PermissionBitSet, Snowflake};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Default)]
pub struct CreateRole {
    pub name: Box<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentionable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionBitSet>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct UpdateRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentionable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionBitSet>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateChannel {
    pub name: Box<str>,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permission_overwrites: Vec<PermissionOverwrite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
}

impl CreateChannel {
    pub fn new(name: impl Into<Box<str>>, channel_type: ChannelType) -> Self {
        Self {
            name: name.into(),
            channel_type,
            permission_overwrites: Vec::new(),
            parent_id: None,
        }
    }
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct UpdateChannel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_overwrites: Option<Vec<PermissionOverwrite>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
}

#[derive(Serialize, Debug, Clone)]
pub struct EditChannelOverwrite {
    #[serde(rename = "type")]
    pub overwrite_type: PermissionOverwriteType,
    pub allow: PermissionBitSet,
    pub deny: PermissionBitSet,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateThread {
    pub name: Box<str>,
    /// One of the three thread channel types.
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    /// Starter message, only used in forum and media channels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageBody>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateThreadFromMessage {
    pub name: Box<str>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct UpdateThread {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_tags: Option<Vec<Snowflake>>,
}

/// Body of `POST /channels/{id}/messages`.
#[derive(Serialize, Debug, Clone)]
pub struct CreateMessage {
    #[serde(flatten)]
    pub body: MessageBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
}

impl From<MessageBody> for CreateMessage {
    fn from(body: MessageBody) -> Self {
        Self {
            body,
            message_reference: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_thread_skips_unset_fields() {
        let body = UpdateThread {
            archived: Some(true),
            ..Default::default()
        };

        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"archived": true}));
    }

    #[test]
    fn test_create_channel() {
        let mut body = CreateChannel::new("ticket-1", ChannelType::GuildText);
        body.parent_id = Some(Snowflake(5));

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"name": "ticket-1", "type": 0, "parent_id": "5"})
        );
    }
}
