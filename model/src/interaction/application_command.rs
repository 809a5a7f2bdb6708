use crate::channel::ChannelType;
use crate::interaction::OptionType;
use crate::{PermissionBitSet, Snowflake};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ApplicationCommandType {
    #[default]
    ChatInput = 1,
    User = 2,
    Message = 3,
    PrimaryEntryPoint = 4,
}

/// Body of a command as sent to the bulk overwrite endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommandDefinition {
    pub name: Box<str>,
    #[serde(default)]
    pub description: Box<str>,
    #[serde(rename = "type", default)]
    pub command_type: ApplicationCommandType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<PermissionBitSet>,
    #[serde(default)]
    pub nsfw: bool,
}

impl CommandDefinition {
    pub fn chat_input(name: impl Into<Box<str>>, description: impl Into<Box<str>>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            command_type: ApplicationCommandType::ChatInput,
            options: Vec::new(),
            default_member_permissions: None,
            nsfw: false,
        }
    }
}

/// A command as registered, including the ids assigned by the platform.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApplicationCommand {
    pub id: Snowflake,
    pub application_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Snowflake>,
    #[serde(flatten)]
    pub definition: CommandDefinition,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommandOptionDefinition {
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub name: Box<str>,
    pub description: Box<str>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ApplicationCommandOptionChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default)]
    pub autocomplete: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApplicationCommandOptionChoice {
    pub name: Box<str>,
    /// String, integer or number, matching the option's type.
    pub value: Value,
}

impl ApplicationCommandOptionChoice {
    pub fn new(name: impl Into<Box<str>>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
