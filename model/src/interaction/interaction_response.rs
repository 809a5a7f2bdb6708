use crate::channel::message::{AllowedMentions, Embed, MessageFlags};
use crate::interaction::{ApplicationCommandOptionChoice, Component};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum InteractionResponse {
    Pong(SimpleInteractionResponse),
    ChannelMessageWithSource(MessageResponse),
    DeferredChannelMessageWithSource(DeferredResponse),
    DeferredMessageUpdate(DeferredResponse),
    UpdateMessage(MessageResponse),
    ApplicationCommandAutoCompleteResult(AutoCompleteResultResponse),
    Modal(ModalResponse),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SimpleInteractionResponse {
    r#type: InteractionResponseType,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    r#type: InteractionResponseType,
    pub data: MessageBody,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeferredResponse {
    r#type: InteractionResponseType,
    pub data: DeferredResponseData,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeferredResponseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AutoCompleteResultResponse {
    r#type: InteractionResponseType,
    pub data: AutoCompleteResultResponseData,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AutoCompleteResultResponseData {
    pub choices: Vec<ApplicationCommandOptionChoice>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModalResponse {
    r#type: InteractionResponseType,
    pub data: Modal,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Modal {
    pub custom_id: Box<str>,
    pub title: Box<str>,
    pub components: Vec<Component>,
}

impl Modal {
    pub fn new(
        custom_id: impl Into<Box<str>>,
        title: impl Into<Box<str>>,
        components: Vec<Component>,
    ) -> Self {
        Self {
            custom_id: custom_id.into(),
            title: title.into(),
            components,
        }
    }
}

/// Message content used for interaction callbacks, follow-ups and channel messages.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MessageBody {
    #[serde(default)]
    pub content: Box<str>,
    #[serde(default)]
    pub tts: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl MessageBody {
    pub fn content(content: impl Into<Box<str>>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Default::default()
        }
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.flags = ephemeral_flags(ephemeral);
        self
    }

    pub fn is_ephemeral(&self) -> bool {
        self.flags
            .map_or(false, |flags| flags & MessageFlags::EPHEMERAL != 0)
    }
}

/// Reference to an uploaded file, by its index in the multipart body.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AttachmentReference {
    pub id: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[non_exhaustive]
pub enum InteractionResponseType {
    Pong = 1,
    ChannelMessageWithSource = 4,
    DeferredChannelMessageWithSource = 5,
    DeferredMessageUpdate = 6,
    UpdateMessage = 7,
    ApplicationCommandAutoCompleteResult = 8,
    Modal = 9,
}

impl TryFrom<u64> for InteractionResponseType {
    type Error = Box<str>;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Pong,
            4 => Self::ChannelMessageWithSource,
            5 => Self::DeferredChannelMessageWithSource,
            6 => Self::DeferredMessageUpdate,
            7 => Self::UpdateMessage,
            8 => Self::ApplicationCommandAutoCompleteResult,
            9 => Self::Modal,
            _ => {
                return Err(
                    format!("invalid interaction response type \"{}\"", value).into_boxed_str()
                )
            }
        })
    }
}

fn ephemeral_flags(ephemeral: bool) -> Option<u64> {
    ephemeral.then_some(MessageFlags::EPHEMERAL)
}

impl InteractionResponse {
    pub fn new_pong() -> InteractionResponse {
        InteractionResponse::Pong(SimpleInteractionResponse {
            r#type: InteractionResponseType::Pong,
        })
    }

    pub fn new_channel_message_with_source(data: MessageBody) -> InteractionResponse {
        InteractionResponse::ChannelMessageWithSource(MessageResponse {
            r#type: InteractionResponseType::ChannelMessageWithSource,
            data,
        })
    }

    pub fn new_deferred_message_with_source(ephemeral: bool) -> InteractionResponse {
        InteractionResponse::DeferredChannelMessageWithSource(DeferredResponse {
            r#type: InteractionResponseType::DeferredChannelMessageWithSource,
            data: DeferredResponseData {
                flags: ephemeral_flags(ephemeral),
            },
        })
    }

    pub fn new_deferred_message_update() -> InteractionResponse {
        InteractionResponse::DeferredMessageUpdate(DeferredResponse {
            r#type: InteractionResponseType::DeferredMessageUpdate,
            data: DeferredResponseData { flags: None },
        })
    }

    pub fn new_update_message(data: MessageBody) -> InteractionResponse {
        InteractionResponse::UpdateMessage(MessageResponse {
            r#type: InteractionResponseType::UpdateMessage,
            data,
        })
    }

    pub fn new_auto_complete_result(
        choices: Vec<ApplicationCommandOptionChoice>,
    ) -> InteractionResponse {
        InteractionResponse::ApplicationCommandAutoCompleteResult(AutoCompleteResultResponse {
            r#type: InteractionResponseType::ApplicationCommandAutoCompleteResult,
            data: AutoCompleteResultResponseData { choices },
        })
    }

    pub fn new_modal(data: Modal) -> InteractionResponse {
        InteractionResponse::Modal(ModalResponse {
            r#type: InteractionResponseType::Modal,
            data,
        })
    }

    pub fn response_type(&self) -> InteractionResponseType {
        match self {
            InteractionResponse::Pong(r) => r.r#type,
            InteractionResponse::ChannelMessageWithSource(r) => r.r#type,
            InteractionResponse::DeferredChannelMessageWithSource(r) => r.r#type,
            InteractionResponse::DeferredMessageUpdate(r) => r.r#type,
            InteractionResponse::UpdateMessage(r) => r.r#type,
            InteractionResponse::ApplicationCommandAutoCompleteResult(r) => r.r#type,
            InteractionResponse::Modal(r) => r.r#type,
        }
    }

    /// Whether the response creates or edits a message that can be fetched afterwards.
    pub fn produces_message(&self) -> bool {
        matches!(
            self,
            InteractionResponse::ChannelMessageWithSource(_)
                | InteractionResponse::DeferredChannelMessageWithSource(_)
                | InteractionResponse::UpdateMessage(_)
        )
    }
}

impl<'de> Deserialize<'de> for InteractionResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        let response_type = value
            .get("type")
            .and_then(Value::as_u64)
            .ok_or_else(|| Box::from("interaction response type was not an integer"))
            .and_then(InteractionResponseType::try_from)
            .map_err(D::Error::custom)?;

        let response = match response_type {
            InteractionResponseType::Pong => {
                serde_json::from_value(value).map(InteractionResponse::Pong)
            }
            InteractionResponseType::ChannelMessageWithSource => {
                serde_json::from_value(value).map(InteractionResponse::ChannelMessageWithSource)
            }
            InteractionResponseType::DeferredChannelMessageWithSource => {
                serde_json::from_value(value)
                    .map(InteractionResponse::DeferredChannelMessageWithSource)
            }
            InteractionResponseType::DeferredMessageUpdate => {
                serde_json::from_value(value).map(InteractionResponse::DeferredMessageUpdate)
            }
            InteractionResponseType::UpdateMessage => {
                serde_json::from_value(value).map(InteractionResponse::UpdateMessage)
            }
            InteractionResponseType::ApplicationCommandAutoCompleteResult => {
                serde_json::from_value(value)
                    .map(InteractionResponse::ApplicationCommandAutoCompleteResult)
            }
            InteractionResponseType::Modal => {
                serde_json::from_value(value).map(InteractionResponse::Modal)
            }
        }
        .map_err(D::Error::custom)?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pong() {
        let json = serde_json::to_value(InteractionResponse::new_pong()).unwrap();
        assert_eq!(json, json!({"type": 1}));
    }

    #[test]
    fn test_ephemeral_reply() {
        let res = InteractionResponse::new_channel_message_with_source(
            MessageBody::content("hi").ephemeral(true),
        );

        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json, json!({"type": 4, "data": {"content": "hi", "tts": false, "flags": 64}}));
    }

    #[test]
    fn test_deferred_without_flags() {
        let json =
            serde_json::to_value(InteractionResponse::new_deferred_message_with_source(false))
                .unwrap();
        assert_eq!(json, json!({"type": 5, "data": {}}));
    }

    #[test]
    fn test_roundtrip_keeps_variant() {
        let modal = Modal::new("feedback", "Feedback", Vec::new());
        let raw = serde_json::to_string(&InteractionResponse::new_modal(modal)).unwrap();
        let parsed: InteractionResponse = serde_json::from_str(&raw).unwrap();

        assert_eq!(parsed.response_type(), InteractionResponseType::Modal);
        assert!(!parsed.produces_message());
    }
}
