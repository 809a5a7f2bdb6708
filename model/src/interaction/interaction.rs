use crate::channel::message::Message;
use crate::guild::Member;
use crate::interaction::{ApplicationCommandType, ComponentType, OptionNode, ResolvedEntities};
use crate::user::User;
use crate::{PermissionBitSet, Snowflake};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutoComplete,
    ModalSubmit,
    /// A type added by the platform after this crate was written.
    Unknown(u64),
}

impl From<u64> for InteractionType {
    fn from(value: u64) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::ApplicationCommandAutoComplete,
            5 => Self::ModalSubmit,
            other => Self::Unknown(other),
        }
    }
}

impl From<InteractionType> for u64 {
    fn from(value: InteractionType) -> Self {
        match value {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::ApplicationCommandAutoComplete => 4,
            InteractionType::ModalSubmit => 5,
            InteractionType::Unknown(other) => other,
        }
    }
}

impl Serialize for InteractionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::from(*self))
    }
}

impl<'de> Deserialize<'de> for InteractionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::from)
    }
}

/// Anything the platform may post to the interactions endpoint.
///
/// Pings are answered before an [`Interaction`] is ever built, so they get their own
/// variant and never need an actor.
#[derive(Debug, Clone)]
pub enum InteractionPayload {
    Ping(PingInteraction),
    Interaction(Box<Interaction>),
}

impl InteractionPayload {
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PingInteraction {
    pub id: Snowflake,
    pub application_id: Snowflake,
    pub r#type: InteractionType,
    pub token: Box<str>,
}

#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: Snowflake,
    pub application_id: Snowflake,
    pub kind: InteractionType,
    pub data: InteractionData,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    /// Set when invoked inside a guild.
    pub member: Option<Member>,
    /// The invoking user, taken from `member.user` for guild interactions.
    pub user: User,
    pub token: Box<str>,
    pub locale: Option<Box<str>>,
    pub guild_locale: Option<Box<str>>,
    /// The message a component was attached to.
    pub message: Option<Message>,
    pub app_permissions: Option<PermissionBitSet>,
}

#[derive(Debug, Clone)]
pub enum InteractionData {
    Command(CommandData),
    Component(ComponentData),
    ModalSubmit(ModalSubmitData),
    /// Raw `data` of an interaction type this crate does not know, `null` when absent.
    Unknown(Value),
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommandData {
    pub id: Snowflake,
    pub name: Box<str>,
    #[serde(rename = "type", default)]
    pub command_type: ApplicationCommandType,
    #[serde(default)]
    pub target_id: Option<Snowflake>,
    #[serde(default)]
    pub options: Vec<OptionNode>,
    #[serde(default)]
    pub resolved: ResolvedEntities,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ComponentData {
    pub custom_id: Box<str>,
    pub component_type: ComponentType,
    #[serde(default)]
    pub values: Vec<Box<str>>,
    #[serde(default)]
    pub resolved: ResolvedEntities,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModalSubmitData {
    pub custom_id: Box<str>,
    #[serde(default)]
    pub components: Vec<ModalRow>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModalRow {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    #[serde(default)]
    pub components: Vec<ModalField>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModalField {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub custom_id: Box<str>,
    #[serde(default)]
    pub value: Option<Box<str>>,
}

impl Interaction {
    /// Parses a non-ping interaction body. Use [`InteractionPayload::parse`] when the
    /// body may be a ping.
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    pub fn actor_id(&self) -> Snowflake {
        self.user.id
    }

    /// Command name for commands and autocomplete, custom id for components and modals.
    pub fn custom_id(&self) -> Option<&str> {
        match &self.data {
            InteractionData::Component(data) => Some(&data.custom_id),
            InteractionData::ModalSubmit(data) => Some(&data.custom_id),
            InteractionData::Command(_) | InteractionData::Unknown(_) => None,
        }
    }

    pub fn command_name(&self) -> Option<&str> {
        match &self.data {
            InteractionData::Command(data) => Some(&data.name),
            _ => None,
        }
    }

    pub fn target_id(&self) -> Option<Snowflake> {
        match &self.data {
            InteractionData::Command(data) => data.target_id,
            _ => None,
        }
    }

    pub fn resolved(&self) -> Option<&ResolvedEntities> {
        match &self.data {
            InteractionData::Command(data) => Some(&data.resolved),
            InteractionData::Component(data) => Some(&data.resolved),
            InteractionData::ModalSubmit(_) | InteractionData::Unknown(_) => None,
        }
    }

    pub fn in_guild(&self) -> bool {
        self.guild_id.is_some()
    }
}

#[derive(Deserialize)]
struct RawInteraction {
    id: Snowflake,
    application_id: Snowflake,
    r#type: InteractionType,
    data: Option<Value>,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    #[serde(default)]
    channel_id: Option<Snowflake>,
    #[serde(default)]
    member: Option<Member>,
    #[serde(default)]
    user: Option<User>,
    token: Box<str>,
    #[serde(default)]
    locale: Option<Box<str>>,
    #[serde(default)]
    guild_locale: Option<Box<str>>,
    #[serde(default)]
    message: Option<Message>,
    #[serde(default)]
    app_permissions: Option<PermissionBitSet>,
}

impl RawInteraction {
    fn into_interaction(self) -> Result<Interaction, String> {
        let data = match (self.r#type, self.data) {
            (InteractionType::Ping, _) => return Err("ping has no interaction body".to_owned()),
            (InteractionType::Unknown(_), data) => Ok(InteractionData::Unknown(data.unwrap_or_default())),
            (_, None) => return Err("interaction has no data".to_owned()),
            (
                InteractionType::ApplicationCommand | InteractionType::ApplicationCommandAutoComplete,
                Some(data),
            ) => serde_json::from_value(data).map(InteractionData::Command),
            (InteractionType::MessageComponent, Some(data)) => {
                serde_json::from_value(data).map(InteractionData::Component)
            }
            (InteractionType::ModalSubmit, Some(data)) => {
                serde_json::from_value(data).map(InteractionData::ModalSubmit)
            }
        }
        .map_err(|e| e.to_string())?;

        let mut member = self.member;
        let user = member
            .as_mut()
            .and_then(|member| member.user.take())
            .or(self.user)
            .ok_or("interaction has neither member.user nor user")?;

        // keep the member's user populated for consumers reading it directly
        if let Some(member) = member.as_mut() {
            member.user = Some(user.clone());
        }

        Ok(Interaction {
            id: self.id,
            application_id: self.application_id,
            kind: self.r#type,
            data,
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            member,
            user,
            token: self.token,
            locale: self.locale,
            guild_locale: self.guild_locale,
            message: self.message,
            app_permissions: self.app_permissions,
        })
    }
}

impl<'de> Deserialize<'de> for Interaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawInteraction::deserialize(deserializer)?
            .into_interaction()
            .map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for InteractionPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        let interaction_type = value
            .get("type")
            .and_then(Value::as_u64)
            .map(InteractionType::from)
            .ok_or_else(|| D::Error::custom("interaction type was not an integer"))?;

        let payload = match interaction_type {
            InteractionType::Ping => serde_json::from_value(value).map(InteractionPayload::Ping),
            _ => serde_json::from_value(value)
                .map(|interaction| InteractionPayload::Interaction(Box::new(interaction))),
        }
        .map_err(D::Error::custom)?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::message::MessageType;

    #[test]
    fn test_ping() {
        let payload = InteractionPayload::parse(
            br#"{"id":"1","application_id":"2","type":1,"token":"t","version":1}"#,
        )
        .unwrap();

        assert!(matches!(payload, InteractionPayload::Ping(p) if &*p.token == "t"));
    }

    #[test]
    fn test_guild_command_takes_actor_from_member() {
        let payload = InteractionPayload::parse(
            br#"{
                "id": "10", "application_id": "2", "type": 2, "token": "tok",
                "guild_id": "3", "channel_id": "4",
                "member": {"user": {"id": "7", "username": "alice"}, "roles": [], "permissions": "8"},
                "data": {"id": "99", "name": "help", "type": 1}
            }"#,
        )
        .unwrap();

        let interaction = match payload {
            InteractionPayload::Interaction(i) => i,
            other => panic!("expected interaction, got {:?}", other),
        };

        assert_eq!(interaction.actor_id(), Snowflake(7));
        assert_eq!(interaction.command_name(), Some("help"));
        assert_eq!(interaction.custom_id(), None);
        assert!(interaction.in_guild());
        assert_eq!(
            interaction.member.as_ref().and_then(|m| m.user.as_ref()).map(|u| u.id),
            Some(Snowflake(7))
        );
    }

    #[test]
    fn test_dm_component() {
        let interaction: Interaction = serde_json::from_str(
            r#"{
                "id": "10", "application_id": "2", "type": 3, "token": "tok",
                "user": {"id": "8", "username": "bob"},
                "data": {"custom_id": "s_example__1", "component_type": 3, "values": ["a", "b"]}
            }"#,
        )
        .unwrap();

        assert_eq!(interaction.actor_id(), Snowflake(8));
        assert_eq!(interaction.custom_id(), Some("s_example__1"));
        assert!(interaction.member.is_none());

        match &interaction.data {
            InteractionData::Component(data) => assert_eq!(data.values.len(), 2),
            other => panic!("expected component data, got {:?}", other),
        }
    }

    #[test]
    fn test_modal_submit_rows() {
        let interaction: Interaction = serde_json::from_str(
            r#"{
                "id": "10", "application_id": "2", "type": 5, "token": "tok",
                "user": {"id": "8", "username": "bob"},
                "data": {"custom_id": "feedback", "components": [
                    {"type": 1, "components": [{"type": 4, "custom_id": "reason", "value": "slow"}]}
                ]}
            }"#,
        )
        .unwrap();

        match &interaction.data {
            InteractionData::ModalSubmit(data) => {
                assert_eq!(data.components[0].components[0].value.as_deref(), Some("slow"))
            }
            other => panic!("expected modal data, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_still_parses() {
        let payload = InteractionPayload::parse(
            br#"{
                "id": "10", "application_id": "2", "type": 6, "token": "tok",
                "user": {"id": "8", "username": "bob"},
                "data": {"something": "new"}
            }"#,
        )
        .unwrap();

        let interaction = match payload {
            InteractionPayload::Interaction(i) => i,
            other => panic!("expected interaction, got {:?}", other),
        };

        assert_eq!(interaction.kind, InteractionType::Unknown(6));
        assert_eq!(interaction.actor_id(), Snowflake(8));
        assert_eq!(interaction.custom_id(), None);
        assert!(matches!(&interaction.data, InteractionData::Unknown(data) if data["something"] == "new"));
        assert_eq!(serde_json::to_value(interaction.kind).unwrap(), 6);
    }

    #[test]
    fn test_component_on_unlisted_message_type() {
        let interaction: Interaction = serde_json::from_str(
            r#"{
                "id": "10", "application_id": "2", "type": 3, "token": "tok",
                "user": {"id": "8", "username": "bob"},
                "message": {"id": "5", "channel_id": "4", "type": 24},
                "data": {"custom_id": "b_example__1", "component_type": 2}
            }"#,
        )
        .unwrap();

        let message = interaction.message.unwrap();
        assert_eq!(message.message_type, MessageType::Unknown(24));
    }

    #[test]
    fn test_missing_actor_is_rejected() {
        let res = serde_json::from_str::<Interaction>(
            r#"{"id":"1","application_id":"2","type":2,"token":"t","data":{"id":"3","name":"x"}}"#,
        );
        assert!(res.is_err());
    }
}
