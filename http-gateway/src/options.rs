//! Flattening of command option trees, select menu values and modal fields into a
//! single name to value map.

use model::channel::message::Attachment;
use model::channel::PartialChannel;
use model::guild::{PartialMember, Role};
use model::interaction::{
    ComponentData, ComponentType, Interaction, InteractionData, LeafValue, ModalSubmitData,
    OptionNode, ResolvedEntities,
};
use model::user::User;
use model::Snowflake;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// A referenced entity, or just its id when the resolved table had no entry for it.
#[derive(Debug, Clone)]
pub enum Resolved<T> {
    Entity(T),
    Stub(Snowflake),
}

impl<T> Resolved<T> {
    pub fn entity(&self) -> Option<&T> {
        match self {
            Resolved::Entity(entity) => Some(entity),
            Resolved::Stub(_) => None,
        }
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, Resolved::Stub(_))
    }
}

impl<T: Serialize> Serialize for Resolved<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resolved::Entity(entity) => entity.serialize(serializer),
            Resolved::Stub(id) => json!({ "id": id }).serialize(serializer),
        }
    }
}

/// A user option, with the guild member record when one was sent along.
#[derive(Debug, Clone)]
pub struct ResolvedUser {
    pub user: Resolved<User>,
    pub member: Option<PartialMember>,
}

impl ResolvedUser {
    pub fn id(&self) -> Snowflake {
        match &self.user {
            Resolved::Entity(user) => user.id,
            Resolved::Stub(id) => *id,
        }
    }
}

// Serializes as the user object with a `member` key, `{}` when there is no member.
impl Serialize for ResolvedUser {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.user).map_err(S::Error::custom)?;

        let member = match &self.member {
            Some(member) => serde_json::to_value(member).map_err(S::Error::custom)?,
            None => Value::Object(Map::new()),
        };

        if let Value::Object(map) = &mut value {
            map.insert("member".to_owned(), member);
        }

        value.serialize(serializer)
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum OptionValue {
    String(Box<str>),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(Box<ResolvedUser>),
    Channel(Resolved<PartialChannel>),
    Role(Resolved<Role>),
    Attachment(Resolved<Attachment>),
    Mentionable(Snowflake),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&ResolvedUser> {
        match self {
            OptionValue::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Resolved<PartialChannel>> {
        match self {
            OptionValue::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&Resolved<Role>> {
        match self {
            OptionValue::Role(role) => Some(role),
            _ => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&Resolved<Attachment>> {
        match self {
            OptionValue::Attachment(attachment) => Some(attachment),
            _ => None,
        }
    }

    pub fn as_snowflake(&self) -> Option<Snowflake> {
        match self {
            OptionValue::Mentionable(id) => Some(*id),
            OptionValue::User(user) => Some(user.id()),
            _ => None,
        }
    }
}

/// Flat view of everything the user supplied with an interaction.
///
/// Entries keep the order they were first inserted in; inserting an existing name
/// replaces its value in place.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ResolvedOptions {
    #[serde(serialize_with = "serialize_values")]
    values: Vec<(Box<str>, OptionValue)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcommand: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused: Option<Box<str>>,
}

fn serialize_values<S: Serializer>(
    values: &[(Box<str>, OptionValue)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(values.iter().map(|(name, value)| (name, value)))
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values
            .iter()
            .find(|(key, _)| &**key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (&**name, value))
    }

    pub fn first(&self) -> Option<(&str, &OptionValue)> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Name of the option the user is typing in, for autocomplete.
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    fn insert(&mut self, name: impl Into<Box<str>>, value: OptionValue) {
        let name = name.into();
        match self.values.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((name, value)),
        }
    }
}

pub fn resolve_interaction(interaction: &Interaction) -> ResolvedOptions {
    match &interaction.data {
        InteractionData::Command(data) => resolve(&data.options, &data.resolved),
        InteractionData::Component(data) => resolve_component(data),
        InteractionData::ModalSubmit(data) => resolve_modal(data),
        InteractionData::Unknown(_) => ResolvedOptions::default(),
    }
}

/// Flattens a command's option tree. At most one group and one subcommand sit above
/// the leaves; their names are recorded separately from the values.
pub fn resolve(options: &[OptionNode], resolved: &ResolvedEntities) -> ResolvedOptions {
    let mut out = ResolvedOptions::default();

    for node in options {
        match node {
            OptionNode::Group(group) => {
                out.group = Some(group.name.clone());

                for subcommand in &group.subcommands {
                    out.subcommand = Some(subcommand.name.clone());
                    add_leaves(&mut out, &subcommand.options, resolved);
                }
            }
            OptionNode::Subcommand(subcommand) => {
                out.subcommand = Some(subcommand.name.clone());
                add_leaves(&mut out, &subcommand.options, resolved);
            }
            OptionNode::Leaf(leaf) => add_leaves(&mut out, std::slice::from_ref(leaf), resolved),
        }
    }

    out
}

fn add_leaves(
    out: &mut ResolvedOptions,
    leaves: &[model::interaction::Leaf],
    resolved: &ResolvedEntities,
) {
    for leaf in leaves {
        if leaf.focused {
            out.focused = Some(leaf.name.clone());
        }

        out.insert(leaf.name.clone(), resolve_leaf(&leaf.value, resolved));
    }
}

fn resolve_leaf(value: &LeafValue, resolved: &ResolvedEntities) -> OptionValue {
    match value {
        LeafValue::String(s) => OptionValue::String(s.clone()),
        LeafValue::Integer(i) => OptionValue::Integer(*i),
        LeafValue::Number(n) => OptionValue::Number(*n),
        LeafValue::Boolean(b) => OptionValue::Boolean(*b),
        LeafValue::User(id) => resolve_user(*id, resolved),
        LeafValue::Channel(id) => OptionValue::Channel(lookup(&resolved.channels, *id)),
        LeafValue::Role(id) => OptionValue::Role(lookup(&resolved.roles, *id)),
        LeafValue::Attachment(id) => OptionValue::Attachment(lookup(&resolved.attachments, *id)),
        LeafValue::Mentionable(id) => OptionValue::Mentionable(*id),
    }
}

fn lookup<T: Clone>(
    table: &std::collections::HashMap<Snowflake, T>,
    id: Snowflake,
) -> Resolved<T> {
    match table.get(&id) {
        Some(entity) => Resolved::Entity(entity.clone()),
        None => Resolved::Stub(id),
    }
}

fn resolve_user(id: Snowflake, resolved: &ResolvedEntities) -> OptionValue {
    OptionValue::User(Box::new(ResolvedUser {
        user: lookup(&resolved.users, id),
        member: resolved.members.get(&id).cloned(),
    }))
}

/// Select menu values land under the component's custom id. Only the last selected
/// value is kept.
pub fn resolve_component(data: &ComponentData) -> ResolvedOptions {
    let mut out = ResolvedOptions::default();

    for raw in &data.values {
        let value = match data.component_type {
            ComponentType::UserSelect => raw
                .parse()
                .map(|id| resolve_user(id, &data.resolved))
                .ok(),
            ComponentType::ChannelSelect => raw
                .parse()
                .map(|id| OptionValue::Channel(lookup(&data.resolved.channels, id)))
                .ok(),
            ComponentType::RoleSelect => raw
                .parse()
                .map(|id| OptionValue::Role(lookup(&data.resolved.roles, id)))
                .ok(),
            _ => None,
        };

        out.insert(
            data.custom_id.clone(),
            value.unwrap_or_else(|| OptionValue::String(raw.clone())),
        );
    }

    out
}

pub fn resolve_modal(data: &ModalSubmitData) -> ResolvedOptions {
    let mut out = ResolvedOptions::default();

    let fields = data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .filter(|field| field.component_type == ComponentType::TextInput);

    for field in fields {
        if let Some(value) = &field.value {
            out.insert(field.custom_id.clone(), OptionValue::String(value.clone()));
        }
    }

    out
}
