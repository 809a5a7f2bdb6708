use crate::Snowflake;
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

/// One node of a command invocation's option tree.
///
/// The platform nests at most one group and one subcommand above the leaves, and the
/// types here make any other shape unrepresentable: groups only hold subcommands and
/// subcommands only hold leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionNode {
    Group(OptionGroup),
    Subcommand(Subcommand),
    Leaf(Leaf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    pub name: Box<str>,
    pub subcommands: Vec<Subcommand>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subcommand {
    pub name: Box<str>,
    pub options: Vec<Leaf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub name: Box<str>,
    pub focused: bool,
    pub value: LeafValue,
}

/// Raw value of a leaf option. Reference kinds only carry the id; hydrating them against
/// the resolved table happens later.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    String(Box<str>),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(Snowflake),
    Channel(Snowflake),
    Role(Snowflake),
    Mentionable(Snowflake),
    Attachment(Snowflake),
}

impl LeafValue {
    pub fn option_type(&self) -> OptionType {
        match self {
            LeafValue::String(_) => OptionType::String,
            LeafValue::Integer(_) => OptionType::Integer,
            LeafValue::Number(_) => OptionType::Number,
            LeafValue::Boolean(_) => OptionType::Boolean,
            LeafValue::User(_) => OptionType::User,
            LeafValue::Channel(_) => OptionType::Channel,
            LeafValue::Role(_) => OptionType::Role,
            LeafValue::Mentionable(_) => OptionType::Mentionable,
            LeafValue::Attachment(_) => OptionType::Attachment,
        }
    }
}

impl OptionNode {
    pub fn name(&self) -> &str {
        match self {
            OptionNode::Group(group) => &group.name,
            OptionNode::Subcommand(subcommand) => &subcommand.name,
            OptionNode::Leaf(leaf) => &leaf.name,
        }
    }
}

#[derive(Deserialize)]
struct RawOption {
    name: Box<str>,
    #[serde(rename = "type")]
    option_type: OptionType,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    focused: bool,
}

impl RawOption {
    fn into_node(self) -> Result<OptionNode, String> {
        Ok(match self.option_type {
            OptionType::SubCommandGroup => OptionNode::Group(OptionGroup {
                name: self.name,
                subcommands: self
                    .options
                    .into_iter()
                    .map(RawOption::into_subcommand)
                    .collect::<Result<_, _>>()?,
            }),
            OptionType::SubCommand => OptionNode::Subcommand(self.into_subcommand()?),
            _ => OptionNode::Leaf(self.into_leaf()?),
        })
    }

    fn into_subcommand(self) -> Result<Subcommand, String> {
        if self.option_type != OptionType::SubCommand {
            return Err(format!("option \"{}\" is not a subcommand", self.name));
        }

        Ok(Subcommand {
            name: self.name,
            options: self
                .options
                .into_iter()
                .map(RawOption::into_leaf)
                .collect::<Result<_, _>>()?,
        })
    }

    fn into_leaf(self) -> Result<Leaf, String> {
        let value = match self.value {
            Some(value) => value,
            None => return Err(format!("option \"{}\" has no value", self.name)),
        };

        let value = parse_leaf_value(self.option_type, value)
            .ok_or_else(|| format!("option \"{}\" has an invalid value", self.name))?;

        Ok(Leaf {
            name: self.name,
            focused: self.focused,
            value,
        })
    }
}

fn parse_leaf_value(option_type: OptionType, value: Value) -> Option<LeafValue> {
    let snowflake = |value: &Value| value.as_str().and_then(|s| s.parse::<Snowflake>().ok());

    Some(match option_type {
        OptionType::SubCommand | OptionType::SubCommandGroup => return None,
        OptionType::String => LeafValue::String(Box::from(value.as_str()?)),
        // autocomplete sends whatever the user has typed so far as a string
        OptionType::Integer => match value {
            Value::String(s) => LeafValue::String(s.into_boxed_str()),
            v => LeafValue::Integer(v.as_i64()?),
        },
        OptionType::Number => match value {
            Value::String(s) => LeafValue::String(s.into_boxed_str()),
            v => LeafValue::Number(v.as_f64()?),
        },
        OptionType::Boolean => LeafValue::Boolean(value.as_bool()?),
        OptionType::User => LeafValue::User(snowflake(&value)?),
        OptionType::Channel => LeafValue::Channel(snowflake(&value)?),
        OptionType::Role => LeafValue::Role(snowflake(&value)?),
        OptionType::Mentionable => LeafValue::Mentionable(snowflake(&value)?),
        OptionType::Attachment => LeafValue::Attachment(snowflake(&value)?),
    })
}

impl<'de> Deserialize<'de> for OptionNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawOption::deserialize(deserializer)?
            .into_node()
            .map_err(D::Error::custom)
    }
}
