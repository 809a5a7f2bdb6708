use crate::channel::ChannelType;
use crate::Snowflake;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum Component {
    ActionRow(ActionRow),
    Button(Button),
    SelectMenu(SelectMenu),
    TextInput(TextInput),
    /// Layout components this crate does not model are carried through untouched.
    Other(Value),
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum ComponentType {
    ActionRow = 1,
    Button = 2,
    StringSelect = 3,
    TextInput = 4,
    UserSelect = 5,
    RoleSelect = 6,
    MentionableSelect = 7,
    ChannelSelect = 8,
    Section = 9,
    TextDisplay = 10,
    Thumbnail = 11,
    MediaGallery = 12,
    File = 13,
    Separator = 14,
    Container = 17,
    Label = 18,
    FileUpload = 19,
}

impl ComponentType {
    pub fn is_select(&self) -> bool {
        matches!(
            self,
            ComponentType::StringSelect
                | ComponentType::UserSelect
                | ComponentType::RoleSelect
                | ComponentType::MentionableSelect
                | ComponentType::ChannelSelect
        )
    }
}

impl TryFrom<u64> for ComponentType {
    type Error = Box<str>;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::ActionRow,
            2 => Self::Button,
            3 => Self::StringSelect,
            4 => Self::TextInput,
            5 => Self::UserSelect,
            6 => Self::RoleSelect,
            7 => Self::MentionableSelect,
            8 => Self::ChannelSelect,
            9 => Self::Section,
            10 => Self::TextDisplay,
            11 => Self::Thumbnail,
            12 => Self::MediaGallery,
            13 => Self::File,
            14 => Self::Separator,
            17 => Self::Container,
            18 => Self::Label,
            19 => Self::FileUpload,
            _ => return Err(format!("invalid component type \"{}\"", value).into_boxed_str()),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActionRow {
    pub r#type: ComponentType,
    pub components: Vec<Component>,
}

impl ActionRow {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            r#type: ComponentType::ActionRow,
            components,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Button {
    pub r#type: ComponentType,
    pub style: ButtonStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Box<str>>,
    #[serde(default)]
    pub disabled: bool,
}

impl Button {
    pub fn new(style: ButtonStyle, custom_id: impl Into<Box<str>>, label: impl Into<Box<str>>) -> Self {
        Self {
            r#type: ComponentType::Button,
            style,
            label: Some(label.into()),
            custom_id: Some(custom_id.into()),
            url: None,
            disabled: false,
        }
    }

    pub fn link(url: impl Into<Box<str>>, label: impl Into<Box<str>>) -> Self {
        Self {
            r#type: ComponentType::Button,
            style: ButtonStyle::Link,
            label: Some(label.into()),
            custom_id: None,
            url: Some(url.into()),
            disabled: false,
        }
    }
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum ButtonStyle {
    Primary = 1,
    Secondary = 2,
    Success = 3,
    Danger = 4,
    Link = 5,
    Premium = 6,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SelectMenu {
    pub r#type: ComponentType,
    pub custom_id: Box<str>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_values: Vec<SelectDefaultValue>,
    #[serde(default = "one")]
    pub min_values: u8,
    #[serde(default = "one")]
    pub max_values: u8,
    #[serde(default)]
    pub disabled: bool,
}

impl SelectMenu {
    /// `select_type` must be one of the five select component types.
    pub fn new(select_type: ComponentType, custom_id: impl Into<Box<str>>) -> Self {
        Self {
            r#type: select_type,
            custom_id: custom_id.into(),
            options: Vec::new(),
            channel_types: Vec::new(),
            placeholder: None,
            default_values: Vec::new(),
            min_values: 1,
            max_values: 1,
            disabled: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SelectOption {
    pub label: Box<str>,
    pub value: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
    #[serde(default)]
    pub default: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SelectDefaultValue {
    pub id: Snowflake,
    pub r#type: SelectDefaultValueType,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelectDefaultValueType {
    User,
    Role,
    Channel,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TextInput {
    pub r#type: ComponentType,
    pub custom_id: Box<str>,
    pub style: TextInputStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl TextInput {
    pub fn new(
        custom_id: impl Into<Box<str>>,
        style: TextInputStyle,
        label: impl Into<Box<str>>,
    ) -> Self {
        Self {
            r#type: ComponentType::TextInput,
            custom_id: custom_id.into(),
            style,
            label: Some(label.into()),
            placeholder: None,
            value: None,
            min_length: None,
            max_length: None,
            required: None,
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize_repr, Serialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum TextInputStyle {
    Short = 1,
    Paragraph = 2,
}

fn one() -> u8 {
    1
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        let component_type = value
            .get("type")
            .and_then(Value::as_u64)
            .ok_or_else(|| Box::from("component type was not an integer"))
            .and_then(ComponentType::try_from);

        let component = match component_type {
            Ok(ComponentType::ActionRow) => serde_json::from_value(value).map(Component::ActionRow),
            Ok(ComponentType::Button) => serde_json::from_value(value).map(Component::Button),
            Ok(ComponentType::TextInput) => serde_json::from_value(value).map(Component::TextInput),
            Ok(t) if t.is_select() => serde_json::from_value(value).map(Component::SelectMenu),
            _ => Ok(Component::Other(value)),
        }
        .map_err(D::Error::custom)?;

        Ok(component)
    }
}
