mod interaction;
pub use interaction::{
    CommandData, ComponentData, Interaction, InteractionData, InteractionPayload, InteractionType,
    ModalField, ModalRow, ModalSubmitData, PingInteraction,
};

mod option;
pub use option::{Leaf, LeafValue, OptionGroup, OptionNode, OptionType, Subcommand};

mod resolved;
pub use resolved::ResolvedEntities;

mod component;
pub use component::{
    ActionRow, Button, ButtonStyle, Component, ComponentType, SelectDefaultValue,
    SelectDefaultValueType, SelectMenu, SelectOption, TextInput, TextInputStyle,
};

mod application_command;
pub use application_command::{
    ApplicationCommand, ApplicationCommandOptionChoice, ApplicationCommandType, CommandDefinition,
    CommandOptionDefinition,
};

mod interaction_response;
pub use interaction_response::{
    AttachmentReference, InteractionResponse, InteractionResponseType, MessageBody, Modal,
};
