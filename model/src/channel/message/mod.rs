mod message;
pub use message::{Attachment, Message, MessageFlags, MessageReference, MessageType};

pub mod embed;
pub use embed::Embed;

mod allowed_mentions;
pub use allowed_mentions::AllowedMentions;
