mod channel;
pub use channel::{Channel, PartialChannel};

mod channel_type;
pub use channel_type::ChannelType;

mod permission_overwrite;
pub use permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};

pub mod message;

mod thread_metadata;
pub use thread_metadata::{ThreadArchiveDuration, ThreadMetadata};

mod permission;
pub use permission::Permission;
