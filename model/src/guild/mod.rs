mod guild;
pub use guild::{Guild, PartialGuild};

mod role;
pub use role::{Role, RoleTags};

mod member;
pub use member::{Member, PartialMember};
