mod user;
pub use user::{PremiumType, User};
