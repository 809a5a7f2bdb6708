mod error;
pub use error::{Error, Result};

mod clock;
pub use clock::{Clock, TokioClock};

mod backend;
pub use backend::{HttpBackend, RawResponse, ReqwestBackend, Request};

pub mod ratelimit;

mod transport;
pub use transport::RateLimitedTransport;

mod client;
pub use client::{user_avatar_url, user_banner_url, RestClient};

pub mod payloads;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
