use serde::Serializer;
use std::fmt::Debug;
use warp::reject::Reject;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid ed25519 signature: {0}")]
    InvalidSignatureFormat(#[from] hex::FromHexError),

    #[error("invalid ed25519 signature: {0}")]
    InvalidSignature(#[from] ed25519_dalek::SignatureError),

    #[error("error while decoding json payload: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("error while loading config: {0}")]
    EnvyError(#[from] envy::Error),

    #[error("invalid server address: {0}")]
    AddrParseError(#[from] std::net::AddrParseError),

    #[error("error while building rest client: {0}")]
    RestError(#[from] rest::Error),

    #[cfg(feature = "use-sentry")]
    #[error("invalid sentry dsn: {0}")]
    DsnError(#[from] sentry::types::ParseDsnError),

    #[error("{0}")]
    Custom(Box<str>),
}

impl Error {
    pub fn custom(msg: impl Into<Box<str>>) -> Self {
        Error::Custom(msg.into())
    }

    pub fn is_signature_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidSignature(..) | Error::InvalidSignatureFormat(..)
        )
    }
}

impl Reject for Error {}

impl<T> From<Error> for Result<T, Error> {
    fn from(e: Error) -> Self {
        Err(e)
    }
}

impl serde::Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
