use crate::Result;
use ed25519_dalek::PublicKey;
use model::Snowflake;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

#[derive(Deserialize, Debug)]
pub struct Config {
    pub server_addr: Box<str>,
    pub application_id: Snowflake,
    pub bot_token: Box<str>,
    #[serde(deserialize_with = "deserialize_public_key")]
    pub public_key: PublicKey,
    /// Users allowed to run privileged commands and components.
    #[serde(default)]
    pub owners: Vec<Snowflake>,
    #[serde(default = "default_api_base")]
    pub api_base: Box<str>,
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    pub sentry_dsn: Option<String>,
    #[serde(default)]
    pub json_log: bool,
    #[serde(default)]
    pub debug_mode: bool,
}

impl Config {
    pub fn from_envvar() -> Result<Config> {
        envy::from_env().map_err(Into::into)
    }

    /// How long the webhook waits for a handler's first response before answering 202.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

fn default_api_base() -> Box<str> {
    Box::from(rest::DEFAULT_API_BASE)
}

fn default_response_timeout_ms() -> u64 {
    3000
}

fn deserialize_public_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PublicKey, D::Error> {
    let key = String::deserialize(deserializer)?;

    let mut bytes = [0u8; 32];
    hex::decode_to_slice(key.trim_end_matches('\r'), &mut bytes).map_err(D::Error::custom)?;

    PublicKey::from_bytes(&bytes).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SecretKey;

    fn public_key_hex() -> String {
        let secret = SecretKey::from_bytes(&[7u8; 32]).unwrap();
        hex::encode(PublicKey::from(&secret).as_bytes())
    }

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            ("SERVER_ADDR".to_owned(), "0.0.0.0:8080".to_owned()),
            ("APPLICATION_ID".to_owned(), "42".to_owned()),
            ("BOT_TOKEN".to_owned(), "token".to_owned()),
            ("PUBLIC_KEY".to_owned(), public_key_hex()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        vars
    }

    #[test]
    fn test_defaults() {
        let config: Config = envy::from_iter(vars(&[])).unwrap();

        assert_eq!(config.application_id, Snowflake(42));
        assert!(config.owners.is_empty());
        assert_eq!(&*config.api_base, "https://discord.com/api/v10");
        assert_eq!(config.response_timeout(), Duration::from_secs(3));
        assert!(!config.json_log);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_owner_list() {
        let config: Config = envy::from_iter(vars(&[("OWNERS", "1,2")])).unwrap();
        assert_eq!(config.owners, vec![Snowflake(1), Snowflake(2)]);
    }

    #[test]
    fn test_invalid_public_key() {
        let mut vars = vars(&[]);
        vars[3].1 = "not hex".to_owned();

        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
