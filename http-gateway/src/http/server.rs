use crate::http::response::ErrorResponse;
use crate::{Config, Error, Gateway};
use ed25519_dalek::Signature;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use warp::http::StatusCode;
use warp::reply::Json;
use warp::{Filter, Rejection};

pub struct Server {
    pub config: Config,
    pub gateway: Arc<Gateway>,
}

impl Server {
    pub fn new(config: Config, gateway: Arc<Gateway>) -> Server {
        Server { config, gateway }
    }

    pub async fn start(self) -> Result<(), Error> {
        let address: SocketAddr = self.config.server_addr.parse()?;

        let filter = Arc::new(self).filter_handle();

        info!(%address, "Listening for interactions");
        warp::serve(filter).run(address).await;

        Ok(())
    }

    pub fn filter_handle(
        self: Arc<Self>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::post()
            .and(warp::path("interactions"))
            .and(warp::path::end())
            .and(warp::any().map(move || self.clone()))
            .and(Server::parse_signature())
            .and(warp::header("x-signature-timestamp"))
            .and(warp::body::bytes())
            .and_then(super::handle)
            .with(warp::log("http_gateway"))
            .recover(|error: Rejection| async move {
                if let Some(err) = error.find::<Error>() {
                    let json: Json = ErrorResponse::from(err).into();

                    let status_code = match err {
                        err if err.is_signature_error() => StatusCode::UNAUTHORIZED,
                        Error::JsonError(..) => StatusCode::BAD_REQUEST,
                        _ => StatusCode::INTERNAL_SERVER_ERROR,
                    };

                    Ok(warp::reply::with_status(json, status_code))
                } else {
                    Err(error)
                }
            })
    }

    fn parse_signature() -> impl Filter<Extract = (Signature,), Error = warp::Rejection> + Clone {
        warp::header("x-signature-ed25519").and_then(|signature: String| async move {
            let mut bytes = [0u8; 64];
            if let Err(e) = hex::decode_to_slice(signature, &mut bytes) {
                return Err(warp::reject::custom(Error::InvalidSignatureFormat(e)));
            }

            Ok(Signature::new(bytes))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway_with, ACTOR};
    use crate::handlers;
    use crate::Dispatcher;
    use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signer};
    use serde_json::{json, Value};

    fn keypair() -> Keypair {
        let secret = SecretKey::from_bytes(&[7u8; 32]).unwrap();
        let public = PublicKey::from(&secret);
        Keypair { secret, public }
    }

    fn server(response_timeout_ms: u64) -> Arc<Server> {
        let (gateway, _backend) = gateway_with(handlers::register(Dispatcher::new(Vec::new())));

        let config = Config {
            server_addr: Box::from("127.0.0.1:0"),
            application_id: model::Snowflake(2),
            bot_token: Box::from("token"),
            public_key: keypair().public,
            owners: Vec::new(),
            api_base: Box::from(rest::DEFAULT_API_BASE),
            response_timeout_ms,
            sentry_dsn: None,
            json_log: false,
            debug_mode: false,
        };

        Arc::new(Server::new(config, gateway))
    }

    fn signed(body: &str, timestamp: &str) -> warp::test::RequestBuilder {
        let message = format!("{}{}", timestamp, body);
        let signature = keypair().sign(message.as_bytes());

        warp::test::request()
            .method("POST")
            .path("/interactions")
            .header("x-signature-ed25519", hex::encode(signature.to_bytes()))
            .header("x-signature-timestamp", timestamp)
            .body(body.to_owned())
    }

    #[tokio::test]
    async fn test_ping() {
        let body = r#"{"id":"1","application_id":"2","type":1,"token":"t","version":1}"#;
        let res = signed(body, "1700000000")
            .reply(&server(3000).filter_handle())
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(json, json!({"type": 1}));
    }

    #[tokio::test]
    async fn test_bad_signature() {
        let body = r#"{"id":"1","application_id":"2","type":1,"token":"t","version":1}"#;
        let res = signed(body, "1700000000")
            .header("x-signature-timestamp", "1700000001")
            .reply(&server(3000).filter_handle())
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_signature() {
        let res = warp::test::request()
            .method("POST")
            .path("/interactions")
            .header("x-signature-ed25519", "zz")
            .header("x-signature-timestamp", "1")
            .body("{}")
            .reply(&server(3000).filter_handle())
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let res = signed("{not json", "1700000000")
            .reply(&server(3000).filter_handle())
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_component_response_is_returned_inline() {
        let body = json!({
            "id": "10", "application_id": "2", "type": 3, "token": "tok",
            "user": {"id": ACTOR.to_string(), "username": "alice"},
            "data": {"custom_id": "b_example__42", "component_type": 2}
        })
        .to_string();

        let res = signed(&body, "1700000000")
            .reply(&server(3000).filter_handle())
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(json["type"], 4);
        assert_eq!(json["data"]["content"], "Example button");
    }

    #[tokio::test]
    async fn test_unknown_interaction_type_gets_ephemeral_error() {
        let body = json!({
            "id": "10", "application_id": "2", "type": 6, "token": "tok",
            "user": {"id": ACTOR.to_string(), "username": "alice"},
            "data": {"custom_id": "b_example__42"}
        })
        .to_string();

        let res = signed(&body, "1700000000")
            .reply(&server(3000).filter_handle())
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(json["type"], 4);
        assert_eq!(json["data"]["content"], "Invalid interaction type!");
        assert_eq!(json["data"]["flags"], 64);
    }

    #[tokio::test]
    async fn test_no_response_is_accepted() {
        let body = json!({
            "id": "10", "application_id": "2", "type": 3, "token": "tok",
            "user": {"id": ACTOR.to_string(), "username": "alice"},
            "data": {"custom_id": "unknown", "component_type": 2}
        })
        .to_string();

        let res = signed(&body, "1700000000")
            .reply(&server(3000).filter_handle())
            .await;

        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert!(res.body().is_empty());
    }
}
