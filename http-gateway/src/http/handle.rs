use crate::http::Server;
use crate::Error;
use ed25519_dalek::{PublicKey, Signature, Verifier};
use model::interaction::{InteractionPayload, InteractionResponse};
use std::sync::Arc;
use tracing::debug;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{reply::Response, Rejection, Reply};

pub async fn handle(
    server: Arc<Server>,
    signature: Signature,
    timestamp: String,
    body: Bytes,
) -> Result<Response, Rejection> {
    verify(&server.config.public_key, &signature, &timestamp, &body)?;

    let payload = InteractionPayload::parse(&body[..]).map_err(Error::JsonError)?;

    let interaction = match payload {
        InteractionPayload::Ping(_) => {
            let response = InteractionResponse::new_pong();
            return Ok(warp::reply::json(&response).into_response());
        }
        InteractionPayload::Interaction(interaction) => interaction,
    };

    let interaction_id = interaction.id;
    let rx = server.gateway.handle(*interaction);

    match tokio::time::timeout(server.config.response_timeout(), rx).await {
        Ok(Ok(response)) => Ok(warp::reply::json(&response).into_response()),
        Ok(Err(_)) => {
            debug!(%interaction_id, "Interaction finished without an initial response");
            Ok(StatusCode::ACCEPTED.into_response())
        }
        Err(_) => {
            debug!(%interaction_id, "Timed out waiting for the initial response");
            Ok(StatusCode::ACCEPTED.into_response())
        }
    }
}

fn verify(
    public_key: &PublicKey,
    signature: &Signature,
    timestamp: &str,
    body: &[u8],
) -> Result<(), Error> {
    let body_with_timestamp: Vec<u8> = timestamp
        .as_bytes()
        .iter()
        .copied()
        .chain(body.iter().copied())
        .collect();

    public_key
        .verify(&body_with_timestamp[..], signature)
        .map_err(Error::InvalidSignature)
}
