//! Builders shared by the unit tests.

use crate::{Dispatcher, Gateway};
use async_trait::async_trait;
use model::interaction::Interaction;
use model::Snowflake;
use parking_lot::Mutex;
use rest::{HttpBackend, RawResponse, Request, RestClient};
use serde_json::json;
use std::sync::Arc;

pub const ACTOR: u64 = 7;

/// Backend that records every call and fails it.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl HttpBackend for RecordingBackend {
    async fn execute(&self, request: Request) -> rest::Result<RawResponse> {
        self.calls
            .lock()
            .push((request.method.to_string(), request.path.to_string()));
        Err(rest::Error::Network("offline".into()))
    }
}

pub fn gateway_with(dispatcher: Dispatcher) -> (Arc<Gateway>, Arc<RecordingBackend>) {
    let backend = Arc::new(RecordingBackend::default());
    let rest = RestClient::with_backend(backend.clone(), "token", Snowflake(2)).unwrap();
    (Arc::new(Gateway::new(Arc::new(rest), dispatcher)), backend)
}

pub fn gateway(owners: Vec<Snowflake>) -> (Arc<Gateway>, Arc<RecordingBackend>) {
    gateway_with(Dispatcher::new(owners))
}

fn interaction(kind: u8, data: serde_json::Value) -> Interaction {
    serde_json::from_value(json!({
        "id": "10",
        "application_id": "2",
        "type": kind,
        "token": "tok",
        "guild_id": "3",
        "channel_id": "4",
        "member": {
            "user": {"id": ACTOR.to_string(), "username": "alice", "global_name": "Alice"},
            "roles": []
        },
        "data": data
    }))
    .unwrap()
}

pub fn command(name: &str) -> Interaction {
    interaction(2, json!({"id": "99", "name": name, "type": 1}))
}

pub fn component(custom_id: &str) -> Interaction {
    interaction(3, json!({"custom_id": custom_id, "component_type": 2}))
}

pub fn select(custom_id: &str, values: &[&str]) -> Interaction {
    interaction(
        3,
        json!({"custom_id": custom_id, "component_type": 3, "values": values}),
    )
}

pub fn modal_submit(custom_id: &str, field: &str, value: &str) -> Interaction {
    interaction(
        5,
        json!({"custom_id": custom_id, "components": [
            {"type": 1, "components": [{"type": 4, "custom_id": field, "value": value}]}
        ]}),
    )
}

pub fn with_actor(mut interaction: Interaction, actor: u64) -> Interaction {
    interaction.user.id = Snowflake(actor);
    interaction
}
