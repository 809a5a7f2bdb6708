use crate::correlator::{ModalSubmission, MODAL_TIMEOUT};
use crate::options::{self, ResolvedOptions};
use crate::Gateway;
use model::channel::message::Message;
use model::interaction::{
    ApplicationCommandOptionChoice, Interaction, InteractionResponse, InteractionType, MessageBody,
    Modal,
};
use model::user::User;
use model::Snowflake;
use parking_lot::Mutex;
use rest::RestClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// Everything a handler needs to answer one interaction.
///
/// The first response is handed back to the webhook request that delivered the
/// interaction. Anything after that, or a response sent once the webhook gave up
/// waiting, goes through the callback endpoint instead.
pub struct InteractionContext {
    pub interaction: Interaction,
    pub options: ResolvedOptions,
    gateway: Arc<Gateway>,
    initial: Mutex<Option<oneshot::Sender<InteractionResponse>>>,
    responded: AtomicBool,
}

impl InteractionContext {
    pub fn new(
        interaction: Interaction,
        gateway: Arc<Gateway>,
        initial: oneshot::Sender<InteractionResponse>,
    ) -> Self {
        let options = options::resolve_interaction(&interaction);

        Self {
            interaction,
            options,
            gateway,
            initial: Mutex::new(Some(initial)),
            responded: AtomicBool::new(false),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn rest(&self) -> &RestClient {
        &self.gateway.rest
    }

    pub fn user(&self) -> &User {
        &self.interaction.user
    }

    pub fn is_owner(&self) -> bool {
        self.gateway
            .dispatcher
            .is_owner(self.interaction.actor_id())
    }

    pub fn has_responded(&self) -> bool {
        self.responded.load(Ordering::Acquire)
    }

    pub async fn respond(&self, response: InteractionResponse) -> Option<()> {
        self.responded.store(true, Ordering::Release);

        let sender = self.initial.lock().take();
        let response = match sender {
            Some(sender) => match sender.send(response) {
                Ok(()) => return Some(()),
                Err(response) => {
                    debug!(
                        interaction_id = %self.interaction.id,
                        "Webhook stopped waiting, sending response through the callback endpoint"
                    );
                    response
                }
            },
            None => response,
        };

        self.rest()
            .create_interaction_response(self.interaction.id, &self.interaction.token, &response)
            .await
    }

    /// Sends a message response and fetches the message it created.
    async fn respond_with_message(&self, response: InteractionResponse) -> Option<Message> {
        self.respond(response).await?;
        self.rest()
            .get_original_response(&self.interaction.token)
            .await
    }

    pub async fn reply(&self, body: MessageBody, ephemeral: bool) -> Option<Message> {
        let body = body.ephemeral(ephemeral);
        self.respond_with_message(InteractionResponse::new_channel_message_with_source(body))
            .await
    }

    /// Edits the message the component was attached to.
    pub async fn update(&self, body: MessageBody) -> Option<Message> {
        self.respond_with_message(InteractionResponse::new_update_message(body))
            .await
    }

    pub async fn defer_reply(&self, ephemeral: bool) -> Option<Message> {
        self.respond_with_message(InteractionResponse::new_deferred_message_with_source(
            ephemeral,
        ))
        .await
    }

    pub async fn defer_update(&self) -> Option<()> {
        self.respond(InteractionResponse::new_deferred_message_update())
            .await
    }

    pub async fn autocomplete(&self, choices: Vec<ApplicationCommandOptionChoice>) -> Option<()> {
        self.respond(InteractionResponse::new_auto_complete_result(choices))
            .await
    }

    /// Opens `modal` and waits for the invoking user to submit it.
    ///
    /// Returns the submission's own context, or `None` if the modal could not be opened
    /// or was not submitted in time.
    pub async fn modal(&self, modal: Modal) -> Option<InteractionContext> {
        let pending = self
            .gateway
            .correlator
            .subscribe(&modal.custom_id, self.interaction.actor_id());

        self.respond(InteractionResponse::new_modal(modal)).await?;
        pending.wait(MODAL_TIMEOUT).await
    }

    pub async fn edit_reply(&self, body: &MessageBody) -> Option<Message> {
        self.rest()
            .edit_original_response(&self.interaction.token, body)
            .await
    }

    pub async fn follow_up(&self, body: MessageBody, ephemeral: bool) -> Option<Message> {
        let body = body.ephemeral(ephemeral);
        self.rest()
            .create_followup(&self.interaction.token, &body)
            .await
    }
}

impl ModalSubmission for InteractionContext {
    fn submission_key(&self) -> Option<(&str, Snowflake)> {
        match self.interaction.kind {
            InteractionType::ModalSubmit => self
                .interaction
                .custom_id()
                .map(|custom_id| (custom_id, self.interaction.actor_id())),
            _ => None,
        }
    }
}
