use crate::correlator::ResponseCorrelator;
use crate::{Dispatcher, InteractionContext};
use model::interaction::{Interaction, InteractionResponse, InteractionType};
use rest::RestClient;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// Services shared by every interaction chain.
pub struct Gateway {
    pub rest: Arc<RestClient>,
    pub correlator: ResponseCorrelator<InteractionContext>,
    pub dispatcher: Dispatcher,
}

impl Gateway {
    pub fn new(rest: Arc<RestClient>, dispatcher: Dispatcher) -> Self {
        Self {
            rest,
            correlator: ResponseCorrelator::new(),
            dispatcher,
        }
    }

    /// Runs the interaction on its own task. The receiver yields the first response the
    /// handler produces; it errors if the chain ends without responding.
    pub fn handle(self: &Arc<Self>, interaction: Interaction) -> oneshot::Receiver<InteractionResponse> {
        let (tx, rx) = oneshot::channel();
        let ctx = InteractionContext::new(interaction, Arc::clone(self), tx);

        let gateway = Arc::clone(self);
        tokio::spawn(async move { gateway.run(ctx).await });

        rx
    }

    async fn run(&self, ctx: InteractionContext) {
        if ctx.interaction.kind == InteractionType::ModalSubmit {
            if let Some(ctx) = self.correlator.publish(ctx) {
                debug!(
                    custom_id = ctx.interaction.custom_id().unwrap_or_default(),
                    "Dropping modal submission"
                );
            }
            return;
        }

        self.dispatcher.dispatch(&ctx).await;
    }
}
