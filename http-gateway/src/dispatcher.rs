use crate::{InteractionContext, Result};
use async_trait::async_trait;
use futures::FutureExt;
use model::interaction::{CommandDefinition, InteractionType, MessageBody};
use model::Snowflake;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

const NO_PERMISSION_COMMAND: &str = "You don't have permission to use this command!";
const NO_PERMISSION_COMPONENT: &str = "You don't have permission to use this component!";
const INVALID_INTERACTION: &str = "Invalid interaction type!";

/// Separates the routing key of a component's custom id from handler specific data.
pub const CUSTOM_ID_SEPARATOR: &str = "__";

#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn definition(&self) -> CommandDefinition;

    /// Only owners may run privileged commands.
    fn privileged(&self) -> bool {
        false
    }

    /// Whether the command is listed by help.
    fn visible(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: &InteractionContext) -> Result<()>;

    async fn autocomplete(&self, ctx: &InteractionContext) -> Result<()> {
        ctx.autocomplete(Vec::new()).await;
        Ok(())
    }
}

#[async_trait]
pub trait ComponentHandler: Send + Sync {
    /// Key matched against the part of a custom id before the first `__`.
    fn custom_id(&self) -> &str;

    fn privileged(&self) -> bool {
        false
    }

    async fn execute(&self, ctx: &InteractionContext) -> Result<()>;
}

struct RegisteredCommand {
    name: Box<str>,
    handler: Arc<dyn CommandHandler>,
}

/// Routes interactions to the registered command and component handlers.
#[derive(Default)]
pub struct Dispatcher {
    owners: Vec<Snowflake>,
    commands: Vec<RegisteredCommand>,
    components: HashMap<Box<str>, Arc<dyn ComponentHandler>>,
}

impl Dispatcher {
    pub fn new(owners: Vec<Snowflake>) -> Self {
        Self {
            owners,
            ..Default::default()
        }
    }

    pub fn command(mut self, handler: impl CommandHandler + 'static) -> Self {
        let name = handler.definition().name;
        self.commands.retain(|c| c.name != name);
        self.commands.push(RegisteredCommand {
            name,
            handler: Arc::new(handler),
        });
        self
    }

    pub fn component(mut self, handler: impl ComponentHandler + 'static) -> Self {
        self.components
            .insert(Box::from(handler.custom_id()), Arc::new(handler));
        self
    }

    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owners.contains(&user_id)
    }

    /// Registered commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &dyn CommandHandler> {
        self.commands.iter().map(|c| c.handler.as_ref())
    }

    pub fn command_definitions(&self) -> Vec<CommandDefinition> {
        self.commands().map(|c| c.definition()).collect()
    }

    fn find_command(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.commands
            .iter()
            .find(|c| &*c.name == name)
            .map(|c| &c.handler)
    }

    /// Runs the handler for `ctx`. Handler errors and panics stop here and are answered
    /// with an ephemeral error message.
    pub async fn dispatch(&self, ctx: &InteractionContext) {
        let message = match AssertUnwindSafe(self.route(ctx)).catch_unwind().await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => {
                error!(
                    error = %e,
                    interaction_id = %ctx.interaction.id,
                    kind = ?ctx.interaction.kind,
                    "Handler returned an error"
                );
                e.to_string()
            }
            Err(panic) => {
                let message = panic_message(&*panic);
                error!(
                    panic = %message,
                    interaction_id = %ctx.interaction.id,
                    kind = ?ctx.interaction.kind,
                    "Handler panicked"
                );
                message
            }
        };

        let body = MessageBody::content(error_message(&message));
        if ctx.has_responded() {
            ctx.follow_up(body, true).await;
        } else {
            ctx.reply(body, true).await;
        }
    }

    async fn route(&self, ctx: &InteractionContext) -> Result<()> {
        let actor = ctx.interaction.actor_id();

        match ctx.interaction.kind {
            InteractionType::ApplicationCommand | InteractionType::ApplicationCommandAutoComplete => {
                let name = ctx.interaction.command_name().unwrap_or_default();

                let handler = match self.find_command(name) {
                    Some(handler) => handler,
                    None => {
                        error!(command = name, "No handler found for command");
                        return Ok(());
                    }
                };

                if handler.privileged() && !self.is_owner(actor) {
                    info!(command = name, %actor, "Denied privileged command");
                    ctx.reply(MessageBody::content(NO_PERMISSION_COMMAND), true)
                        .await;
                    return Ok(());
                }

                if ctx.interaction.kind == InteractionType::ApplicationCommandAutoComplete {
                    handler.autocomplete(ctx).await
                } else {
                    handler.execute(ctx).await
                }
            }

            InteractionType::MessageComponent => {
                let custom_id = match ctx.interaction.custom_id() {
                    Some(custom_id) => custom_id,
                    None => {
                        error!(interaction_id = %ctx.interaction.id, "Component interaction has no custom id");
                        return Ok(());
                    }
                };

                let key = custom_id
                    .split(CUSTOM_ID_SEPARATOR)
                    .next()
                    .unwrap_or(custom_id);

                let handler = match self.components.get(key) {
                    Some(handler) => handler,
                    None => return Ok(()),
                };

                if handler.privileged() && !self.is_owner(actor) {
                    info!(component = key, %actor, "Denied privileged component");
                    ctx.reply(MessageBody::content(NO_PERMISSION_COMPONENT), true)
                        .await;
                    return Ok(());
                }

                handler.execute(ctx).await
            }

            InteractionType::Ping | InteractionType::ModalSubmit | InteractionType::Unknown(_) => {
                ctx.reply(MessageBody::content(INVALID_INTERACTION), true)
                    .await;
                Ok(())
            }
        }
    }
}

fn error_message(error: &str) -> String {
    format!(
        "There was an error while executing this command!\n```ansi\n\u{1b}[1;31m{}\n```",
        error
    )
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{command, component, gateway_with, with_actor};
    use crate::Error;
    use model::interaction::{InteractionResponse, InteractionResponseType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    #[derive(Clone, Default)]
    struct Counter(Arc<AtomicUsize>);

    impl Counter {
        fn get(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct Button {
        calls: Counter,
        privileged: bool,
    }

    #[async_trait]
    impl ComponentHandler for Button {
        fn custom_id(&self) -> &str {
            "b_example"
        }

        fn privileged(&self) -> bool {
            self.privileged
        }

        async fn execute(&self, ctx: &InteractionContext) -> Result<()> {
            self.calls.0.fetch_add(1, Ordering::SeqCst);
            ctx.reply(MessageBody::content("Example button"), false).await;
            Ok(())
        }
    }

    struct Failing {
        panic: bool,
    }

    #[async_trait]
    impl CommandHandler for Failing {
        fn definition(&self) -> CommandDefinition {
            CommandDefinition::chat_input("fail", "Always fails")
        }

        async fn execute(&self, _ctx: &InteractionContext) -> Result<()> {
            if self.panic {
                panic!("boom");
            }
            Err(Error::custom("database unavailable"))
        }
    }

    struct Secret;

    #[async_trait]
    impl CommandHandler for Secret {
        fn definition(&self) -> CommandDefinition {
            CommandDefinition::chat_input("secret", "Owners only")
        }

        fn privileged(&self) -> bool {
            true
        }

        async fn execute(&self, ctx: &InteractionContext) -> Result<()> {
            ctx.reply(MessageBody::content("ok"), true).await;
            Ok(())
        }
    }

    fn button(calls: &Counter, privileged: bool) -> Button {
        Button {
            calls: calls.clone(),
            privileged,
        }
    }

    async fn run(dispatcher: Dispatcher, interaction: model::interaction::Interaction) -> Option<InteractionResponse> {
        let (gateway, _backend) = gateway_with(dispatcher);
        let (tx, rx) = oneshot::channel();
        let ctx = InteractionContext::new(interaction, gateway.clone(), tx);

        gateway.dispatcher.dispatch(&ctx).await;
        drop(ctx);
        rx.await.ok()
    }

    fn content(response: &InteractionResponse) -> String {
        serde_json::to_value(response).unwrap()["data"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_owned()
    }

    #[tokio::test]
    async fn test_component_routed_by_prefix() {
        let calls = Counter::default();
        let dispatcher = Dispatcher::new(Vec::new()).component(button(&calls, false));

        let response = run(dispatcher, component("b_example__42")).await.unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(content(&response), "Example button");
    }

    #[tokio::test]
    async fn test_unknown_component_is_ignored() {
        let calls = Counter::default();
        let dispatcher = Dispatcher::new(Vec::new()).component(button(&calls, false));

        assert!(run(dispatcher, component("other__1")).await.is_none());
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn test_unknown_command_is_not_answered() {
        assert!(run(Dispatcher::new(Vec::new()), command("nope")).await.is_none());
    }

    #[tokio::test]
    async fn test_privileged_component_denied() {
        let calls = Counter::default();
        let dispatcher = Dispatcher::new(vec![Snowflake(1)]).component(button(&calls, true));

        let response = run(dispatcher, component("b_example")).await.unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(content(&response), NO_PERMISSION_COMPONENT);
    }

    #[tokio::test]
    async fn test_privileged_command_gate() {
        let denied = run(Dispatcher::new(vec![Snowflake(1)]).command(Secret), command("secret"))
            .await
            .unwrap();
        assert_eq!(content(&denied), NO_PERMISSION_COMMAND);

        let allowed = run(
            Dispatcher::new(vec![Snowflake(1)]).command(Secret),
            with_actor(command("secret"), 1),
        )
        .await
        .unwrap();
        assert_eq!(content(&allowed), "ok");
    }

    #[tokio::test]
    async fn test_handler_error_is_reported() {
        let dispatcher = Dispatcher::new(Vec::new()).command(Failing { panic: false });
        let response = run(dispatcher, command("fail")).await.unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"]["flags"], 64);
        assert_eq!(
            content(&response),
            "There was an error while executing this command!\n```ansi\n\u{1b}[1;31mdatabase unavailable\n```"
        );
    }

    #[tokio::test]
    async fn test_handler_panic_is_caught() {
        let dispatcher = Dispatcher::new(Vec::new()).command(Failing { panic: true });
        let response = run(dispatcher, command("fail")).await.unwrap();

        assert_eq!(response.response_type(), InteractionResponseType::ChannelMessageWithSource);
        assert!(content(&response).contains("boom"));
    }

    #[tokio::test]
    async fn test_unknown_interaction_type_is_rejected() {
        let mut interaction = command("help");
        interaction.kind = InteractionType::Unknown(6);
        interaction.data = model::interaction::InteractionData::Unknown(serde_json::Value::Null);

        let response = run(Dispatcher::new(Vec::new()), interaction).await.unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"]["flags"], 64);
        assert_eq!(content(&response), INVALID_INTERACTION);
    }

    #[test]
    fn test_registration_order_and_replacement() {
        let dispatcher = Dispatcher::new(Vec::new())
            .command(Secret)
            .command(Failing { panic: false })
            .command(Secret);

        let names: Vec<_> = dispatcher
            .command_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec![Box::from("fail"), Box::from("secret")]);
    }
}
