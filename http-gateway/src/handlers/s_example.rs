use crate::{ComponentHandler, InteractionContext, Result};
use async_trait::async_trait;
use model::interaction::{InteractionData, MessageBody};

pub struct ExampleSelect;

#[async_trait]
impl ComponentHandler for ExampleSelect {
    fn custom_id(&self) -> &str {
        "s_example"
    }

    async fn execute(&self, ctx: &InteractionContext) -> Result<()> {
        let choice = match &ctx.interaction.data {
            InteractionData::Component(data) => data.values.first().map(|v| &**v),
            _ => None,
        };

        let content = format!("You choose {}", choice.unwrap_or_default());
        ctx.reply(MessageBody::content(content), false).await;
        Ok(())
    }
}
