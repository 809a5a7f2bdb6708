use crate::{ComponentHandler, InteractionContext, Result};
use async_trait::async_trait;
use model::interaction::MessageBody;

pub struct ExampleButton;

#[async_trait]
impl ComponentHandler for ExampleButton {
    fn custom_id(&self) -> &str {
        "b_example"
    }

    async fn execute(&self, ctx: &InteractionContext) -> Result<()> {
        ctx.reply(MessageBody::content("Example button"), false)
            .await;
        Ok(())
    }
}
