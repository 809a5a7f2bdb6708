use super::EMBED_COLOR;
use crate::{CommandHandler, InteractionContext, Result};
use async_trait::async_trait;
use model::channel::message::embed::{EmbedAuthor, EmbedFooter, EmbedMedia};
use model::channel::message::Embed;
use model::interaction::{CommandDefinition, MessageBody};
use model::user::User;
use rest::user_avatar_url;

pub struct Help;

#[async_trait]
impl CommandHandler for Help {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::chat_input("help", "Gives a list of my commands")
    }

    async fn execute(&self, ctx: &InteractionContext) -> Result<()> {
        let bot = ctx.rest().get_current_user().await;

        let description = ctx
            .gateway()
            .dispatcher
            .commands()
            .filter(|command| command.visible() && !command.privileged())
            .map(|command| {
                let definition = command.definition();
                format!("`/{}`: {}", definition.name, definition.description)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let embed = help_embed(bot.as_ref(), ctx.user(), description);
        ctx.reply(MessageBody::embed(embed), false).await;

        Ok(())
    }
}

fn avatar(user: &User) -> Box<str> {
    user_avatar_url(user.id, user.avatar).into_boxed_str()
}

fn help_embed(bot: Option<&User>, requester: &User, description: String) -> Embed {
    Embed {
        description: Some(description.into_boxed_str()),
        color: Some(EMBED_COLOR),
        author: bot.map(|bot| EmbedAuthor {
            name: Box::from(bot.display_name()),
            url: None,
            icon_url: Some(avatar(bot)),
        }),
        thumbnail: bot.map(|bot| EmbedMedia {
            url: avatar(bot),
            height: None,
            width: None,
        }),
        footer: Some(EmbedFooter {
            text: Box::from(requester.display_name()),
            icon_url: Some(avatar(requester)),
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{command, gateway_with};
    use crate::Dispatcher;
    use tokio::sync::oneshot;

    struct Hidden;

    #[async_trait]
    impl CommandHandler for Hidden {
        fn definition(&self) -> CommandDefinition {
            CommandDefinition::chat_input("hidden", "Not listed")
        }

        fn visible(&self) -> bool {
            false
        }

        async fn execute(&self, _ctx: &InteractionContext) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_lists_visible_commands() {
        let (gateway, _backend) = gateway_with(Dispatcher::new(Vec::new()).command(Help).command(Hidden));
        let (tx, rx) = oneshot::channel();
        let ctx = InteractionContext::new(command("help"), gateway.clone(), tx);

        gateway.dispatcher.dispatch(&ctx).await;

        let json = serde_json::to_value(rx.await.unwrap()).unwrap();
        let embed = &json["data"]["embeds"][0];

        assert_eq!(embed["description"], "`/help`: Gives a list of my commands");
        assert_eq!(embed["footer"]["text"], "Alice");
        // the bot user could not be fetched
        assert!(embed.get("author").is_none());
        assert!(json["data"].get("flags").is_none());
    }

    #[test]
    fn test_embed_uses_bot_identity() {
        let bot: User = serde_json::from_str(r#"{"id":"2","username":"tickets"}"#).unwrap();
        let user: User = serde_json::from_str(r#"{"id":"7","username":"alice"}"#).unwrap();

        let embed = help_embed(Some(&bot), &user, String::new());

        assert_eq!(embed.author.map(|a| a.name), Some(Box::from("tickets")));
        assert!(embed.thumbnail.is_some());
        assert_eq!(embed.footer.map(|f| f.text), Some(Box::from("alice")));
    }
}
