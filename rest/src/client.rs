use crate::backend::{HttpBackend, RawResponse, ReqwestBackend, Request};
use crate::payloads::{
    CreateChannel, CreateMessage, CreateRole, CreateThread, CreateThreadFromMessage,
    EditChannelOverwrite, UpdateChannel, UpdateRole, UpdateThread,
};
use crate::{RateLimitedTransport, Result};
use model::channel::message::Message;
use model::channel::Channel;
use model::guild::{Guild, Member, PartialGuild, Role};
use model::interaction::{ApplicationCommand, CommandDefinition, InteractionResponse, MessageBody};
use model::user::User;
use model::{ImageHash, Snowflake};
use parking_lot::Mutex;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{error, warn};

const AUDIT_LOG_REASON_HEADER: &str = "x-audit-log-reason";
const CDN_BASE: &str = "https://cdn.discordapp.com";

const GUILD_PAGE_SIZE: usize = 200;
const MEMBER_PAGE_SIZE: usize = 1000;

/// Typed access to the REST API on top of [`RateLimitedTransport`].
///
/// Every operation logs and swallows failures: callers get `None` for a failed network
/// call, a non-success status or an undecodable body.
pub struct RestClient {
    transport: RateLimitedTransport,
    authorization: HeaderValue,
    application_id: Snowflake,
    users: Cache<Snowflake, User>,
    guilds: Cache<Snowflake, Guild>,
    channels: Cache<Snowflake, Channel>,
    members: Cache<(Snowflake, Snowflake), Member>,
}

struct Cache<K, V>(Mutex<HashMap<K, V>>);

impl<K: Eq + Hash, V: Clone> Cache<K, V> {
    fn new() -> Self {
        Cache(Mutex::new(HashMap::new()))
    }

    fn get(&self, key: &K) -> Option<V> {
        self.0.lock().get(key).cloned()
    }

    fn insert(&self, key: K, value: V) {
        self.0.lock().insert(key, value);
    }

    fn remove(&self, key: &K) {
        self.0.lock().remove(key);
    }
}

impl RestClient {
    pub fn new(api_base: &str, token: &str, application_id: Snowflake) -> Result<RestClient> {
        let backend = ReqwestBackend::new(api_base)?;
        RestClient::with_transport(
            RateLimitedTransport::new(Arc::new(backend)),
            token,
            application_id,
        )
    }

    pub fn with_backend(
        backend: Arc<dyn HttpBackend>,
        token: &str,
        application_id: Snowflake,
    ) -> Result<RestClient> {
        RestClient::with_transport(RateLimitedTransport::new(backend), token, application_id)
    }

    pub fn with_transport(
        transport: RateLimitedTransport,
        token: &str,
        application_id: Snowflake,
    ) -> Result<RestClient> {
        let mut authorization = HeaderValue::from_str(&format!("Bot {}", token))?;
        authorization.set_sensitive(true);

        Ok(RestClient {
            transport,
            authorization,
            application_id,
            users: Cache::new(),
            guilds: Cache::new(),
            channels: Cache::new(),
            members: Cache::new(),
        })
    }

    pub fn application_id(&self) -> Snowflake {
        self.application_id
    }

    pub fn transport(&self) -> &RateLimitedTransport {
        &self.transport
    }

    // users

    pub async fn get_user(&self, user_id: Snowflake) -> Option<User> {
        if let Some(user) = self.users.get(&user_id) {
            return Some(user);
        }

        let user: User = self
            .call("get_user", self.request(Method::GET, format!("/users/{}", user_id)))
            .await?;

        self.users.insert(user_id, user.clone());
        Some(user)
    }

    pub async fn get_current_user(&self) -> Option<User> {
        self.call("get_current_user", self.request(Method::GET, "/users/@me"))
            .await
    }

    // guilds

    pub async fn get_guild(&self, guild_id: Snowflake) -> Option<Guild> {
        if let Some(guild) = self.guilds.get(&guild_id) {
            return Some(guild);
        }

        let guild: Guild = self
            .call("get_guild", self.request(Method::GET, format!("/guilds/{}", guild_id)))
            .await?;

        self.guilds.insert(guild_id, guild.clone());
        Some(guild)
    }

    /// All guilds the bot is in, fetched in pages of 200.
    pub async fn get_guilds(&self) -> Option<Vec<PartialGuild>> {
        self.paginate("get_guilds", "/users/@me/guilds", GUILD_PAGE_SIZE, |guild: &PartialGuild| {
            Some(guild.id)
        })
        .await
    }

    pub async fn get_member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        if let Some(member) = self.members.get(&(guild_id, user_id)) {
            return Some(member);
        }

        let member: Member = self
            .call(
                "get_member",
                self.request(
                    Method::GET,
                    format!("/guilds/{}/members/{}", guild_id, user_id),
                ),
            )
            .await?;

        self.members.insert((guild_id, user_id), member.clone());
        Some(member)
    }

    /// All members of a guild, fetched in pages of 1000.
    pub async fn get_members(&self, guild_id: Snowflake) -> Option<Vec<Member>> {
        self.paginate(
            "get_members",
            &format!("/guilds/{}/members", guild_id),
            MEMBER_PAGE_SIZE,
            |member: &Member| member.user.as_ref().map(|user| user.id),
        )
        .await
    }

    // roles

    pub async fn get_roles(&self, guild_id: Snowflake) -> Option<Vec<Role>> {
        self.call(
            "get_roles",
            self.request(Method::GET, format!("/guilds/{}/roles", guild_id)),
        )
        .await
    }

    pub async fn create_role(
        &self,
        guild_id: Snowflake,
        data: &CreateRole,
        reason: Option<&str>,
    ) -> Option<Role> {
        let req = self.request(Method::POST, format!("/guilds/{}/roles", guild_id));
        self.call("create_role", self.with_body(req, data, reason)?)
            .await
    }

    pub async fn update_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        data: &UpdateRole,
        reason: Option<&str>,
    ) -> Option<Role> {
        let req = self.request(
            Method::PATCH,
            format!("/guilds/{}/roles/{}", guild_id, role_id),
        );
        self.call("update_role", self.with_body(req, data, reason)?)
            .await
    }

    pub async fn delete_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        reason: Option<&str>,
    ) -> Option<()> {
        let req = self.request(
            Method::DELETE,
            format!("/guilds/{}/roles/{}", guild_id, role_id),
        );
        self.call_empty("delete_role", with_reason(req, reason))
            .await
    }

    pub async fn give_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: Option<&str>,
    ) -> Option<()> {
        let req = self.request(
            Method::PUT,
            format!("/guilds/{}/members/{}/roles/{}", guild_id, user_id, role_id),
        );

        self.call_empty("give_role", with_reason(req, reason)).await?;
        self.members.remove(&(guild_id, user_id));
        Some(())
    }

    pub async fn take_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: Option<&str>,
    ) -> Option<()> {
        let req = self.request(
            Method::DELETE,
            format!("/guilds/{}/members/{}/roles/{}", guild_id, user_id, role_id),
        );

        self.call_empty("take_role", with_reason(req, reason)).await?;
        self.members.remove(&(guild_id, user_id));
        Some(())
    }

    // channels

    pub async fn get_channel(&self, channel_id: Snowflake) -> Option<Channel> {
        if let Some(channel) = self.channels.get(&channel_id) {
            return Some(channel);
        }

        let channel: Channel = self
            .call(
                "get_channel",
                self.request(Method::GET, format!("/channels/{}", channel_id)),
            )
            .await?;

        self.channels.insert(channel_id, channel.clone());
        Some(channel)
    }

    pub async fn get_channels(&self, guild_id: Snowflake) -> Option<Vec<Channel>> {
        self.call(
            "get_channels",
            self.request(Method::GET, format!("/guilds/{}/channels", guild_id)),
        )
        .await
    }

    pub async fn create_channel(
        &self,
        guild_id: Snowflake,
        data: &CreateChannel,
        reason: Option<&str>,
    ) -> Option<Channel> {
        let req = self.request(Method::POST, format!("/guilds/{}/channels", guild_id));
        self.call("create_channel", self.with_body(req, data, reason)?)
            .await
    }

    pub async fn update_channel(
        &self,
        channel_id: Snowflake,
        data: &UpdateChannel,
        reason: Option<&str>,
    ) -> Option<Channel> {
        let req = self.request(Method::PATCH, format!("/channels/{}", channel_id));
        let channel: Channel = self
            .call("update_channel", self.with_body(req, data, reason)?)
            .await?;

        self.channels.insert(channel_id, channel.clone());
        Some(channel)
    }

    pub async fn update_channel_overwrite(
        &self,
        channel_id: Snowflake,
        overwrite_id: Snowflake,
        data: &EditChannelOverwrite,
        reason: Option<&str>,
    ) -> Option<()> {
        let req = self.request(
            Method::PUT,
            format!("/channels/{}/permissions/{}", channel_id, overwrite_id),
        );

        self.call_empty(
            "update_channel_overwrite",
            self.with_body(req, data, reason)?,
        )
        .await?;
        self.channels.remove(&channel_id);
        Some(())
    }

    pub async fn delete_channel(
        &self,
        channel_id: Snowflake,
        reason: Option<&str>,
    ) -> Option<Channel> {
        let req = self.request(Method::DELETE, format!("/channels/{}", channel_id));
        let channel = self
            .call("delete_channel", with_reason(req, reason))
            .await?;

        self.channels.remove(&channel_id);
        Some(channel)
    }

    pub async fn delete_channel_overwrite(
        &self,
        channel_id: Snowflake,
        overwrite_id: Snowflake,
        reason: Option<&str>,
    ) -> Option<()> {
        let req = self.request(
            Method::DELETE,
            format!("/channels/{}/permissions/{}", channel_id, overwrite_id),
        );

        self.call_empty("delete_channel_overwrite", with_reason(req, reason))
            .await?;
        self.channels.remove(&channel_id);
        Some(())
    }

    // threads

    pub async fn create_thread(
        &self,
        channel_id: Snowflake,
        data: &CreateThread,
        reason: Option<&str>,
    ) -> Option<Channel> {
        let req = self.request(Method::POST, format!("/channels/{}/threads", channel_id));
        self.call("create_thread", self.with_body(req, data, reason)?)
            .await
    }

    pub async fn create_thread_from_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        data: &CreateThreadFromMessage,
        reason: Option<&str>,
    ) -> Option<Channel> {
        let req = self.request(
            Method::POST,
            format!("/channels/{}/messages/{}/threads", channel_id, message_id),
        );
        self.call(
            "create_thread_from_message",
            self.with_body(req, data, reason)?,
        )
        .await
    }

    pub async fn update_thread(
        &self,
        thread_id: Snowflake,
        data: &UpdateThread,
        reason: Option<&str>,
    ) -> Option<Channel> {
        let req = self.request(Method::PATCH, format!("/channels/{}", thread_id));
        let thread: Channel = self
            .call("update_thread", self.with_body(req, data, reason)?)
            .await?;

        self.channels.insert(thread_id, thread.clone());
        Some(thread)
    }

    // messages

    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        data: &CreateMessage,
    ) -> Option<Message> {
        let req = self.request(Method::POST, format!("/channels/{}/messages", channel_id));
        self.call("create_message", self.with_body(req, data, None)?)
            .await
    }

    // commands

    /// Replaces the application's global commands with `commands`.
    pub async fn register_commands(
        &self,
        commands: &[CommandDefinition],
    ) -> Option<Vec<ApplicationCommand>> {
        let req = self.request(
            Method::PUT,
            format!("/applications/{}/commands", self.application_id),
        );
        self.call("register_commands", self.with_body(req, commands, None)?)
            .await
    }

    // interaction callbacks

    pub async fn create_interaction_response(
        &self,
        interaction_id: Snowflake,
        token: &str,
        response: &InteractionResponse,
    ) -> Option<()> {
        let req = self.request(
            Method::POST,
            format!("/interactions/{}/{}/callback", interaction_id, token),
        );
        self.call_empty(
            "create_interaction_response",
            self.with_body(req, response, None)?,
        )
        .await
    }

    pub async fn get_original_response(&self, token: &str) -> Option<Message> {
        self.call(
            "get_original_response",
            self.request(Method::GET, self.original_response_path(token)),
        )
        .await
    }

    pub async fn edit_original_response(&self, token: &str, data: &MessageBody) -> Option<Message> {
        let req = self.request(Method::PATCH, self.original_response_path(token));
        self.call("edit_original_response", self.with_body(req, data, None)?)
            .await
    }

    pub async fn create_followup(&self, token: &str, data: &MessageBody) -> Option<Message> {
        let req = self.request(
            Method::POST,
            format!("/webhooks/{}/{}", self.application_id, token),
        );
        self.call("create_followup", self.with_body(req, data, None)?)
            .await
    }

    fn original_response_path(&self, token: &str) -> String {
        format!(
            "/webhooks/{}/{}/messages/@original",
            self.application_id, token
        )
    }

    fn request(&self, method: Method, path: impl Into<Box<str>>) -> Request {
        let mut req = Request::new(method, path);
        req.headers
            .insert(AUTHORIZATION, self.authorization.clone());
        req
    }

    fn with_body<T: Serialize + ?Sized>(
        &self,
        req: Request,
        body: &T,
        reason: Option<&str>,
    ) -> Option<Request> {
        match req.json(body) {
            Ok(req) => Some(with_reason(req, reason)),
            Err(e) => {
                error!(error = %e, "Failed to encode request body");
                None
            }
        }
    }

    async fn paginate<T, F>(
        &self,
        operation: &'static str,
        path: &str,
        page_size: usize,
        id_of: F,
    ) -> Option<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> Option<Snowflake>,
    {
        let mut items = Vec::new();
        let mut after: Option<Snowflake> = None;

        loop {
            let page_path = match after {
                Some(after) => format!("{}?limit={}&after={}", path, page_size, after),
                None => format!("{}?limit={}", path, page_size),
            };

            let page: Vec<T> = match self.call(operation, self.request(Method::GET, page_path)).await
            {
                Some(page) => page,
                None if after.is_none() => return None,
                None => {
                    warn!(operation, fetched = items.len(), "Stopping pagination after failed page");
                    break;
                }
            };

            let full = page.len() >= page_size;
            after = page.last().and_then(&id_of);
            items.extend(page);

            if !full || after.is_none() {
                break;
            }
        }

        Some(items)
    }

    async fn call<T: DeserializeOwned>(&self, operation: &'static str, req: Request) -> Option<T> {
        let route = req.route();
        let res = self.execute(operation, req).await?;

        match serde_json::from_slice(&res.body) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(operation, %route, error = %e, body = %res.body_text(), "Failed to decode response");
                None
            }
        }
    }

    async fn call_empty(&self, operation: &'static str, req: Request) -> Option<()> {
        self.execute(operation, req).await.map(|_| ())
    }

    async fn execute(&self, operation: &'static str, req: Request) -> Option<RawResponse> {
        let route = req.route();

        match self.transport.send(req).await {
            Ok(res) if res.status.is_success() => Some(res),
            Ok(res) => {
                error!(
                    operation,
                    %route,
                    status = %res.status,
                    body = %res.body_text(),
                    "Discord API request failed"
                );
                None
            }
            Err(e) => {
                error!(operation, %route, error = %e, "Discord API request failed");
                None
            }
        }
    }
}

/// Attaches the audit log reason, url-encoded as the API expects.
fn with_reason(mut req: Request, reason: Option<&str>) -> Request {
    let Some(reason) = reason else {
        return req;
    };

    let encoded: String = url::form_urlencoded::byte_serialize(reason.as_bytes()).collect();
    match HeaderValue::from_str(&encoded) {
        Ok(value) => {
            req.headers.insert(AUDIT_LOG_REASON_HEADER, value);
        }
        Err(e) => warn!(error = %e, "Dropping invalid audit log reason"),
    }

    req
}

pub fn user_avatar_url(user_id: Snowflake, avatar: Option<ImageHash>) -> String {
    match avatar {
        Some(hash) => format!(
            "{}/avatars/{}/{}.{}",
            CDN_BASE,
            user_id,
            hash,
            hash.extension()
        ),
        None => format!(
            "{}/embed/avatars/{}.png",
            CDN_BASE,
            user_id.default_avatar_index()
        ),
    }
}

pub fn user_banner_url(user_id: Snowflake, banner: Option<ImageHash>) -> Option<String> {
    banner.map(|hash| {
        format!(
            "{}/banners/{}/{}.{}",
            CDN_BASE,
            user_id,
            hash,
            hash.extension()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests::{response, ScriptedBackend};
    use reqwest::StatusCode;

    const USER: &str = r#"{"id":"7","username":"alice"}"#;

    fn setup() -> (Arc<ScriptedBackend>, RestClient) {
        let backend = Arc::new(ScriptedBackend::default());
        let client = RestClient::with_backend(backend.clone(), "token", Snowflake(2)).unwrap();
        (backend, client)
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_user_is_cached() {
        let (backend, client) = setup();
        backend.push(response(StatusCode::OK, &[], USER));

        let first = client.get_user(Snowflake(7)).await.unwrap();
        let second = client.get_user(Snowflake(7)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(backend.calls.lock().len(), 1);

        let calls = backend.calls.lock();
        let (_, req) = &calls[0];
        assert_eq!(&*req.path, "/users/7");
        assert_eq!(req.headers[AUTHORIZATION], "Bot token");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_returns_none() {
        let (backend, client) = setup();
        backend.push(response(StatusCode::NOT_FOUND, &[], r#"{"message":"Unknown User"}"#));

        assert!(client.get_user(Snowflake(7)).await.is_none());
        // network failure once the script runs out
        assert!(client.get_current_user().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_audit_log_reason_is_encoded() {
        let (backend, client) = setup();
        backend.push(response(StatusCode::NO_CONTENT, &[], ""));

        client
            .give_role(Snowflake(1), Snowflake(7), Snowflake(9), Some("ticket opened"))
            .await
            .unwrap();

        let calls = backend.calls.lock();
        let (_, req) = &calls[0];
        assert_eq!(req.method, Method::PUT);
        assert_eq!(&*req.path, "/guilds/1/members/7/roles/9");
        assert_eq!(req.headers[AUDIT_LOG_REASON_HEADER], "ticket+opened");
    }

    #[tokio::test(start_paused = true)]
    async fn test_guild_pagination() {
        let (backend, client) = setup();

        let page = |start: u64, count: u64| {
            let guilds: Vec<_> = (start..start + count)
                .map(|id| format!(r#"{{"id":"{}","name":"g","icon":null,"owner":false,"features":[]}}"#, id))
                .collect();
            format!("[{}]", guilds.join(","))
        };

        let full = page(1, 200);
        let partial = page(201, 3);
        backend.push(RawResponse {
            status: StatusCode::OK,
            headers: Default::default(),
            body: full.into_bytes(),
        });
        backend.push(RawResponse {
            status: StatusCode::OK,
            headers: Default::default(),
            body: partial.into_bytes(),
        });

        let guilds = client.get_guilds().await.unwrap();
        assert_eq!(guilds.len(), 203);

        let calls = backend.calls.lock();
        assert_eq!(&*calls[0].1.path, "/users/@me/guilds?limit=200");
        assert_eq!(&*calls[1].1.path, "/users/@me/guilds?limit=200&after=200");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_stops_on_failed_page() {
        let (backend, client) = setup();
        backend.push(response(StatusCode::INTERNAL_SERVER_ERROR, &[], ""));

        assert!(client.get_guilds().await.is_none());
        assert_eq!(backend.calls.lock().len(), 1);
    }

    #[test]
    fn test_avatar_urls() {
        let hash: ImageHash = serde_json::from_str(r#""a_1269e74af4df7417b13759eae50c83dc""#).unwrap();

        assert_eq!(
            user_avatar_url(Snowflake(80351110224678912), Some(hash)),
            "https://cdn.discordapp.com/avatars/80351110224678912/a_1269e74af4df7417b13759eae50c83dc.gif"
        );
        assert_eq!(
            user_avatar_url(Snowflake(80351110224678912), None),
            format!(
                "https://cdn.discordapp.com/embed/avatars/{}.png",
                (80351110224678912u64 >> 22) % 6
            )
        );
        assert!(user_banner_url(Snowflake(1), None).is_none());
    }
}
