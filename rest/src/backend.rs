use crate::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// Outbound call, addressed relative to the API base.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: Box<str>,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<Box<str>>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Result<Self> {
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    /// Rate limit key used until the remote side names the bucket: the verb plus the
    /// path without its query string.
    pub fn route(&self) -> Box<str> {
        let path = self.path.split('?').next().unwrap_or_default();
        format!("{} {}", self.method, path).into_boxed_str()
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn execute(&self, request: Request) -> Result<RawResponse>;
}

pub struct ReqwestBackend {
    http_client: reqwest::Client,
    api_base: Box<str>,
}

impl ReqwestBackend {
    pub fn new(api_base: impl Into<Box<str>>) -> Result<Self> {
        Ok(Self {
            http_client: ReqwestBackend::build_http_client()?,
            api_base: api_base.into(),
        })
    }

    fn build_http_client() -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .use_rustls_tls()
            .build()?;

        Ok(client)
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, request: Request) -> Result<RawResponse> {
        let url = format!("{}{}", self.api_base.trim_end_matches('/'), request.path);

        // reqwest::Client is reference counted internally, cloning keeps the connection pool
        let mut req = self
            .http_client
            .clone()
            .request(request.method, url)
            .headers(request.headers);

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let res = req.send().await?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_strips_query() {
        let req = Request::new(Method::GET, "/users/@me/guilds?limit=200&after=5");
        assert_eq!(&*req.route(), "GET /users/@me/guilds");
    }

    #[test]
    fn test_json_sets_content_type() {
        let req = Request::new(Method::POST, "/channels/1/messages")
            .json(&serde_json::json!({"content": "hi"}))
            .unwrap();

        assert_eq!(req.headers[CONTENT_TYPE], "application/json");
        assert_eq!(req.body.as_deref(), Some(&br#"{"content":"hi"}"#[..]));
    }
}
