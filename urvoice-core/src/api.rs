//! REST transport for the UrVoice backend
//!
//! Every endpoint answers with a `{message, success, data}` envelope. The
//! client attaches the bearer token, unwraps the envelope and classifies
//! failures into [`Error`] variants so callers never inspect message text.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::result::Reply;
use crate::session::SessionStore;
use crate::types::Envelope;

pub const USER_REGISTER: &str = "api/users/register";
pub const USER_LOGIN: &str = "api/users/login";
pub const USER_LOGOUT: &str = "api/users/logout";
pub const USER_CURRENT: &str = "api/users/current";
pub const USER_UPDATE: &str = "api/users/update";
pub const USER_DELETE: &str = "api/users/delete";
pub const USER_UPLOAD_PHOTO: &str = "api/users/uploadPhotos";

pub const ARTICLE_LIST: &str = "api/articles/getAll";
pub const ARTICLE_DETAIL: &str = "api/articles/getArticle";

pub const SPEECH_TO_TEXT: &str = "api/models/speech-to-text";
pub const ANALYZE_SPEECH: &str = "api/models/analyze-speech";

pub const HISTORY_SAVE: &str = "api/history/save";
pub const HISTORY_LIST: &str = "api/history/getAll";
pub const HISTORY_DETAIL: &str = "api/history/getHistory";

const MISSING_TOKEN: &str = "No authentication token. Please login again.";

/// Whether a request carries the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Public,
    Bearer,
}

/// Shared HTTP client bound to one backend and one session store
pub struct ApiClient {
    client: Client,
    config: Config,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: Config, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            session,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Start a request, attaching `Authorization: Bearer` when required
    pub async fn request(&self, method: Method, path: &str, auth: Auth) -> Result<RequestBuilder> {
        let builder = self.client.request(method, self.url(path));
        match auth {
            Auth::Public => Ok(builder),
            Auth::Bearer => {
                let token = self
                    .session
                    .token()
                    .await?
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| Error::Unauthorized(MISSING_TOKEN.to_string()))?;
                Ok(builder.bearer_auth(token))
            }
        }
    }

    /// Send and unwrap an envelope whose `data` is required
    pub async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Reply<T>> {
        let envelope = self.send_envelope::<T>(request).await?;
        match envelope.data {
            Some(data) => Ok(Reply::new(data, envelope.message)),
            None => Err(Error::Decode("response is missing `data`".to_string())),
        }
    }

    /// Send and unwrap an envelope whose `data` may be absent
    pub async fn send_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Reply<Option<T>>> {
        let envelope = self.send_envelope::<T>(request).await?;
        Ok(Reply::new(envelope.data, envelope.message))
    }

    /// Send and unwrap an envelope whose `data` is ignored
    pub async fn send_unit(&self, request: RequestBuilder) -> Result<Reply<()>> {
        let reply = self
            .send_optional::<serde_json::Value>(request)
            .await?;
        Ok(reply.map(|_| ()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Reply<T>> {
        let request = self.request(Method::GET, path, Auth::Bearer).await?;
        self.send(request).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B, auth: Auth) -> Result<Reply<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, auth).await?.json(body);
        self.send(request).await
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        debug!("{} <- {}", status, url);

        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let body = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body).map_err(|e| {
            warn!("Undecodable body from {}: {}", url, e);
            Error::Decode(e.to_string())
        })?;

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "Request was rejected".to_string());
            debug!("{} rejected: {}", url, message);
            return Err(Error::Rejected(message));
        }

        Ok(envelope)
    }
}

/// Map a non-2xx response to an error, preferring the envelope's message
async fn status_error(status: StatusCode, response: Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string()
            } else {
                body
            }
        });

    if status == StatusCode::UNAUTHORIZED {
        warn!("Unauthorized: {}", message);
        return Error::Unauthorized(message);
    }

    error!("API error: {} - {}", status, message);
    Error::Server {
        status: status.as_u16(),
        message,
    }
}
