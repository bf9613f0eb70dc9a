use std::sync::{Arc, Mutex, MutexGuard};

use muni_common::models::auth::{LoginRequest, LoginType, RegisterRequest, TokenResponse, User};
use muni_common::rut::format_rut;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::navigator::{Navigator, Route};
use crate::storage::{
    Storage, AUTH_TOKEN_KEY, CHAT_KEYS, CHAT_SESSION_KEY, LEGACY_TOKEN_KEY,
};

struct Inner {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
    /// Serializes token writes with their navigation side effect
    session_lock: Mutex<()>,
}

/// Owner of the bearer token and the single funnel every request goes through.
///
/// Cloning is cheap; clones share storage and the token lock.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                base,
                storage,
                navigator,
                session_lock: Mutex::new(()),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a poisoned lock carries no broken state
        self.inner
            .session_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The stored bearer token, if any. Empty values count as absent.
    pub fn token(&self) -> Option<String> {
        match self.inner.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    /// True exactly when a token is stored; freshness is not checked.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Start a request against a gateway path such as `/api/auth/users/me`.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .http
            .request(method, format!("{}{}", self.inner.base_url, path))
    }

    /// Start a request whose path is built from segments, each percent-encoded.
    ///
    /// Used where user input (dates, service types, ids) lands in the path.
    pub fn request_segments(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut url = self.inner.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        self.inner.http.request(method, url)
    }

    /// Send a request, attaching the bearer token when one is stored.
    ///
    /// A 401 tears the session down before the error is returned. Other
    /// non-success statuses become [`ClientError`] values carrying the
    /// server's detail message.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let token = self.token();
        let builder = match token.as_deref() {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(token.as_deref());
        }
        Err(ClientError::from_status(status, &body))
    }

    /// Send a request and decode its JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        decode(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.request(Method::GET, path)).await
    }

    /// Clear the session the rejected request was sent with.
    ///
    /// Only the first 401 for the token currently stored acts; later or
    /// concurrent 401s for the same (already cleared) token, and 401s for
    /// requests sent without a token, leave storage and navigation alone.
    fn handle_unauthorized(&self, sent_token: Option<&str>) {
        let Some(sent) = sent_token else {
            return;
        };
        let _guard = self.lock();
        if self.token().as_deref() != Some(sent) {
            tracing::debug!("Ignoring 401 for a token that is no longer stored");
            return;
        }
        tracing::warn!("Server rejected the session token; logging out");
        if let Err(e) = self
            .inner
            .storage
            .remove_many(&[AUTH_TOKEN_KEY, LEGACY_TOKEN_KEY])
        {
            tracing::error!("Failed to clear rejected token: {}", e);
        }
        self.inner.navigator.navigate(Route::Login);
    }

    fn store_session(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(ClientError::Decode(
                "server returned an empty access token".to_string(),
            ));
        }
        let _guard = self.lock();
        self.inner.storage.remove_many(CHAT_KEYS)?;
        self.inner.storage.set(AUTH_TOKEN_KEY, token)
    }

    /// Log in and persist the returned token.
    ///
    /// RUT identifiers are sent in their dotted display form.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        login_type: LoginType,
    ) -> Result<TokenResponse> {
        let identifier = match login_type {
            LoginType::Rut => format_rut(identifier),
            LoginType::Email => identifier.trim().to_string(),
        };
        let req = LoginRequest {
            identifier,
            password: password.to_string(),
            login_type,
        };

        let resp: TokenResponse = self
            .send_json(self.request(Method::POST, "/api/auth/token").json(&req))
            .await
            .inspect_err(|e| tracing::warn!("Login failed: {}", e))?;
        self.store_session(&resp.access_token)?;
        tracing::info!("Login succeeded");
        Ok(resp)
    }

    /// Register a citizen account; the new account is logged in right away.
    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: &RegisterRequest) -> Result<TokenResponse> {
        let resp: TokenResponse = self
            .send_json(self.request(Method::POST, "/api/auth/register").json(req))
            .await?;
        self.store_session(&resp.access_token)?;
        tracing::info!("Registration succeeded");
        Ok(resp)
    }

    /// Drop the token and every dependent artifact, then go to the login view.
    ///
    /// Safe to call repeatedly. Navigation happens even if clearing storage
    /// fails; the storage error is still reported.
    pub fn logout(&self) -> Result<()> {
        let cleared = {
            let _guard = self.lock();
            let mut keys = vec![AUTH_TOKEN_KEY, LEGACY_TOKEN_KEY];
            keys.extend_from_slice(CHAT_KEYS);
            self.inner.storage.remove_many(&keys)
        };
        self.inner.navigator.navigate(Route::Login);
        cleared
    }

    /// Fetch the profile for the stored token.
    #[tracing::instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        self.get_json("/api/auth/users/me").await
    }

    /// Chatbot conversation id remembered for this session
    pub fn chat_session_id(&self) -> Option<String> {
        self.inner
            .storage
            .get(CHAT_SESSION_KEY)
            .ok()
            .flatten()
            .filter(|id| !id.is_empty())
    }

    pub fn remember_chat_session(&self, session_id: &str) -> Result<()> {
        self.inner.storage.set(CHAT_SESSION_KEY, session_id)
    }

    pub fn forget_chat_session(&self) -> Result<()> {
        self.inner.storage.remove(CHAT_SESSION_KEY)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}
