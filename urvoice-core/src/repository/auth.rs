//! Registration, login and logout
//!
//! Login persists the access token into the session store; logout clears it.

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, Auth, USER_LOGIN, USER_LOGOUT, USER_REGISTER};
use crate::error::{Error, Result};
use crate::result::{Reply, ResultStream, track};
use crate::types::{AuthToken, RegisterRequest, User};

#[derive(Clone)]
pub struct AuthRepository {
    api: Arc<ApiClient>,
}

impl AuthRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> ResultStream<Option<User>> {
        let api = Arc::clone(&self.api);
        let request = RegisterRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        track(async move {
            if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
                return Err(Error::InvalidInput(
                    "name, email and password are required".to_string(),
                ));
            }
            let builder = api
                .request(Method::POST, USER_REGISTER, Auth::Public)
                .await?
                .json(&request);
            let reply = api.send_optional::<User>(builder).await?;
            info!("Registered new account");
            Ok(reply)
        })
    }

    /// Log in and store the returned access token
    pub fn login(&self, email: &str, password: &str) -> ResultStream<AuthToken> {
        let api = Arc::clone(&self.api);
        let email = email.trim().to_string();
        let password = password.to_string();
        track(async move { sign_in(&api, &email, &password).await })
    }

    /// Re-run the login exchange to replace an expired token
    pub fn refresh_session(&self, email: &str, password: &str) -> ResultStream<()> {
        let api = Arc::clone(&self.api);
        let email = email.trim().to_string();
        let password = password.to_string();
        track(async move {
            let reply = sign_in(&api, &email, &password).await?;
            debug!("Session refreshed");
            Ok(reply.map(|_| ()))
        })
    }

    /// Log out server-side, then drop the local token
    pub fn logout(&self) -> ResultStream<()> {
        let api = Arc::clone(&self.api);
        track(async move {
            let builder = api.request(Method::POST, USER_LOGOUT, Auth::Bearer).await?;
            match api.send_unit(builder).await {
                Ok(reply) => {
                    api.session().clear().await?;
                    info!("Logged out");
                    Ok(reply)
                }
                Err(Error::Unauthorized(message)) => {
                    // the server no longer honours this token, so it is useless locally too
                    warn!("Logout rejected as unauthorized, clearing local session");
                    api.session().clear().await?;
                    Err(Error::Unauthorized(message))
                }
                Err(e) => Err(e),
            }
        })
    }

    pub async fn is_logged_in(&self) -> Result<bool> {
        self.api.session().is_logged_in().await
    }
}

async fn sign_in(api: &ApiClient, email: &str, password: &str) -> Result<Reply<AuthToken>> {
    if email.is_empty() || password.is_empty() {
        return Err(Error::InvalidInput(
            "email and password are required".to_string(),
        ));
    }

    let builder = api
        .request(Method::POST, USER_LOGIN, Auth::Public)
        .await?
        .form(&[("email", email), ("password", password)]);
    let reply = api.send::<AuthToken>(builder).await?;

    let token = reply
        .data
        .access_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Decode("login response has no access token".to_string()))?;
    api.session().save_token(token).await?;

    info!("Login succeeded");
    Ok(reply)
}
