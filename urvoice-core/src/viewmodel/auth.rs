use std::sync::Arc;

use futures::StreamExt;
use tracing::warn;

use crate::api::ApiClient;
use crate::error::Result;
use crate::repository::AuthRepository;
use crate::types::{AuthToken, User};

use super::StateSlot;

/// Login screen state
pub struct LoginViewModel {
    api: Arc<ApiClient>,
    repository: AuthRepository,
    login: StateSlot<AuthToken>,
    refresh: StateSlot<()>,
}

impl LoginViewModel {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            repository: AuthRepository::new(Arc::clone(&api)),
            api,
            login: StateSlot::new(),
            refresh: StateSlot::new(),
        }
    }

    pub fn login_state(&self) -> &StateSlot<AuthToken> {
        &self.login
    }

    pub fn refresh_state(&self) -> &StateSlot<()> {
        &self.refresh
    }

    pub fn login(&self, email: &str, password: &str) {
        self.login.launch(self.repository.login(email, password));
    }

    /// Re-authenticate with stored credentials. A failed refresh leaves the
    /// old token unusable, so it is dropped before the error is published.
    pub fn refresh_session(&self, email: &str, password: &str) {
        let session = Arc::clone(self.api.session());
        let results = self
            .repository
            .refresh_session(email, password)
            .then(move |state| {
                let session = Arc::clone(&session);
                async move {
                    if state.is_error()
                        && let Err(e) = session.clear().await
                    {
                        warn!("Failed to clear session after refresh failure: {}", e);
                    }
                    state
                }
            })
            .boxed();
        self.refresh.launch(results);
    }

    pub async fn clear_session(&self) -> Result<()> {
        self.api.session().clear().await?;
        self.login.reset();
        self.refresh.reset();
        Ok(())
    }

    pub fn reset(&self) {
        self.login.reset();
        self.refresh.reset();
    }
}

/// Registration screen state
pub struct RegisterViewModel {
    repository: AuthRepository,
    register: StateSlot<Option<User>>,
}

impl RegisterViewModel {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            repository: AuthRepository::new(api),
            register: StateSlot::new(),
        }
    }

    pub fn register_state(&self) -> &StateSlot<Option<User>> {
        &self.register
    }

    pub fn register(&self, name: &str, email: &str, password: &str) {
        self.register
            .launch(self.repository.register(name, email, password));
    }

    pub fn reset(&self) {
        self.register.reset();
    }
}
