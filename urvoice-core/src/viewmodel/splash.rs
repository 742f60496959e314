//! Startup routing
//!
//! Decides where the app opens: onboarding on first launch, then login until
//! a session token exists, then home.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::result::{Reply, track};
use crate::session::SessionStore;
use crate::storage::Storage;

use super::StateSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupState {
    pub onboarding_completed: bool,
    pub logged_in: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupDestination {
    Onboarding,
    Login,
    Home,
}

impl StartupState {
    pub fn destination(&self) -> StartupDestination {
        match (self.onboarding_completed, self.logged_in) {
            (false, _) => StartupDestination::Onboarding,
            (true, false) => StartupDestination::Login,
            (true, true) => StartupDestination::Home,
        }
    }
}

pub struct SplashViewModel {
    storage: Arc<Storage>,
    session: Arc<dyn SessionStore>,
    startup: StateSlot<StartupState>,
}

impl SplashViewModel {
    pub fn new(storage: Arc<Storage>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            storage,
            session,
            startup: StateSlot::new(),
        }
    }

    pub fn startup(&self) -> &StateSlot<StartupState> {
        &self.startup
    }

    /// Read the onboarding flag and session token into the startup slot
    pub fn check(&self) {
        let storage = Arc::clone(&self.storage);
        let session = Arc::clone(&self.session);
        self.startup.launch(track(async move {
            let state = StartupState {
                onboarding_completed: storage.onboarding_complete()?,
                logged_in: session.is_logged_in().await?,
            };
            info!("Startup destination: {:?}", state.destination());
            Ok(Reply::new(state, None))
        }));
    }

    /// Persist that onboarding was shown, then recompute the startup state
    pub fn complete_onboarding(&self) -> Result<()> {
        self.storage.set_onboarding_complete(true)?;
        self.check();
        Ok(())
    }
}
