//! Profile screen
//!
//! Edits go through their own slots; once an edit succeeds the `user` slot is
//! refetched so the screen shows what the server actually stored.

use std::sync::Arc;

use tracing::debug;

use crate::api::ApiClient;
use crate::media::build_media_url;
use crate::repository::{AuthRepository, UserRepository};
use crate::result::AsyncResult;
use crate::types::User;

use super::StateSlot;

pub struct ProfileViewModel {
    api: Arc<ApiClient>,
    users: UserRepository,
    auth: AuthRepository,
    user: StateSlot<User>,
    update: StateSlot<Option<User>>,
    photo: StateSlot<Option<User>>,
    logout: StateSlot<()>,
    delete: StateSlot<()>,
}

impl ProfileViewModel {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            users: UserRepository::new(Arc::clone(&api)),
            auth: AuthRepository::new(Arc::clone(&api)),
            api,
            user: StateSlot::new(),
            update: StateSlot::new(),
            photo: StateSlot::new(),
            logout: StateSlot::new(),
            delete: StateSlot::new(),
        }
    }

    pub fn user(&self) -> &StateSlot<User> {
        &self.user
    }

    pub fn update_state(&self) -> &StateSlot<Option<User>> {
        &self.update
    }

    pub fn photo_state(&self) -> &StateSlot<Option<User>> {
        &self.photo
    }

    pub fn logout_state(&self) -> &StateSlot<()> {
        &self.logout
    }

    pub fn delete_state(&self) -> &StateSlot<()> {
        &self.delete
    }

    pub fn load_user(&self) {
        self.user.launch(self.users.current_user());
    }

    pub fn update_user(&self, name: &str, password: &str) {
        let refetch = self.refetch_on_success();
        self.update
            .launch_then(self.users.update_user(name, password), refetch);
    }

    pub fn upload_photo(&self, file_name: &str, bytes: Vec<u8>) {
        let refetch = self.refetch_on_success();
        self.photo
            .launch_then(self.users.upload_photo(file_name, bytes), refetch);
    }

    pub fn logout(&self) {
        self.logout.launch(self.auth.logout());
    }

    pub fn delete_account(&self) {
        self.delete.launch(self.users.delete_account());
    }

    pub fn reset_update(&self) {
        self.update.reset();
    }

    pub fn reset_photo(&self) {
        self.photo.reset();
    }

    pub fn profile_image_url(&self) -> Option<String> {
        let state = self.user.get();
        let user = state.value()?;
        Some(build_media_url(
            self.api.config().base(),
            user.profile_image.as_deref(),
        ))
    }

    fn refetch_on_success(&self) -> impl FnOnce(&AsyncResult<Option<User>>) + Send + 'static {
        let user = self.user.clone();
        let users = self.users.clone();
        move |state| {
            if state.is_success() {
                debug!("Profile changed, refetching current user");
                user.launch(users.current_user());
            }
        }
    }
}
