use std::sync::Arc;

use crate::api::ApiClient;
use crate::history::latest_entry;
use crate::media::build_media_url;
use crate::repository::{ArticleRepository, HistoryRepository, UserRepository};
use crate::types::{Article, HistoryEntry, User};

use super::StateSlot;

/// Home screen: greeting, article feed and the most recent practice session
pub struct HomeViewModel {
    api: Arc<ApiClient>,
    users: UserRepository,
    articles_repo: ArticleRepository,
    history_repo: HistoryRepository,
    user: StateSlot<User>,
    articles: StateSlot<Vec<Article>>,
    history: StateSlot<Vec<HistoryEntry>>,
}

impl HomeViewModel {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            users: UserRepository::new(Arc::clone(&api)),
            articles_repo: ArticleRepository::new(Arc::clone(&api)),
            history_repo: HistoryRepository::new(Arc::clone(&api)),
            api,
            user: StateSlot::new(),
            articles: StateSlot::new(),
            history: StateSlot::new(),
        }
    }

    pub fn user(&self) -> &StateSlot<User> {
        &self.user
    }

    pub fn articles(&self) -> &StateSlot<Vec<Article>> {
        &self.articles
    }

    pub fn history(&self) -> &StateSlot<Vec<HistoryEntry>> {
        &self.history
    }

    /// Fire the user, article and history requests together
    pub fn load_initial_data(&self) {
        self.load_user();
        self.load_articles();
        self.load_history();
    }

    pub fn load_user(&self) {
        self.user.launch(self.users.current_user());
    }

    pub fn load_articles(&self) {
        self.articles.launch(self.articles_repo.all_articles());
    }

    pub fn load_history(&self) {
        self.history.launch(self.history_repo.all_history());
    }

    /// Newest entry of the loaded history, if it has loaded and any entry is dated
    pub fn latest_history(&self) -> Option<HistoryEntry> {
        let state = self.history.get();
        latest_entry(state.value()?).cloned()
    }

    pub fn profile_image_url(&self) -> Option<String> {
        let state = self.user.get();
        let user = state.value()?;
        Some(build_media_url(
            self.api.config().base(),
            user.profile_image.as_deref(),
        ))
    }
}
