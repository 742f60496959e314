use std::sync::Arc;

use crate::api::ApiClient;
use crate::media::build_media_url;
use crate::repository::ArticleRepository;
use crate::types::{Article, RecordId};

use super::StateSlot;

/// Article list and detail screens
pub struct ArticleViewModel {
    api: Arc<ApiClient>,
    repository: ArticleRepository,
    articles: StateSlot<Vec<Article>>,
    article: StateSlot<Article>,
}

impl ArticleViewModel {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            repository: ArticleRepository::new(Arc::clone(&api)),
            api,
            articles: StateSlot::new(),
            article: StateSlot::new(),
        }
    }

    pub fn articles(&self) -> &StateSlot<Vec<Article>> {
        &self.articles
    }

    pub fn article(&self) -> &StateSlot<Article> {
        &self.article
    }

    pub fn load_all(&self) {
        self.articles.launch(self.repository.all_articles());
    }

    pub fn load(&self, id: RecordId) {
        self.article.launch(self.repository.article(id));
    }

    /// Absolute URL of an article's cover image, empty when it has none
    pub fn image_url(&self, article: &Article) -> String {
        build_media_url(self.api.config().base(), article.image.as_deref())
    }
}
