use std::sync::Arc;

use crate::api::{ARTICLE_DETAIL, ARTICLE_LIST, ApiClient};
use crate::result::{ResultStream, track};
use crate::types::{Article, RecordId};

#[derive(Clone)]
pub struct ArticleRepository {
    api: Arc<ApiClient>,
}

impl ArticleRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub fn all_articles(&self) -> ResultStream<Vec<Article>> {
        let api = Arc::clone(&self.api);
        track(async move { api.get::<Vec<Article>>(ARTICLE_LIST).await })
    }

    pub fn article(&self, id: RecordId) -> ResultStream<Article> {
        let api = Arc::clone(&self.api);
        track(async move { api.get::<Article>(&format!("{ARTICLE_DETAIL}/{id}")).await })
    }
}
