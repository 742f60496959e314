use std::sync::Arc;

use tracing::info;

use crate::api::{ApiClient, Auth, HISTORY_DETAIL, HISTORY_LIST, HISTORY_SAVE};
use crate::error::Error;
use crate::result::{ResultStream, track};
use crate::types::{HistoryEntry, RecordId, SaveHistoryRequest};

#[derive(Clone)]
pub struct HistoryRepository {
    api: Arc<ApiClient>,
}

impl HistoryRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub fn save_history(&self, request: SaveHistoryRequest) -> ResultStream<HistoryEntry> {
        let api = Arc::clone(&self.api);
        track(async move {
            if request.audio_file_name.is_empty() {
                return Err(Error::InvalidInput(
                    "history entry needs the uploaded audio file name".to_string(),
                ));
            }
            let reply = api
                .post_json::<_, HistoryEntry>(HISTORY_SAVE, &request, Auth::Bearer)
                .await?;
            info!(
                "Saved history entry {:?} ({} corrections)",
                reply.data.id,
                request.grammar_analysis.len()
            );
            Ok(reply)
        })
    }

    pub fn all_history(&self) -> ResultStream<Vec<HistoryEntry>> {
        let api = Arc::clone(&self.api);
        track(async move { api.get::<Vec<HistoryEntry>>(HISTORY_LIST).await })
    }

    pub fn history(&self, id: RecordId) -> ResultStream<HistoryEntry> {
        let api = Arc::clone(&self.api);
        track(async move { api.get::<HistoryEntry>(&format!("{HISTORY_DETAIL}/{id}")).await })
    }
}
