use std::sync::Arc;

use crate::api::ApiClient;
use crate::history::sorted_newest_first;
use crate::repository::HistoryRepository;
use crate::types::{HistoryEntry, RecordId, SaveHistoryRequest};

use super::StateSlot;

/// History list, detail and save state
pub struct HistoryViewModel {
    repository: HistoryRepository,
    history: StateSlot<Vec<HistoryEntry>>,
    detail: StateSlot<HistoryEntry>,
    save: StateSlot<HistoryEntry>,
}

impl HistoryViewModel {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            repository: HistoryRepository::new(api),
            history: StateSlot::new(),
            detail: StateSlot::new(),
            save: StateSlot::new(),
        }
    }

    pub fn history(&self) -> &StateSlot<Vec<HistoryEntry>> {
        &self.history
    }

    pub fn detail(&self) -> &StateSlot<HistoryEntry> {
        &self.detail
    }

    pub fn save_state(&self) -> &StateSlot<HistoryEntry> {
        &self.save
    }

    pub fn load_all(&self) {
        self.history.launch(self.repository.all_history());
    }

    pub fn load(&self, id: RecordId) {
        self.detail.launch(self.repository.history(id));
    }

    pub fn save(&self, request: SaveHistoryRequest) {
        self.save.launch(self.repository.save_history(request));
    }

    pub fn reset_save(&self) {
        self.save.reset();
    }

    /// Loaded entries ordered newest first, empty until the list has loaded
    pub fn entries_newest_first(&self) -> Vec<HistoryEntry> {
        self.history
            .get()
            .value()
            .map(|entries| sorted_newest_first(entries))
            .unwrap_or_default()
    }
}
