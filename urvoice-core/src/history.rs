//! Helpers over fetched history lists

use chrono::{DateTime, Utc};

use crate::types::HistoryEntry;

/// Parse a server timestamp, `None` when missing or not RFC 3339
pub fn parse_created_at(entry: &HistoryEntry) -> Option<DateTime<Utc>> {
    let raw = entry.created_at.as_deref()?;
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The most recently created entry.
///
/// Entries whose timestamp is missing or unparsable are never selected; if no
/// entry has a usable timestamp the result is `None`. Ties keep the entry that
/// appears last in the list.
pub fn latest_entry(entries: &[HistoryEntry]) -> Option<&HistoryEntry> {
    entries
        .iter()
        .filter_map(|entry| parse_created_at(entry).map(|at| (at, entry)))
        .max_by_key(|(at, _)| *at)
        .map(|(_, entry)| entry)
}

/// Entries ordered newest first; undated entries go last in their original order
pub fn sorted_newest_first(entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let mut dated: Vec<(Option<DateTime<Utc>>, &HistoryEntry)> =
        entries.iter().map(|e| (parse_created_at(e), e)).collect();
    // sort_by is stable, so equal keys keep their list order
    dated.sort_by(|(a, _), (b, _)| b.cmp(a));
    dated.into_iter().map(|(_, e)| e.clone()).collect()
}
