//! Media URL resolution
//!
//! The backend stores uploads (profile photos, article images, recordings) by
//! relative name; clients resolve them against the configured base URL.

const UPLOADS_PREFIX: &str = "/uploads/";

/// Resolve a media reference to a fetchable URL.
///
/// Blank input yields an empty string, absolute URLs pass through, and
/// anything else is placed under `<base>/uploads/`.
pub fn build_media_url(base_url: &str, path: Option<&str>) -> String {
    let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
        return String::new();
    };

    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with(UPLOADS_PREFIX) {
        format!("{base}{path}")
    } else {
        format!("{base}{UPLOADS_PREFIX}{}", path.trim_start_matches('/'))
    }
}
