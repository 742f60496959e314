//! Core types used throughout UrVoice
//!
//! Records mirror the backend's JSON shapes. Fields the server may omit are
//! `Option`s; nothing here is mutated after deserialization.

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier used by the backend for users, articles and history entries
pub type RecordId = i64;

/// Response wrapper used by every endpoint: `{message, success, data}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
}

/// Credentials returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Relative upload path or absolute URL; resolve with `media::build_media_url`
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("User")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One grammar issue found in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarCorrection {
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default)]
    pub corrected: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Result of running grammar analysis on a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(default)]
    pub corrected_paragraph: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub grammar_analysis: Vec<GrammarCorrection>,
}

/// Speech-to-text output for one uploaded recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    #[serde(default)]
    pub text: Option<String>,
    /// Server-side path of the stored audio, relative to the media root
    #[serde(default)]
    pub audio_path: Option<String>,
    /// Name the server assigned to the upload; needed for analysis and history
    #[serde(default)]
    pub audio_file_name: Option<String>,
}

impl Transcript {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// A saved practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub audio_file_name: Option<String>,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub original_paragraph: Option<String>,
    #[serde(default)]
    pub corrected_paragraph: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub grammar_analysis: Vec<GrammarCorrection>,
    /// ISO-8601 timestamp as sent by the server
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The server sends `null` instead of `[]` for empty analyses
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ========== Request bodies ==========

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    pub audio_file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveHistoryRequest {
    pub audio_file_name: String,
    pub original_paragraph: String,
    pub corrected_paragraph: String,
    pub grammar_analysis: Vec<GrammarCorrection>,
}

impl SaveHistoryRequest {
    /// Build the save payload from a confirmed transcript and its analysis
    pub fn from_analysis(audio_file_name: &str, original: &str, analysis: &Analysis) -> Self {
        Self {
            audio_file_name: audio_file_name.to_string(),
            original_paragraph: original.to_string(),
            corrected_paragraph: analysis.corrected_paragraph.clone().unwrap_or_default(),
            grammar_analysis: analysis.grammar_analysis.clone(),
        }
    }
}
