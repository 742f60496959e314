#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use urvoice::{ApiClient, Config, MemorySessionStore, SessionStore};
use wiremock::MockServer;

pub const TOKEN: &str = "tok-1";

pub struct Backend {
    pub server: MockServer,
    pub session: Arc<MemorySessionStore>,
    pub api: Arc<ApiClient>,
}

impl Backend {
    /// Mock server plus a client whose session already holds [`TOKEN`]
    pub async fn logged_in() -> Self {
        Self::start(Some(TOKEN), Duration::from_secs(5)).await
    }

    pub async fn logged_out() -> Self {
        Self::start(None, Duration::from_secs(5)).await
    }

    pub async fn start(token: Option<&str>, read_timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let session = Arc::new(match token {
            Some(t) => MemorySessionStore::with_token(t),
            None => MemorySessionStore::new(),
        });
        let config = Config::default()
            .with_base_url(server.uri())
            .expect("mock server uri is http")
            .with_timeouts(Duration::from_secs(2), read_timeout);
        let store: Arc<dyn SessionStore> = session.clone();
        let api = Arc::new(ApiClient::new(config, store).expect("client builds"));
        Self {
            server,
            session,
            api,
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.session.token().await.expect("memory store never fails")
    }
}

/// Successful envelope around `data`
pub fn ok(message: &str, data: Value) -> Value {
    json!({ "message": message, "success": true, "data": data })
}

/// Envelope the backend sends for a refused request
pub fn refused(message: &str) -> Value {
    json!({ "message": message, "success": false, "data": null })
}

pub fn user_json(name: &str) -> Value {
    json!({
        "id": 7,
        "name": name,
        "email": "rina@example.com",
        "profileImage": "profile/7.png"
    })
}

pub fn transcript_json() -> Value {
    json!({
        "text": "i goes to school yesterday",
        "audioPath": "/uploads/audio/rec-1.wav",
        "audioFileName": "rec-1.wav"
    })
}

pub fn analysis_json() -> Value {
    json!({
        "correctedParagraph": "I went to school yesterday.",
        "grammarAnalysis": [
            {"original": "goes", "corrected": "went", "reason": "past tense with 'yesterday'"}
        ]
    })
}

pub fn history_json(id: i64, created_at: Option<&str>) -> Value {
    json!({
        "id": id,
        "audioFileName": format!("rec-{id}.wav"),
        "audioPath": format!("/uploads/audio/rec-{id}.wav"),
        "originalParagraph": "i goes to school yesterday",
        "correctedParagraph": "I went to school yesterday.",
        "grammarAnalysis": [],
        "createdAt": created_at
    })
}
