//! Speech-to-text upload and grammar analysis

use std::sync::Arc;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use uuid::Uuid;

use crate::api::{ANALYZE_SPEECH, ApiClient, Auth, SPEECH_TO_TEXT};
use crate::audio::AudioClip;
use crate::error::{Error, Result};
use crate::result::{Reply, ResultStream, track};
use crate::types::{AnalyzeRequest, Analysis, Transcript};

#[derive(Clone)]
pub struct SpeechRepository {
    api: Arc<ApiClient>,
}

impl SpeechRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Encode a recording as WAV and upload it for transcription
    pub fn speech_to_text(&self, clip: AudioClip) -> ResultStream<Transcript> {
        let api = Arc::clone(&self.api);
        track(async move {
            if clip.is_empty() {
                return Err(Error::InvalidInput("recording is empty".to_string()));
            }
            let wav = clip.to_wav()?;
            let file_name = format!("recording-{}.wav", Uuid::new_v4());
            upload(&api, file_name, wav).await
        })
    }
}

async fn upload(api: &ApiClient, file_name: String, wav: Vec<u8>) -> Result<Reply<Transcript>> {
    debug!("Uploading {} ({} bytes) for transcription", file_name, wav.len());

    let part = Part::bytes(wav).file_name(file_name).mime_str("audio/wav")?;
    let form = Form::new().part("audio", part);

    let builder = api
        .request(Method::POST, SPEECH_TO_TEXT, Auth::Bearer)
        .await?
        .multipart(form);
    let reply = api.send::<Transcript>(builder).await?;
    if reply
        .data
        .audio_file_name
        .as_deref()
        .is_none_or(|name| name.trim().is_empty())
    {
        return Err(Error::Decode("transcript is missing its audio file name".to_string()));
    }
    Ok(reply)
}

#[derive(Clone)]
pub struct AnalyzeRepository {
    api: Arc<ApiClient>,
}

impl AnalyzeRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Run grammar analysis on a transcript of a previously uploaded recording
    pub fn analyze(&self, text: &str, audio_file_name: &str) -> ResultStream<Analysis> {
        let api = Arc::clone(&self.api);
        let request = AnalyzeRequest {
            text: text.trim().to_string(),
            audio_file_name: audio_file_name.to_string(),
        };
        track(async move {
            if request.text.is_empty() {
                return Err(Error::InvalidInput("nothing to analyze".to_string()));
            }
            debug!("Analyzing {} chars", request.text.len());
            api.post_json::<_, Analysis>(ANALYZE_SPEECH, &request, Auth::Bearer)
                .await
        })
    }
}
