//! Speech practice pipeline
//!
//! Drives one practice round: record, transcribe, let the user confirm the
//! transcript, analyze grammar, save to history. The current [`PipelineStage`]
//! is observable; each network step runs as a task owned by the stage slot, so
//! `reset` or a newer step cancels it and any late result is dropped.
//!
//! ```text
//! Idle -> Recording -> Transcribing -> TranscribedAwaitingConfirmation
//!      -> Analyzing -> AnalyzedAwaitingSave -> Saving -> Saved
//! ```
//!
//! Each network step has a matching failure stage from which `retry` re-issues
//! the same request.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::audio::{AudioClip, Recorder};
use crate::error::{Error, ErrorKind, Failure, Result};
use crate::repository::{AnalyzeRepository, HistoryRepository, SpeechRepository};
use crate::result::{AsyncResult, ResultStream, settle};
use crate::types::{Analysis, HistoryEntry, SaveHistoryRequest, Transcript};
use crate::viewmodel::Slot;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    Idle,
    Recording,
    Transcribing,
    TranscriptionFailed(Failure),
    TranscribedAwaitingConfirmation(Transcript),
    Analyzing,
    AnalysisFailed(Failure),
    AnalyzedAwaitingSave(Analysis),
    Saving,
    SaveFailed(Failure),
    Saved(HistoryEntry),
}

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Transcribing => "transcribing",
            Self::TranscriptionFailed(_) => "transcription failed",
            Self::TranscribedAwaitingConfirmation(_) => "awaiting transcript confirmation",
            Self::Analyzing => "analyzing",
            Self::AnalysisFailed(_) => "analysis failed",
            Self::AnalyzedAwaitingSave(_) => "awaiting save",
            Self::Saving => "saving",
            Self::SaveFailed(_) => "save failed",
            Self::Saved(_) => "saved",
        }
    }

    /// A request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Transcribing | Self::Analyzing | Self::Saving)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::TranscriptionFailed(f) | Self::AnalysisFailed(f) | Self::SaveFailed(f) => Some(f),
            _ => None,
        }
    }
}

/// Inputs kept around so a failed step can be re-issued
#[derive(Default)]
struct Round {
    clip: Option<AudioClip>,
    transcript: Option<Transcript>,
    analysis: Option<Analysis>,
}

/// Steps that hit the network spawn onto the ambient tokio runtime.
pub struct SpeechPipeline {
    recorder: Recorder,
    speech: SpeechRepository,
    analyzer: AnalyzeRepository,
    history: HistoryRepository,
    stage: Slot<PipelineStage>,
    round: Mutex<Round>,
}

impl SpeechPipeline {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self::with_recorder(api, Recorder::new())
    }

    pub fn with_recorder(api: Arc<ApiClient>, recorder: Recorder) -> Self {
        Self {
            recorder,
            speech: SpeechRepository::new(Arc::clone(&api)),
            analyzer: AnalyzeRepository::new(Arc::clone(&api)),
            history: HistoryRepository::new(api),
            stage: Slot::new(PipelineStage::Idle),
            round: Mutex::new(Round::default()),
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineStage> {
        self.stage.subscribe()
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Input level for the recording meter, `0.0` once capture has stopped
    pub fn audio_level(&self) -> f32 {
        self.recorder.current_audio_level()
    }

    /// Wait until no request is in flight and return the stage reached
    pub async fn settled(&self) -> PipelineStage {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| !s.is_busy()).await {
            Ok(stage) => stage.clone(),
            Err(_) => self.stage(),
        }
    }

    pub fn start_recording(&self) -> Result<()> {
        let mut round = self.round.lock();
        let stage = self.stage.get();
        if !matches!(stage, PipelineStage::Idle | PipelineStage::Saved(_)) {
            return Err(invalid(&stage));
        }

        *round = Round::default();
        self.recorder.start()?;
        self.stage.replace(PipelineStage::Recording);
        Ok(())
    }

    pub fn push_samples(&self, frames: &[f32]) -> Result<()> {
        let stage = self.stage.get();
        if stage != PipelineStage::Recording {
            return Err(invalid(&stage));
        }
        self.recorder.push(frames);
        Ok(())
    }

    /// Finish the recording and upload it. Needs a tokio runtime.
    pub fn stop_and_transcribe(&self) -> Result<()> {
        let mut round = self.round.lock();
        let stage = self.stage.get();
        if stage != PipelineStage::Recording {
            return Err(invalid(&stage));
        }

        let clip = self.recorder.stop()?;
        round.clip = Some(clip.clone());
        self.transcribe(clip);
        Ok(())
    }

    /// Accept the transcript and send it for grammar analysis
    pub fn confirm_transcript(&self) -> Result<()> {
        let mut round = self.round.lock();
        let PipelineStage::TranscribedAwaitingConfirmation(transcript) = self.stage.get() else {
            return Err(invalid(&self.stage.get()));
        };
        if transcript.text().trim().is_empty() {
            return Err(Error::InvalidInput("transcript is empty".to_string()));
        }
        if audio_file_name(&transcript).is_none() {
            return Err(Error::InvalidInput("transcript has no audio file".to_string()));
        }

        self.analyze(&transcript);
        round.transcript = Some(transcript);
        Ok(())
    }

    /// Throw the transcript away and return to idle so the user can re-record
    pub fn reject_transcript(&self) -> Result<()> {
        let mut round = self.round.lock();
        let stage = self.stage.get();
        if !matches!(stage, PipelineStage::TranscribedAwaitingConfirmation(_)) {
            return Err(invalid(&stage));
        }

        *round = Round::default();
        self.stage.replace(PipelineStage::Idle);
        debug!("Transcript rejected");
        Ok(())
    }

    /// Persist the analysis to the user's history
    pub fn save(&self) -> Result<()> {
        let mut round = self.round.lock();
        let PipelineStage::AnalyzedAwaitingSave(analysis) = self.stage.get() else {
            return Err(invalid(&self.stage.get()));
        };
        let request = save_request(round.transcript.as_ref(), &analysis)?;

        self.persist(request);
        round.analysis = Some(analysis);
        Ok(())
    }

    /// Re-issue whichever network step failed last
    pub fn retry(&self) -> Result<()> {
        let round = self.round.lock();
        let stage = self.stage.get();
        match (&stage, &*round) {
            (
                PipelineStage::TranscriptionFailed(_),
                Round {
                    clip: Some(clip), ..
                },
            ) => self.transcribe(clip.clone()),
            (
                PipelineStage::AnalysisFailed(_),
                Round {
                    transcript: Some(transcript),
                    ..
                },
            ) => self.analyze(transcript),
            (
                PipelineStage::SaveFailed(_),
                Round {
                    transcript,
                    analysis: Some(analysis),
                    ..
                },
            ) => self.persist(save_request(transcript.as_ref(), analysis)?),
            _ => return Err(invalid(&stage)),
        }
        info!("Retrying after {}", stage.name());
        Ok(())
    }

    /// Abandon the round from any stage; in-flight results are discarded
    pub fn reset(&self) {
        let mut round = self.round.lock();
        *round = Round::default();
        self.recorder.discard();
        self.stage.replace(PipelineStage::Idle);
        debug!("Pipeline reset");
    }

    fn transcribe(&self, clip: AudioClip) {
        self.run(
            PipelineStage::Transcribing,
            self.speech.speech_to_text(clip),
            PipelineStage::TranscribedAwaitingConfirmation,
            PipelineStage::TranscriptionFailed,
        );
    }

    fn analyze(&self, transcript: &Transcript) {
        self.run(
            PipelineStage::Analyzing,
            self.analyzer
                .analyze(transcript.text(), audio_file_name(transcript).unwrap_or_default()),
            PipelineStage::AnalyzedAwaitingSave,
            PipelineStage::AnalysisFailed,
        );
    }

    fn persist(&self, request: SaveHistoryRequest) {
        self.run(
            PipelineStage::Saving,
            self.history.save_history(request),
            PipelineStage::Saved,
            PipelineStage::SaveFailed,
        );
    }

    fn run<T>(
        &self,
        busy: PipelineStage,
        results: ResultStream<T>,
        on_success: fn(T) -> PipelineStage,
        on_failure: fn(Failure) -> PipelineStage,
    ) where
        T: Send + 'static,
    {
        debug!("Pipeline {}", busy.name());
        let writer = self.stage.begin(busy);
        self.stage.spawn(writer, move |writer| async move {
            let next = match settle(results).await {
                AsyncResult::Success { value, .. } => on_success(value),
                AsyncResult::Error(failure) => {
                    warn!("Pipeline step failed: {}", failure);
                    on_failure(failure)
                }
                AsyncResult::Initial | AsyncResult::Loading => on_failure(Failure::new(
                    ErrorKind::Local,
                    "request finished without a result",
                )),
            };
            writer.publish(next);
        });
    }
}

fn invalid(stage: &PipelineStage) -> Error {
    Error::InvalidState(stage.name().to_string())
}

fn save_request(transcript: Option<&Transcript>, analysis: &Analysis) -> Result<SaveHistoryRequest> {
    let transcript =
        transcript.ok_or_else(|| Error::InvalidState("no confirmed transcript".to_string()))?;
    let file_name = audio_file_name(transcript)
        .ok_or_else(|| Error::InvalidInput("transcript has no audio file".to_string()))?;
    Ok(SaveHistoryRequest::from_analysis(file_name, transcript.text(), analysis))
}

fn audio_file_name(transcript: &Transcript) -> Option<&str> {
    transcript
        .audio_file_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
}
