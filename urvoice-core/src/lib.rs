//! UrVoice Core - client engine for the UrVoice speaking practice app
//!
//! Talks to the UrVoice backend (accounts, articles, speech-to-text, grammar
//! analysis, practice history), exposes every call as an observable
//! [`AsyncResult`] sequence, and keeps per-screen view state plus the
//! record/transcribe/analyze/save pipeline on top of that.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod history;
pub mod media;
pub mod migrations;
pub mod pipeline;
pub mod repository;
pub mod result;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod types;
pub mod viewmodel;

pub use error::{Error, ErrorKind, Failure, Result};
pub use types::*;

/// Re-export the main components for convenience
pub use api::ApiClient;
pub use audio::{AudioClip, Recorder};
pub use config::Config;
pub use media::build_media_url;
pub use pipeline::{PipelineStage, SpeechPipeline};
pub use repository::{
    AnalyzeRepository, ArticleRepository, AuthRepository, HistoryRepository, SpeechRepository,
    UserRepository,
};
pub use result::{AsyncResult, Reply, ResultStream};
pub use session::{MemorySessionStore, SessionStore};
pub use storage::Storage;
pub use viewmodel::{
    ArticleViewModel, HistoryViewModel, HomeViewModel, LoginViewModel, ProfileViewModel,
    RegisterViewModel, SplashViewModel, StateSlot,
};
