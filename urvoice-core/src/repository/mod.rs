//! Repository layer: one unit of remote work per method
//!
//! Each method returns a [`ResultStream`](crate::result::ResultStream) that
//! emits `Loading` and then exactly one `Success` or `Error`. Transport and
//! decoding failures never escape as `Err`; they become `Error` emissions.

mod article;
mod auth;
mod history;
mod speech;
mod user;

pub use article::ArticleRepository;
pub use auth::AuthRepository;
pub use history::HistoryRepository;
pub use speech::{AnalyzeRepository, SpeechRepository};
pub use user::UserRepository;
