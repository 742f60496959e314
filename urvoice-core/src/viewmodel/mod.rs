//! Per-screen view state
//!
//! Each holder owns one [`StateSlot`] per operation it can trigger. Triggering
//! an operation flips its slot to `Loading` at once and fills in the outcome
//! when the request settles. Observers read the latest value or subscribe to
//! changes; nothing is lost when a screen is rebuilt because the holder keeps
//! the last result.
//!
//! Trigger methods spawn their request onto the ambient tokio runtime and
//! panic when called outside one.

mod article;
mod auth;
mod history;
mod home;
mod profile;
mod slot;
mod splash;

pub use article::ArticleViewModel;
pub use auth::{LoginViewModel, RegisterViewModel};
pub use history::HistoryViewModel;
pub use home::HomeViewModel;
pub use profile::ProfileViewModel;
pub use slot::{Slot, SlotWriter, StateSlot};
pub use splash::{SplashViewModel, StartupDestination, StartupState};
