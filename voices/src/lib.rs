pub mod catalog;
pub mod commands;
pub mod diagnostics;
pub mod events;
pub mod reconcile;
pub mod settings;
pub mod store;
pub mod telemetry;
pub mod transfer;

mod engine;
mod error;

pub use engine::{BootstrapOutcome, StatusLine, VoiceEngine};
pub use error::AppError;
