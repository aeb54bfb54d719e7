//! External integrations: crop disease analyzer and IoT sprayer
//!
//! Request handlers only see the [`DiseaseAnalyzer`] and [`SprayerController`]
//! traits. The mock implementations stand in until a trained model and a
//! device driver are wired in through `AppState::with_integrations`.

pub mod analyzer;
pub mod image;
pub mod sprayer;

use thiserror::Error;

pub use analyzer::{Analysis, DiseaseAnalyzer, MockAnalyzer, ModelStatus};
pub use image::DataUrl;
pub use sprayer::{DeviceStatus, MockSprayer, Severity, SprayActivation, SprayCommand, SprayerController};

/// Failure reported by an analyzer or sprayer implementation
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
}
