//! IoT sprayer control

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::IntegrationError;
use crate::clock;
use crate::config::SprayerConfig;

/// Disease severity, also used to size the spray run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Spray run length in seconds
    pub const fn spray_duration_secs(self) -> u32 {
        match self {
            Self::Low => 15,
            Self::Medium => 30,
            Self::High => 45,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: only `Low`, `Medium` and `High` are accepted
impl FromStr for Severity {
    type Err = IntegrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| IntegrationError::InvalidInput(format!("unknown severity '{s}'")))
    }
}

/// Activation request sent to the sprayer
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SprayCommand {
    pub crop: String,
    pub disease: String,
    pub severity: Severity,
}

/// Sprayer acknowledgement
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SprayActivation {
    pub status: String,
    pub message: String,
    /// Seconds
    pub spray_duration: u32,
    pub chemical_used: String,
    pub timestamp: String,
}

/// Device health reported by `/status`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeviceStatus {
    pub status: String,
    pub last_communication: String,
    pub battery_level: u8,
}

/// Sprayer device driver
#[async_trait]
pub trait SprayerController: Send + Sync {
    async fn activate(&self, command: &SprayCommand) -> Result<SprayActivation, IntegrationError>;

    async fn status(&self) -> Result<DeviceStatus, IntegrationError>;
}

/// Placeholder sprayer that succeeds unless its battery is flat
#[derive(Debug, Clone)]
pub struct MockSprayer {
    delay: Duration,
    battery_level: u8,
}

impl MockSprayer {
    pub const fn new(delay: Duration, battery_level: u8) -> Self {
        Self {
            delay,
            battery_level,
        }
    }

    pub const fn from_config(config: &SprayerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.simulated_delay_ms),
            config.battery_level,
        )
    }
}

#[async_trait]
impl SprayerController for MockSprayer {
    async fn activate(&self, command: &SprayCommand) -> Result<SprayActivation, IntegrationError> {
        info!(
            crop = %command.crop,
            disease = %command.disease,
            severity = %command.severity,
            "Activating IoT sprayer"
        );
        tokio::time::sleep(self.delay).await;

        if self.battery_level == 0 {
            return Err(IntegrationError::Unavailable("sprayer battery depleted".to_string()));
        }

        let activation = SprayActivation {
            status: "success".to_string(),
            message: "Sprayer activated successfully".to_string(),
            spray_duration: command.severity.spray_duration_secs(),
            chemical_used: "Fungicide".to_string(),
            timestamp: clock::iso_now(),
        };

        info!(message = %activation.message, "IoT sprayer responded");
        Ok(activation)
    }

    async fn status(&self) -> Result<DeviceStatus, IntegrationError> {
        Ok(DeviceStatus {
            status: "connected".to_string(),
            last_communication: clock::iso_now(),
            battery_level: self.battery_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(severity: Severity) -> SprayCommand {
        SprayCommand {
            crop: "Wheat".to_string(),
            disease: "Rust".to_string(),
            severity,
        }
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("Low".parse::<Severity>().unwrap(), Severity::Low);
        assert_eq!("Medium".parse::<Severity>().unwrap(), Severity::Medium);
        assert_eq!("High".parse::<Severity>().unwrap(), Severity::High);
        assert!("low".parse::<Severity>().is_err());
        assert!("Critical".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"High\"");
        assert_eq!(Severity::default(), Severity::Medium);
    }

    #[tokio::test]
    async fn test_spray_duration_follows_severity() {
        let sprayer = MockSprayer::new(Duration::ZERO, 85);
        for (severity, secs) in [(Severity::Low, 15), (Severity::Medium, 30), (Severity::High, 45)] {
            let activation = sprayer.activate(&command(severity)).await.unwrap();
            assert_eq!(activation.spray_duration, secs);
            assert_eq!(activation.status, "success");
            assert_eq!(activation.chemical_used, "Fungicide");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_waits_for_configured_delay() {
        let sprayer = MockSprayer::from_config(&SprayerConfig {
            simulated_delay_ms: 1000,
            battery_level: 85,
        });

        let start = tokio::time::Instant::now();
        sprayer.activate(&command(Severity::Low)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_flat_battery_fails_activation() {
        let sprayer = MockSprayer::new(Duration::ZERO, 0);
        let err = sprayer.activate(&command(Severity::High)).await.unwrap_err();
        assert_eq!(err.to_string(), "unavailable: sprayer battery depleted");
    }

    #[tokio::test]
    async fn test_status_reports_battery() {
        let sprayer = MockSprayer::new(Duration::ZERO, 42);
        let status = sprayer.status().await.unwrap();
        assert_eq!(status.status, "connected");
        assert_eq!(status.battery_level, 42);
    }
}
