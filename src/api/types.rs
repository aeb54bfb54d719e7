// API request/response types

use serde::{Deserialize, Deserializer, Serialize};

use crate::integrations::{Analysis, DeviceStatus, ModelStatus, SprayActivation, SprayCommand};

/// `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: String,
}

/// `POST /predictDisease` success body: analyzer output plus request metadata
#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub timestamp: String,
    pub processing_time: String,
    pub model_version: String,
}

/// `POST /spray` request body; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct SprayRequest {
    pub crop: Option<String>,
    pub disease: Option<String>,
    /// Kept loose so a non-string severity reports as an invalid level.
    /// `None` only when the key is absent; an explicit `null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present")]
    pub severity: Option<serde_json::Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// `POST /spray` success body: sprayer acknowledgement plus the request echo
#[derive(Debug, Serialize)]
pub struct SprayResult {
    #[serde(flatten)]
    pub activation: SprayActivation,
    pub request_data: SprayCommand,
}

/// `GET /status`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ai_model: ModelStatus,
    pub iot_sprayer: DeviceStatus,
    pub system: SystemInfo,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub uptime: String,
    pub requests_processed: u64,
    pub last_restart: String,
}
