// Endpoint handlers module

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::info;

use super::error::ApiError;
use super::types::{
    AnalysisResult, HealthResponse, SprayRequest, SprayResult, StatusResponse, SystemInfo,
};
use crate::clock;
use crate::config::AppState;
use crate::http::{json_response, read_body, BoxError};
use crate::integrations::{DataUrl, Severity, SprayCommand};

type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

const UNKNOWN: &str = "Unknown";

/// `GET /health`
pub fn health(state: &AppState) -> HandlerResult {
    let body = HealthResponse {
        status: "healthy",
        timestamp: clock::iso_now(),
        version: state.config.service.version.clone(),
    };
    Ok(json_response(StatusCode::OK, &body, state.config.server.debug))
}

/// `POST /predictDisease`
pub async fn predict_disease<B>(body: B, state: &AppState) -> HandlerResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let bytes = read_body(body, state.config.http.max_body_size).await?;
    let image = extract_image(&bytes)?;
    info!("Received disease prediction request");

    let data_url = DataUrl::parse(&image).ok_or_else(ApiError::invalid_image_format)?;

    let started = Instant::now();
    let analysis = state
        .analyzer
        .analyze(&data_url)
        .await
        .map_err(|e| ApiError::prediction_failed(&e))?;
    let processing_time = format_processing_time(started.elapsed());

    info!(disease = %analysis.disease, %processing_time, "Disease prediction successful");

    let result = AnalysisResult {
        analysis,
        timestamp: clock::iso_now(),
        processing_time,
        model_version: state.analyzer.model_version().to_string(),
    };
    Ok(json_response(StatusCode::OK, &result, state.config.server.debug))
}

/// `POST /spray`
pub async fn spray<B>(body: B, state: &AppState) -> HandlerResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let bytes = read_body(body, state.config.http.max_body_size).await?;
    let command = parse_spray_request(&bytes)?.into_command()?;

    let activation = state
        .sprayer
        .activate(&command)
        .await
        .map_err(|e| ApiError::spray_failed(&e))?;

    info!(crop = %command.crop, "Sprayer activation successful");

    let result = SprayResult {
        activation,
        request_data: command,
    };
    Ok(json_response(StatusCode::OK, &result, state.config.server.debug))
}

/// `GET /status`
pub async fn system_status(state: &AppState) -> HandlerResult {
    let ai_model = state
        .analyzer
        .status()
        .await
        .map_err(|e| ApiError::status_failed(&e))?;
    let iot_sprayer = state
        .sprayer
        .status()
        .await
        .map_err(|e| ApiError::status_failed(&e))?;

    let body = StatusResponse {
        ai_model,
        iot_sprayer,
        system: SystemInfo {
            uptime: clock::format_uptime(state.uptime()),
            requests_processed: state.requests_processed(),
            last_restart: clock::iso_utc(state.started_at()),
        },
    };
    Ok(json_response(StatusCode::OK, &body, state.config.server.debug))
}

/// Pull the `image` string out of a prediction body
///
/// Anything that is not a JSON object carrying a non-null `image` counts as missing.
fn extract_image(body: &[u8]) -> Result<String, ApiError> {
    let Ok(Value::Object(mut fields)) = serde_json::from_slice::<Value>(body) else {
        return Err(ApiError::missing_image());
    };

    match fields.remove("image") {
        None | Some(Value::Null) => Err(ApiError::missing_image()),
        Some(Value::String(image)) => Ok(image),
        Some(_) => Err(ApiError::invalid_image_format()),
    }
}

/// An empty body or JSON `null` means "use every default"
fn parse_spray_request(body: &[u8]) -> Result<SprayRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SprayRequest::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid_body(format!("Malformed JSON: {e}")))?;

    match value {
        Value::Null => Ok(SprayRequest::default()),
        Value::Object(_) => {
            serde_json::from_value(value).map_err(|e| ApiError::invalid_body(e.to_string()))
        }
        _ => Err(ApiError::invalid_body("Request body must be a JSON object")),
    }
}

impl SprayRequest {
    /// Apply defaults and validate the severity level
    fn into_command(self) -> Result<SprayCommand, ApiError> {
        let crop = self.crop.unwrap_or_else(|| UNKNOWN.to_string());
        let disease = self.disease.unwrap_or_else(|| UNKNOWN.to_string());
        info!(%crop, %disease, "Received spray request");

        let severity = match self.severity {
            None => Severity::default(),
            Some(Value::String(level)) => level
                .parse::<Severity>()
                .map_err(|_| ApiError::invalid_severity())?,
            Some(_) => return Err(ApiError::invalid_severity()),
        };

        Ok(SprayCommand {
            crop,
            disease,
            severity,
        })
    }
}

fn format_processing_time(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}
