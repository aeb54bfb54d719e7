//! Crop disease analyzer

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use super::image::DataUrl;
use super::sprayer::Severity;
use super::IntegrationError;
use crate::config::AnalyzerConfig;

/// Recommended treatments for a detected disease
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Treatment {
    pub organic: String,
    pub chemical: String,
}

/// Model output for a single crop image
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Analysis {
    pub crop: String,
    pub disease: String,
    pub severity: Severity,
    /// Percentage in `[0, 100]`
    pub confidence: f64,
    pub treatment: Treatment,
    pub description: String,
}

/// Model readiness reported by `/status`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModelStatus {
    pub status: String,
    pub version: String,
    pub last_updated: String,
}

/// Image classification backend
#[async_trait]
pub trait DiseaseAnalyzer: Send + Sync {
    async fn analyze(&self, image: &DataUrl<'_>) -> Result<Analysis, IntegrationError>;

    /// Version string attached to every analysis result
    fn model_version(&self) -> &str;

    async fn status(&self) -> Result<ModelStatus, IntegrationError>;
}

/// Placeholder analyzer returning a fixed leaf rust diagnosis
#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    delay: Duration,
    model_version: String,
    last_updated: String,
}

impl MockAnalyzer {
    pub fn new(delay: Duration, model_version: impl Into<String>) -> Self {
        Self {
            delay,
            model_version: model_version.into(),
            last_updated: "2025-01-15T10:30:00Z".to_string(),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            last_updated: config.last_updated.clone(),
            ..Self::new(
                Duration::from_millis(config.simulated_delay_ms),
                config.model_version.clone(),
            )
        }
    }
}

#[async_trait]
impl DiseaseAnalyzer for MockAnalyzer {
    async fn analyze(&self, image: &DataUrl<'_>) -> Result<Analysis, IntegrationError> {
        info!(
            media_type = image.media_type(),
            base64 = image.is_base64(),
            approx_bytes = image.decoded_len_hint(),
            "Processing crop image with AI model"
        );
        tokio::time::sleep(self.delay).await;

        let analysis = Analysis {
            crop: "Wheat".to_string(),
            disease: "Leaf Rust".to_string(),
            severity: Severity::Medium,
            confidence: 87.5,
            treatment: Treatment {
                organic: "Apply neem oil spray twice weekly. Ensure proper air circulation and avoid overhead watering.".to_string(),
                chemical: "Use fungicide containing propiconazole. Apply as directed on the product label.".to_string(),
            },
            description: "Leaf rust is a fungal disease that appears as orange-brown pustules on leaves. Early detection and treatment are crucial to prevent yield loss.".to_string(),
        };

        info!(
            disease = %analysis.disease,
            confidence = analysis.confidence,
            "AI analysis complete"
        );
        Ok(analysis)
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }

    async fn status(&self) -> Result<ModelStatus, IntegrationError> {
        Ok(ModelStatus {
            status: "ready".to_string(),
            version: self.model_version.clone(),
            last_updated: self.last_updated.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_leaf_rust() {
        let analyzer = MockAnalyzer::new(Duration::ZERO, "v1.0.0");
        let image = DataUrl::parse("data:image/jpeg;base64,AAAA").unwrap();
        let analysis = analyzer.analyze(&image).await.unwrap();

        assert_eq!(analysis.crop, "Wheat");
        assert_eq!(analysis.disease, "Leaf Rust");
        assert_eq!(analysis.severity, Severity::Medium);
        assert!((analysis.confidence - 87.5).abs() < f64::EPSILON);
        assert!(analysis.treatment.chemical.contains("propiconazole"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_waits_for_configured_delay() {
        let analyzer = MockAnalyzer::new(Duration::from_secs(2), "v1.0.0");
        let image = DataUrl::parse("data:image/png;base64,AAAA").unwrap();

        let start = tokio::time::Instant::now();
        analyzer.analyze(&image).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_status_reports_configured_version() {
        let config = AnalyzerConfig {
            simulated_delay_ms: 0,
            model_version: "v2.1.0".to_string(),
            last_updated: "2025-06-01T00:00:00Z".to_string(),
        };
        let analyzer = MockAnalyzer::from_config(&config);
        assert_eq!(analyzer.model_version(), "v2.1.0");

        let status = analyzer.status().await.unwrap();
        assert_eq!(status.status, "ready");
        assert_eq!(status.version, "v2.1.0");
        assert_eq!(status.last_updated, "2025-06-01T00:00:00Z");
    }
}
