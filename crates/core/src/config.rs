use serde::Deserialize;
use std::time::Duration;

/// Tuning knobs for the extraction pipeline. Defaults mirror the production
/// configuration; deployments override them from a TOML fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Detections below this confidence are discarded before line merging.
    pub min_confidence: f32,
    /// A mean detection confidence below this triggers one retry on the
    /// image rotated 180°.
    pub retry_confidence: f32,
    /// Estimated skew at or below this many degrees is left uncorrected.
    pub skew_threshold_deg: f32,
    /// Hard ceiling on a single OCR backend invocation.
    pub ocr_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            retry_confidence: 0.6,
            skew_threshold_deg: 3.0,
            ocr_timeout_secs: 600,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_constants() {
        let c = PipelineConfig::default();
        assert_eq!(c.min_confidence, 0.5);
        assert_eq!(c.retry_confidence, 0.6);
        assert_eq!(c.skew_threshold_deg, 3.0);
        assert_eq!(c.ocr_timeout_secs, 600);
    }

    #[test]
    fn from_toml_overrides_only_given_keys() {
        let c = PipelineConfig::from_toml("min_confidence = 0.3\nocr_timeout_secs = 30\n").unwrap();
        assert_eq!(c.min_confidence, 0.3);
        assert_eq!(c.ocr_timeout_secs, 30);
        // untouched keys keep their defaults
        assert_eq!(c.retry_confidence, 0.6);
        assert_eq!(c.skew_threshold_deg, 3.0);
    }

    #[test]
    fn from_toml_rejects_garbage() {
        assert!(PipelineConfig::from_toml("min_confidence = [").is_err());
    }

    #[test]
    fn timeout_converts_to_duration() {
        let c = PipelineConfig { ocr_timeout_secs: 5, ..Default::default() };
        assert_eq!(c.ocr_timeout(), Duration::from_secs(5));
    }
}
