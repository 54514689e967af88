use serde::{Deserialize, Serialize};

use crate::error::{MinutkaError, Result};

/// Longest side of the grayscale buffers used for frame comparison.
/// Caps per-comparison cost regardless of source resolution.
pub const MAX_COMPARE_DIM: u32 = 320;

/// Detection thresholds for a single run. Passed explicitly into each
/// scanner so two scans in the same process can use different values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// SSIM below this value counts as a scene change (strict `<`).
    pub scene_change_threshold: f64,
    /// Minimum seconds between two accepted scene changes.
    pub min_scene_duration: f64,
    /// Mean pixel difference above `click_threshold * 255` counts as an
    /// interaction (strict `>`).
    pub click_threshold: f64,
    /// Scene scanner analyzes every Nth frame.
    pub frame_sample_rate: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            scene_change_threshold: 0.3,
            min_scene_duration: 2.0,
            click_threshold: 0.1,
            frame_sample_rate: 1,
        }
    }
}

impl DetectionConfig {
    /// Reject malformed configs before any scanning starts. Scan results
    /// are best-effort and never fail mid-run, so contract violations
    /// have to surface here.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.scene_change_threshold) {
            return Err(MinutkaError::InvalidConfig {
                reason: format!(
                    "scene_change_threshold must be within [0, 1], got {}",
                    self.scene_change_threshold
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.click_threshold) {
            return Err(MinutkaError::InvalidConfig {
                reason: format!(
                    "click_threshold must be within [0, 1], got {}",
                    self.click_threshold
                ),
            });
        }
        if self.min_scene_duration < 0.0 || !self.min_scene_duration.is_finite() {
            return Err(MinutkaError::InvalidConfig {
                reason: format!(
                    "min_scene_duration must be a non-negative number of seconds, got {}",
                    self.min_scene_duration
                ),
            });
        }
        if self.frame_sample_rate == 0 {
            return Err(MinutkaError::InvalidConfig {
                reason: "frame_sample_rate must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DetectionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let mut config = DetectionConfig::default();
        config.scene_change_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = DetectionConfig::default();
        config.click_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_stride_and_negative_duration() {
        let mut config = DetectionConfig::default();
        config.frame_sample_rate = 0;
        assert!(config.validate().is_err());

        let mut config = DetectionConfig::default();
        config.min_scene_duration = -2.0;
        assert!(config.validate().is_err());
    }
}
