//! Pose parameter descriptors

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Named continuous blend control
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct PoseParamDesc {
    /// Parameter name
    pub name: String,
    /// Value mapped to normalized 0.0
    pub start: f32,
    /// Value mapped to normalized 1.0
    pub end: f32,
    /// Wrap span for cyclic parameters (e.g. 360 for a yaw); 0.0 when not cyclic
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub looping: f32,
}

impl PoseParamDesc {
    pub fn new<S: Into<String>>(name: S, start: f32, end: f32) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            looping: 0.0,
        }
    }

    #[must_use]
    pub fn with_looping(mut self, span: f32) -> Self {
        self.looping = span;
        self
    }

    /// Map a value into `[0, 1]`, wrapping cyclic parameters first
    pub fn normalize(&self, value: f32) -> f32 {
        let mut value = value;
        if self.looping > 0.0 {
            let wrap = (self.start + self.end) / 2.0 + self.looping / 2.0;
            let shift = self.looping - wrap;
            value -= self.looping * ((value + shift) / self.looping).floor();
        }
        let span = self.end - self.start;
        if span == 0.0 {
            return 0.0;
        }
        ((value - self.start) / span).clamp(0.0, 1.0)
    }

    /// Map a normalized value back into parameter units
    pub fn denormalize(&self, normalized: f32) -> f32 {
        normalized * (self.end - self.start) + self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps() {
        let p = PoseParamDesc::new("aim_pitch", -45.0, 45.0);
        assert!((p.normalize(0.0) - 0.5).abs() < 0.001);
        assert_eq!(p.normalize(90.0), 1.0);
        assert_eq!(p.normalize(-90.0), 0.0);
        assert!((p.denormalize(0.25) + 22.5).abs() < 0.001);
    }

    #[test]
    fn test_normalize_wraps_cyclic() {
        let p = PoseParamDesc::new("move_yaw", -180.0, 180.0).with_looping(360.0);
        // 270 wraps to -90
        assert!((p.normalize(270.0) - 0.25).abs() < 0.001);
        assert!((p.normalize(-270.0) - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_degenerate_range() {
        let p = PoseParamDesc::new("flat", 1.0, 1.0);
        assert_eq!(p.normalize(5.0), 0.0);
    }
}
