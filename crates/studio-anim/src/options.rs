//! Tunable engine constants

/// What an IK trace does when its trace hits nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum IkMissPolicy {
    /// Leave the target at its desired position
    #[default]
    KeepDesired,
    /// Snap to the end of the trace segment even if nothing was hit
    UseTraceEnd,
}

/// When autoplay sequences are layered onto the primary pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum AutoplayPolicy {
    /// Only while the entity has an IK context
    #[default]
    WithIk,
    /// On every pose evaluation
    Always,
}

/// Options controlling clock advance, event dispatch and IK behaviour
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimatingOptions {
    /// Longest interval a single advance may consume (seconds)
    pub max_interval: f32,
    /// Advances of this interval or less are ignored (seconds)
    pub min_advance: f32,
    /// Duration assumed for a missing model, invalid sequence or zero-length sequence
    pub fallback_duration: f32,
    /// Scan end used once a non-looping sequence has finished
    pub event_overshoot: f32,
    /// Width of the sequence and events parity counters
    pub parity_bits: u32,
    /// Event numbers at or above this are client-side and never dispatched here
    pub client_event_threshold: i32,
    /// IK trace behaviour when nothing is hit
    pub ik_miss_policy: IkMissPolicy,
    /// Autoplay layering
    pub autoplay: AutoplayPolicy,
}

impl Default for AnimatingOptions {
    fn default() -> Self {
        Self {
            max_interval: 0.2,
            min_advance: 0.001,
            fallback_duration: 0.1,
            event_overshoot: 1.01,
            parity_bits: 3,
            client_event_threshold: 5000,
            ik_miss_policy: IkMissPolicy::KeepDesired,
            autoplay: AutoplayPolicy::WithIk,
        }
    }
}

impl AnimatingOptions {
    #[must_use]
    pub fn with_max_interval(mut self, seconds: f32) -> Self {
        self.max_interval = seconds;
        self
    }

    #[must_use]
    pub fn with_fallback_duration(mut self, seconds: f32) -> Self {
        self.fallback_duration = seconds;
        self
    }

    #[must_use]
    pub fn with_parity_bits(mut self, bits: u32) -> Self {
        self.parity_bits = bits.clamp(1, 31);
        self
    }

    #[must_use]
    pub fn with_ik_miss_policy(mut self, policy: IkMissPolicy) -> Self {
        self.ik_miss_policy = policy;
        self
    }

    #[must_use]
    pub fn with_autoplay(mut self, policy: AutoplayPolicy) -> Self {
        self.autoplay = policy;
        self
    }

    /// Mask applied to parity counters
    pub fn parity_mask(&self) -> u32 {
        (1u32 << self.parity_bits.clamp(1, 31)) - 1
    }
}
