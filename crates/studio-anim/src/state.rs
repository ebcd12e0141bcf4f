//! Per-entity animation state

use studio_model::{MAX_BONE_CONTROLLERS, MAX_POSE_PARAMETERS};

/// Playback state of one animating entity
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    /// Index of the current sequence
    pub sequence: Option<usize>,
    /// Normalized playback phase
    pub cycle: f32,
    /// Multiplier on cycle advance. 0 freezes events.
    pub playback_rate: f32,
    /// Normalized pose parameter values
    pub pose_parameters: [f32; MAX_POSE_PARAMETERS],
    /// Normalized bone controller values
    pub bone_controllers: [f32; MAX_BONE_CONTROLLERS],
    /// Loop flag cached when the sequence was selected
    pub loops: bool,
    /// Set once the cycle passes the last visible point of the sequence
    pub finished: bool,
    /// Highest cycle already scanned for events
    pub last_event_check: f32,
    /// Wraps of a looping sequence since the last event dispatch
    pub loops_crossed: u32,
    /// Time of the latest pose update
    pub anim_time: f32,
    /// Time of the pose update before that
    pub prev_anim_time: f32,
    /// Ground speed of the current sequence (units per second)
    pub ground_speed: f32,
    /// Bumped whenever the sequence is reset
    pub sequence_parity: u32,
    /// Bumped whenever the sequence is reset
    pub events_parity: u32,
}

impl AnimationState {
    /// Create a state playing `sequence` from the start
    pub fn new(sequence: Option<usize>) -> Self {
        Self {
            sequence,
            ..Self::none()
        }
    }

    /// Create an inactive state
    pub fn none() -> Self {
        Self {
            sequence: None,
            cycle: 0.0,
            playback_rate: 1.0,
            pose_parameters: [0.0; MAX_POSE_PARAMETERS],
            bone_controllers: [0.0; MAX_BONE_CONTROLLERS],
            loops: false,
            finished: false,
            last_event_check: 0.0,
            loops_crossed: 0,
            anim_time: 0.0,
            prev_anim_time: 0.0,
            ground_speed: 0.0,
            sequence_parity: 0,
            events_parity: 0,
        }
    }

    /// Check if a sequence is selected
    pub fn is_active(&self) -> bool {
        self.sequence.is_some()
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::none()
    }
}
