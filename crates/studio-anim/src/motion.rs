//! Root motion: moving the entity through the world in step with its animation.
//!
//! Baked root displacement is stored in sequence-local space. Only the entity's
//! yaw is applied when moving it into the world, pitch and roll never tilt a
//! walking character's path.

use glam::Vec3;
use studio_model::math::{angles_to_quat, yaw_rotate};

use crate::animating::Animating;

/// Result of [`Animating::interval_movement`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalMovement {
    /// Interval actually consumed, shortened when a non-looping sequence ends
    pub interval_used: f32,
    /// Cycle the movement ends at
    pub end_cycle: f32,
    /// The sequence reached its end within the interval
    pub finished: bool,
    /// New world position of the entity
    pub position: Vec3,
    /// New entity angles (yaw only)
    pub angles: Vec3,
    /// Whether the sequence carries any root motion
    pub moved: bool,
}

impl Animating {
    /// Combined cycle rate including the playback rate
    fn motion_rate(&self) -> f32 {
        self.sequence_cycle_rate(self.state.sequence) * self.state.playback_rate
    }

    /// Root motion covered by playing the current sequence for `interval` seconds
    /// from the current cycle.
    ///
    /// A non-looping sequence stops at cycle 1.0: the interval is shortened to
    /// exactly reach it and the movement reports `finished`. Sequences without
    /// root motion leave position and angles unchanged.
    pub fn interval_movement(&self, interval: f32) -> IntervalMovement {
        let rate = self.motion_rate();
        let mut interval_used = interval;
        let mut end_cycle = self.state.cycle + interval * rate;
        let mut finished = false;

        if !self.state.loops && end_cycle > 1.0 {
            if rate != 0.0 {
                interval_used = (1.0 - self.state.cycle) / rate;
            }
            end_cycle = 1.0;
            finished = true;
        }

        let movement = self.model().zip(self.state.sequence).and_then(|(m, seq)| {
            m.seq_movement(seq, self.state.cycle, end_cycle, &self.state.pose_parameters)
        });

        let (position, angles, moved) = match movement {
            Some((delta, yaw)) => (
                self.origin + yaw_rotate(delta, self.angles.y),
                Vec3::new(0.0, self.angles.y + yaw, 0.0),
                true,
            ),
            None => (self.origin, self.angles, false),
        };

        IntervalMovement {
            interval_used,
            end_cycle,
            finished,
            position,
            angles,
            moved,
        }
    }

    /// Speed of the root one interval ahead of the current cycle, scaled by
    /// the playback rate
    pub fn instantaneous_velocity(&self, interval: f32) -> f32 {
        let Some((model, seq)) = self.model().zip(self.state.sequence) else {
            return 0.0;
        };
        let next = self.state.cycle + interval * self.motion_rate();
        model
            .seq_velocity(seq, next, &self.state.pose_parameters)
            .map_or(0.0, |v| (v * self.state.playback_rate).length())
    }

    /// Cycle at which the current sequence's root motion first covers `distance`
    pub fn movement_frame(&self, distance: f32) -> f32 {
        self.model()
            .zip(self.state.sequence)
            .map_or(0.0, |(m, seq)| {
                m.find_seq_distance(seq, &self.state.pose_parameters, distance)
            })
    }

    /// Whether a sequence carries root motion
    pub fn has_movement(&self, sequence: usize) -> bool {
        self.model().is_some_and(|m| {
            m.seq_movement(sequence, 0.0, 1.0, &self.state.pose_parameters)
                .is_some()
        })
    }

    /// World velocity implied by the cached ground speed along the sequence's
    /// direction of travel
    pub fn ground_speed_velocity(&self) -> Vec3 {
        let Some(seq) = self.state.sequence.filter(|_| self.model().is_some()) else {
            return Vec3::ZERO;
        };
        let yaw = self.sequence_move_yaw(seq) + self.angles.y;
        let forward = angles_to_quat(Vec3::new(0.0, yaw, 0.0)) * Vec3::X;
        forward * self.state.ground_speed
    }

    /// Linear motion of the current sequence rotated into the world by the
    /// entity angles
    pub fn velocity(&self) -> Vec3 {
        let Some(seq) = self.state.sequence else {
            return Vec3::ZERO;
        };
        angles_to_quat(self.angles) * self.sequence_linear_motion(seq)
    }
}
