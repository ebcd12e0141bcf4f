//! Baked animation clips: per-bone keyframes and piecewise root motion.
//!
//! Keyframes are stored one value per frame. A track with no values leaves the
//! bone at its bind pose and a track with a single value is constant.
//!
//! Root motion is stored as a list of [`MovementSegment`]s. Each segment covers
//! the frames after the previous segment's `end_frame` up to its own, moving
//! along `vector` with a speed that changes linearly from `v0` to `v1` (units
//! per second). Cumulative positions are baked when the model is built.

use glam::{Quat, Vec3};
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::math::yaw_rotate;

/// Keyframes for a single bone
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BoneTrack {
    /// Local positions, one per frame
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub positions: Vec<Vec3>,
    /// Local rotations, one per frame
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub rotations: Vec<Quat>,
}

impl BoneTrack {
    /// Sample the position channel at a fractional frame
    pub fn sample_position(&self, frame: f32) -> Option<Vec3> {
        let (i0, i1, s) = bracket(self.positions.len(), frame)?;
        Some(self.positions[i0].lerp(self.positions[i1], s))
    }

    /// Sample the rotation channel at a fractional frame
    pub fn sample_rotation(&self, frame: f32) -> Option<Quat> {
        let (i0, i1, s) = bracket(self.rotations.len(), frame)?;
        Some(self.rotations[i0].slerp(self.rotations[i1], s).normalize())
    }
}

/// Seconds between two frames at `fps`, 0.0 for degenerate clips
fn segment_seconds(fps: f32, prev_frame: f32, end_frame: f32) -> f32 {
    if fps > 0.0 { (end_frame - prev_frame) / fps } else { 0.0 }
}

/// Find the bracketing keyframes and blend factor for a fractional frame
fn bracket(len: usize, frame: f32) -> Option<(usize, usize, f32)> {
    match len {
        0 => None,
        1 => Some((0, 0, 0.0)),
        _ => {
            let last = len - 1;
            let frame = frame.clamp(0.0, last as f32);
            let i0 = (frame.floor() as usize).min(last);
            let i1 = (i0 + 1).min(last);
            Some((i0, i1, frame - i0 as f32))
        }
    }
}

/// One piece of baked root motion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct MovementSegment {
    /// Last frame covered by this segment
    pub end_frame: f32,
    /// Speed at the start of the segment (units per second)
    pub v0: f32,
    /// Speed at the end of the segment (units per second)
    pub v1: f32,
    /// Accumulated yaw at the end of the segment (degrees)
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub angle: f32,
    /// Direction of travel
    pub vector: Vec3,
    /// Accumulated position at the end of the segment (baked)
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub position: Vec3,
}

impl MovementSegment {
    /// Constant-speed segment along `vector`
    pub fn linear(end_frame: f32, speed: f32, vector: Vec3) -> Self {
        Self {
            end_frame,
            v0: speed,
            v1: speed,
            angle: 0.0,
            vector: vector.normalize_or_zero(),
            position: Vec3::ZERO,
        }
    }

    /// Distance covered after travelling `f` (0..1) of a segment lasting `seconds`
    fn distance(&self, f: f32, seconds: f32) -> f32 {
        seconds * (self.v0 * f + 0.5 * (self.v1 - self.v0) * f * f)
    }
}

/// A baked animation clip
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct AnimationDesc {
    /// Clip name
    pub name: String,
    /// Frames per second
    pub fps: f32,
    /// Number of frames (a clip of N frames lasts N-1 frame intervals)
    pub num_frames: usize,
    /// Per-bone keyframes, indexed by bone. Missing entries keep the bind pose.
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub tracks: Vec<BoneTrack>,
    /// Root motion
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub movements: Vec<MovementSegment>,
}

impl AnimationDesc {
    /// Create an empty clip
    pub fn new<S: Into<String>>(name: S, fps: f32, num_frames: usize) -> Self {
        Self {
            name: name.into(),
            fps,
            num_frames,
            tracks: Vec::new(),
            movements: Vec::new(),
        }
    }

    /// Set the keyframes of one bone
    #[must_use]
    pub fn with_track(mut self, bone: usize, track: BoneTrack) -> Self {
        if self.tracks.len() <= bone {
            self.tracks.resize_with(bone + 1, BoneTrack::default);
        }
        self.tracks[bone] = track;
        self
    }

    /// Append a root motion segment
    #[must_use]
    pub fn with_movement(mut self, segment: MovementSegment) -> Self {
        self.movements.push(segment);
        self
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        if self.num_frames <= 1 || self.fps <= 0.0 {
            return 0.0;
        }
        (self.num_frames - 1) as f32 / self.fps
    }

    /// Cycles per second, 0.0 for degenerate clips
    pub fn cycles_per_second(&self) -> f32 {
        let duration = self.duration();
        if duration > 0.0 { 1.0 / duration } else { 0.0 }
    }

    /// Fractional frame for a cycle in `[0, 1]`
    pub fn frame_at(&self, cycle: f32) -> f32 {
        cycle * self.num_frames.saturating_sub(1) as f32
    }

    /// Keyframes of a bone, if any were baked
    pub fn track(&self, bone: usize) -> Option<&BoneTrack> {
        self.tracks.get(bone)
    }

    /// Fill in the accumulated position of every movement segment
    pub fn bake_movement(&mut self) {
        let mut prev_frame = 0.0;
        let mut position = Vec3::ZERO;
        let fps = self.fps;
        for segment in &mut self.movements {
            let seconds = segment_seconds(fps, prev_frame, segment.end_frame);
            position += segment.vector * segment.distance(1.0, seconds);
            segment.position = position;
            prev_frame = segment.end_frame;
        }
    }

    /// Accumulated root position and yaw at a cycle. Cycles outside `[0, 1]`
    /// add whole loops of motion.
    ///
    /// Returns None when the clip has no root motion.
    pub fn position_at(&self, cycle: f32) -> Option<(Vec3, f32)> {
        let last = self.movements.last()?;

        let loops = cycle.floor();
        let frame = self.frame_at(cycle - loops);

        let mut prev_frame = 0.0;
        let mut base_pos = Vec3::ZERO;
        let mut base_yaw = 0.0;
        for segment in &self.movements {
            if segment.end_frame >= frame {
                let span = segment.end_frame - prev_frame;
                let f = if span > 0.0 { (frame - prev_frame) / span } else { 1.0 };
                let seconds = segment_seconds(self.fps, prev_frame, segment.end_frame);
                let mut pos = base_pos + segment.vector * segment.distance(f, seconds);
                let mut yaw = base_yaw * (1.0 - f) + segment.angle * f;
                if loops != 0.0 {
                    pos += last.position * loops;
                    yaw += last.angle * loops;
                }
                return Some((pos, yaw));
            }
            prev_frame = segment.end_frame;
            base_pos = segment.position;
            base_yaw = segment.angle;
        }

        // Segments stop short of the final frame: hold the last position
        Some((last.position * (loops + 1.0), last.angle * (loops + 1.0)))
    }

    /// Root displacement between two cycles, expressed in the frame of the start cycle
    pub fn movement(&self, cycle_from: f32, cycle_to: f32) -> Option<(Vec3, f32)> {
        let (start_pos, start_yaw) = self.position_at(cycle_from)?;
        let (end_pos, end_yaw) = self.position_at(cycle_to)?;
        Some((yaw_rotate(end_pos - start_pos, -start_yaw), end_yaw - start_yaw))
    }

    /// Root velocity (units per second) at a cycle
    pub fn velocity_at(&self, cycle: f32) -> Option<Vec3> {
        if self.movements.is_empty() {
            return None;
        }
        let frame = self.frame_at(cycle.clamp(0.0, 1.0));
        let mut prev_frame = 0.0;
        for segment in &self.movements {
            if segment.end_frame >= frame {
                let span = segment.end_frame - prev_frame;
                let f = if span > 0.0 { (frame - prev_frame) / span } else { 0.0 };
                let speed = segment.v0 * (1.0 - f) + segment.v1 * f;
                return Some(segment.vector * speed);
            }
            prev_frame = segment.end_frame;
        }
        Some(Vec3::ZERO)
    }

    /// First cycle at which the travelled distance reaches `distance`; 1.0 if never.
    pub fn find_distance(&self, distance: f32) -> f32 {
        if distance <= 0.0 {
            return 0.0;
        }
        let frames = self.num_frames.saturating_sub(1) as f32;
        if frames <= 0.0 {
            return 1.0;
        }

        let mut remaining = distance;
        let mut prev_frame = 0.0;
        for segment in &self.movements {
            let seconds = segment_seconds(self.fps, prev_frame, segment.end_frame);
            let covered = segment.distance(1.0, seconds);
            if covered >= remaining && seconds > 0.0 {
                // seconds * (a t^2 + b t) = remaining
                let a = 0.5 * (segment.v1 - segment.v0);
                let b = segment.v0;
                let c = -remaining / seconds;
                let t = if a.abs() > f32::EPSILON {
                    (-b + (b * b - 4.0 * a * c).max(0.0).sqrt()) / (2.0 * a)
                } else if b.abs() > f32::EPSILON {
                    -c / b
                } else {
                    0.0
                };
                let frame = t.clamp(0.0, 1.0) * (segment.end_frame - prev_frame) + prev_frame;
                return frame / frames;
            }
            remaining -= covered;
            prev_frame = segment.end_frame;
        }
        1.0
    }
}
