//! World collision queries used by IK traces.
//!
//! The animation core never owns world geometry. Hosts implement
//! [`TraceHull`] and pass it in with each tick.

use glam::Vec3;

bitflags::bitflags! {
    /// Contents a trace should stop at
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContentsMask: u32 {
        const SOLID = 0x1;
        const WINDOW = 0x2;
        const GRATE = 0x8;
        const WATER = 0x20;
        const MOVEABLE = 0x4000;
        const PLAYER_CLIP = 0x10000;
        const MONSTER_CLIP = 0x20000;
        const MONSTER = 0x0200_0000;
        const DEBRIS = 0x0400_0000;
    }
}

impl ContentsMask {
    /// Everything that blocks movement
    pub const MASK_SOLID: Self = Self::SOLID
        .union(Self::MOVEABLE)
        .union(Self::WINDOW)
        .union(Self::MONSTER)
        .union(Self::GRATE);

    /// Static world only: what feet are planted against
    pub fn ik_trace() -> Self {
        Self::MASK_SOLID.difference(Self::MONSTER)
    }
}

/// Result of sweeping a box through the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceResult {
    /// Where the box stopped
    pub end_pos: Vec3,
    /// Fraction of the sweep completed (1.0 = nothing hit)
    pub fraction: f32,
    /// The sweep started inside solid geometry
    pub start_solid: bool,
}

impl TraceResult {
    /// A sweep that reached its end unobstructed
    pub fn miss(end: Vec3) -> Self {
        Self {
            end_pos: end,
            fraction: 1.0,
            start_solid: false,
        }
    }

    /// Whether anything was hit
    pub fn hit(&self) -> bool {
        self.fraction < 1.0 || self.start_solid
    }
}

/// Sweeps an axis-aligned box through the world
pub trait TraceHull {
    fn trace_hull(
        &self,
        start: Vec3,
        end: Vec3,
        mins: Vec3,
        maxs: Vec3,
        mask: ContentsMask,
    ) -> TraceResult;
}

/// A world with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTracer;

impl TraceHull for NullTracer {
    fn trace_hull(
        &self,
        _start: Vec3,
        end: Vec3,
        _mins: Vec3,
        _maxs: Vec3,
        _mask: ContentsMask,
    ) -> TraceResult {
        TraceResult::miss(end)
    }
}

/// An infinite solid floor at a fixed height
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundPlaneTracer {
    /// Height of the floor surface
    pub height: f32,
}

impl GroundPlaneTracer {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl TraceHull for GroundPlaneTracer {
    fn trace_hull(
        &self,
        start: Vec3,
        end: Vec3,
        mins: Vec3,
        _maxs: Vec3,
        mask: ContentsMask,
    ) -> TraceResult {
        if !mask.contains(ContentsMask::SOLID) {
            return TraceResult::miss(end);
        }

        let bottom_start = start.z + mins.z;
        let bottom_end = end.z + mins.z;
        if bottom_start < self.height {
            return TraceResult {
                end_pos: start,
                fraction: 0.0,
                start_solid: true,
            };
        }
        if bottom_end >= self.height {
            return TraceResult::miss(end);
        }

        let fraction = (bottom_start - self.height) / (bottom_start - bottom_end);
        TraceResult {
            end_pos: start.lerp(end, fraction),
            fraction,
            start_solid: false,
        }
    }
}
