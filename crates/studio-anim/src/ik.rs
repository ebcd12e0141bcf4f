//! Inverse kinematics: per-entity chain targets, ground locks and a two-bone solve.
//!
//! A context moves through three states each tick. [`IkContext::init`] captures
//! the entity frame and the tick time, [`IkContext::calculate_locks`] snaps the
//! fresh targets onto world geometry and [`IkContext::solve_dependencies`]
//! bends every targeted chain so its end effector reaches the target.
//! Targets stamped with another tick's time are stale and left alone.

use glam::{Affine3A, Quat, Vec3};
use studio_model::{IkChainDesc, StudioModel, math::angles_to_quat};

use crate::collision::{ContentsMask, TraceHull};
use crate::options::IkMissPolicy;
use crate::pose::BonePose;

const EPSILON: f32 = 1e-5;

/// Where one chain's end effector should go this tick
#[derive(Debug, Clone, PartialEq)]
pub struct IkTarget {
    /// IK chain index
    pub chain: usize,
    /// Requested world position
    pub desired: Vec3,
    /// Position after ground locking
    pub position: Vec3,
    /// Half length of the vertical trace
    pub height: f32,
    /// Trace radius
    pub radius: f32,
    /// Tick the target was set for
    pub time: f32,
}

/// Lifecycle of a context within one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IkState {
    Uninitialized,
    Initialized { time: f32, origin: Vec3, angles: Vec3 },
    Solved { time: f32 },
}

/// IK targets and solver state owned by one entity
#[derive(Debug, Clone, PartialEq)]
pub struct IkContext {
    policy: IkMissPolicy,
    state: IkState,
    root: Affine3A,
    up: Vec3,
    time: f32,
    targets: Vec<IkTarget>,
}

impl Default for IkContext {
    fn default() -> Self {
        Self::new(IkMissPolicy::default())
    }
}

impl IkContext {
    pub fn new(policy: IkMissPolicy) -> Self {
        Self {
            policy,
            state: IkState::Uninitialized,
            root: Affine3A::IDENTITY,
            up: Vec3::Z,
            time: 0.0,
            targets: Vec::new(),
        }
    }

    pub fn state(&self) -> IkState {
        self.state
    }

    pub fn miss_policy(&self) -> IkMissPolicy {
        self.policy
    }

    /// Capture the entity frame for the tick at `time`
    pub fn init(&mut self, angles: Vec3, origin: Vec3, scale: f32, time: f32) {
        let rotation = angles_to_quat(angles);
        self.root = Affine3A::from_scale_rotation_translation(Vec3::splat(scale), rotation, origin);
        self.up = rotation * Vec3::Z;
        self.time = time;
        self.state = IkState::Initialized {
            time,
            origin,
            angles,
        };
    }

    /// Set or replace the target of a chain
    pub fn set_target(&mut self, chain: usize, position: Vec3, height: f32, radius: f32, time: f32) {
        let target = IkTarget {
            chain,
            desired: position,
            position,
            height,
            radius,
            time,
        };
        match self.targets.iter_mut().find(|t| t.chain == chain) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
    }

    pub fn target(&self, chain: usize) -> Option<&IkTarget> {
        self.targets.iter().find(|t| t.chain == chain)
    }

    pub fn targets(&self) -> &[IkTarget] {
        &self.targets
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    fn is_fresh(&self, target: &IkTarget) -> bool {
        target.time == self.time
    }

    /// Trace the world around every fresh target and lock it to the surface found.
    ///
    /// Returns the number of targets that were traced.
    pub fn calculate_locks(&mut self, tracer: &dyn TraceHull) -> usize {
        if self.state == IkState::Uninitialized {
            log::warn!("IK locks calculated before init");
            return 0;
        }

        let up = self.up;
        let time = self.time;
        let policy = self.policy;
        let mut traced = 0;
        for target in self.targets.iter_mut().filter(|t| t.time == time) {
            let start = target.desired + up * target.height;
            let end = target.desired - up * target.height;
            let r = target.radius;
            let trace = tracer.trace_hull(
                start,
                end,
                Vec3::new(-r, -r, 0.0),
                Vec3::new(r, r, 1.0),
                ContentsMask::ik_trace(),
            );

            target.position = match policy {
                IkMissPolicy::UseTraceEnd => trace.end_pos,
                IkMissPolicy::KeepDesired if trace.hit() => trace.end_pos,
                IkMissPolicy::KeepDesired => target.desired,
            };
            traced += 1;
        }
        traced
    }

    /// Bend every chain with a fresh target so its effector reaches the target.
    ///
    /// Returns the number of chains solved.
    pub fn solve_dependencies(&mut self, model: &StudioModel, pose: &mut BonePose) -> usize {
        let IkState::Initialized { time, .. } = self.state else {
            log::warn!("IK solve without a fresh init");
            return 0;
        };

        let to_model = self.root.inverse();
        let mut solved = 0;
        for target in self.targets.iter().filter(|t| self.is_fresh(t)) {
            let Some(chain) = model.ik_chain(target.chain) else {
                log::warn!(
                    "IK target for unknown chain {} on model '{}'",
                    target.chain,
                    model.name()
                );
                continue;
            };
            if chain.links.iter().any(|&b| b >= pose.len()) {
                continue;
            }
            let goal = to_model.transform_point3(target.position);
            if solve_two_bone(model, chain, pose, goal) {
                solved += 1;
            }
        }

        log::debug!("IK solved {solved} chain(s) at {time}");
        self.state = IkState::Solved { time };
        solved
    }
}

/// Model-space rotation and position of every bone up to `last`
fn model_space(model: &StudioModel, pose: &BonePose, last: usize) -> (Vec<Quat>, Vec<Vec3>) {
    let mut rotations = Vec::with_capacity(last + 1);
    let mut positions = Vec::with_capacity(last + 1);
    for (i, bone) in model.bones().iter().enumerate().take(last + 1) {
        let (parent_rot, parent_pos) = bone
            .parent
            .map_or((Quat::IDENTITY, Vec3::ZERO), |p| (rotations[p], positions[p]));
        rotations.push(parent_rot * pose.rotations[i]);
        positions.push(parent_pos + parent_rot * pose.positions[i]);
    }
    (rotations, positions)
}

/// Analytic hip/knee/foot solve towards `goal` in model space.
///
/// The foot keeps its model-space orientation.
fn solve_two_bone(model: &StudioModel, chain: &IkChainDesc, pose: &mut BonePose, goal: Vec3) -> bool {
    let [hip, knee, foot] = chain.links;
    let (rotations, positions) = model_space(model, pose, foot);
    let (a, b, c) = (positions[hip], positions[knee], positions[foot]);

    let upper = b - a;
    let lower = c - b;
    let l1 = upper.length();
    let l2 = lower.length();
    let to_goal = goal - a;
    let dist = to_goal.length();
    if l1 < EPSILON || l2 < EPSILON || dist < EPSILON {
        return false;
    }

    let dir = to_goal / dist;
    let d = dist.min(l1 + l2).max((l1 - l2).abs());

    // Bend plane from the knee direction, falling back to the current bend
    let pole = (chain.knee_dir - dir * chain.knee_dir.dot(dir))
        .try_normalize()
        .or_else(|| (upper - dir * upper.dot(dir)).try_normalize())
        .unwrap_or_else(|| dir.any_orthonormal_vector());

    let along = (l1 * l1 - l2 * l2 + d * d) / (2.0 * d);
    let height = (l1 * l1 - along * along).max(0.0).sqrt();
    let knee_pos = a + dir * along + pole * height;
    let foot_pos = a + dir * d;

    let hip_delta = Quat::from_rotation_arc(upper / l1, (knee_pos - a).normalize());
    let lower_after = hip_delta * lower;
    let knee_delta = Quat::from_rotation_arc(
        lower_after.normalize(),
        (foot_pos - knee_pos).normalize(),
    );

    let parent_rot = model
        .bone(hip)
        .and_then(|bone| bone.parent)
        .map_or(Quat::IDENTITY, |p| rotations[p]);
    let hip_world = (hip_delta * rotations[hip]).normalize();
    let knee_world = (knee_delta * hip_delta * rotations[knee]).normalize();

    pose.rotations[hip] = (parent_rot.inverse() * hip_world).normalize();
    pose.rotations[knee] = (hip_world.inverse() * knee_world).normalize();
    pose.rotations[foot] = (knee_world.inverse() * rotations[foot]).normalize();
    true
}
