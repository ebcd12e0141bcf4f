//! The animating entity.
//!
//! [`Animating`] owns the playback state of one object in the world and ties
//! the sequence clock, event dispatcher, pose solver, IK context and bone cache
//! together. A host drives it once per simulation tick in this order:
//!
//! 1. [`Animating::studio_frame_advance`] moves the cycle forward
//! 2. [`Animating::dispatch_anim_events`] delivers the events crossed
//! 3. [`Animating::bone_transforms`] and the queries built on it read the pose
//!
//! Every query is total. A missing model or an out-of-range index logs a
//! warning and yields a neutral value.

use std::sync::Arc;

use glam::{Affine3A, Vec3};
use rand::Rng;
use studio_model::math::{angle_transform, angles_to_quat, axis_vectors, transform_angles, yaw_rotate};
use studio_model::{BoneFlags, MAX_BONE_CONTROLLERS, MAX_POSE_PARAMETERS, ModelInfo, StudioModel};

use crate::bone_cache::{BoneCache, BoneCacheKey};
use crate::clock;
use crate::collision::{NullTracer, TraceHull};
use crate::cycle::normalize_cycle;
use crate::events::{AnimEventHandler, dispatch_events};
use crate::ik::IkContext;
use crate::options::{AnimatingOptions, AutoplayPolicy};
use crate::pose::{PoseRequest, PoseSolver};
use crate::state::AnimationState;

/// Bones kept in the bone cache: everything hitboxes and attachments need
pub const CACHED_BONE_MASK: BoneFlags =
    BoneFlags::USED_BY_HITBOX.union(BoneFlags::USED_BY_ATTACHMENT);

/// Per-tick inputs that live outside the entity
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    /// Simulation time of the tick
    pub cur_time: f32,
    /// Free-running clock driving autoplay sequences
    pub realtime: f32,
    /// World collision for IK traces
    pub tracer: &'a dyn TraceHull,
}

impl TickContext<'static> {
    /// Tick at `cur_time` in an empty world
    pub fn new(cur_time: f32) -> Self {
        Self {
            cur_time,
            realtime: cur_time,
            tracer: &NullTracer,
        }
    }
}

impl<'a> TickContext<'a> {
    #[must_use]
    pub fn with_realtime(mut self, realtime: f32) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn with_tracer<'b>(self, tracer: &'b dyn TraceHull) -> TickContext<'b> {
        TickContext {
            cur_time: self.cur_time,
            realtime: self.realtime,
            tracer,
        }
    }
}

/// An entity playing sequences of a [`StudioModel`]
#[derive(Debug, Clone)]
pub struct Animating {
    model: Option<Arc<StudioModel>>,
    options: AnimatingOptions,
    pub(crate) state: AnimationState,
    pub(crate) origin: Vec3,
    pub(crate) angles: Vec3,
    pub(crate) model_scale: f32,
    pub(crate) body: u32,
    pub(crate) skin: u32,
    pub(crate) hitbox_set: usize,
    pub(crate) ik: Option<IkContext>,
    bone_cache: BoneCache,
    bounds: Option<(Vec3, Vec3)>,
    pub(crate) client_side_animation: bool,
    pub(crate) client_side_frame_reset: bool,
}

impl Default for Animating {
    fn default() -> Self {
        Self::new()
    }
}

impl Animating {
    /// Create an entity without a model
    pub fn new() -> Self {
        Self {
            model: None,
            options: AnimatingOptions::default(),
            state: AnimationState::none(),
            origin: Vec3::ZERO,
            angles: Vec3::ZERO,
            model_scale: 1.0,
            body: 0,
            skin: 0,
            hitbox_set: 0,
            ik: None,
            bone_cache: BoneCache::new(),
            bounds: None,
            client_side_animation: false,
            client_side_frame_reset: false,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: AnimatingOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: Arc<StudioModel>) -> Self {
        self.set_model_handle(Some(model));
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_angles(mut self, angles: Vec3) -> Self {
        self.angles = angles;
        self
    }

    // Model

    /// Resolve a model through a provider and attach it.
    ///
    /// Returns false and keeps the current model when the name is unknown.
    pub fn set_model(&mut self, provider: &dyn ModelInfo, name: &str) -> bool {
        match provider.get_model(name) {
            Some(model) => {
                self.set_model_handle(Some(model));
                true
            }
            None => {
                log::warn!("Model '{name}' not found");
                false
            }
        }
    }

    /// Attach a model handle (or detach with None)
    pub fn set_model_handle(&mut self, model: Option<Arc<StudioModel>>) {
        self.model = model;
        self.bone_cache.invalidate();
        self.bounds = None;

        let Some(model) = self.model.as_deref() else {
            return;
        };
        log::debug!("Attached model '{}'", model.name());
        if self.hitbox_set >= model.hitbox_sets().len() {
            self.hitbox_set = 0;
        }
        if self.state.sequence.is_some_and(|s| s >= model.sequence_count()) {
            self.state.sequence = None;
        }
        self.init_bone_controllers();
    }

    pub fn model(&self) -> Option<&StudioModel> {
        self.model.as_deref()
    }

    pub fn model_handle(&self) -> Option<&Arc<StudioModel>> {
        self.model.as_ref()
    }

    pub fn options(&self) -> &AnimatingOptions {
        &self.options
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Mutable access to the raw playback state. Invalidates the bone cache.
    pub fn state_mut(&mut self) -> &mut AnimationState {
        self.bone_cache.invalidate();
        &mut self.state
    }

    fn model_or_warn(&self, operation: &str) -> Option<&StudioModel> {
        let model = self.model.as_deref();
        if model.is_none() {
            log::warn!("{operation} without a model");
        }
        model
    }

    // Placement

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    /// Pitch, yaw and roll in degrees
    pub fn angles(&self) -> Vec3 {
        self.angles
    }

    pub fn set_angles(&mut self, angles: Vec3) {
        self.angles = angles;
    }

    pub fn model_scale(&self) -> f32 {
        self.model_scale
    }

    pub fn set_model_scale(&mut self, scale: f32) {
        if scale != self.model_scale {
            self.model_scale = scale;
            self.bone_cache.invalidate();
        }
    }

    /// Entity-to-world transform (unscaled)
    pub fn entity_transform(&self) -> Affine3A {
        angle_transform(self.angles, self.origin)
    }

    /// Transform root bones compose against
    pub fn root_transform(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.model_scale),
            angles_to_quat(self.angles),
            self.origin,
        )
    }

    /// World position of the model's eyes
    pub fn eye_position(&self) -> Vec3 {
        let eye = self.model().map_or(Vec3::ZERO, StudioModel::eye_position);
        self.root_transform().transform_point3(eye)
    }

    // Clock and events

    /// Advance the cycle to `cur_time`. Returns false when nothing moved.
    pub fn studio_frame_advance(&mut self, cur_time: f32) -> bool {
        let advanced = clock::advance(&mut self.state, self.model.as_deref(), &self.options, cur_time);
        if advanced {
            self.bone_cache.invalidate();
        }
        advanced
    }

    /// Deliver the events crossed since the last dispatch
    pub fn dispatch_anim_events(&mut self, cur_time: f32, handler: &mut dyn AnimEventHandler) -> usize {
        dispatch_events(
            &mut self.state,
            self.model.as_deref(),
            &self.options,
            cur_time,
            handler,
        )
    }

    /// Advance and dispatch in one call, returning the number of events fired
    pub fn update(&mut self, cur_time: f32, handler: &mut dyn AnimEventHandler) -> usize {
        self.studio_frame_advance(cur_time);
        self.dispatch_anim_events(cur_time, handler)
    }

    /// Interval the current or most recent advance covers
    pub fn anim_time_interval(&self, cur_time: f32) -> f32 {
        clock::anim_time_interval(&self.state, cur_time, &self.options)
    }

    // Sequences

    pub fn sequence(&self) -> Option<usize> {
        self.state.sequence
    }

    /// Switch the sequence without resetting playback. Out-of-range indices are rejected.
    pub fn set_sequence(&mut self, sequence: Option<usize>) -> bool {
        if let (Some(index), Some(model)) = (sequence, self.model.as_deref()) {
            if index >= model.sequence_count() {
                log::warn!(
                    "Sequence {index} out of range for model '{}' ({} sequences)",
                    model.name(),
                    model.sequence_count()
                );
                return false;
            }
        }
        if self.state.sequence != sequence {
            self.state.sequence = sequence;
            self.bone_cache.invalidate();
        }
        true
    }

    pub fn cycle(&self) -> f32 {
        self.state.cycle
    }

    /// Set the cycle, normalized into the domain of the current sequence
    pub fn set_cycle(&mut self, cycle: f32) {
        let cycle = normalize_cycle(cycle, self.state.loops).cycle;
        if cycle != self.state.cycle {
            self.state.cycle = cycle;
            self.bone_cache.invalidate();
        }
    }

    pub fn playback_rate(&self) -> f32 {
        self.state.playback_rate
    }

    pub fn set_playback_rate(&mut self, rate: f32) {
        self.state.playback_rate = rate;
    }

    pub fn ground_speed(&self) -> f32 {
        self.state.ground_speed
    }

    pub fn is_sequence_finished(&self) -> bool {
        self.state.finished
    }

    pub fn is_sequence_looping(&self) -> bool {
        self.state.loops
    }

    /// Start playing `sequence`.
    ///
    /// A non-looping current sequence restarts from cycle 0. Playback
    /// bookkeeping is reset when the sequence changes or does not loop.
    pub fn reset_sequence(&mut self, sequence: usize) {
        if !self.state.loops {
            self.state.cycle = 0.0;
        }
        let changed = self.state.sequence != Some(sequence);
        if !self.set_sequence(Some(sequence)) {
            return;
        }
        if changed || !self.state.loops {
            self.reset_sequence_info();
        }
        self.bone_cache.invalidate();
    }

    /// Reset per-sequence bookkeeping and bump the parity counters
    pub fn reset_sequence_info(&mut self) {
        clock::reset_sequence_info(&mut self.state, self.model.as_deref(), &self.options);
    }

    /// Duration of a sequence at the current pose parameters
    pub fn sequence_duration(&self, sequence: Option<usize>) -> f32 {
        clock::sequence_duration(
            self.model.as_deref(),
            sequence,
            &self.state.pose_parameters,
            &self.options,
        )
    }

    pub fn sequence_cycle_rate(&self, sequence: Option<usize>) -> f32 {
        clock::sequence_cycle_rate(
            self.model.as_deref(),
            sequence,
            &self.state.pose_parameters,
            &self.options,
        )
    }

    pub fn sequence_ground_speed(&self, sequence: Option<usize>) -> f32 {
        clock::sequence_ground_speed(
            self.model.as_deref(),
            sequence,
            &self.state.pose_parameters,
            &self.options,
        )
    }

    /// Last cycle of the current sequence before its fade-out
    pub fn last_visible_cycle(&self) -> f32 {
        clock::last_visible_cycle(&self.state, self.model.as_deref(), &self.options)
    }

    pub fn lookup_sequence(&self, label: &str) -> Option<usize> {
        self.model()?.lookup_sequence(label)
    }

    pub fn sequence_name(&self, sequence: usize) -> Option<&str> {
        self.model()?.sequence(sequence).map(|s| s.label.as_str())
    }

    pub fn sequence_activity(&self, sequence: usize) -> Option<&str> {
        self.model()?.sequence(sequence)?.activity.as_deref()
    }

    /// Whether a sequence carries the given event number
    pub fn has_anim_event(&self, sequence: usize, event: i32) -> bool {
        self.model()
            .is_some_and(|m| m.sequence_events(sequence).iter().any(|e| e.event == event))
    }

    /// Direction of a sequence's root motion in degrees, 0 when stationary
    pub fn sequence_move_yaw(&self, sequence: usize) -> f32 {
        self.model()
            .and_then(|m| m.sequence_move_yaw(sequence, &self.state.pose_parameters))
            .unwrap_or(0.0)
    }

    /// Distance covered by one full cycle of a sequence
    pub fn sequence_move_dist(&self, sequence: usize) -> f32 {
        self.sequence_linear_motion(sequence).length()
    }

    pub fn sequence_linear_motion(&self, sequence: usize) -> Vec3 {
        self.model().map_or(Vec3::ZERO, |m| {
            m.sequence_linear_motion(sequence, &self.state.pose_parameters)
        })
    }

    pub fn entry_node(&self, sequence: usize) -> usize {
        self.model()
            .and_then(|m| m.sequence(sequence))
            .map_or(0, |s| s.entry_node)
    }

    pub fn exit_node(&self, sequence: usize) -> usize {
        self.model()
            .and_then(|m| m.sequence(sequence))
            .map_or(0, |s| s.exit_node)
    }

    /// Pick a sequence for an activity at random, weighted by `|act_weight|`.
    ///
    /// The current sequence is kept when it plays the activity with a
    /// negative weight.
    pub fn select_weighted_sequence<R: Rng + ?Sized>(&self, activity: &str, rng: &mut R) -> Option<usize> {
        let model = self.model_or_warn("Sequence selection")?;

        if let Some(current) = self.state.sequence {
            let keep = model.sequence(current).is_some_and(|s| {
                s.act_weight < 0
                    && s.activity
                        .as_deref()
                        .is_some_and(|a| a.eq_ignore_ascii_case(activity))
            });
            if keep {
                return Some(current);
            }
        }

        // Wide enough for any number of i32::MAX weights
        let mut total: u64 = 0;
        let mut picked = None;
        for (index, seq) in model.sequences_for_activity(activity) {
            let weight = u64::from(seq.act_weight.unsigned_abs());
            total += weight;
            if total == 0 || rng.random_range(0..total) < weight {
                picked = Some(index);
            }
        }
        picked
    }

    /// Sequence with the largest weight for an activity
    pub fn select_heaviest_sequence(&self, activity: &str) -> Option<usize> {
        let model = self.model_or_warn("Sequence selection")?;
        let mut best: Option<(usize, i32)> = None;
        for (index, seq) in model.sequences_for_activity(activity) {
            if best.is_none_or(|(_, w)| seq.act_weight > w) {
                best = Some((index, seq.act_weight));
            }
        }
        best.map(|(index, _)| index)
    }

    /// First sequence playing an activity
    pub fn lookup_activity(&self, activity: &str) -> Option<usize> {
        self.model()?
            .sequences_for_activity(activity)
            .next()
            .map(|(index, _)| index)
    }

    /// Sequence to play next when travelling from `current` towards `goal`
    /// through the transition graph, and the direction to play it in.
    pub fn find_transition_sequence(&self, current: usize, goal: usize, direction: i32) -> (usize, i32) {
        if current == goal {
            return (goal, direction);
        }
        let Some(model) = self.model() else {
            return (goal, direction);
        };
        let (Some(from), Some(to)) = (model.sequence(current), model.sequence(goal)) else {
            return (goal, direction);
        };
        if from.exit_node == 0 || to.entry_node == 0 {
            return (goal, direction);
        }

        let end_node = if direction > 0 {
            from.exit_node
        } else {
            from.entry_node
        };
        if end_node == to.entry_node {
            return (goal, 1);
        }

        let intern = model.transition_node(end_node, to.entry_node);
        if intern == 0 {
            return (goal, direction);
        }

        for (index, seq) in model.sequences().iter().enumerate() {
            if seq.entry_node == end_node && seq.exit_node == intern {
                return (index, 1);
            }
            if seq.node_flags != 0 && seq.exit_node == end_node && seq.entry_node == intern {
                return (index, -1);
            }
        }
        (goal, direction)
    }

    // Pose parameters

    /// Set a pose parameter in its own units, returning the value actually stored
    pub fn set_pose_parameter(&mut self, index: usize, value: f32) -> f32 {
        let Some(model) = self.model.as_deref() else {
            log::warn!("Pose parameter set without a model");
            return value;
        };
        let Some(desc) = model.pose_param(index).filter(|_| index < MAX_POSE_PARAMETERS) else {
            log::warn!("Pose parameter {index} out of range for model '{}'", model.name());
            return value;
        };

        let normalized = desc.normalize(value);
        let stored = desc.denormalize(normalized);
        if self.state.pose_parameters[index] != normalized {
            self.state.pose_parameters[index] = normalized;
            self.bone_cache.invalidate();
        }
        stored
    }

    pub fn set_pose_parameter_by_name(&mut self, name: &str, value: f32) -> f32 {
        match self.lookup_pose_parameter(name) {
            Some(index) => self.set_pose_parameter(index, value),
            None => {
                log::warn!("Unknown pose parameter '{name}'");
                value
            }
        }
    }

    /// Value of a pose parameter in its own units (0 when unknown)
    pub fn get_pose_parameter(&self, index: usize) -> f32 {
        self.model()
            .and_then(|m| m.pose_param(index))
            .filter(|_| index < MAX_POSE_PARAMETERS)
            .map_or(0.0, |desc| desc.denormalize(self.state.pose_parameters[index]))
    }

    pub fn get_pose_parameter_by_name(&self, name: &str) -> f32 {
        self.lookup_pose_parameter(name)
            .map_or(0.0, |index| self.get_pose_parameter(index))
    }

    pub fn lookup_pose_parameter(&self, name: &str) -> Option<usize> {
        self.model()?.lookup_pose_param(name)
    }

    /// Whether a sequence blends on a pose parameter
    pub fn has_pose_parameter(&self, sequence: usize, index: usize) -> bool {
        self.model()
            .and_then(|m| m.sequence(sequence))
            .is_some_and(|s| s.param_index.contains(&Some(index)))
    }

    // Bone controllers

    /// Set a controller slot in controller units, returning the value actually stored
    pub fn set_bone_controller(&mut self, index: usize, value: f32) -> f32 {
        if index >= MAX_BONE_CONTROLLERS {
            log::warn!("Bone controller {index} out of range");
            return value;
        }
        let Some(model) = self.model.as_deref() else {
            return value;
        };
        let Some(desc) = model.controllers().iter().find(|c| c.index == index) else {
            return value;
        };

        let normalized = desc.encode(value);
        let stored = desc.denormalize(normalized);
        if self.state.bone_controllers[index] != normalized {
            self.state.bone_controllers[index] = normalized;
            self.bone_cache.invalidate();
        }
        stored
    }

    /// Value of a controller slot in controller units (0 when unused)
    pub fn get_bone_controller(&self, index: usize) -> f32 {
        if index >= MAX_BONE_CONTROLLERS {
            return 0.0;
        }
        self.model()
            .and_then(|m| m.controllers().iter().find(|c| c.index == index))
            .map_or(0.0, |desc| desc.denormalize(self.state.bone_controllers[index]))
    }

    /// Set every controller slot and pose parameter to the value 0
    pub fn init_bone_controllers(&mut self) {
        for index in 0..MAX_BONE_CONTROLLERS {
            self.set_bone_controller(index, 0.0);
        }
        let count = self
            .model()
            .map_or(0, |m| m.pose_param_count().min(MAX_POSE_PARAMETERS));
        for index in 0..count {
            self.set_pose_parameter(index, 0.0);
        }
    }

    // IK

    /// Create the IK context if there is none
    pub fn enable_ik(&mut self) {
        if self.ik.is_none() {
            self.ik = Some(IkContext::new(self.options.ik_miss_policy));
            self.bone_cache.invalidate();
        }
    }

    pub fn disable_ik(&mut self) {
        if self.ik.take().is_some() {
            self.bone_cache.invalidate();
        }
    }

    pub fn is_ik_enabled(&self) -> bool {
        self.ik.is_some()
    }

    pub fn ik(&self) -> Option<&IkContext> {
        self.ik.as_ref()
    }

    /// Mutable access to the IK context. Invalidates the bone cache.
    pub fn ik_mut(&mut self) -> Option<&mut IkContext> {
        self.bone_cache.invalidate();
        self.ik.as_mut()
    }

    /// Aim an IK chain at a world position for the tick at `time`.
    ///
    /// Returns false when IK is disabled or the chain is unknown.
    pub fn set_ik_target(&mut self, chain: usize, position: Vec3, height: f32, radius: f32, time: f32) -> bool {
        if self.model().is_none_or(|m| m.ik_chain(chain).is_none()) {
            log::warn!("IK target for unknown chain {chain}");
            return false;
        }
        let Some(ik) = self.ik.as_mut() else {
            return false;
        };
        ik.set_target(chain, position, height, radius, time);
        self.bone_cache.invalidate();
        true
    }

    // Bones

    pub fn num_bones(&self) -> usize {
        self.model().map_or(0, StudioModel::bone_count)
    }

    pub fn lookup_bone(&self, name: &str) -> Option<usize> {
        self.model()?.lookup_bone(name)
    }

    /// Evaluate the pose and compose bone-to-world transforms for `mask`.
    ///
    /// Always recomputes. Full-skeleton queries call this directly; hitbox
    /// and attachment queries go through [`Animating::bone_transforms`].
    pub fn setup_bones(&mut self, ctx: &TickContext<'_>, mask: BoneFlags) -> Vec<Option<Affine3A>> {
        let Some(model) = self.model.clone() else {
            log::warn!("Bone setup without a model");
            return Vec::new();
        };
        let root = self.root_transform();

        if let Some(ik) = self.ik.as_mut() {
            ik.init(self.angles, self.origin, self.model_scale, ctx.cur_time);
        }

        let autoplay = match self.options.autoplay {
            AutoplayPolicy::Always => true,
            AutoplayPolicy::WithIk => self.ik.is_some(),
        };
        let solver = PoseSolver::new(&model);
        let mut pose = solver.compute_pose(&PoseRequest {
            sequence: self.state.sequence,
            cycle: self.state.cycle,
            pose_parameters: &self.state.pose_parameters,
            bone_controllers: &self.state.bone_controllers,
            mask,
            realtime: ctx.realtime,
            autoplay,
        });

        if let Some(ik) = self.ik.as_mut() {
            ik.calculate_locks(ctx.tracer);
            ik.solve_dependencies(&model, &mut pose);
        }

        solver.build_matrices(&pose, &root, mask)
    }

    fn cache_key(&self) -> BoneCacheKey {
        BoneCacheKey {
            sequence: self.state.sequence,
            anim_time: self.state.anim_time,
            angles: self.angles,
            origin: self.origin,
            mask: CACHED_BONE_MASK,
        }
    }

    /// Bone-to-world transforms of every hitbox and attachment bone, cached
    pub fn bone_transforms(&mut self, ctx: &TickContext<'_>) -> &[Option<Affine3A>] {
        let key = self.cache_key();
        if !self.bone_cache.is_valid_for(&key) {
            log::debug!(
                "Bone cache miss for sequence {:?} at {}",
                key.sequence,
                key.anim_time
            );
            let transforms = self.setup_bones(ctx, CACHED_BONE_MASK);
            self.bone_cache.store(key, transforms);
        }
        self.bone_cache.transforms()
    }

    /// The bone cache, refreshed for this tick
    pub fn bone_cache(&mut self, ctx: &TickContext<'_>) -> &BoneCache {
        self.bone_transforms(ctx);
        &self.bone_cache
    }

    /// The bone cache as it stands, without refreshing
    pub fn cached_bones(&self) -> &BoneCache {
        &self.bone_cache
    }

    /// Force the next bone query to recompute
    pub fn invalidate_bone_cache(&mut self) {
        self.bone_cache.invalidate();
    }

    /// Bone-to-world transform of one bone.
    ///
    /// Bones outside the cache, and invalid bones, report the entity transform.
    pub fn get_bone_transform(&mut self, ctx: &TickContext<'_>, bone: usize) -> Affine3A {
        let fallback = self.entity_transform();
        if bone >= self.num_bones() {
            log::warn!("Bone {bone} out of range");
            return fallback;
        }
        self.bone_transforms(ctx)
            .get(bone)
            .copied()
            .flatten()
            .unwrap_or(fallback)
    }

    /// World position and angles of a bone
    pub fn get_bone_position(&mut self, ctx: &TickContext<'_>, bone: usize) -> Option<(Vec3, Vec3)> {
        if bone >= self.num_bones() {
            log::warn!("Bone {bone} out of range");
            return None;
        }
        let transform = self.get_bone_transform(ctx, bone);
        Some((Vec3::from(transform.translation), transform_angles(&transform)))
    }

    // Attachments

    pub fn num_attachments(&self) -> usize {
        self.model().map_or(0, |m| m.attachments().len())
    }

    pub fn lookup_attachment(&self, name: &str) -> Option<usize> {
        self.model()?.lookup_attachment(name)
    }

    /// Attachment-to-world transform
    pub fn get_attachment(&mut self, ctx: &TickContext<'_>, index: usize) -> Option<Affine3A> {
        let Some((bone, local)) = self
            .model()
            .and_then(|m| m.attachment(index))
            .map(|a| (a.bone, a.local_transform()))
        else {
            log::warn!("Attachment {index} out of range");
            return None;
        };
        Some(self.get_bone_transform(ctx, bone) * local)
    }

    pub fn get_attachment_by_name(&mut self, ctx: &TickContext<'_>, name: &str) -> Option<Affine3A> {
        let index = self.lookup_attachment(name)?;
        self.get_attachment(ctx, index)
    }

    /// Attachment transform relative to the entity
    pub fn get_attachment_local(&mut self, ctx: &TickContext<'_>, index: usize) -> Option<Affine3A> {
        let world = self.get_attachment(ctx, index)?;
        Some(self.entity_transform().inverse() * world)
    }

    /// World origin and forward, right and up vectors of an attachment
    pub fn attachment_vectors(
        &mut self,
        ctx: &TickContext<'_>,
        index: usize,
    ) -> Option<(Vec3, Vec3, Vec3, Vec3)> {
        let transform = self.get_attachment(ctx, index)?;
        let (forward, right, up) = axis_vectors(&transform);
        Some((Vec3::from(transform.translation), forward, right, up))
    }

    // Hitboxes

    pub fn hitbox_set(&self) -> usize {
        self.hitbox_set
    }

    /// Select the active hitbox set. Invalid sets fall back to set 0.
    pub fn set_hitbox_set(&mut self, set: usize) -> bool {
        let count = self.hitbox_set_count();
        if set >= count {
            log::warn!("Hitbox set {set} out of range ({count} sets)");
            self.hitbox_set = 0;
            return false;
        }
        self.hitbox_set = set;
        true
    }

    pub fn set_hitbox_set_by_name(&mut self, name: &str) -> bool {
        match self.model().and_then(|m| m.lookup_hitbox_set(name)) {
            Some(set) => self.set_hitbox_set(set),
            None => {
                log::warn!("Unknown hitbox set '{name}'");
                false
            }
        }
    }

    pub fn hitbox_set_name(&self) -> Option<&str> {
        self.model()?
            .hitbox_set(self.hitbox_set)
            .map(|s| s.name.as_str())
    }

    pub fn hitbox_set_count(&self) -> usize {
        self.model().map_or(0, |m| m.hitbox_sets().len())
    }

    /// Bone of a hitbox in the active set
    pub fn hitbox_bone(&self, hitbox: usize) -> Option<usize> {
        self.model()?.hitbox(self.hitbox_set, hitbox).map(|h| h.bone)
    }

    /// Find a hitbox by name across every set, returning `(set, hitbox)`
    pub fn lookup_hitbox(&self, name: &str) -> Option<(usize, usize)> {
        let model = self.model()?;
        (0..model.hitbox_sets().len())
            .find_map(|set| model.lookup_hitbox(set, name).map(|index| (set, index)))
    }

    /// Split the active set's hitboxes by which side of a plane their world
    /// centre lies on, returning `(front, back)` hitbox indices
    pub fn hitboxes_front_side(
        &mut self,
        ctx: &TickContext<'_>,
        normal: Vec3,
        dist: f32,
    ) -> (Vec<usize>, Vec<usize>) {
        let boxes: Vec<(usize, Vec3)> = self
            .model()
            .and_then(|m| m.hitbox_set(self.hitbox_set))
            .map(|set| set.hitboxes.iter().map(|h| (h.bone, h.center())).collect())
            .unwrap_or_default();

        let mut front = Vec::new();
        let mut back = Vec::new();
        for (index, (bone, center)) in boxes.into_iter().enumerate() {
            let world = self.get_bone_transform(ctx, bone).transform_point3(center);
            if world.dot(normal) >= dist {
                front.push(index);
            } else {
                back.push(index);
            }
        }
        (front, back)
    }

    // Body groups and skin

    /// Packed body group selection
    pub fn body(&self) -> u32 {
        self.body
    }

    pub fn set_body(&mut self, body: u32) {
        self.body = body;
    }

    pub fn skin(&self) -> u32 {
        self.skin
    }

    pub fn set_skin(&mut self, skin: u32) {
        self.skin = skin;
    }

    /// Select a model within a body group. Returns false for an invalid group or value.
    pub fn set_bodygroup(&mut self, group: usize, value: u32) -> bool {
        let Some(part) = self.model().and_then(|m| m.body_parts().get(group)) else {
            log::warn!("Body group {group} out of range");
            return false;
        };
        match part.apply(self.body, value) {
            Some(body) => {
                self.body = body;
                true
            }
            None => false,
        }
    }

    pub fn get_bodygroup(&self, group: usize) -> u32 {
        self.model()
            .and_then(|m| m.body_parts().get(group))
            .map_or(0, |part| part.current(self.body))
    }

    pub fn bodygroup_name(&self, group: usize) -> Option<&str> {
        self.model()?
            .body_parts()
            .get(group)
            .map(|p| p.name.as_str())
    }

    pub fn find_bodygroup_by_name(&self, name: &str) -> Option<usize> {
        self.model()?.lookup_body_part(name)
    }

    /// Number of choices in a body group
    pub fn bodygroup_count(&self, group: usize) -> u32 {
        self.model()
            .and_then(|m| m.body_parts().get(group))
            .map_or(0, |p| p.num_models)
    }

    pub fn num_bodygroups(&self) -> usize {
        self.model().map_or(0, |m| m.body_parts().len())
    }

    // Flex

    pub fn num_flex_controllers(&self) -> usize {
        self.model().map_or(0, |m| m.flex_controllers().len())
    }

    pub fn flex_controller_name(&self, index: usize) -> Option<&str> {
        self.model()?
            .flex_controllers()
            .get(index)
            .map(|c| c.name.as_str())
    }

    pub fn flex_controller_kind(&self, index: usize) -> Option<&str> {
        self.model()?
            .flex_controllers()
            .get(index)
            .map(|c| c.kind.as_str())
    }

    pub fn flex_facs(&self, index: usize) -> Option<&str> {
        self.model()?
            .flex_descs()
            .get(index)
            .map(|f| f.facs.as_str())
    }

    // Bounds

    /// Fit the entity bounds to the current sequence's box, rotated by yaw.
    ///
    /// The vertical extent is fixed to `0..1`. Returns the new bounds, or None
    /// (keeping the old bounds) when there is no valid sequence.
    pub fn set_sequence_box(&mut self) -> Option<(Vec3, Vec3)> {
        let seq = self.model()?.sequence(self.state.sequence?)?;
        let (mins, maxs) = (seq.bbmin, seq.bbmax);

        let mut rmin = Vec3::splat(f32::MAX);
        let mut rmax = Vec3::splat(f32::MIN);
        for x in [mins.x, maxs.x] {
            for y in [mins.y, maxs.y] {
                for z in [mins.z, maxs.z] {
                    let p = yaw_rotate(Vec3::new(x, y, z), self.angles.y);
                    rmin = rmin.min(p);
                    rmax = rmax.max(p);
                }
            }
        }
        rmin.z = 0.0;
        rmax.z = 1.0;

        self.bounds = Some((rmin, rmax));
        self.bounds
    }

    /// Bounds set by [`Animating::set_sequence_box`]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bounds
    }

    // Misc

    /// Mirror another entity's model and playback
    pub fn copy_animation_data_from(&mut self, other: &Animating) {
        self.model.clone_from(&other.model);
        self.state.sequence = other.state.sequence;
        self.state.cycle = other.state.cycle;
        self.state.playback_rate = other.state.playback_rate;
        self.state.pose_parameters = other.state.pose_parameters;
        self.state.bone_controllers = other.state.bone_controllers;
        self.state.anim_time = other.state.anim_time;
        self.state.loops = other.state.loops;
        self.body = other.body;
        self.skin = other.skin;
        self.bone_cache.invalidate();
    }

    /// Let clients animate this entity themselves
    pub fn use_client_side_animation(&mut self) {
        self.client_side_animation = true;
    }

    pub fn uses_client_side_animation(&self) -> bool {
        self.client_side_animation
    }

    /// Toggle the flag clients watch to restart their local animation
    pub fn reset_client_side_frame(&mut self) {
        self.client_side_frame_reset = !self.client_side_frame_reset;
    }

    pub fn client_side_frame_reset(&self) -> bool {
        self.client_side_frame_reset
    }
}
