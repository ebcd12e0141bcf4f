//! Save/restore and replication of animation state.
//!
//! [`FIELDS`] is the field table shared by every consumer: save games write
//! the fields it lists, network code replicates them, and
//! [`AnimatingSnapshot::from_values`] rebuilds a snapshot from any subset of
//! them. IK chain contents are transient and never persisted, only whether
//! the entity had an IK context.

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};
use studio_model::{MAX_BONE_CONTROLLERS, MAX_POSE_PARAMETERS};

use crate::animating::Animating;
use crate::cycle::MAX_NON_LOOPING_CYCLE;
use crate::error::{Result, StateError};
use crate::ik::IkContext;

/// Snapshot layout version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Value type of a persisted field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    /// Fixed-length float array
    FloatArray(usize),
}

/// A field value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum FieldValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    FloatArray(Vec<f32>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Int(_) => FieldKind::Int,
            Self::Float(_) => FieldKind::Float,
            Self::Bool(_) => FieldKind::Bool,
            Self::FloatArray(v) => FieldKind::FloatArray(v.len()),
        }
    }
}

/// Entry of the field table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDesc {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Default value; arrays repeat it, flags treat non-zero as true
    pub default: f32,
}

impl FieldDesc {
    const fn new(name: &'static str, kind: FieldKind, default: f32) -> Self {
        Self {
            name,
            kind,
            default,
        }
    }

    pub fn default_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Int => FieldValue::Int(self.default as i64),
            FieldKind::Float => FieldValue::Float(self.default),
            FieldKind::Bool => FieldValue::Bool(self.default != 0.0),
            FieldKind::FloatArray(len) => FieldValue::FloatArray(vec![self.default; len]),
        }
    }
}

/// Every persisted and replicated field
pub const FIELDS: &[FieldDesc] = &[
    FieldDesc::new("sequence", FieldKind::Int, -1.0),
    FieldDesc::new("cycle", FieldKind::Float, 0.0),
    FieldDesc::new("playback_rate", FieldKind::Float, 1.0),
    FieldDesc::new("pose_parameters", FieldKind::FloatArray(MAX_POSE_PARAMETERS), 0.0),
    FieldDesc::new("bone_controllers", FieldKind::FloatArray(MAX_BONE_CONTROLLERS), 0.0),
    FieldDesc::new("body", FieldKind::Int, 0.0),
    FieldDesc::new("skin", FieldKind::Int, 0.0),
    FieldDesc::new("sequence_parity", FieldKind::Int, 0.0),
    FieldDesc::new("events_parity", FieldKind::Int, 0.0),
    FieldDesc::new("anim_time", FieldKind::Float, 0.0),
    FieldDesc::new("ground_speed", FieldKind::Float, 0.0),
    FieldDesc::new("last_event_check", FieldKind::Float, 0.0),
    FieldDesc::new("finished", FieldKind::Bool, 0.0),
    FieldDesc::new("loops", FieldKind::Bool, 0.0),
    FieldDesc::new("hitbox_set", FieldKind::Int, 0.0),
    FieldDesc::new("model_scale", FieldKind::Float, 1.0),
    FieldDesc::new("client_side_animation", FieldKind::Bool, 0.0),
    FieldDesc::new("client_side_frame_reset", FieldKind::Bool, 0.0),
    FieldDesc::new("ik_enabled", FieldKind::Bool, 0.0),
];

/// Look up a field by name
pub fn field(name: &str) -> Option<&'static FieldDesc> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Saved animation state of one entity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct AnimatingSnapshot {
    pub version: u32,
    pub sequence: Option<usize>,
    pub cycle: f32,
    pub playback_rate: f32,
    pub pose_parameters: Vec<f32>,
    pub bone_controllers: Vec<f32>,
    pub body: u32,
    pub skin: u32,
    pub sequence_parity: u32,
    pub events_parity: u32,
    pub anim_time: f32,
    pub ground_speed: f32,
    pub last_event_check: f32,
    pub finished: bool,
    pub loops: bool,
    pub hitbox_set: usize,
    pub model_scale: f32,
    pub client_side_animation: bool,
    pub client_side_frame_reset: bool,
    pub ik_enabled: bool,
}

impl Default for AnimatingSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            sequence: None,
            cycle: 0.0,
            playback_rate: 1.0,
            pose_parameters: vec![0.0; MAX_POSE_PARAMETERS],
            bone_controllers: vec![0.0; MAX_BONE_CONTROLLERS],
            body: 0,
            skin: 0,
            sequence_parity: 0,
            events_parity: 0,
            anim_time: 0.0,
            ground_speed: 0.0,
            last_event_check: 0.0,
            finished: false,
            loops: false,
            hitbox_set: 0,
            model_scale: 1.0,
            client_side_animation: false,
            client_side_frame_reset: false,
            ik_enabled: false,
        }
    }
}

fn to_u32(field: &'static str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| StateError::InvalidValue {
        field,
        reason: format!("{value} is not a valid unsigned value"),
    })
}

impl AnimatingSnapshot {
    /// Read a field by name
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "sequence" => FieldValue::Int(self.sequence.map_or(-1, |s| s as i64)),
            "cycle" => FieldValue::Float(self.cycle),
            "playback_rate" => FieldValue::Float(self.playback_rate),
            "pose_parameters" => FieldValue::FloatArray(self.pose_parameters.clone()),
            "bone_controllers" => FieldValue::FloatArray(self.bone_controllers.clone()),
            "body" => FieldValue::Int(i64::from(self.body)),
            "skin" => FieldValue::Int(i64::from(self.skin)),
            "sequence_parity" => FieldValue::Int(i64::from(self.sequence_parity)),
            "events_parity" => FieldValue::Int(i64::from(self.events_parity)),
            "anim_time" => FieldValue::Float(self.anim_time),
            "ground_speed" => FieldValue::Float(self.ground_speed),
            "last_event_check" => FieldValue::Float(self.last_event_check),
            "finished" => FieldValue::Bool(self.finished),
            "loops" => FieldValue::Bool(self.loops),
            "hitbox_set" => FieldValue::Int(self.hitbox_set as i64),
            "model_scale" => FieldValue::Float(self.model_scale),
            "client_side_animation" => FieldValue::Bool(self.client_side_animation),
            "client_side_frame_reset" => FieldValue::Bool(self.client_side_frame_reset),
            "ik_enabled" => FieldValue::Bool(self.ik_enabled),
            _ => return None,
        };
        Some(value)
    }

    /// Write a field by name, checking its kind against the field table
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<()> {
        let desc = field(name).ok_or_else(|| StateError::UnknownField(name.to_string()))?;
        let mismatch = || StateError::TypeMismatch {
            field: desc.name,
            expected: desc.kind,
        };

        match (desc.kind, value) {
            (FieldKind::Int, FieldValue::Int(v)) => match desc.name {
                "sequence" => {
                    self.sequence = if v < 0 {
                        None
                    } else {
                        Some(usize::try_from(v).map_err(|_| mismatch())?)
                    };
                }
                "body" => self.body = to_u32(desc.name, v)?,
                "skin" => self.skin = to_u32(desc.name, v)?,
                "sequence_parity" => self.sequence_parity = to_u32(desc.name, v)?,
                "events_parity" => self.events_parity = to_u32(desc.name, v)?,
                "hitbox_set" => self.hitbox_set = to_u32(desc.name, v)? as usize,
                _ => return Err(mismatch()),
            },
            (FieldKind::Float, FieldValue::Float(v)) => match desc.name {
                "cycle" => self.cycle = v,
                "playback_rate" => self.playback_rate = v,
                "anim_time" => self.anim_time = v,
                "ground_speed" => self.ground_speed = v,
                "last_event_check" => self.last_event_check = v,
                "model_scale" => self.model_scale = v,
                _ => return Err(mismatch()),
            },
            (FieldKind::Bool, FieldValue::Bool(v)) => match desc.name {
                "finished" => self.finished = v,
                "loops" => self.loops = v,
                "client_side_animation" => self.client_side_animation = v,
                "client_side_frame_reset" => self.client_side_frame_reset = v,
                "ik_enabled" => self.ik_enabled = v,
                _ => return Err(mismatch()),
            },
            (FieldKind::FloatArray(len), FieldValue::FloatArray(values)) => {
                if values.len() != len {
                    return Err(StateError::ArrayLength {
                        field: desc.name,
                        expected: len,
                        found: values.len(),
                    });
                }
                match desc.name {
                    "pose_parameters" => self.pose_parameters = values,
                    "bone_controllers" => self.bone_controllers = values,
                    _ => return Err(mismatch()),
                }
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    /// Every field in table order
    pub fn to_values(&self) -> Vec<(&'static str, FieldValue)> {
        FIELDS
            .iter()
            .filter_map(|f| self.get(f.name).map(|v| (f.name, v)))
            .collect()
    }

    /// Build a snapshot from named values. Fields not given keep their defaults.
    pub fn from_values<'a, I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, FieldValue)>,
    {
        let mut snapshot = Self::default();
        for (name, value) in values {
            snapshot.set(name, value)?;
        }
        Ok(snapshot)
    }
}

impl Animating {
    /// Capture the persisted animation state
    pub fn snapshot(&self) -> AnimatingSnapshot {
        let state = &self.state;
        AnimatingSnapshot {
            version: SNAPSHOT_VERSION,
            sequence: state.sequence,
            cycle: state.cycle,
            playback_rate: state.playback_rate,
            pose_parameters: state.pose_parameters.to_vec(),
            bone_controllers: state.bone_controllers.to_vec(),
            body: self.body,
            skin: self.skin,
            sequence_parity: state.sequence_parity,
            events_parity: state.events_parity,
            anim_time: state.anim_time,
            ground_speed: state.ground_speed,
            last_event_check: state.last_event_check,
            finished: state.finished,
            loops: state.loops,
            hitbox_set: self.hitbox_set,
            model_scale: self.model_scale,
            client_side_animation: self.client_side_animation,
            client_side_frame_reset: self.client_side_frame_reset,
            ik_enabled: self.ik.is_some(),
        }
    }

    /// Restore state captured by [`Animating::snapshot`].
    ///
    /// The entity is left untouched when the snapshot is rejected.
    pub fn restore(&mut self, snapshot: &AnimatingSnapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StateError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let pose_parameters: [f32; MAX_POSE_PARAMETERS] = snapshot
            .pose_parameters
            .as_slice()
            .try_into()
            .map_err(|_| StateError::ArrayLength {
                field: "pose_parameters",
                expected: MAX_POSE_PARAMETERS,
                found: snapshot.pose_parameters.len(),
            })?;
        let bone_controllers: [f32; MAX_BONE_CONTROLLERS] = snapshot
            .bone_controllers
            .as_slice()
            .try_into()
            .map_err(|_| StateError::ArrayLength {
                field: "bone_controllers",
                expected: MAX_BONE_CONTROLLERS,
                found: snapshot.bone_controllers.len(),
            })?;
        if let (Some(sequence), Some(model)) = (snapshot.sequence, self.model()) {
            if sequence >= model.sequence_count() {
                return Err(StateError::InvalidValue {
                    field: "sequence",
                    reason: format!(
                        "{sequence} is out of range for model '{}' ({} sequences)",
                        model.name(),
                        model.sequence_count()
                    ),
                });
            }
        }
        let cycle_in_domain = if snapshot.loops {
            (0.0..1.0).contains(&snapshot.cycle)
        } else {
            (0.0..=MAX_NON_LOOPING_CYCLE).contains(&snapshot.cycle)
        };
        if !cycle_in_domain {
            return Err(StateError::InvalidValue {
                field: "cycle",
                reason: format!("{} is outside the cycle domain", snapshot.cycle),
            });
        }
        let overshoot = self.options().event_overshoot;
        if !(0.0..=overshoot).contains(&snapshot.last_event_check) {
            return Err(StateError::InvalidValue {
                field: "last_event_check",
                reason: format!(
                    "{} is outside [0, {overshoot}]",
                    snapshot.last_event_check
                ),
            });
        }

        let mask = self.options().parity_mask();
        let state = self.state_mut();
        state.sequence = snapshot.sequence;
        state.cycle = snapshot.cycle;
        state.playback_rate = snapshot.playback_rate;
        state.pose_parameters = pose_parameters;
        state.bone_controllers = bone_controllers;
        state.sequence_parity = snapshot.sequence_parity & mask;
        state.events_parity = snapshot.events_parity & mask;
        state.anim_time = snapshot.anim_time;
        state.prev_anim_time = snapshot.anim_time;
        state.ground_speed = snapshot.ground_speed;
        state.last_event_check = snapshot.last_event_check;
        state.loops_crossed = 0;
        state.finished = snapshot.finished;
        state.loops = snapshot.loops;

        self.body = snapshot.body;
        self.skin = snapshot.skin;
        self.model_scale = snapshot.model_scale;
        self.client_side_animation = snapshot.client_side_animation;
        self.client_side_frame_reset = snapshot.client_side_frame_reset;
        if self.model().is_some() {
            self.set_hitbox_set(snapshot.hitbox_set);
        } else {
            self.hitbox_set = snapshot.hitbox_set;
        }

        self.ik = snapshot
            .ik_enabled
            .then(|| IkContext::new(self.options().ik_miss_policy));

        log::debug!(
            "Restored sequence {:?} at cycle {:.3}",
            snapshot.sequence,
            snapshot.cycle
        );
        Ok(())
    }
}
