//! Sequences: playable clips built from one or a grid of blended animations

use glam::Vec3;
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Sequence playback flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct SequenceFlags: u32 {
        /// Wraps around at the end instead of holding the last frame
        const LOOPING = 0x0001;
        /// Always layered on top of the primary sequence
        const AUTOPLAY = 0x0008;
        /// Stores offsets from the bind pose rather than absolute poses
        const DELTA = 0x0004;
    }
}

impl Default for SequenceFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Trigger point baked into a sequence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct AnimEvent {
    /// Cycle at which the event fires
    pub cycle: f32,
    /// Event number. Numbers of 5000 and above are client-side by convention.
    pub event: i32,
    /// Free-form option string passed to the handler
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub options: String,
}

impl AnimEvent {
    /// Create an event with no options
    pub fn new(cycle: f32, event: i32) -> Self {
        Self {
            cycle,
            event,
            options: String::new(),
        }
    }

    /// Attach an option string
    #[must_use]
    pub fn with_options<S: Into<String>>(mut self, options: S) -> Self {
        self.options = options.into();
        self
    }
}

/// A named, playable sequence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct SequenceDesc {
    /// Sequence name
    pub label: String,
    /// Activity this sequence can play for (e.g. `ACT_WALK`)
    pub activity: Option<String>,
    /// Selection weight among sequences of the same activity. Negative
    /// weights mark sequences that keep playing once selected.
    pub act_weight: i32,
    /// Playback flags
    pub flags: SequenceFlags,
    /// Seconds of fade-out at the end of a non-looping sequence
    pub fade_out_time: f32,
    /// Baked events, in dispatch order
    pub events: Vec<AnimEvent>,
    /// Pose parameters driving each blend axis
    pub param_index: [Option<usize>; 2],
    /// Pose parameter value mapped to the first column/row of the grid
    pub param_start: [f32; 2],
    /// Pose parameter value mapped to the last column/row of the grid
    pub param_end: [f32; 2],
    /// Blend grid dimensions
    pub group_size: [usize; 2],
    /// Animation indices, `group_size[0] * group_size[1]` entries, row-major by axis 1
    pub animations: Vec<usize>,
    /// Per-bone blend weight (empty means 1.0 for every bone)
    pub bone_weights: Vec<f32>,
    /// Transition graph node the sequence starts at (0 = no node)
    pub entry_node: usize,
    /// Transition graph node the sequence ends at (0 = no node)
    pub exit_node: usize,
    /// Non-zero when the sequence may play backwards through the graph
    pub node_flags: u32,
    /// Bounding box minimum
    pub bbmin: Vec3,
    /// Bounding box maximum
    pub bbmax: Vec3,
}

impl Default for SequenceDesc {
    fn default() -> Self {
        Self {
            label: String::new(),
            activity: None,
            act_weight: 0,
            flags: SequenceFlags::empty(),
            fade_out_time: 0.2,
            events: Vec::new(),
            param_index: [None, None],
            param_start: [0.0, 0.0],
            param_end: [0.0, 0.0],
            group_size: [1, 1],
            animations: Vec::new(),
            bone_weights: Vec::new(),
            entry_node: 0,
            exit_node: 0,
            node_flags: 0,
            bbmin: Vec3::ZERO,
            bbmax: Vec3::ZERO,
        }
    }
}

impl SequenceDesc {
    /// Single-animation sequence
    pub fn new<S: Into<String>>(label: S, animation: usize) -> Self {
        Self {
            label: label.into(),
            animations: vec![animation],
            ..Self::default()
        }
    }

    /// Set playback flags
    #[must_use]
    pub fn with_flags(mut self, flags: SequenceFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the activity and its selection weight
    #[must_use]
    pub fn with_activity<S: Into<String>>(mut self, activity: S, weight: i32) -> Self {
        self.activity = Some(activity.into());
        self.act_weight = weight;
        self
    }

    /// Append a baked event
    #[must_use]
    pub fn with_event(mut self, event: AnimEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Set the fade-out time
    #[must_use]
    pub fn with_fade_out(mut self, seconds: f32) -> Self {
        self.fade_out_time = seconds;
        self
    }

    /// Make this a one-axis blend across `animations`, driven by a pose parameter
    #[must_use]
    pub fn with_blend(
        mut self,
        pose_param: usize,
        start: f32,
        end: f32,
        animations: Vec<usize>,
    ) -> Self {
        self.param_index[0] = Some(pose_param);
        self.param_start[0] = start;
        self.param_end[0] = end;
        self.group_size = [animations.len().max(1), 1];
        self.animations = animations;
        self
    }

    /// Set the transition graph nodes
    #[must_use]
    pub fn with_nodes(mut self, entry: usize, exit: usize) -> Self {
        self.entry_node = entry;
        self.exit_node = exit;
        self
    }

    /// Set the bounding box
    #[must_use]
    pub fn with_bounds(mut self, bbmin: Vec3, bbmax: Vec3) -> Self {
        self.bbmin = bbmin;
        self.bbmax = bbmax;
        self
    }

    /// Whether the sequence wraps around
    pub fn is_looping(&self) -> bool {
        self.flags.contains(SequenceFlags::LOOPING)
    }

    /// Whether the sequence is layered automatically
    pub fn is_autoplay(&self) -> bool {
        self.flags.contains(SequenceFlags::AUTOPLAY)
    }

    /// Whether the sequence stores offsets from the bind pose
    pub fn is_delta(&self) -> bool {
        self.flags.contains(SequenceFlags::DELTA)
    }

    /// Animation at a grid cell
    pub fn animation_at(&self, i0: usize, i1: usize) -> Option<usize> {
        let i0 = i0.min(self.group_size[0].saturating_sub(1));
        let i1 = i1.min(self.group_size[1].saturating_sub(1));
        self.animations.get(i1 * self.group_size[0] + i0).copied()
    }

    /// Blend weight of a bone
    pub fn bone_weight(&self, bone: usize) -> f32 {
        self.bone_weights.get(bone).copied().unwrap_or(1.0)
    }
}
