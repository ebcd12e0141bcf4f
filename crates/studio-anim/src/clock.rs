//! Sequence clock: advances the cycle of an [`AnimationState`] from wall-clock time.

use studio_model::StudioModel;

use crate::cycle::normalize_cycle;
use crate::options::AnimatingOptions;
use crate::state::AnimationState;

/// Duration of a sequence in seconds.
///
/// Falls back to `options.fallback_duration` for a missing model, an invalid
/// sequence or a sequence with no length.
pub fn sequence_duration(
    model: Option<&StudioModel>,
    sequence: Option<usize>,
    pose_parameters: &[f32],
    options: &AnimatingOptions,
) -> f32 {
    let Some(model) = model else {
        return options.fallback_duration;
    };
    let Some(sequence) = sequence.filter(|&s| s < model.sequence_count()) else {
        if let Some(index) = sequence {
            log::warn!(
                "Sequence {index} out of range for model '{}' ({} sequences)",
                model.name(),
                model.sequence_count()
            );
        }
        return options.fallback_duration;
    };

    let duration = model.sequence_duration(sequence, pose_parameters);
    if duration > 0.0 {
        duration
    } else {
        options.fallback_duration
    }
}

/// Cycles per second of a sequence at unit playback rate
pub fn sequence_cycle_rate(
    model: Option<&StudioModel>,
    sequence: Option<usize>,
    pose_parameters: &[f32],
    options: &AnimatingOptions,
) -> f32 {
    1.0 / sequence_duration(model, sequence, pose_parameters, options)
}

/// Last cycle before the fade-out of the current sequence begins
pub fn last_visible_cycle(
    state: &AnimationState,
    model: Option<&StudioModel>,
    options: &AnimatingOptions,
) -> f32 {
    let Some(seq) = model.zip(state.sequence).and_then(|(m, s)| m.sequence(s)) else {
        return 1.0;
    };
    if seq.is_looping() {
        return 1.0;
    }
    let rate = sequence_cycle_rate(model, state.sequence, &state.pose_parameters, options);
    1.0 - seq.fade_out_time * rate * state.playback_rate
}

/// Ground speed of a sequence: length of its linear motion over its duration
pub fn sequence_ground_speed(
    model: Option<&StudioModel>,
    sequence: Option<usize>,
    pose_parameters: &[f32],
    options: &AnimatingOptions,
) -> f32 {
    let Some((model, sequence)) = model.zip(sequence) else {
        return 0.0;
    };
    let distance = model
        .sequence_linear_motion(sequence, pose_parameters)
        .length();
    distance / sequence_duration(Some(model), Some(sequence), pose_parameters, options)
}

/// Interval the current or most recent advance covers
pub fn anim_time_interval(
    state: &AnimationState,
    current_time: f32,
    options: &AnimatingOptions,
) -> f32 {
    let interval = if state.anim_time < current_time {
        current_time - state.anim_time
    } else {
        state.anim_time - state.prev_anim_time
    };
    interval.clamp(0.0, options.max_interval)
}

/// Advance the cycle to `current_time`.
///
/// Returns false when the elapsed interval is too small to count as a new tick.
pub fn advance(
    state: &mut AnimationState,
    model: Option<&StudioModel>,
    options: &AnimatingOptions,
    current_time: f32,
) -> bool {
    if state.prev_anim_time == 0.0 {
        state.prev_anim_time = state.anim_time;
    }

    let interval = (current_time - state.anim_time).clamp(0.0, options.max_interval);
    if interval <= options.min_advance {
        return false;
    }

    state.prev_anim_time = state.anim_time;
    state.anim_time = current_time;

    let rate = sequence_cycle_rate(model, state.sequence, &state.pose_parameters, options)
        * state.playback_rate;
    let raw = state.cycle + interval * rate;
    if state.loops && raw >= 1.0 {
        state.loops_crossed = state.loops_crossed.saturating_add(raw.floor() as u32);
    }
    let next = normalize_cycle(raw, state.loops);
    state.cycle = next.cycle;

    if next.wrapped || state.cycle > last_visible_cycle(state, model, options) {
        state.finished = true;
    }

    state.ground_speed =
        sequence_ground_speed(model, state.sequence, &state.pose_parameters, options);

    log::trace!(
        "Advanced sequence {:?} by {interval:.4}s to cycle {:.4} (finished: {})",
        state.sequence,
        state.cycle,
        state.finished
    );
    true
}

/// Reset per-sequence bookkeeping after a new sequence has been selected
pub fn reset_sequence_info(
    state: &mut AnimationState,
    model: Option<&StudioModel>,
    options: &AnimatingOptions,
) {
    if state.sequence.is_none() && model.is_some_and(|m| m.sequence_count() > 0) {
        state.sequence = Some(0);
    }

    state.ground_speed =
        sequence_ground_speed(model, state.sequence, &state.pose_parameters, options);
    state.loops = model
        .zip(state.sequence)
        .and_then(|(m, s)| m.sequence(s))
        .is_some_and(|s| s.is_looping());
    state.playback_rate = 1.0;
    state.finished = false;
    state.last_event_check = 0.0;
    state.loops_crossed = 0;

    let mask = options.parity_mask();
    state.sequence_parity = (state.sequence_parity + 1) & mask;
    state.events_parity = (state.events_parity + 1) & mask;

    log::debug!(
        "Reset sequence {:?} (loops: {}, parity: {})",
        state.sequence,
        state.loops,
        state.sequence_parity
    );
}
