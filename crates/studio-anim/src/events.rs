//! Event dispatcher: fires the baked events crossed by the sequence clock.

use studio_model::StudioModel;

use crate::clock::{anim_time_interval, sequence_cycle_rate};
use crate::options::AnimatingOptions;
use crate::state::AnimationState;

/// An animation event delivered to a handler
#[derive(Debug, Clone, PartialEq)]
pub struct FiredEvent {
    /// Sequence the event belongs to
    pub sequence: usize,
    /// Event number
    pub event: i32,
    /// Option string baked with the event
    pub options: String,
    /// Cycle the event is placed at
    pub cycle: f32,
    /// Absolute time the event nominally fires at
    pub time: f32,
}

/// Receiver of animation events
pub trait AnimEventHandler {
    fn handle_anim_event(&mut self, event: &FiredEvent);
}

impl<F: FnMut(&FiredEvent)> AnimEventHandler for F {
    fn handle_anim_event(&mut self, event: &FiredEvent) {
        self(event);
    }
}

/// Whether an event at `cycle` lies in the scanned window `[start, end)`.
///
/// For looping sequences a window with `end < start` wrapped past the end of
/// the sequence and covers `[start, 1) ∪ [0, end)`.
pub fn event_in_window(cycle: f32, start: f32, end: f32, looping: bool) -> bool {
    if cycle >= start && cycle < end {
        return true;
    }
    looping && end < start && (cycle >= start || cycle < end)
}

/// Scan the interval traversed since the last call and deliver every event in it.
///
/// A looping sequence that wrapped fires `[start, 1)`, then every event once per
/// whole pass it skipped, then `[0, end)`. Playing backwards fires nothing.
///
/// Returns the number of events delivered.
pub fn dispatch_events(
    state: &mut AnimationState,
    model: Option<&StudioModel>,
    options: &AnimatingOptions,
    current_time: f32,
    handler: &mut dyn AnimEventHandler,
) -> usize {
    let loops_crossed = std::mem::take(&mut state.loops_crossed);
    if state.playback_rate == 0.0 {
        return 0;
    }
    let Some(model) = model else {
        log::warn!("Event dispatch without a model");
        return 0;
    };
    let Some(index) = state.sequence else {
        return 0;
    };
    let Some(seq) = model.sequence(index) else {
        log::warn!("Event dispatch for invalid sequence {index}");
        return 0;
    };
    if seq.events.is_empty() {
        return 0;
    }

    let cycle_rate = sequence_cycle_rate(Some(model), state.sequence, &state.pose_parameters, options)
        * state.playback_rate;
    if cycle_rate < 0.0 {
        state.last_event_check = state.cycle;
        log::trace!("Skipping events of sequence '{}' played backwards", seq.label);
        return 0;
    }

    let start = state.last_event_check;
    let end = if !state.loops && state.finished {
        options.event_overshoot
    } else {
        state.cycle
    };
    state.last_event_check = end;

    // (window start, window end, pass) in the order the cycle traversed them
    let windows: Vec<(f32, f32, u32)> = if state.loops && loops_crossed > 0 {
        std::iter::once((start, 1.0, 0))
            .chain((1..loops_crossed).map(|pass| (0.0, 1.0, pass)))
            .chain(std::iter::once((0.0, end, loops_crossed)))
            .collect()
    } else {
        vec![(start, end, 0)]
    };
    let interval = anim_time_interval(state, current_time, options);

    let mut fired = 0;
    for (from, to, pass) in windows {
        for event in &seq.events {
            if event.event >= options.client_event_threshold {
                continue;
            }

            let time = if loops_crossed > 0 && state.loops {
                if !(from..to).contains(&event.cycle) {
                    continue;
                }
                // Whole cycles between the event and the current cycle
                let behind = (loops_crossed - pass) as f32 + state.cycle - event.cycle;
                state.anim_time - behind / cycle_rate + interval
            } else {
                if !event_in_window(event.cycle, from, to, seq.is_looping()) {
                    continue;
                }
                if cycle_rate > 0.0 {
                    let mut cycle = event.cycle;
                    if cycle > state.cycle {
                        // Belongs to the previous pass through the sequence
                        cycle -= 1.0;
                    }
                    state.anim_time + (cycle - state.cycle) / cycle_rate + interval
                } else {
                    state.anim_time
                }
            };

            let fired_event = FiredEvent {
                sequence: index,
                event: event.event,
                options: event.options.clone(),
                cycle: event.cycle,
                time,
            };
            log::debug!(
                "Firing event {} of sequence '{}' at cycle {:.3}",
                fired_event.event,
                seq.label,
                fired_event.cycle
            );
            handler.handle_anim_event(&fired_event);
            fired += 1;
        }
    }
    fired
}
