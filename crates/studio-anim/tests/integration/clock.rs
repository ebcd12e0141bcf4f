//! Sequence clock integration tests

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use studio_anim::AnimatingOptions;
use studio_anim::cycle::{MAX_NON_LOOPING_CYCLE, normalize_cycle};

use crate::common::{FIRE, IDLE, WALK, entity_playing, entity_with_options};

proptest! {
    #[test]
    fn normalized_looping_cycle_stays_in_unit_range(cycle in -100.0f32..100.0) {
        let normalized = normalize_cycle(cycle, true);
        prop_assert!((0.0..1.0).contains(&normalized.cycle));
        prop_assert_eq!(normalized.wrapped, !(0.0..1.0).contains(&cycle));
    }

    #[test]
    fn normalized_non_looping_cycle_is_clamped(cycle in -100.0f32..100.0) {
        let normalized = normalize_cycle(cycle, false);
        prop_assert!(normalized.cycle >= 0.0);
        prop_assert!(normalized.cycle <= MAX_NON_LOOPING_CYCLE);
    }

    #[test]
    fn parity_wraps_at_bit_width(resets in 0u32..64, bits in 1u32..6) {
        let options = AnimatingOptions::default().with_parity_bits(bits);
        let mut entity = entity_with_options(FIRE, options);
        for _ in 0..resets {
            entity.reset_sequence(FIRE);
        }
        let mask = (1u32 << bits) - 1;
        prop_assert_eq!(entity.state().sequence_parity, (resets + 1) & mask);
        prop_assert_eq!(entity.state().events_parity, (resets + 1) & mask);
    }
}

#[test]
fn test_advance_accumulates_cycle() {
    let mut entity = entity_playing(WALK);
    assert!(entity.studio_frame_advance(0.1));
    assert!(entity.studio_frame_advance(0.2));
    assert!((entity.cycle() - 0.2).abs() < 1e-4);
    assert_eq!(entity.state().prev_anim_time, 0.1);
    assert_eq!(entity.state().anim_time, 0.2);
}

#[test]
fn test_duplicate_tick_is_ignored() {
    let mut entity = entity_playing(WALK);
    assert!(entity.studio_frame_advance(0.1));
    let cycle = entity.cycle();
    assert!(!entity.studio_frame_advance(0.1));
    assert!(!entity.studio_frame_advance(0.1005));
    assert_eq!(entity.cycle(), cycle);
}

#[test]
fn test_hitch_is_clamped() {
    let mut entity = entity_playing(WALK);
    entity.studio_frame_advance(0.2);
    entity.studio_frame_advance(5.0);
    assert!((entity.cycle() - 0.4).abs() < 1e-4);
    assert!((entity.anim_time_interval(5.0) - 0.2).abs() < 1e-4);
}

#[test]
fn test_looping_sequence_wraps_and_finishes() {
    let mut entity = entity_playing(WALK);
    for i in 1..=6 {
        entity.studio_frame_advance(i as f32 * 0.2);
    }
    assert!(entity.cycle() < 0.5);
    assert!(entity.is_sequence_finished());
    assert!(entity.is_sequence_looping());
}

#[test]
fn test_non_looping_sequence_rests_at_end() {
    let mut entity = entity_playing(FIRE);
    for i in 1..=5 {
        entity.studio_frame_advance(i as f32 * 0.1);
    }
    assert!(!entity.is_sequence_finished());

    for i in 6..=12 {
        entity.studio_frame_advance(i as f32 * 0.1);
    }
    assert!(entity.is_sequence_finished());
    assert_eq!(entity.cycle(), MAX_NON_LOOPING_CYCLE);
}

#[test]
fn test_playback_rate_scales_advance() {
    let mut entity = entity_playing(WALK);
    entity.set_playback_rate(2.0);
    entity.studio_frame_advance(0.1);
    assert!((entity.cycle() - 0.2).abs() < 1e-4);
}

#[test]
fn test_reset_clears_playback() {
    let mut entity = entity_playing(FIRE);
    entity.set_playback_rate(3.0);
    for i in 1..=5 {
        entity.studio_frame_advance(i as f32 * 0.2);
    }
    assert!(entity.is_sequence_finished());

    entity.reset_sequence(IDLE);
    assert_eq!(entity.playback_rate(), 1.0);
    assert!(!entity.is_sequence_finished());
    assert_eq!(entity.state().last_event_check, 0.0);
    assert_eq!(entity.cycle(), 0.0);
}

#[test]
fn test_durations() {
    let entity = entity_playing(WALK);
    assert!((entity.sequence_duration(Some(WALK)) - 1.0).abs() < 1e-4);
    assert!((entity.sequence_cycle_rate(Some(WALK)) - 1.0).abs() < 1e-4);
    assert_eq!(entity.sequence_duration(Some(99)), 0.1);
    assert_eq!(entity.sequence_duration(None), 0.1);
    assert_eq!(entity.last_visible_cycle(), 1.0);
}
