//! Event dispatcher integration tests

use pretty_assertions::assert_eq;
use studio_anim::FiredEvent;
use test_case::test_case;

use crate::common::{FIRE, FLUTTER, FOOTSTEPS, IDLE, STEP_EVENTS, entity_playing, run_ticks};

fn event_numbers(fired: &[FiredEvent]) -> Vec<i32> {
    let mut numbers: Vec<i32> = fired.iter().map(|e| e.event).collect();
    numbers.sort_unstable();
    numbers
}

#[test_case(0.05, 36 ; "twenty per second")]
#[test_case(0.1, 18 ; "ten per second")]
#[test_case(0.15, 12 ; "uneven ticks")]
#[test_case(0.2, 9 ; "max interval ticks")]
fn test_events_fire_once_per_pass_regardless_of_tick(tick: f32, ticks: usize) {
    // 1.8 seconds of a 1 second loop: two passes over 0.1 and 0.5, one over 0.9
    let mut entity = entity_playing(FOOTSTEPS);
    let fired = run_ticks(&mut entity, tick, ticks);
    assert_eq!(event_numbers(&fired), vec![100, 100, 200, 200, 300]);
}

#[test_case(0.05, 40 ; "twenty per second")]
#[test_case(0.1, 20 ; "one pass per tick")]
#[test_case(0.2, 10 ; "two passes per tick")]
fn test_short_loop_fires_every_skipped_pass(tick: f32, ticks: usize) {
    // 2 seconds of a 0.1 second loop: twenty passes over three events
    let mut entity = entity_playing(FLUTTER);
    let fired = run_ticks(&mut entity, tick, ticks);
    assert_eq!(fired.len(), 60);
    for (_, number) in STEP_EVENTS {
        assert_eq!(fired.iter().filter(|e| e.event == number).count(), 20);
    }
    assert!(fired.iter().all(|e| e.time <= entity.state().anim_time + tick + 1e-4));
}

#[test]
fn test_backwards_loop_fires_nothing() {
    let mut entity = entity_playing(FOOTSTEPS);
    entity.set_playback_rate(-1.0);
    let fired = run_ticks(&mut entity, 0.1, 25);
    assert!(fired.is_empty());
    assert_eq!(entity.state().last_event_check, entity.cycle());
}

#[test]
fn test_events_carry_baked_data() {
    let mut entity = entity_playing(FOOTSTEPS);
    let fired = run_ticks(&mut entity, 0.2, 1);
    assert_eq!(fired.len(), 1);
    let event = &fired[0];
    assert_eq!(event.sequence, FOOTSTEPS);
    assert_eq!(event.event, STEP_EVENTS[0].1);
    assert_eq!(event.cycle, STEP_EVENTS[0].0);
    assert!(event.time > 0.0);
}

#[test]
fn test_finished_sequence_overshoots_to_final_event() {
    let mut entity = entity_playing(FIRE);
    let fired = run_ticks(&mut entity, 0.1, 15);
    // 0.9995 lies past the resting cycle of 0.999 and still fires exactly once
    assert_eq!(event_numbers(&fired), vec![10, 20]);
    assert_eq!(fired[0].options, "muzzle");

    let more = run_ticks(&mut entity, 0.1, 5);
    assert!(more.is_empty());
}

#[test]
fn test_client_side_events_are_skipped() {
    let mut entity = entity_playing(FIRE);
    let fired = run_ticks(&mut entity, 0.1, 7);
    assert!(fired.iter().all(|e| e.event < 5000));
    assert_eq!(event_numbers(&fired), vec![10]);
}

#[test]
fn test_paused_playback_fires_nothing() {
    let mut entity = entity_playing(FOOTSTEPS);
    entity.set_playback_rate(0.0);
    let fired = run_ticks(&mut entity, 0.1, 20);
    assert!(fired.is_empty());
    assert_eq!(entity.cycle(), 0.0);
}

#[test]
fn test_sequence_without_events() {
    let mut entity = entity_playing(IDLE);
    assert!(run_ticks(&mut entity, 0.1, 20).is_empty());
}

#[test]
fn test_reset_rearms_events() {
    let mut entity = entity_playing(FIRE);
    let first = run_ticks(&mut entity, 0.1, 15);
    entity.reset_sequence(FIRE);
    let second = run_ticks(&mut entity, 0.1, 15);
    assert_eq!(event_numbers(&first), event_numbers(&second));
}

#[test]
fn test_handler_trait_object() {
    struct Counter(usize);

    impl studio_anim::AnimEventHandler for Counter {
        fn handle_anim_event(&mut self, _event: &FiredEvent) {
            self.0 += 1;
        }
    }

    let mut entity = entity_playing(FOOTSTEPS);
    let mut counter = Counter(0);
    let mut time = 0.0;
    for _ in 0..5 {
        time += 0.2;
        entity.update(time, &mut counter);
    }
    assert_eq!(counter.0, 3);
}
