//! Cycle normalization. Every wraparound of the animation phase goes through
//! [`normalize_cycle`].

/// Largest cycle a non-looping sequence may rest at
pub const MAX_NON_LOOPING_CYCLE: f32 = 0.999;

/// Outcome of normalizing a cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedCycle {
    /// Cycle in `[0, 1)` (looping) or `[0, 0.999]` (non-looping)
    pub cycle: f32,
    /// Whether the input left `[0, 1)`
    pub wrapped: bool,
}

/// Bring a cycle back into its domain.
///
/// Looping sequences wrap modulo 1. Non-looping sequences clamp to
/// `[0, MAX_NON_LOOPING_CYCLE]`.
pub fn normalize_cycle(cycle: f32, looping: bool) -> NormalizedCycle {
    let wrapped = !(0.0..1.0).contains(&cycle);
    let cycle = if !looping {
        cycle.clamp(0.0, MAX_NON_LOOPING_CYCLE)
    } else if wrapped {
        let c = cycle.rem_euclid(1.0);
        // Tiny negative inputs round up to exactly 1.0
        if c >= 1.0 { 0.0 } else { c }
    } else {
        cycle
    };

    NormalizedCycle { cycle, wrapped }
}

/// Fractional part in `[0, 1)`
pub fn frac(value: f32) -> f32 {
    normalize_cycle(value, true).cycle
}
