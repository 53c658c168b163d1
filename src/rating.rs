//! Output and performance rating.
//!
//! | Proficiency | Rating |
//! |-------------|--------|
//! | < 65 | 1 |
//! | [65, 75) | 2 |
//! | [75, 85) | 3 |
//! | [85, 95) | 4 |
//! | >= 95 | 5 |
//!
//! Boundaries belong to the higher tier. Values outside 0-100 are not
//! clamped; NaN rates 1.

/// Performance tier (1-5) for a proficiency percentage.
pub fn rating_for(proficiency: f64) -> u8 {
    if proficiency >= 95.0 {
        5
    } else if proficiency >= 85.0 {
        4
    } else if proficiency >= 75.0 {
        3
    } else if proficiency >= 65.0 {
        2
    } else {
        1
    }
}

/// Expected output: `proficiency / 100 × target`.
#[inline]
pub fn actual_output(proficiency: f64, target: f64) -> f64 {
    proficiency / 100.0 * target
}
