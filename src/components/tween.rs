//! Easing curves for the timed-loop catch-up animation.
//!
//! After a timed-loop roulette stops (or misses), its value is carried from
//! the stop point up to `max_value` over a fixed duration before the next
//! cycle. [`ease`] shapes that interpolation; the curve is picked per
//! roulette with the `catch_up_easing` configuration key.

use serde::Serialize;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, EnumString, EnumIter, StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
}

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
    }
}

/// Linearly interpolate between two floats.
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_every_curve_pins_endpoints_and_clamps() {
        for easing in Easing::iter() {
            assert!(approx_eq(ease(easing, 0.0), 0.0), "{easing:?} at 0.0");
            assert!(approx_eq(ease(easing, 1.0), 1.0), "{easing:?} at 1.0");
            assert!(approx_eq(ease(easing, -0.5), 0.0), "{easing:?} below 0");
            assert!(approx_eq(ease(easing, 1.5), 1.0), "{easing:?} above 1");
        }
    }

    #[test]
    fn test_every_curve_is_monotonic() {
        for easing in Easing::iter() {
            let mut previous = 0.0;
            for step in 1..=20 {
                let value = ease(easing, step as f32 / 20.0);
                assert!(value + EPSILON >= previous, "{easing:?} dipped at step {step}");
                previous = value;
            }
        }
    }

    #[test]
    fn test_curve_midpoints() {
        assert!(approx_eq(ease(Easing::Linear, 0.25), 0.25));
        assert!(approx_eq(ease(Easing::QuadIn, 0.5), 0.25));
        assert!(approx_eq(ease(Easing::QuadOut, 0.5), 0.75));
        assert!(approx_eq(ease(Easing::QuadInOut, 0.75), 0.875));
        assert!(approx_eq(ease(Easing::CubicIn, 0.5), 0.125));
        assert!(approx_eq(ease(Easing::CubicOut, 0.5), 0.875));
        assert!(approx_eq(ease(Easing::CubicInOut, 0.25), 0.0625));
    }

    #[test]
    fn test_lerp_f32() {
        assert!(approx_eq(lerp_f32(4.0, 10.0, 0.0), 4.0));
        assert!(approx_eq(lerp_f32(4.0, 10.0, 0.5), 7.0));
        assert!(approx_eq(lerp_f32(4.0, 10.0, 1.0), 10.0));
    }

    #[test]
    fn test_easing_parses_config_names() {
        assert_eq!("linear".parse::<Easing>().unwrap(), Easing::Linear);
        assert_eq!("quad_out".parse::<Easing>().unwrap(), Easing::QuadOut);
        assert_eq!("Cubic_In_Out".parse::<Easing>().unwrap(), Easing::CubicInOut);
        assert!("bounce".parse::<Easing>().is_err());
    }
}
