// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MET-based calorie estimation.

use crate::models::ActivityType;

/// Per-type coefficients.
struct Coefficients {
    /// Metabolic equivalent (kcal per kg per hour)
    met: f64,
    /// Locomotion cost (kcal per kg per km); `None` for time-only activities
    per_km: Option<f64>,
}

fn coefficients(activity_type: ActivityType) -> Coefficients {
    match activity_type {
        ActivityType::Walk => Coefficients {
            met: 3.0,
            per_km: Some(0.8),
        },
        ActivityType::Run => Coefficients {
            met: 7.0,
            per_km: Some(1.0),
        },
        ActivityType::Hike => Coefficients {
            met: 5.0,
            per_km: Some(1.1),
        },
        ActivityType::Play => Coefficients {
            met: 4.0,
            per_km: None,
        },
        ActivityType::Training => Coefficients {
            met: 2.5,
            per_km: None,
        },
    }
}

/// Negative and NaN inputs count as zero.
fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Estimate energy expenditure in kcal.
///
/// Locomotion types take the larger of the time-based and distance-based
/// estimates, so a session with no fixes still accrues calories over time.
/// Play and training are time-based only.
pub fn estimate_calories(
    activity_type: ActivityType,
    elapsed_minutes: f64,
    distance_km: f64,
    weight_kg: f64,
) -> u32 {
    let minutes = non_negative(elapsed_minutes);
    let km = non_negative(distance_km);
    let weight = non_negative(weight_kg);
    let c = coefficients(activity_type);

    let by_time = c.met * weight * minutes / 60.0;
    let kcal = match c.per_km {
        Some(per_km) => by_time.max(per_km * weight * km),
        None => by_time,
    };

    // Float-to-int casts saturate, so infinities land on u32::MAX
    kcal.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [ActivityType; 5] = [
        ActivityType::Walk,
        ActivityType::Run,
        ActivityType::Hike,
        ActivityType::Play,
        ActivityType::Training,
    ];

    #[test]
    fn test_walk_distance_dominates() {
        // 15 kg dog, 0.222 km in 2 seconds
        let kcal = estimate_calories(ActivityType::Walk, 2.0 / 60.0, 0.222, 15.0);
        assert_eq!(kcal, 3); // 0.8 * 15 * 0.222 = 2.66
    }

    #[test]
    fn test_walk_time_dominates_without_distance() {
        // 3.0 MET * 20 kg * 1 h
        assert_eq!(estimate_calories(ActivityType::Walk, 60.0, 0.0, 20.0), 60);
    }

    #[test]
    fn test_play_ignores_distance() {
        let a = estimate_calories(ActivityType::Play, 30.0, 0.0, 10.0);
        let b = estimate_calories(ActivityType::Play, 30.0, 5.0, 10.0);
        assert_eq!(a, b);
        assert_eq!(a, 20); // 4.0 * 10 * 0.5
    }

    #[test]
    fn test_run_costs_more_than_walk() {
        let walk = estimate_calories(ActivityType::Walk, 30.0, 3.0, 25.0);
        let run = estimate_calories(ActivityType::Run, 30.0, 3.0, 25.0);
        assert!(run > walk);
    }

    #[test]
    fn test_monotonic_in_time() {
        for kind in ALL_TYPES {
            let mut last = 0;
            for minutes in 0..240 {
                let kcal = estimate_calories(kind, f64::from(minutes), 1.5, 18.0);
                assert!(kcal >= last, "{} decreased at {} min", kind, minutes);
                last = kcal;
            }
        }
    }

    #[test]
    fn test_non_negative_for_bad_inputs() {
        for kind in ALL_TYPES {
            assert_eq!(estimate_calories(kind, -10.0, -1.0, 20.0), 0);
            assert_eq!(estimate_calories(kind, 30.0, 1.0, -5.0), 0);
            assert_eq!(estimate_calories(kind, f64::NAN, f64::NAN, f64::NAN), 0);
        }
    }

    #[test]
    fn test_zero_inputs() {
        for kind in ALL_TYPES {
            assert_eq!(estimate_calories(kind, 0.0, 0.0, 15.0), 0);
        }
    }
}
