//! Feature construction for the two classifiers
//!
//! Difficulty features (15):
//!
//! | index | meaning                                   |
//! |-------|-------------------------------------------|
//! | 0..6  | one-hot problem tags (`TAG_VOCABULARY`)    |
//! | 6     | difficulty ordinal (easy 0, medium 1, hard 2) |
//! | 7..13 | per-tag success rate (placeholder 0.5)    |
//! | 13    | average solve time in seconds             |
//! | 14    | average edit count                        |

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::{
    constants::{
        DEFAULT_AVG_EDITS, DEFAULT_AVG_SOLVE_TIME_SECS, DEFAULT_TAG_SUCCESS, DIFFICULTY_FEATURE_DIM,
        HINT_FEATURE_DIM, SIMULATED_EDITS_MEAN, TAG_VOCABULARY,
    },
    models::{Problem, UserProfile},
};

/// Feature vector for the difficulty (pass probability) model
pub type DifficultyFeatures = [f64; DIFFICULTY_FEATURE_DIM];

/// Feature vector for the hint timing model
pub type HintFeatures = [f64; HINT_FEATURE_DIM];

/// Build the difficulty feature vector for a (profile, problem) pair
///
/// A missing profile, or an average that is not positive yet, falls back to
/// the fixed defaults.
pub fn difficulty_features(profile: Option<&UserProfile>, problem: &Problem) -> DifficultyFeatures {
    let mut features = [0.0; DIFFICULTY_FEATURE_DIM];

    for (slot, tag) in features.iter_mut().zip(TAG_VOCABULARY) {
        *slot = if problem.has_tag(tag) { 1.0 } else { 0.0 };
    }

    features[TAG_VOCABULARY.len()] = problem.difficulty_level().ordinal();

    // TODO: derive per-tag success from the user's submission history once the
    // expected semantics (window, smoothing) are agreed on.
    let success_start = TAG_VOCABULARY.len() + 1;
    for slot in &mut features[success_start..success_start + TAG_VOCABULARY.len()] {
        *slot = DEFAULT_TAG_SUCCESS;
    }

    let (avg_time, avg_edits) = profile_averages(profile);
    features[DIFFICULTY_FEATURE_DIM - 2] = avg_time;
    features[DIFFICULTY_FEATURE_DIM - 1] = avg_edits;

    features
}

fn profile_averages(profile: Option<&UserProfile>) -> (f64, f64) {
    match profile {
        Some(p) => (
            positive_or(p.avg_time_per_solve, DEFAULT_AVG_SOLVE_TIME_SECS),
            positive_or(p.avg_edits, DEFAULT_AVG_EDITS),
        ),
        None => (DEFAULT_AVG_SOLVE_TIME_SECS, DEFAULT_AVG_EDITS),
    }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value > 0.0 { value } else { default }
}

/// Build the hint timing feature vector
pub fn hint_features(time_spent_seconds: i32, edits: u32) -> HintFeatures {
    [f64::from(time_spent_seconds), f64::from(edits)]
}

/// Draw a simulated edit count (the client does not report real edit counts)
pub fn simulate_edit_count<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    sample_poisson(rng, SIMULATED_EDITS_MEAN)
}

/// Poisson draw; a non-positive or non-finite `lambda` yields 0
pub fn sample_poisson<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u32 {
    match Poisson::new(lambda) {
        Ok(dist) => dist.sample(rng) as u32,
        Err(_) => 0,
    }
}
