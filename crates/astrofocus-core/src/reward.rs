//! Distance rewards.
//!
//! A 1500-second reference session earns 1.5 million km. The reward scales
//! linearly with the configured duration and is then weighted by the
//! operator's 1-5 rating, where 3 is neutral.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reference session length in seconds.
pub const BASE_DURATION_SECS: f64 = 1500.0;
/// Million km earned for one reference session at a neutral rating.
pub const BASE_DISTANCE_REWARD: f64 = 1.5;
/// Share of the total distance lost on an intrusion.
pub const INTRUSION_PENALTY_RATE: f64 = 0.1;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const NEUTRAL_RATING: u8 = 3;

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_SEGMENTS: usize = 3;
const CODE_SEGMENT_LEN: usize = 4;

/// Distance for a session of `duration_secs`, before rating.
pub fn base_reward(duration_secs: u64) -> f64 {
    let duration = duration_secs.max(1) as f64;
    (duration / BASE_DURATION_SECS) * BASE_DISTANCE_REWARD
}

/// Rating weight: `clamp(rating, 1, 5) / 3`.
pub fn rating_multiplier(rating: i64) -> f64 {
    let clamped = rating.clamp(i64::from(MIN_RATING), i64::from(MAX_RATING));
    clamped as f64 / f64::from(NEUTRAL_RATING)
}

/// Distance removed from `total` by an intrusion. Never more than `total`.
pub fn intrusion_penalty(total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    total * INTRUSION_PENALTY_RATE
}

/// A validated 1-5 session rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const NEUTRAL: Rating = Rating(NEUTRAL_RATING);

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(ValidationError::InvalidRating(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn multiplier(self) -> f64 {
        rating_multiplier(i64::from(self.0))
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::str::FromStr for Rating {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| ValidationError::InvalidRatingText(trimmed.to_string()))?;
        Rating::new(value)
    }
}

/// A completed session waiting for its rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSession {
    pub code: String,
    pub base_distance: f64,
}

impl PendingSession {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, duration_secs: u64) -> Self {
        Self {
            code: generate_decryption_code(rng),
            base_distance: base_reward(duration_secs),
        }
    }

    pub fn adjusted_distance(&self, rating: Rating) -> f64 {
        self.base_distance * rating.multiplier()
    }
}

/// Three dash-joined segments of four upper-case base-36 characters,
/// e.g. `A1B2-CD3E-9F0G`.
pub fn generate_decryption_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_SEGMENTS)
        .map(|_| {
            (0..CODE_SEGMENT_LEN)
                .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn reference_session_earns_one_and_a_half() {
        assert_eq!(base_reward(1500), 1.5);
        assert_eq!(base_reward(3000), 2.0 * base_reward(1500));
    }

    #[test]
    fn zero_duration_is_treated_as_one_second() {
        assert_eq!(base_reward(0), base_reward(1));
    }

    #[test]
    fn neutral_rating_is_exactly_one() {
        assert_eq!(rating_multiplier(3), 1.0);
        assert_eq!(Rating::NEUTRAL.multiplier(), 1.0);
    }

    #[test]
    fn out_of_range_ratings_clamp() {
        assert_eq!(rating_multiplier(-4), rating_multiplier(1));
        assert_eq!(rating_multiplier(9), rating_multiplier(5));
    }

    #[test]
    fn rating_rejects_values_outside_one_to_five() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert!("  4 ".parse::<Rating>().is_ok());
        assert_eq!(
            "four".parse::<Rating>(),
            Err(ValidationError::InvalidRatingText("four".to_string()))
        );
        assert_eq!("9".parse::<Rating>(), Err(ValidationError::InvalidRating(9)));
    }

    #[test]
    fn penalty_is_ten_percent() {
        assert_eq!(intrusion_penalty(10.0), 1.0);
        assert_eq!(intrusion_penalty(0.0), 0.0);
    }

    #[test]
    fn decryption_code_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = generate_decryption_code(&mut rng);
        let segments: Vec<&str> = code.split('-').collect();
        assert_eq!(segments.len(), 3);
        for segment in segments {
            assert_eq!(segment.len(), 4);
            assert!(segment
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn pending_session_applies_rating() {
        let mut rng = StdRng::seed_from_u64(1);
        let pending = PendingSession::new(&mut rng, 1500);
        let five = Rating::new(5).unwrap();
        assert!((pending.adjusted_distance(five) - 2.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn multiplier_matches_clamped_rating(rating in -100i64..100) {
            let expected = rating.clamp(1, 5) as f64 / 3.0;
            prop_assert_eq!(rating_multiplier(rating), expected);
        }

        #[test]
        fn reward_is_linear_in_duration(d in 1u64..100_000, k in 1u64..8) {
            let single = base_reward(d);
            let scaled = base_reward(d * k);
            prop_assert!((scaled - single * k as f64).abs() < 1e-9 * scaled.max(1.0));
        }

        #[test]
        fn penalty_never_drives_total_negative(total in 0.0f64..1e9) {
            let after = (total - intrusion_penalty(total)).max(0.0);
            prop_assert!(after >= 0.0);
            prop_assert!(after <= total);
        }
    }
}
