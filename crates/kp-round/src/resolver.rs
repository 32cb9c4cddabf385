//! Continuation resolver — turns a classification into the round's fate

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::config::{ContinueRate, ResolverOdds};

/// Face of the premium double-or-nothing coin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumOutcome {
    Double,
    Nothing,
}

impl PremiumOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            PremiumOutcome::Double => "double",
            PremiumOutcome::Nothing => "nothing",
        }
    }
}

/// How a completed round resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Streak continues
    Continue,
    /// Streak continues after the drink reveal overlay
    ContinueWithBonusReveal,
    /// Premium coin flip, streak always continues afterwards
    PremiumSubEvent { outcome: PremiumOutcome },
    /// Streak ends
    Terminate,
}

impl Resolution {
    /// Does the streak survive?
    pub fn is_continuation(&self) -> bool {
        !matches!(self, Resolution::Terminate)
    }

    pub fn shows_bonus_reveal(&self) -> bool {
        matches!(self, Resolution::ContinueWithBonusReveal)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Resolution::Continue => "continue",
            Resolution::ContinueWithBonusReveal => "bonus_reveal",
            Resolution::PremiumSubEvent { .. } => "premium",
            Resolution::Terminate => "terminate",
        }
    }
}

/// Resolve a round, first matching rule wins
///
/// 1. premium flag → premium sub-event (coin flip, always continues)
/// 2. three or more cherries → bonus reveal
/// 3. two cherries → bonus reveal at `two_cherry_reveal`, else continue
/// 4. one cherry → continue
/// 5. small yaku → bonus reveal at `small_yaku_reveal`, else continue
/// 6. nothing → continue at the player's rate, else terminate
pub fn resolve<R: Rng + ?Sized>(
    classification: &Classification,
    rate: ContinueRate,
    odds: &ResolverOdds,
    rng: &mut R,
) -> Resolution {
    if classification.has_premium_flag {
        let outcome = if rng.random::<f64>() < odds.premium_double {
            PremiumOutcome::Double
        } else {
            PremiumOutcome::Nothing
        };
        return Resolution::PremiumSubEvent { outcome };
    }

    match classification.cherry_count {
        n if n >= 3 => Resolution::ContinueWithBonusReveal,
        2 => reveal_or_continue(odds.two_cherry_reveal, rng),
        1 => Resolution::Continue,
        _ if classification.has_small_yaku => reveal_or_continue(odds.small_yaku_reveal, rng),
        _ => {
            if rng.random::<f64>() < rate.value() {
                Resolution::Continue
            } else {
                Resolution::Terminate
            }
        }
    }
}

fn reveal_or_continue<R: Rng + ?Sized>(chance: f64, rng: &mut R) -> Resolution {
    if rng.random::<f64>() < chance {
        Resolution::ContinueWithBonusReveal
    } else {
        Resolution::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rate(value: f64) -> ContinueRate {
        ContinueRate::new(value).unwrap()
    }

    fn cherries(n: u32) -> Classification {
        Classification {
            cherry_count: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_one_cherry_always_continues() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1000 {
            let r = resolve(&cherries(1), rate(0.29), &ResolverOdds::default(), &mut rng);
            assert_eq!(r, Resolution::Continue);
        }
    }

    #[test]
    fn test_three_cherries_always_reveal() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for n in [3, 4, 9] {
            let r = resolve(&cherries(n), rate(0.29), &ResolverOdds::default(), &mut rng);
            assert_eq!(r, Resolution::ContinueWithBonusReveal);
        }
    }

    #[test]
    fn test_premium_beats_everything() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let c = Classification {
            cherry_count: 3,
            has_small_yaku: true,
            has_premium_flag: true,
        };
        let mut doubles = 0;
        for _ in 0..2000 {
            match resolve(&c, rate(0.29), &ResolverOdds::default(), &mut rng) {
                Resolution::PremiumSubEvent { outcome } => {
                    if outcome == PremiumOutcome::Double {
                        doubles += 1;
                    }
                }
                other => panic!("expected premium, got {other:?}"),
            }
        }
        // Fair coin
        assert!((850..=1150).contains(&doubles), "doubles = {doubles}");
    }

    #[test]
    fn test_two_cherry_reveal_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let trials = 20_000;
        let reveals = (0..trials)
            .map(|_| resolve(&cherries(2), rate(0.5), &ResolverOdds::default(), &mut rng))
            .inspect(|r| assert!(r.is_continuation()))
            .filter(|r| r.shows_bonus_reveal())
            .count();
        let observed = reveals as f64 / trials as f64;
        approx::assert_abs_diff_eq!(observed, 0.3, epsilon = 0.02);
    }

    #[test]
    fn test_small_yaku_reveal_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let yaku = Classification {
            has_small_yaku: true,
            ..Default::default()
        };
        let trials = 20_000;
        let reveals = (0..trials)
            .map(|_| resolve(&yaku, rate(0.29), &ResolverOdds::default(), &mut rng))
            .inspect(|r| assert!(r.is_continuation()))
            .filter(|r| r.shows_bonus_reveal())
            .count();
        let observed = reveals as f64 / trials as f64;
        approx::assert_abs_diff_eq!(observed, 0.2, epsilon = 0.02);
    }

    #[test]
    fn test_no_hit_follows_continue_rate() {
        let trials = 20_000;
        for (seed, value) in ContinueRate::OFFERED.into_iter().enumerate() {
            let mut rng = ChaCha8Rng::seed_from_u64(100 + seed as u64);
            let continued = (0..trials)
                .filter(|_| {
                    resolve(
                        &Classification::default(),
                        rate(value),
                        &ResolverOdds::default(),
                        &mut rng,
                    )
                    .is_continuation()
                })
                .count();
            let observed = continued as f64 / trials as f64;
            approx::assert_abs_diff_eq!(observed, value, epsilon = 0.02);
        }
    }

    #[test]
    fn test_resolution_names() {
        assert_eq!(Resolution::Continue.name(), "continue");
        assert_eq!(
            Resolution::PremiumSubEvent {
                outcome: PremiumOutcome::Nothing
            }
            .name(),
            "premium"
        );
        assert!(!Resolution::Terminate.is_continuation());
    }
}
