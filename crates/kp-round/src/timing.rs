//! Timing profiles and the named phases of a session

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    Normal,
    /// Fast mode
    Turbo,
    /// Every phase resolves immediately (tests, headless simulation)
    Instant,
    /// Custom durations
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

/// A single suspension point between two engine transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Last reel stopped → next spin or round end decided
    SpinSettle,
    /// Continuation decided → fresh round enters
    RoundRestart,
    /// Drink reveal overlay on screen
    BonusRevealHold,
    /// Premium overlay opening
    PremiumIntro,
    /// Coin in the air
    PremiumFlip,
    /// Coin face on screen
    PremiumResult,
    /// Terminal round → streak summary overlay
    StreakSummary,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::SpinSettle => "spin_settle",
            Phase::RoundRestart => "round_restart",
            Phase::BonusRevealHold => "bonus_reveal_hold",
            Phase::PremiumIntro => "premium_intro",
            Phase::PremiumFlip => "premium_flip",
            Phase::PremiumResult => "premium_result",
            Phase::StreakSummary => "streak_summary",
        }
    }
}

/// Phase durations in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Pause after the third reel stops before the spin is evaluated
    pub spin_settle_ms: f64,

    /// Pause before a continued round starts spinning
    pub round_restart_ms: f64,

    /// How long the drink reveal stays up
    pub bonus_reveal_ms: f64,

    /// Premium overlay intro
    pub premium_intro_ms: f64,

    /// Premium coin flip animation
    pub premium_flip_ms: f64,

    /// Premium result display
    pub premium_result_ms: f64,

    /// Delay before the streak summary appears after a terminal round
    pub streak_summary_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            spin_settle_ms: 500.0,
            round_restart_ms: 800.0,
            bonus_reveal_ms: 2500.0,
            premium_intro_ms: 1500.0,
            premium_flip_ms: 2000.0,
            premium_result_ms: 2500.0,
            streak_summary_ms: 1000.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            spin_settle_ms: 200.0,
            round_restart_ms: 300.0,
            bonus_reveal_ms: 1200.0,
            premium_intro_ms: 600.0,
            premium_flip_ms: 1000.0,
            premium_result_ms: 1200.0,
            streak_summary_ms: 400.0,
        }
    }

    /// No delays at all
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            spin_settle_ms: 0.0,
            round_restart_ms: 0.0,
            bonus_reveal_ms: 0.0,
            premium_intro_ms: 0.0,
            premium_flip_ms: 0.0,
            premium_result_ms: 0.0,
            streak_summary_ms: 0.0,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            spin_settle_ms: self.spin_settle_ms * factor,
            round_restart_ms: self.round_restart_ms * factor,
            bonus_reveal_ms: self.bonus_reveal_ms * factor,
            premium_intro_ms: self.premium_intro_ms * factor,
            premium_flip_ms: self.premium_flip_ms * factor,
            premium_result_ms: self.premium_result_ms * factor,
            streak_summary_ms: self.streak_summary_ms * factor,
        }
    }

    /// Duration of a phase
    pub fn duration(&self, phase: Phase) -> f64 {
        match phase {
            Phase::SpinSettle => self.spin_settle_ms,
            Phase::RoundRestart => self.round_restart_ms,
            Phase::BonusRevealHold => self.bonus_reveal_ms,
            Phase::PremiumIntro => self.premium_intro_ms,
            Phase::PremiumFlip => self.premium_flip_ms,
            Phase::PremiumResult => self.premium_result_ms,
            Phase::StreakSummary => self.streak_summary_ms,
        }
    }

    /// Full premium sub-event, intro to result
    pub fn premium_total_ms(&self) -> f64 {
        self.premium_intro_ms + self.premium_flip_ms + self.premium_result_ms
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let phases = [
            Phase::SpinSettle,
            Phase::RoundRestart,
            Phase::BonusRevealHold,
            Phase::PremiumIntro,
            Phase::PremiumFlip,
            Phase::PremiumResult,
            Phase::StreakSummary,
        ];
        for phase in phases {
            let value = self.duration(phase);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration {
                    name: phase.name(),
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}
