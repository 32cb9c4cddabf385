//! Stage — The core enum defining all canonical session phases
//!
//! A Stage is NOT an animation, NOT an engine callback.
//! A Stage is the SEMANTIC MEANING of a moment in the session flow.

use serde::{Deserialize, Serialize};

/// Canonical session stage
///
/// Symbols travel as their snake_case names (`"cherry"`, `"shooting_star"`) so
/// this crate stays independent of the engine's symbol type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // SESSION
    // ═══════════════════════════════════════════════════════════════════════
    /// Session configured and started
    SessionStart {
        /// Player-selected base continue rate
        continue_rate: f64,
    },

    /// Terminal overlay showing the final streak
    StreakSummary {
        continue_count: u32,
    },

    /// Revival check succeeded, play resumes with a fresh round
    Revival {
        continue_count: u32,
    },

    /// Player left and the revival check failed
    SessionEnd {
        continue_count: u32,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // ROUND
    // ═══════════════════════════════════════════════════════════════════════
    /// Fresh round entered, record cleared
    RoundStart {
        round_index: u32,
    },

    /// Round finished and resolved
    RoundComplete {
        /// Number of spins the round used (1-3)
        spins: u8,
        cherry_count: u32,
        small_yaku: bool,
        premium: bool,
        /// Resolution name (`continue`, `bonus_reveal`, `premium`, `terminate`)
        resolution: String,
    },

    /// Streak survives the round
    StreakContinue {
        continue_count: u32,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// All three reels set spinning
    SpinStart {
        spin_index: u8,
        /// Spin was forced to the premium set by the premium gate
        #[serde(default)]
        forced_premium: bool,
    },

    /// One reel stopped on a symbol
    ReelStop {
        reel_index: u8,
        symbol: String,
    },

    /// All reels of a spin stopped
    SpinSettled {
        spin_index: u8,
        symbols: Vec<String>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // BONUS REVEAL
    // ═══════════════════════════════════════════════════════════════════════
    /// Drink reveal overlay shown
    BonusRevealOn,

    /// Drink reveal overlay hidden
    BonusRevealOff,

    // ═══════════════════════════════════════════════════════════════════════
    // PREMIUM SUB-EVENT
    // ═══════════════════════════════════════════════════════════════════════
    /// Premium overlay opens
    PremiumIntro,

    /// Double-or-nothing coin is flipped
    PremiumFlip,

    /// Coin face shown (`double` or `nothing`)
    PremiumResult {
        outcome: String,
    },
}

impl Stage {
    /// Get the stage category for grouping
    pub fn category(&self) -> StageCategory {
        match self {
            Stage::SessionStart { .. }
            | Stage::StreakSummary { .. }
            | Stage::Revival { .. }
            | Stage::SessionEnd { .. } => StageCategory::Session,

            Stage::RoundStart { .. }
            | Stage::RoundComplete { .. }
            | Stage::StreakContinue { .. } => StageCategory::Round,

            Stage::SpinStart { .. } | Stage::ReelStop { .. } | Stage::SpinSettled { .. } => {
                StageCategory::SpinLifecycle
            }

            Stage::BonusRevealOn | Stage::BonusRevealOff => StageCategory::Bonus,

            Stage::PremiumIntro | Stage::PremiumFlip | Stage::PremiumResult { .. } => {
                StageCategory::Premium
            }
        }
    }

    /// Get a simple string name for this stage type
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::SessionStart { .. } => "session_start",
            Stage::StreakSummary { .. } => "streak_summary",
            Stage::Revival { .. } => "revival",
            Stage::SessionEnd { .. } => "session_end",
            Stage::RoundStart { .. } => "round_start",
            Stage::RoundComplete { .. } => "round_complete",
            Stage::StreakContinue { .. } => "streak_continue",
            Stage::SpinStart { .. } => "spin_start",
            Stage::ReelStop { .. } => "reel_stop",
            Stage::SpinSettled { .. } => "spin_settled",
            Stage::BonusRevealOn => "bonus_reveal_on",
            Stage::BonusRevealOff => "bonus_reveal_off",
            Stage::PremiumIntro => "premium_intro",
            Stage::PremiumFlip => "premium_flip",
            Stage::PremiumResult { .. } => "premium_result",
        }
    }

    /// Does the view put a modal overlay up for this stage?
    pub fn is_overlay(&self) -> bool {
        matches!(
            self,
            Stage::BonusRevealOn
                | Stage::PremiumIntro
                | Stage::PremiumFlip
                | Stage::PremiumResult { .. }
                | Stage::StreakSummary { .. }
        )
    }

    /// All stage type names
    pub fn all_type_names() -> &'static [&'static str] {
        &[
            "session_start",
            "streak_summary",
            "revival",
            "session_end",
            "round_start",
            "round_complete",
            "streak_continue",
            "spin_start",
            "reel_stop",
            "spin_settled",
            "bonus_reveal_on",
            "bonus_reveal_off",
            "premium_intro",
            "premium_flip",
            "premium_result",
        ]
    }

    /// Check if a type name is known
    pub fn is_valid_type_name(name: &str) -> bool {
        Self::all_type_names().contains(&name)
    }
}

/// Stage category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    Session,
    Round,
    SpinLifecycle,
    Bonus,
    Premium,
}

impl StageCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Session => "Session",
            Self::Round => "Round",
            Self::SpinLifecycle => "Spin Lifecycle",
            Self::Bonus => "Bonus Reveal",
            Self::Premium => "Premium",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        let stage = Stage::ReelStop {
            reel_index: 2,
            symbol: "cherry".into(),
        };
        let json = serde_json::to_string(&stage).unwrap();
        assert!(json.contains("reel_stop"));
        assert!(json.contains("reel_index"));

        let deserialized: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(stage, deserialized);
    }

    #[test]
    fn test_spin_start_forced_defaults_false() {
        let stage: Stage = serde_json::from_str(r#"{"type":"spin_start","spin_index":1}"#).unwrap();
        assert_eq!(
            stage,
            Stage::SpinStart {
                spin_index: 1,
                forced_premium: false
            }
        );
    }

    #[test]
    fn test_stage_category() {
        assert_eq!(
            Stage::SpinStart {
                spin_index: 0,
                forced_premium: false
            }
            .category(),
            StageCategory::SpinLifecycle
        );
        assert_eq!(Stage::BonusRevealOn.category(), StageCategory::Bonus);
        assert_eq!(Stage::PremiumFlip.category(), StageCategory::Premium);
        assert_eq!(
            Stage::StreakSummary { continue_count: 3 }.category(),
            StageCategory::Session
        );
    }

    #[test]
    fn test_type_names_known() {
        let stages = [
            Stage::RoundStart { round_index: 0 },
            Stage::BonusRevealOff,
            Stage::PremiumResult {
                outcome: "double".into(),
            },
            Stage::SessionEnd { continue_count: 0 },
        ];
        for stage in &stages {
            assert!(Stage::is_valid_type_name(stage.type_name()));
        }
        assert!(!Stage::is_valid_type_name("big_win"));
    }

    #[test]
    fn test_overlays() {
        assert!(Stage::BonusRevealOn.is_overlay());
        assert!(!Stage::BonusRevealOff.is_overlay());
        assert!(Stage::StreakSummary { continue_count: 0 }.is_overlay());
        assert!(!Stage::RoundStart { round_index: 1 }.is_overlay());
    }
}
