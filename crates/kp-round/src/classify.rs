//! Outcome classification of a round record

use serde::{Deserialize, Serialize};

use crate::spin::{RoundRecord, SpinResult};
use crate::symbols::SymbolClass;

/// Match categories found in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    /// Cherries across every reel of every recorded spin
    pub cherry_count: u32,
    /// Some spin showed three identical common symbols
    pub has_small_yaku: bool,
    /// Some spin showed three premium symbols
    pub has_premium_flag: bool,
}

impl Classification {
    /// Classify a single spin
    pub fn of_spin(spin: &SpinResult) -> Self {
        let cherry_count = spin
            .symbols()
            .iter()
            .filter(|s| s.is_cherry())
            .count() as u32;

        let triple = spin.is_triple().map(|s| s.class());

        Self {
            cherry_count,
            has_small_yaku: triple == Some(SymbolClass::Common),
            has_premium_flag: triple == Some(SymbolClass::Premium),
        }
    }

    /// Fold another classification into this one
    pub fn merge(self, other: Self) -> Self {
        Self {
            cherry_count: self.cherry_count + other.cherry_count,
            has_small_yaku: self.has_small_yaku || other.has_small_yaku,
            has_premium_flag: self.has_premium_flag || other.has_premium_flag,
        }
    }

    /// Anything qualifying landed; the round ends here
    pub fn is_hit(&self) -> bool {
        self.cherry_count > 0 || self.has_small_yaku || self.has_premium_flag
    }
}

/// Classify everything recorded in the round so far
pub fn classify(record: &RoundRecord) -> Classification {
    record
        .spins()
        .iter()
        .map(Classification::of_spin)
        .fold(Classification::default(), Classification::merge)
}
