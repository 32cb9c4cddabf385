//! Round sequencer — the per-round reel state machine
//!
//! ```text
//! Idle ──start_round──> SpinActive(0) ──3×stop_reel──> AllReelsStopped(0)
//!                            ^                               │ settle
//!                            └──────── no hit, i < 2 ────────┤
//!                                                            v
//!                                                      RoundComplete
//! ```
//!
//! Illegal calls are silent no-ops. The record only ever grows by one full
//! spin when the third reel of an active spin stops.

use rand::Rng;

use crate::classify::{Classification, classify};
use crate::spin::{MAX_SPINS, REEL_COUNT, ReelSlot, RoundRecord, RoundState, SpinResult};
use crate::symbols::{Symbol, WeightTable, generate_premium_symbol_set, generate_weighted_symbol};

/// A reel that just stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReelStopped {
    pub reel_index: u8,
    pub symbol: Symbol,
    /// Set when this was the last reel of the spin
    pub completed: Option<SpinResult>,
}

/// What `settle()` decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// No hit yet, next spin is active
    NextSpin { spin_index: u8 },
    /// Round over, with the classification of the whole record
    RoundComplete(Classification),
}

/// Drives one round at a time
#[derive(Debug, Clone)]
pub struct RoundSequencer {
    state: RoundState,
    reels: [ReelSlot; REEL_COUNT],
    record: RoundRecord,
    /// Premium set the gate forced onto the active spin
    forced: Option<[Symbol; REEL_COUNT]>,
    weights: WeightTable,
    premium_gate: f64,
}

impl RoundSequencer {
    pub fn new(weights: WeightTable, premium_gate: f64) -> Self {
        Self {
            state: RoundState::Idle,
            reels: [ReelSlot::Unresolved; REEL_COUNT],
            record: RoundRecord::new(),
            forced: None,
            weights,
            premium_gate,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Enter a fresh round. Only valid from `Idle` or `RoundComplete`.
    pub fn start_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !matches!(self.state, RoundState::Idle | RoundState::RoundComplete) {
            return false;
        }
        self.record.clear();
        self.begin_spin(0, rng);
        true
    }

    /// Stop one reel of the active spin
    ///
    /// `None` for an out-of-range index, an already stopped reel, or when no
    /// spin is active.
    pub fn stop_reel<R: Rng + ?Sized>(&mut self, reel_index: u8, rng: &mut R) -> Option<ReelStopped> {
        let RoundState::SpinActive { spin_index } = self.state else {
            return None;
        };
        let slot = self.reels.get_mut(reel_index as usize)?;
        if slot.is_stopped() {
            return None;
        }

        let symbol = match self.forced {
            Some(set) => set[reel_index as usize],
            None => generate_weighted_symbol(rng, &self.weights),
        };
        *slot = ReelSlot::Stopped(symbol);

        let completed = SpinResult::from_slots(&self.reels);
        if let Some(spin) = completed {
            self.record.push(spin);
            self.state = RoundState::AllReelsStopped { spin_index };
        }

        Some(ReelStopped {
            reel_index,
            symbol,
            completed,
        })
    }

    /// Evaluate the stopped spin. Only valid in `AllReelsStopped`.
    pub fn settle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<SettleOutcome> {
        let RoundState::AllReelsStopped { spin_index } = self.state else {
            return None;
        };

        let classification = classify(&self.record);
        if classification.is_hit() || spin_index + 1 >= MAX_SPINS {
            self.state = RoundState::RoundComplete;
            self.forced = None;
            return Some(SettleOutcome::RoundComplete(classification));
        }

        let next = spin_index + 1;
        self.begin_spin(next, rng);
        Some(SettleOutcome::NextSpin { spin_index: next })
    }

    /// Drop any in-flight round
    pub fn reset(&mut self) {
        self.state = RoundState::Idle;
        self.reels = [ReelSlot::Unresolved; REEL_COUNT];
        self.record.clear();
        self.forced = None;
    }

    fn begin_spin<R: Rng + ?Sized>(&mut self, spin_index: u8, rng: &mut R) {
        self.reels = [ReelSlot::Unresolved; REEL_COUNT];
        self.forced = (rng.random::<f64>() < self.premium_gate).then(generate_premium_symbol_set);
        self.state = RoundState::SpinActive { spin_index };
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READ ACCESS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn spin_index(&self) -> Option<u8> {
        self.state.spin_index()
    }

    /// Reel display slots of the current spin
    pub fn reels(&self) -> &[ReelSlot; REEL_COUNT] {
        &self.reels
    }

    pub fn record(&self) -> &RoundRecord {
        &self.record
    }

    /// Active spin was forced by the premium gate
    pub fn is_forced_premium(&self) -> bool {
        self.forced.is_some()
    }

    /// Spins left in the round, counting the active one
    pub fn remaining_spins(&self) -> u8 {
        match self.state {
            RoundState::Idle => MAX_SPINS,
            RoundState::SpinActive { spin_index } => MAX_SPINS - spin_index,
            RoundState::AllReelsStopped { spin_index } => MAX_SPINS - spin_index - 1,
            RoundState::RoundComplete => 0,
        }
    }

    /// Reels still spinning in the active spin
    pub fn remaining_stops(&self) -> usize {
        if !self.state.is_spin_active() {
            return 0;
        }
        self.reels.iter().filter(|slot| !slot.is_stopped()).count()
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }
}

impl Default for RoundSequencer {
    fn default() -> Self {
        Self::new(WeightTable::standard(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolWeight;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn only(symbol: Symbol) -> WeightTable {
        WeightTable::new(vec![SymbolWeight { symbol, weight: 1.0 }]).unwrap()
    }

    fn stop_all(seq: &mut RoundSequencer, rng: &mut ChaCha8Rng) -> Option<SpinResult> {
        (0..REEL_COUNT as u8)
            .filter_map(|i| seq.stop_reel(i, rng))
            .last()
            .and_then(|stop| stop.completed)
    }

    #[test]
    fn test_start_round_from_idle_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut seq = RoundSequencer::default();
        assert_eq!(seq.state(), RoundState::Idle);
        assert_eq!(seq.remaining_spins(), 3);

        assert!(seq.start_round(&mut rng));
        assert_eq!(seq.state(), RoundState::SpinActive { spin_index: 0 });
        assert_eq!(seq.remaining_stops(), 3);

        // Mid-round restart is ignored
        assert!(!seq.start_round(&mut rng));
    }

    #[test]
    fn test_stop_same_reel_twice_is_noop() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut seq = RoundSequencer::default();
        seq.start_round(&mut rng);

        let first = seq.stop_reel(1, &mut rng).unwrap();
        assert_eq!(first.reel_index, 1);
        assert!(first.completed.is_none());
        assert_eq!(seq.reels()[1], ReelSlot::Stopped(first.symbol));

        assert!(seq.stop_reel(1, &mut rng).is_none());
        assert_eq!(seq.reels()[1], ReelSlot::Stopped(first.symbol));
        assert_eq!(seq.remaining_stops(), 2);
    }

    #[test]
    fn test_invalid_index_and_inactive_spin() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seq = RoundSequencer::default();
        assert!(seq.stop_reel(0, &mut rng).is_none());

        seq.start_round(&mut rng);
        assert!(seq.stop_reel(3, &mut rng).is_none());
        assert!(seq.stop_reel(u8::MAX, &mut rng).is_none());
        assert_eq!(seq.remaining_stops(), 3);
    }

    #[test]
    fn test_third_stop_records_spin() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut seq = RoundSequencer::new(only(Symbol::Bell), 0.0);
        seq.start_round(&mut rng);

        let spin = stop_all(&mut seq, &mut rng).unwrap();
        assert_eq!(spin.symbols(), &[Symbol::Bell; 3]);
        assert_eq!(seq.record().len(), 1);
        assert_eq!(seq.state(), RoundState::AllReelsStopped { spin_index: 0 });

        // Stopping during settle does nothing
        assert!(seq.stop_reel(0, &mut rng).is_none());
        assert_eq!(seq.record().len(), 1);
    }

    #[test]
    fn test_hit_exits_early() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seq = RoundSequencer::new(only(Symbol::Cherry), 0.0);
        seq.start_round(&mut rng);
        stop_all(&mut seq, &mut rng);

        match seq.settle(&mut rng) {
            Some(SettleOutcome::RoundComplete(c)) => assert_eq!(c.cherry_count, 3),
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(seq.state(), RoundState::RoundComplete);
        assert_eq!(seq.record().len(), 1);
        assert_eq!(seq.remaining_spins(), 0);
        assert!(seq.settle(&mut rng).is_none());
    }

    #[test]
    fn test_no_hit_runs_three_spins() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        // Two alternating commons can never hit
        let weights = WeightTable::new(vec![
            SymbolWeight {
                symbol: Symbol::Grape,
                weight: 1.0,
            },
            SymbolWeight {
                symbol: Symbol::Bell,
                weight: 1.0,
            },
        ])
        .unwrap();
        let mut seq = RoundSequencer::new(weights, 0.0);

        for _ in 0..200 {
            seq.start_round(&mut rng);
            let mut spins = 0;
            loop {
                stop_all(&mut seq, &mut rng);
                spins += 1;
                match seq.settle(&mut rng).unwrap() {
                    SettleOutcome::NextSpin { spin_index } => {
                        assert_eq!(spin_index as usize, spins);
                        assert_eq!(seq.reels(), &[ReelSlot::Unresolved; REEL_COUNT]);
                    }
                    SettleOutcome::RoundComplete(c) => {
                        // A triple of either common is a yaku and ends early
                        assert!(c.has_small_yaku || spins == 3);
                        break;
                    }
                }
            }
            assert_eq!(seq.record().len(), spins);
            assert!((1..=3).contains(&spins));
        }
    }

    #[test]
    fn test_record_length_matches_completed_spins() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seq = RoundSequencer::default();
        for _ in 0..1000 {
            assert!(seq.start_round(&mut rng));
            let mut completed = 0;
            while seq.state() != RoundState::RoundComplete {
                if stop_all(&mut seq, &mut rng).is_some() {
                    completed += 1;
                }
                let before = seq.record().len();
                if let Some(SettleOutcome::NextSpin { .. }) = seq.settle(&mut rng) {
                    // Earlier spins were all misses
                    assert!(!classify(seq.record()).is_hit());
                }
                assert_eq!(seq.record().len(), before);
            }
            assert_eq!(seq.record().len(), completed);
            assert!((1..=3).contains(&completed));
        }
    }

    #[test]
    fn test_premium_gate_forces_every_reel() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut seq = RoundSequencer::new(WeightTable::standard(), 1.0);
        seq.start_round(&mut rng);
        assert!(seq.is_forced_premium());

        let spin = stop_all(&mut seq, &mut rng).unwrap();
        assert_eq!(spin.symbols(), &[Symbol::ShootingStar; 3]);
        match seq.settle(&mut rng) {
            Some(SettleOutcome::RoundComplete(c)) => assert!(c.has_premium_flag),
            other => panic!("expected premium completion, got {other:?}"),
        }
        assert!(!seq.is_forced_premium());
    }

    #[test]
    fn test_reset() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut seq = RoundSequencer::default();
        seq.start_round(&mut rng);
        seq.stop_reel(0, &mut rng);
        seq.reset();
        assert_eq!(seq.state(), RoundState::Idle);
        assert!(seq.record().is_empty());
        assert_eq!(seq.reels(), &[ReelSlot::Unresolved; REEL_COUNT]);
    }
}
