//! Game Engine — session driver on a virtual clock
//!
//! Owns the sequencer, the session counter and the scheduler, and turns view
//! input (`stop_reel`, `leave`) plus clock advances into stage events.

use kp_stage::{Stage, StageEvent, StagePayload};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::config::{ConfigError, GameConfig};
use crate::listener::{NullListener, RoundListener};
use crate::resolver::{PremiumOutcome, Resolution, resolve};
use crate::scheduler::Scheduler;
use crate::sequencer::{RoundSequencer, SettleOutcome};
use crate::session::{LeaveOutcome, SessionCounter, SessionState};
use crate::spin::{REEL_COUNT, ReelSlot, RoundRecord, RoundState};
use crate::symbols::Symbol;
use crate::timing::Phase;

/// What runs when a phase elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    SettleSpin,
    RestartRound,
    EndBonusReveal,
    FlipCoin(PremiumOutcome),
    ShowCoin(PremiumOutcome),
    FinishPremium,
    SummarizeStreak,
}

/// A scheduled phase, stamped with the epoch it was scheduled in
#[derive(Debug, Clone, Copy)]
struct Continuation {
    phase: Phase,
    step: Step,
    epoch: u64,
}

/// Session statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub rounds: u64,
    pub spins: u64,
    pub hit_rounds: u64,
    pub continues: u64,
    pub bonus_reveals: u64,
    pub premium_events: u64,
    pub premium_doubles: u64,
    pub terminations: u64,
    pub revivals: u64,
    /// Rounds with nothing landed, the ones decided by the continue rate
    pub no_hit_rounds: u64,
    pub no_hit_continues: u64,
    pub max_streak: u32,
}

impl SessionStats {
    /// Fraction of rounds with a cherry, yaku or premium
    pub fn hit_rate(&self) -> f64 {
        if self.rounds > 0 {
            self.hit_rounds as f64 / self.rounds as f64
        } else {
            0.0
        }
    }

    /// Observed continue rate on no-hit rounds
    pub fn no_hit_continue_rate(&self) -> f64 {
        if self.no_hit_rounds > 0 {
            self.no_hit_continues as f64 / self.no_hit_rounds as f64
        } else {
            0.0
        }
    }

    pub fn mean_spins_per_round(&self) -> f64 {
        if self.rounds > 0 {
            self.spins as f64 / self.rounds as f64
        } else {
            0.0
        }
    }

    fn record_round(&mut self, classification: &Classification, resolution: Resolution) {
        self.rounds += 1;
        if classification.is_hit() {
            self.hit_rounds += 1;
        } else {
            self.no_hit_rounds += 1;
            if resolution.is_continuation() {
                self.no_hit_continues += 1;
            }
        }

        match resolution {
            Resolution::Continue => self.continues += 1,
            Resolution::ContinueWithBonusReveal => self.bonus_reveals += 1,
            Resolution::PremiumSubEvent { outcome } => {
                self.premium_events += 1;
                if outcome == PremiumOutcome::Double {
                    self.premium_doubles += 1;
                }
            }
            Resolution::Terminate => self.terminations += 1,
        }
    }
}

/// Round Resolution Engine
///
/// Single-threaded. Nothing happens between calls: the host drives time with
/// [`advance`](Self::advance) or [`run_until_idle`](Self::run_until_idle).
pub struct GameEngine {
    config: GameConfig,
    rng: ChaCha8Rng,
    sequencer: RoundSequencer,
    session: SessionCounter,
    scheduler: Scheduler<Continuation>,
    listener: Box<dyn RoundListener>,
    stats: SessionStats,
    round_index: u32,
    /// Bumped on teardown, continuations from older epochs are dropped
    epoch: u64,
    active: bool,
}

impl GameEngine {
    /// Create an engine seeded from OS entropy
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::from_os_rng())
    }

    /// Create a reproducible engine
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        let sequencer = RoundSequencer::new(config.weights.clone(), config.odds.premium_gate);

        Ok(Self {
            config,
            rng,
            sequencer,
            session: SessionCounter::new(),
            scheduler: Scheduler::new(),
            listener: Box::new(NullListener),
            stats: SessionStats::default(),
            round_index: 0,
            epoch: 0,
            active: false,
        })
    }

    /// Attach a listener (builder form)
    pub fn with_listener(mut self, listener: impl RoundListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn set_listener(&mut self, listener: impl RoundListener + 'static) {
        self.listener = Box::new(listener);
    }

    /// Reseed the RNG (reproducible sessions)
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VIEW INPUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a new session and its first round
    ///
    /// Anything still pending from a previous session is cancelled.
    pub fn start_session(&mut self) {
        self.teardown();
        self.session.reset();
        self.stats = SessionStats::default();
        self.round_index = 0;
        self.active = true;

        log::info!(
            "Session started at {} continue rate",
            self.config.continue_rate.percent_label()
        );
        self.emit(Stage::SessionStart {
            continue_rate: self.config.continue_rate.value(),
        });
        self.begin_round();
    }

    /// Start a round by hand
    ///
    /// Rounds restart on their own after a continuation, so this only matters
    /// when nothing is running. Returns false mid-round, while phases are
    /// pending, or once the streak has terminated.
    pub fn start_round(&mut self) -> bool {
        if !self.active
            || self.session.is_terminated()
            || self.session.is_ended()
            || !self.scheduler.is_empty()
        {
            return false;
        }
        self.begin_round()
    }

    /// Stop one reel of the active spin
    ///
    /// Returns the symbol it landed on, or `None` if the call was ignored.
    pub fn stop_reel(&mut self, reel_index: u8) -> Option<Symbol> {
        let stop = self.sequencer.stop_reel(reel_index, &mut self.rng)?;
        self.emit(Stage::ReelStop {
            reel_index: stop.reel_index,
            symbol: stop.symbol.name().to_string(),
        });

        if let Some(spin) = stop.completed {
            log::debug!("Spin {} stopped: {spin}", self.sequencer.spin_index().unwrap_or(0));
            self.schedule(Phase::SpinSettle, Step::SettleSpin);
        }
        Some(stop.symbol)
    }

    /// Leave the streak summary, taking the one-shot revival check
    ///
    /// Only valid once the summary is on screen (streak terminated, nothing
    /// pending). On revival a fresh round starts with the count preserved.
    pub fn leave(&mut self) -> Option<LeaveOutcome> {
        if !self.active || !self.session.is_terminated() || !self.scheduler.is_empty() {
            return None;
        }
        let chance = self.config.odds.revival;
        let outcome = self.session.revival_check(&mut self.rng, chance)?;
        let continue_count = self.session.continue_count();

        match outcome {
            LeaveOutcome::Revived => {
                log::info!("Revived at streak {continue_count}");
                self.stats.revivals += 1;
                self.emit(Stage::Revival { continue_count });
                self.begin_round();
            }
            LeaveOutcome::Ended => {
                log::info!("Session ended at streak {continue_count}");
                self.emit(Stage::SessionEnd { continue_count });
                self.active = false;
            }
        }
        Some(outcome)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CLOCK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Move the clock forward, running every phase that elapses on the way
    ///
    /// Returns how many continuations ran.
    pub fn advance(&mut self, ms: f64) -> usize {
        let target = self.scheduler.now_ms() + ms.max(0.0);
        let mut fired = 0;
        while let Some(continuation) = self.scheduler.pop_due(target) {
            self.dispatch(continuation);
            fired += 1;
        }
        self.scheduler.advance_clock_to(target);
        fired
    }

    /// Run pending phases back to back until the engine waits on the view
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(continuation) = self.scheduler.pop_next() {
            self.dispatch(continuation);
            fired += 1;
        }
        fired
    }

    /// Cancel every pending phase and discard the in-flight round
    pub fn teardown(&mut self) {
        let dropped = self.scheduler.cancel_all();
        self.epoch += 1;
        self.sequencer.reset();
        if dropped > 0 {
            log::debug!("Teardown cancelled {dropped} pending phase(s)");
        }
        self.active = false;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READ ACCESS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round_state(&self) -> RoundState {
        self.sequencer.state()
    }

    pub fn spin_index(&self) -> Option<u8> {
        self.sequencer.spin_index()
    }

    pub fn reels(&self) -> &[ReelSlot; REEL_COUNT] {
        self.sequencer.reels()
    }

    pub fn record(&self) -> &RoundRecord {
        self.sequencer.record()
    }

    pub fn session(&self) -> SessionState {
        self.session.state()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn remaining_spins(&self) -> u8 {
        self.sequencer.remaining_spins()
    }

    pub fn remaining_stops(&self) -> usize {
        self.sequencer.remaining_stops()
    }

    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    /// Phases waiting on the clock, earliest first
    pub fn pending_phases(&self) -> Vec<Phase> {
        self.scheduler.pending().into_iter().map(|c| c.phase).collect()
    }

    /// 1-based index of the current round in this session
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn is_session_active(&self) -> bool {
        self.active
    }

    /// A revival check is owed and the summary is on screen
    pub fn can_leave(&self) -> bool {
        self.active && self.session.revival_available() && self.scheduler.is_empty()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn begin_round(&mut self) -> bool {
        if !self.sequencer.start_round(&mut self.rng) {
            return false;
        }
        self.round_index += 1;
        log::debug!("Round {} started", self.round_index);
        self.emit(Stage::RoundStart {
            round_index: self.round_index,
        });
        self.emit_spin_start(0);
        true
    }

    fn emit_spin_start(&mut self, spin_index: u8) {
        let forced_premium = self.sequencer.is_forced_premium();
        if forced_premium {
            log::debug!("Premium gate forced spin {spin_index}");
        }
        self.emit(Stage::SpinStart {
            spin_index,
            forced_premium,
        });
    }

    fn schedule(&mut self, phase: Phase, step: Step) {
        let delay = self.config.timing.duration(phase);
        self.scheduler.schedule(
            delay,
            Continuation {
                phase,
                step,
                epoch: self.epoch,
            },
        );
    }

    fn dispatch(&mut self, continuation: Continuation) {
        if continuation.epoch != self.epoch {
            log::debug!("Dropping stale {} phase", continuation.phase.name());
            return;
        }

        match continuation.step {
            Step::SettleSpin => self.settle_spin(),
            Step::RestartRound => {
                self.begin_round();
            }
            Step::EndBonusReveal => {
                self.emit(Stage::BonusRevealOff);
                self.schedule(Phase::RoundRestart, Step::RestartRound);
            }
            Step::FlipCoin(outcome) => {
                self.emit(Stage::PremiumFlip);
                self.schedule(Phase::PremiumFlip, Step::ShowCoin(outcome));
            }
            Step::ShowCoin(outcome) => {
                self.emit(Stage::PremiumResult {
                    outcome: outcome.name().to_string(),
                });
                self.schedule(Phase::PremiumResult, Step::FinishPremium);
            }
            Step::FinishPremium => {
                self.continue_streak();
                self.begin_round();
            }
            Step::SummarizeStreak => {
                let continue_count = self.session.continue_count();
                log::info!("Streak ended at {continue_count}");
                self.emit(Stage::StreakSummary { continue_count });
                self.listener.on_session_terminated(continue_count);
            }
        }
    }

    fn settle_spin(&mut self) {
        let Some(spin_index) = self.sequencer.spin_index() else {
            return;
        };
        if let Some(spin) = self.sequencer.record().last().copied() {
            self.stats.spins += 1;
            self.emit(Stage::SpinSettled {
                spin_index,
                symbols: spin.names(),
            });
            self.listener.on_spin_settled(&spin);
        }

        match self.sequencer.settle(&mut self.rng) {
            Some(SettleOutcome::NextSpin { spin_index }) => self.emit_spin_start(spin_index),
            Some(SettleOutcome::RoundComplete(classification)) => {
                self.complete_round(classification)
            }
            None => {}
        }
    }

    fn complete_round(&mut self, classification: Classification) {
        let resolution = resolve(
            &classification,
            self.config.continue_rate,
            &self.config.odds,
            &mut self.rng,
        );
        self.stats.record_round(&classification, resolution);

        log::debug!(
            "Round {} complete: {:?} -> {}",
            self.round_index,
            classification,
            resolution.name()
        );
        self.emit(Stage::RoundComplete {
            spins: self.sequencer.record().len() as u8,
            cherry_count: classification.cherry_count,
            small_yaku: classification.has_small_yaku,
            premium: classification.has_premium_flag,
            resolution: resolution.name().to_string(),
        });
        self.listener.on_round_complete(&classification, resolution);

        match resolution {
            Resolution::Continue => {
                self.continue_streak();
                self.schedule(Phase::RoundRestart, Step::RestartRound);
            }
            Resolution::ContinueWithBonusReveal => {
                self.continue_streak();
                self.emit(Stage::BonusRevealOn);
                self.schedule(Phase::BonusRevealHold, Step::EndBonusReveal);
            }
            Resolution::PremiumSubEvent { outcome } => {
                self.emit(Stage::PremiumIntro);
                self.schedule(Phase::PremiumIntro, Step::FlipCoin(outcome));
            }
            Resolution::Terminate => {
                self.session.terminate();
                self.schedule(Phase::StreakSummary, Step::SummarizeStreak);
            }
        }
    }

    fn continue_streak(&mut self) {
        let continue_count = self.session.record_continue();
        self.stats.max_streak = self.stats.max_streak.max(continue_count);
        self.emit(Stage::StreakContinue { continue_count });
    }

    fn emit(&mut self, stage: Stage) {
        let mut payload = StagePayload::new()
            .round(self.round_index)
            .continue_count(self.session.continue_count());
        if let Some(spin_index) = self.sequencer.spin_index() {
            payload = payload.spin(spin_index);
        }
        let event = StageEvent::with_payload(stage, self.scheduler.now_ms(), payload);
        self.listener.on_stage(&event);
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        if !self.scheduler.is_empty() {
            self.teardown();
        }
    }
}
