//! # kp-sim — Headless Session Simulator
//!
//! Plays whole sessions against `GameEngine` without a view: every reel is
//! stopped in order, phases run back to back, and the revival check is taken
//! whenever the streak ends. Batches run in parallel on rayon, one seed per
//! session, so a batch is reproducible from its base seed.
//!
//! ```text
//! SimConfig ──> simulate_batch ──par_iter──> simulate_session × N
//!                     │                              │
//!                     v                              v
//!                BatchReport  <──── aggregate ── SessionReport
//! ```

use std::time::Instant;

use kp_round::{
    ConfigError, GameConfig, GameEngine, LeaveOutcome, REEL_COUNT, TraceRecorder,
};
use kp_stage::StageTrace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG & ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Simulation errors
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid game config: {0}")]
    Config(#[from] ConfigError),

    #[error("batch needs at least one session")]
    NoSessions,

    #[error("max_rounds must be at least 1")]
    NoRounds,
}

/// Batch parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub game: GameConfig,
    pub sessions: u32,
    /// Session `i` runs with seed `base_seed + i`
    pub base_seed: u64,
    /// Round cap per session, a capped session counts as unfinished
    pub max_rounds: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            sessions: 10_000,
            base_seed: 0,
            max_rounds: 10_000,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.sessions == 0 {
            return Err(SimError::NoSessions);
        }
        if self.max_rounds == 0 {
            return Err(SimError::NoRounds);
        }
        self.game.validate()?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolution histogram
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionCounts {
    pub continues: u64,
    pub bonus_reveals: u64,
    pub premium_events: u64,
    pub terminations: u64,
}

impl ResolutionCounts {
    pub fn total(&self) -> u64 {
        self.continues + self.bonus_reveals + self.premium_events + self.terminations
    }

    fn add(&mut self, other: &Self) {
        self.continues += other.continues;
        self.bonus_reveals += other.bonus_reveals;
        self.premium_events += other.premium_events;
        self.terminations += other.terminations;
    }
}

/// One simulated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub seed: u64,
    pub rounds: u64,
    pub spins: u64,
    /// Streak when the session ended (or was capped)
    pub final_streak: u32,
    pub revivals: u64,
    pub premium_doubles: u64,
    pub resolutions: ResolutionCounts,
    pub no_hit_rounds: u64,
    pub no_hit_continues: u64,
    /// Hit `max_rounds` before the session ended
    pub capped: bool,
}

/// Aggregate over a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub sessions: u32,
    pub continue_rate: f64,
    pub total_rounds: u64,
    pub total_spins: u64,
    pub mean_streak: f64,
    pub max_streak: u32,
    pub revivals: u64,
    pub premium_doubles: u64,
    pub resolutions: ResolutionCounts,
    /// Observed continue rate on no-hit rounds
    pub empirical_continue_rate: f64,
    pub capped_sessions: u32,
}

impl BatchReport {
    /// Fold session reports into a batch summary
    pub fn from_sessions(continue_rate: f64, reports: &[SessionReport]) -> Self {
        let mut resolutions = ResolutionCounts::default();
        let mut no_hit_rounds = 0;
        let mut no_hit_continues = 0;

        for report in reports {
            resolutions.add(&report.resolutions);
            no_hit_rounds += report.no_hit_rounds;
            no_hit_continues += report.no_hit_continues;
        }

        let streak_sum: u64 = reports.iter().map(|r| r.final_streak as u64).sum();
        let mean_streak = if reports.is_empty() {
            0.0
        } else {
            streak_sum as f64 / reports.len() as f64
        };
        let empirical_continue_rate = if no_hit_rounds > 0 {
            no_hit_continues as f64 / no_hit_rounds as f64
        } else {
            0.0
        };

        Self {
            sessions: reports.len() as u32,
            continue_rate,
            total_rounds: reports.iter().map(|r| r.rounds).sum(),
            total_spins: reports.iter().map(|r| r.spins).sum(),
            mean_streak,
            max_streak: reports.iter().map(|r| r.final_streak).max().unwrap_or(0),
            revivals: reports.iter().map(|r| r.revivals).sum(),
            premium_doubles: reports.iter().map(|r| r.premium_doubles).sum(),
            resolutions,
            empirical_continue_rate,
            capped_sessions: reports.iter().filter(|r| r.capped).count() as u32,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIMULATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Play one session to its end (or `max_rounds`)
pub fn simulate_session(
    config: &GameConfig,
    seed: u64,
    max_rounds: u64,
) -> Result<SessionReport, SimError> {
    let mut engine = GameEngine::with_seed(config.clone(), seed)?;
    let capped = play_session(&mut engine, max_rounds);

    let stats = engine.stats();
    Ok(SessionReport {
        seed,
        rounds: stats.rounds,
        spins: stats.spins,
        final_streak: engine.session().continue_count,
        revivals: stats.revivals,
        premium_doubles: stats.premium_doubles,
        resolutions: ResolutionCounts {
            continues: stats.continues,
            bonus_reveals: stats.bonus_reveals,
            premium_events: stats.premium_events,
            terminations: stats.terminations,
        },
        no_hit_rounds: stats.no_hit_rounds,
        no_hit_continues: stats.no_hit_continues,
        capped,
    })
}

/// Run a batch in parallel
pub fn simulate_batch(config: &SimConfig) -> Result<BatchReport, SimError> {
    config.validate()?;
    let started = Instant::now();

    let reports = (0..config.sessions)
        .into_par_iter()
        .map(|i| {
            simulate_session(
                &config.game,
                config.base_seed.wrapping_add(i as u64),
                config.max_rounds,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let report = BatchReport::from_sessions(config.game.continue_rate.value(), &reports);
    log::info!(
        "Simulated {} sessions ({} rounds) in {:.1?}",
        report.sessions,
        report.total_rounds,
        started.elapsed()
    );
    Ok(report)
}

/// Record the stage trace of a single session
pub fn trace_session(config: &GameConfig, seed: u64, max_rounds: u64) -> Result<StageTrace, SimError> {
    let recorder = TraceRecorder::new(format!("session-{seed}"));
    let mut engine = GameEngine::with_seed(config.clone(), seed)?.with_listener(recorder.clone());
    play_session(&mut engine, max_rounds);
    drop(engine);
    Ok(recorder.snapshot())
}

/// Returns true if the round cap stopped the session
fn play_session(engine: &mut GameEngine, max_rounds: u64) -> bool {
    engine.start_session();

    loop {
        if engine.can_leave() {
            match engine.leave() {
                Some(LeaveOutcome::Revived) => continue,
                _ => return false,
            }
        }
        if engine.stats().rounds >= max_rounds {
            log::debug!("Session capped at {max_rounds} rounds");
            engine.teardown();
            return true;
        }
        if !engine.round_state().is_spin_active() {
            // Nothing to stop and nothing to leave
            return false;
        }

        for reel in 0..REEL_COUNT as u8 {
            engine.stop_reel(reel);
        }
        engine.run_until_idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kp_round::ContinueRate;

    fn game(rate: f64) -> GameConfig {
        GameConfig::instant(ContinueRate::new(rate).unwrap())
    }

    #[test]
    fn test_session_is_reproducible() {
        let a = simulate_session(&game(0.81), 42, 10_000).unwrap();
        let b = simulate_session(&game(0.81), 42, 10_000).unwrap();
        assert_eq!(a, b);
        assert!(a.rounds >= 1);
        assert!(!a.capped);
    }

    #[test]
    fn test_session_counts_line_up() {
        let report = simulate_session(&game(0.5), 7, 10_000).unwrap();
        assert_eq!(report.resolutions.total(), report.rounds);
        assert!(report.spins >= report.rounds && report.spins <= report.rounds * 3);
        // Every revival follows a termination, the last termination ended the session
        assert_eq!(report.resolutions.terminations, report.revivals + 1);
    }

    #[test]
    fn test_cap() {
        let report = simulate_session(&game(0.99), 3, 5).unwrap();
        assert!(report.rounds <= 5);
        if report.capped {
            assert_eq!(report.rounds, 5);
        }
    }

    #[test]
    fn test_invalid_batch() {
        let config = SimConfig {
            sessions: 0,
            ..Default::default()
        };
        assert!(matches!(simulate_batch(&config), Err(SimError::NoSessions)));

        let config = SimConfig {
            max_rounds: 0,
            ..Default::default()
        };
        assert!(matches!(simulate_batch(&config), Err(SimError::NoRounds)));
    }

    #[test]
    fn test_aggregate() {
        let reports = vec![
            SessionReport {
                seed: 0,
                rounds: 4,
                spins: 6,
                final_streak: 3,
                revivals: 0,
                premium_doubles: 0,
                resolutions: ResolutionCounts {
                    continues: 3,
                    terminations: 1,
                    ..Default::default()
                },
                no_hit_rounds: 2,
                no_hit_continues: 1,
                capped: false,
            },
            SessionReport {
                seed: 1,
                rounds: 2,
                spins: 5,
                final_streak: 1,
                revivals: 1,
                premium_doubles: 0,
                resolutions: ResolutionCounts {
                    bonus_reveals: 1,
                    terminations: 1,
                    ..Default::default()
                },
                no_hit_rounds: 2,
                no_hit_continues: 0,
                capped: true,
            },
        ];
        let batch = BatchReport::from_sessions(0.5, &reports);
        assert_eq!(batch.sessions, 2);
        assert_eq!(batch.total_rounds, 6);
        assert_eq!(batch.max_streak, 3);
        assert_eq!(batch.capped_sessions, 1);
        assert_eq!(batch.resolutions.total(), 6);
        approx::assert_abs_diff_eq!(batch.mean_streak, 2.0);
        approx::assert_abs_diff_eq!(batch.empirical_continue_rate, 0.25);
    }

    #[test]
    fn test_trace_session() {
        let trace = trace_session(&GameConfig::default(), 11, 10_000).unwrap();
        assert!(trace.has_stage("session_start"));
        assert!(trace.has_stage("session_end"));
        assert_eq!(trace.trace_id, "session-11");
        assert!(trace.duration_ms() > 0.0);
    }
}
