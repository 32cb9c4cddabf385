//! Session counter — streak length and the revival check

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Externally visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Consecutive continued rounds
    pub continue_count: u32,
    /// Last round terminated the streak
    pub terminated: bool,
}

/// Result of the player leaving the result view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveOutcome {
    /// Revival roll succeeded, play resumes
    Revived,
    /// Session is over
    Ended,
}

/// Owns the streak counter for the lifetime of a session
#[derive(Debug, Clone, Default)]
pub struct SessionCounter {
    state: SessionState,
    /// One revival roll is owed per termination
    revival_armed: bool,
    revivals: u32,
    ended: bool,
}

impl SessionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn continue_count(&self) -> u32 {
        self.state.continue_count
    }

    pub fn is_terminated(&self) -> bool {
        self.state.terminated
    }

    /// Player left for good
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn revivals(&self) -> u32 {
        self.revivals
    }

    /// Is a revival roll still owed?
    pub fn revival_available(&self) -> bool {
        self.revival_armed
    }

    /// Count one continued round. Ignored once terminated.
    pub fn record_continue(&mut self) -> u32 {
        if !self.state.terminated && !self.ended {
            self.state.continue_count += 1;
        }
        self.state.continue_count
    }

    /// End the streak and arm the single revival roll
    pub fn terminate(&mut self) {
        if self.state.terminated || self.ended {
            return;
        }
        self.state.terminated = true;
        self.revival_armed = true;
    }

    /// Take the revival roll owed for the last termination
    ///
    /// `None` when no roll is owed (not terminated, or already rolled).
    pub fn revival_check<R: Rng + ?Sized>(&mut self, rng: &mut R, chance: f64) -> Option<LeaveOutcome> {
        if !self.revival_armed {
            return None;
        }
        self.revival_armed = false;

        if rng.random::<f64>() < chance {
            self.state.terminated = false;
            self.revivals += 1;
            Some(LeaveOutcome::Revived)
        } else {
            self.ended = true;
            Some(LeaveOutcome::Ended)
        }
    }

    /// Fresh session, same counter instance
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_counts_continues() {
        let mut counter = SessionCounter::new();
        assert_eq!(counter.record_continue(), 1);
        assert_eq!(counter.record_continue(), 2);
        assert_eq!(
            counter.state(),
            SessionState {
                continue_count: 2,
                terminated: false
            }
        );
    }

    #[test]
    fn test_no_count_after_termination() {
        let mut counter = SessionCounter::new();
        counter.record_continue();
        counter.terminate();
        assert_eq!(counter.record_continue(), 1);
        assert!(counter.is_terminated());
    }

    #[test]
    fn test_revival_is_one_shot() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut counter = SessionCounter::new();
        assert_eq!(counter.revival_check(&mut rng, 1.0), None);

        counter.terminate();
        assert!(counter.revival_available());
        assert_eq!(counter.revival_check(&mut rng, 0.0), Some(LeaveOutcome::Ended));
        assert!(counter.is_ended());
        assert_eq!(counter.revival_check(&mut rng, 1.0), None);
    }

    #[test]
    fn test_revival_keeps_count_and_rearms_on_next_termination() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut counter = SessionCounter::new();
        counter.record_continue();
        counter.record_continue();
        counter.terminate();

        assert_eq!(counter.revival_check(&mut rng, 1.0), Some(LeaveOutcome::Revived));
        assert!(!counter.is_terminated());
        assert_eq!(counter.continue_count(), 2);
        assert_eq!(counter.revivals(), 1);

        assert_eq!(counter.record_continue(), 3);
        counter.terminate();
        assert!(counter.revival_available());
    }

    #[test]
    fn test_revival_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let trials = 20_000;
        let revived = (0..trials)
            .filter(|_| {
                let mut counter = SessionCounter::new();
                counter.terminate();
                counter.revival_check(&mut rng, 0.2) == Some(LeaveOutcome::Revived)
            })
            .count();
        approx::assert_abs_diff_eq!(revived as f64 / trials as f64, 0.2, epsilon = 0.02);
    }
}
