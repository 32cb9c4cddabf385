//! # kp-stage — Kanpai Stage System
//!
//! Defines the canonical phases a Kanpai session passes through.
//! The view never reads engine internals to decide what to show — only STAGES.
//!
//! ## Flow
//!
//! ```text
//! SessionStart
//!     └── RoundStart
//!           ├── SpinStart → ReelStop ×3 → SpinSettled   (up to 3 spins)
//!           └── RoundComplete
//!                 ├── StreakContinue (+ BonusRevealOn/Off)
//!                 ├── PremiumIntro → PremiumFlip → PremiumResult
//!                 └── StreakSummary → Revival | SessionEnd
//! ```
//!
//! This crate only describes stages and records them; it knows nothing about
//! symbols, odds or timing.

pub mod event;
pub mod stage;
pub mod trace;

pub use event::*;
pub use stage::*;
pub use trace::*;
