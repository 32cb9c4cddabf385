//! # kp-round — Kanpai Round Resolution Engine
//!
//! Drives a three-reel, up-to-three-spin round, classifies what landed and
//! decides whether the player's streak survives.
//!
//! ## Features
//!
//! - **Weighted Symbols**: Configurable weight table with a rare cherry and an ultra-rare premium
//! - **Round Sequencer**: Explicit state machine, early exit on the first hit
//! - **Classifier / Resolver**: Cherry tiers, small yaku, premium double-or-nothing
//! - **Session Counter**: Streak counting and the one-shot revival check
//! - **Scheduler**: Virtual-clock continuations with named phases and scoped cancellation
//!
//! ## Architecture
//!
//! ```text
//! GameEngine
//!     │
//!     ├── RoundSequencer ── WeightTable (generate_weighted_symbol)
//!     │        │
//!     │        v
//!     │   RoundRecord → classify() → Classification
//!     │                                   │
//!     ├── resolve(ContinueRate, ResolverOdds)
//!     │        │
//!     │        v
//!     ├── SessionCounter (continue_count, revival)
//!     ├── Scheduler<Continuation> (TimingConfig phases)
//!     └── RoundListener → StageEvent
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod listener;
pub mod resolver;
pub mod scheduler;
pub mod sequencer;
pub mod session;
pub mod spin;
pub mod symbols;
pub mod timing;

pub use classify::*;
pub use config::*;
pub use engine::*;
pub use listener::*;
pub use resolver::*;
pub use scheduler::*;
pub use sequencer::*;
pub use session::*;
pub use spin::*;
pub use symbols::*;
pub use timing::*;
