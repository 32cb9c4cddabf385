//! Reel slots, spin results and the per-round record

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Number of reels per spin
pub const REEL_COUNT: usize = 3;

/// Maximum spins per round
pub const MAX_SPINS: u8 = 3;

/// What one reel position currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "symbol", rename_all = "snake_case")]
pub enum ReelSlot {
    /// Still spinning
    #[default]
    Unresolved,
    /// Stopped on a symbol
    Stopped(Symbol),
}

impl ReelSlot {
    pub fn is_stopped(&self) -> bool {
        matches!(self, ReelSlot::Stopped(_))
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            ReelSlot::Stopped(symbol) => Some(*symbol),
            ReelSlot::Unresolved => None,
        }
    }
}

/// All three reels of one spin, once stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpinResult {
    symbols: [Symbol; REEL_COUNT],
}

impl SpinResult {
    pub fn new(symbols: [Symbol; REEL_COUNT]) -> Self {
        Self { symbols }
    }

    /// Build from reel slots, `None` if any reel is still spinning
    pub fn from_slots(slots: &[ReelSlot; REEL_COUNT]) -> Option<Self> {
        let [a, b, c] = slots;
        Some(Self::new([a.symbol()?, b.symbol()?, c.symbol()?]))
    }

    /// Parse three emoji, e.g. `["🍒", "🍇", "🔔"]`
    pub fn from_glyphs(glyphs: [&str; REEL_COUNT]) -> Option<Self> {
        let [a, b, c] = glyphs;
        Some(Self::new([
            Symbol::from_glyph(a)?,
            Symbol::from_glyph(b)?,
            Symbol::from_glyph(c)?,
        ]))
    }

    pub fn symbols(&self) -> &[Symbol; REEL_COUNT] {
        &self.symbols
    }

    /// All three reels show the same symbol
    pub fn is_triple(&self) -> Option<Symbol> {
        let [a, b, c] = self.symbols;
        (a == b && b == c).then_some(a)
    }

    pub fn count_of(&self, symbol: Symbol) -> usize {
        self.symbols.iter().filter(|&&s| s == symbol).count()
    }

    /// Symbol names for stage payloads
    pub fn names(&self) -> Vec<String> {
        self.symbols.iter().map(|s| s.name().to_string()).collect()
    }
}

impl std::fmt::Display for SpinResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = self.symbols;
        write!(f, "[{a} {b} {c}]")
    }
}

/// Spins accumulated in the current round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    spins: Vec<SpinResult>,
}

impl RoundRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spins(spins: impl IntoIterator<Item = SpinResult>) -> Self {
        Self {
            spins: spins.into_iter().collect(),
        }
    }

    pub fn push(&mut self, spin: SpinResult) {
        self.spins.push(spin);
    }

    pub fn clear(&mut self) {
        self.spins.clear();
    }

    pub fn spins(&self) -> &[SpinResult] {
        &self.spins
    }

    pub fn len(&self) -> usize {
        self.spins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    pub fn last(&self) -> Option<&SpinResult> {
        self.spins.last()
    }
}

/// Round sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoundState {
    /// No round running
    #[default]
    Idle,
    /// Reels of spin `spin_index` are spinning and can be stopped
    SpinActive { spin_index: u8 },
    /// Every reel of the spin stopped, evaluation pending
    AllReelsStopped { spin_index: u8 },
    /// Round finished, waiting for the next one to be started
    RoundComplete,
}

impl RoundState {
    /// Spin index of an in-flight spin
    pub fn spin_index(&self) -> Option<u8> {
        match self {
            RoundState::SpinActive { spin_index }
            | RoundState::AllReelsStopped { spin_index } => Some(*spin_index),
            RoundState::Idle | RoundState::RoundComplete => None,
        }
    }

    pub fn is_spin_active(&self) -> bool {
        matches!(self, RoundState::SpinActive { .. })
    }
}
