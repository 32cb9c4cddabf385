//! Symbol definitions and the weighted symbol generator

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Symbol classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolClass {
    /// Can form a small yaku
    Common,
    /// Counted toward the cherry tiers, never a yaku
    Cherry,
    /// Ultra-rare, three in one spin raise the premium flag
    Premium,
}

/// A reel symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Symbol {
    Cherry = 0,
    Grape = 1,
    Bell = 2,
    Diamond = 3,
    Watermelon = 4,
    ShootingStar = 5,
}

impl Symbol {
    /// Every symbol in table order
    pub const ALL: [Symbol; 6] = [
        Symbol::Cherry,
        Symbol::Grape,
        Symbol::Bell,
        Symbol::Diamond,
        Symbol::Watermelon,
        Symbol::ShootingStar,
    ];

    /// The ultra-rare symbol used by the premium set
    pub const PREMIUM: Symbol = Symbol::ShootingStar;

    /// Symbol classification
    pub fn class(self) -> SymbolClass {
        match self {
            Symbol::Cherry => SymbolClass::Cherry,
            Symbol::ShootingStar => SymbolClass::Premium,
            Symbol::Grape | Symbol::Bell | Symbol::Diamond | Symbol::Watermelon => {
                SymbolClass::Common
            }
        }
    }

    pub fn is_cherry(self) -> bool {
        self.class() == SymbolClass::Cherry
    }

    pub fn is_premium(self) -> bool {
        self.class() == SymbolClass::Premium
    }

    /// Emoji shown on the reel
    pub fn glyph(self) -> &'static str {
        match self {
            Symbol::Cherry => "🍒",
            Symbol::Grape => "🍇",
            Symbol::Bell => "🔔",
            Symbol::Diamond => "💎",
            Symbol::Watermelon => "🍉",
            Symbol::ShootingStar => "🌠",
        }
    }

    /// Stable snake_case name (matches the serde form)
    pub fn name(self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Grape => "grape",
            Symbol::Bell => "bell",
            Symbol::Diamond => "diamond",
            Symbol::Watermelon => "watermelon",
            Symbol::ShootingStar => "shooting_star",
        }
    }

    /// Look up a symbol by its emoji
    pub fn from_glyph(glyph: &str) -> Option<Symbol> {
        Self::ALL.into_iter().find(|s| s.glyph() == glyph)
    }

    /// Look up a symbol by its snake_case name
    pub fn from_name(name: &str) -> Option<Symbol> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}

/// One entry of the weight table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolWeight {
    pub symbol: Symbol,
    pub weight: f64,
}

/// Ordered symbol weights
///
/// Order matters: the generator walks entries front to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    entries: Vec<SymbolWeight>,
}

impl WeightTable {
    /// Build a table, rejecting anything the generator could not draw from
    pub fn new(entries: Vec<SymbolWeight>) -> Result<Self, ConfigError> {
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Base game weights: cherry small, four commons share the bulk, premium tiny
    pub fn standard() -> Self {
        let entries = [
            (Symbol::Cherry, 10.0),
            (Symbol::Grape, 22.0),
            (Symbol::Bell, 22.0),
            (Symbol::Diamond, 22.0),
            (Symbol::Watermelon, 22.0),
            (Symbol::ShootingStar, 2.0),
        ]
        .into_iter()
        .map(|(symbol, weight)| SymbolWeight { symbol, weight })
        .collect();

        Self { entries }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::EmptyWeightTable);
        }
        for entry in &self.entries {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    symbol: entry.symbol.name(),
                    weight: entry.weight,
                });
            }
        }
        if self.total() <= 0.0 {
            return Err(ConfigError::NoReachableSymbol);
        }
        Ok(())
    }

    pub fn entries(&self) -> &[SymbolWeight] {
        &self.entries
    }

    /// Sum of all weights
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Weight configured for a symbol (summed if listed twice)
    pub fn weight_of(&self, symbol: Symbol) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.symbol == symbol)
            .map(|e| e.weight)
            .sum()
    }

    /// Expected frequency of a symbol
    pub fn share(&self, symbol: Symbol) -> f64 {
        let total = self.total();
        if total > 0.0 {
            self.weight_of(symbol) / total
        } else {
            0.0
        }
    }

    /// Symbol returned when float drift exhausts the table without a pick
    pub fn fallback(&self) -> Symbol {
        self.entries
            .iter()
            .rev()
            .find(|e| e.weight > 0.0)
            .map(|e| e.symbol)
            .unwrap_or(Symbol::Grape)
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Draw one symbol from the weight table
///
/// Draws `r` in `[0, total)` and subtracts weights in table order until the
/// remainder drops to zero or below. Zero-weight entries are skipped so they
/// can never be returned.
pub fn generate_weighted_symbol<R: Rng + ?Sized>(rng: &mut R, table: &WeightTable) -> Symbol {
    let mut remainder = rng.random::<f64>() * table.total();

    for entry in table.entries() {
        if entry.weight <= 0.0 {
            continue;
        }
        remainder -= entry.weight;
        if remainder <= 0.0 {
            return entry.symbol;
        }
    }

    table.fallback()
}

/// The forced premium spin: three premium symbols
pub fn generate_premium_symbol_set() -> [Symbol; 3] {
    [Symbol::PREMIUM; 3]
}
