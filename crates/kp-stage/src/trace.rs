//! StageTrace — A complete sequence of stage events for one session
//!
//! A trace captures the full timeline the view played back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::StageEvent;
use crate::stage::{Stage, StageCategory};

/// A complete trace of stage events for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    /// Unique identifier for this trace
    pub trace_id: String,

    /// Optional session identifier
    #[serde(default)]
    pub session_id: Option<String>,

    /// All events in chronological order
    pub events: Vec<StageEvent>,

    /// When this trace was started
    pub recorded_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl StageTrace {
    /// Create a new empty trace
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            session_id: None,
            events: Vec::new(),
            recorded_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Add an event to the trace
    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    /// Set session ID
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get total duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        if self.events.is_empty() {
            return 0.0;
        }
        let first = self.events.first().map(|e| e.timestamp_ms).unwrap_or(0.0);
        let last = self.events.last().map(|e| e.timestamp_ms).unwrap_or(0.0);
        last - first
    }

    /// Get events by category
    pub fn events_by_category(&self, category: StageCategory) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.category() == category)
            .collect()
    }

    /// Get events by stage type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.type_name() == type_name)
            .collect()
    }

    /// Count events of one stage type
    pub fn count(&self, type_name: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.stage.type_name() == type_name)
            .count()
    }

    /// Check if trace contains a specific stage type
    pub fn has_stage(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.stage.type_name() == type_name)
    }

    /// Find first event matching a predicate
    pub fn find_event<F>(&self, predicate: F) -> Option<&StageEvent>
    where
        F: Fn(&StageEvent) -> bool,
    {
        self.events.iter().find(|e| predicate(e))
    }

    /// Streak length reported by the last summary, revival or session end
    pub fn final_continue_count(&self) -> Option<u32> {
        self.events.iter().rev().find_map(|e| match &e.stage {
            Stage::StreakSummary { continue_count }
            | Stage::Revival { continue_count }
            | Stage::SessionEnd { continue_count } => Some(*continue_count),
            _ => None,
        })
    }

    /// Get summary of trace
    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            trace_id: self.trace_id.clone(),
            event_count: self.events.len(),
            duration_ms: self.duration_ms(),
            rounds: self.count("round_start"),
            spins: self.count("spin_settled"),
            bonus_reveals: self.count("bonus_reveal_on"),
            premium_events: self.count("premium_intro"),
            final_continue_count: self.final_continue_count(),
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Summary of a trace for quick overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub event_count: usize,
    pub duration_ms: f64,
    pub rounds: usize,
    pub spins: usize,
    pub bonus_reveals: usize,
    pub premium_events: usize,
    pub final_continue_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_basic_trace() -> StageTrace {
        let mut trace = StageTrace::new("test-001");

        trace.push(StageEvent::new(Stage::RoundStart { round_index: 0 }, 0.0));
        trace.push(StageEvent::new(
            Stage::SpinStart {
                spin_index: 0,
                forced_premium: false,
            },
            0.0,
        ));
        for (i, symbol) in ["cherry", "grape", "bell"].into_iter().enumerate() {
            trace.push(StageEvent::new(
                Stage::ReelStop {
                    reel_index: i as u8,
                    symbol: symbol.into(),
                },
                300.0 + (i as f64 * 150.0),
            ));
        }
        trace.push(StageEvent::new(
            Stage::SpinSettled {
                spin_index: 0,
                symbols: vec!["cherry".into(), "grape".into(), "bell".into()],
            },
            600.0,
        ));
        trace.push(StageEvent::new(Stage::BonusRevealOn, 1000.0));
        trace.push(StageEvent::new(Stage::BonusRevealOff, 2500.0));
        trace.push(StageEvent::new(Stage::StreakSummary { continue_count: 1 }, 3000.0));

        trace
    }

    #[test]
    fn test_trace_creation() {
        let trace = create_basic_trace();
        assert_eq!(trace.len(), 9);
        assert!(!trace.is_empty());
    }

    #[test]
    fn test_trace_duration() {
        let trace = create_basic_trace();
        assert_eq!(trace.duration_ms(), 3000.0);
    }

    #[test]
    fn test_trace_queries() {
        let trace = create_basic_trace();
        assert_eq!(trace.count("reel_stop"), 3);
        assert_eq!(trace.events_by_category(StageCategory::Bonus).len(), 2);
        assert!(trace.has_stage("spin_settled"));
        assert!(!trace.has_stage("premium_intro"));
        assert_eq!(trace.final_continue_count(), Some(1));
    }

    #[test]
    fn test_trace_summary() {
        let summary = create_basic_trace().summary();
        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.spins, 1);
        assert_eq!(summary.bonus_reveals, 1);
        assert_eq!(summary.premium_events, 0);
    }

    #[test]
    fn test_trace_serialization() {
        let trace = create_basic_trace().with_session("s-1");
        let json = trace.to_json().unwrap();

        assert!(json.contains("spin_settled"));

        let deserialized: StageTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.session_id.as_deref(), Some("s-1"));
        assert_eq!(deserialized.events.len(), trace.events.len());
    }
}
