use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Eleven monotonically non-decreasing counters per player. Within a
/// session, no counter ever decreases; the deltas between consecutive
/// frames drive [`crate::sensors::stats::StatEventSensor`]'s event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerStats {
    pub goals: u32,
    pub saves: u32,
    pub stuns: u32,
    pub passes: u32,
    pub catches: u32,
    pub steals: u32,
    pub blocks: u32,
    pub interceptions: u32,
    pub assists: u32,
    pub shots_taken: u32,
    pub points: u32,
}

impl PlayerStats {
    /// Per-field positive deltas from `previous` to `self`. A counter that
    /// appears to have decreased (a violation of the stated invariant) is
    /// clamped to zero rather than propagated as a negative delta.
    pub fn deltas_from(&self, previous: &PlayerStats) -> PlayerStatsDelta {
        PlayerStatsDelta {
            goals: self.goals.saturating_sub(previous.goals),
            saves: self.saves.saturating_sub(previous.saves),
            stuns: self.stuns.saturating_sub(previous.stuns),
            passes: self.passes.saturating_sub(previous.passes),
            catches: self.catches.saturating_sub(previous.catches),
            steals: self.steals.saturating_sub(previous.steals),
            blocks: self.blocks.saturating_sub(previous.blocks),
            interceptions: self.interceptions.saturating_sub(previous.interceptions),
            assists: self.assists.saturating_sub(previous.assists),
            shots_taken: self.shots_taken.saturating_sub(previous.shots_taken),
            points: self.points.saturating_sub(previous.points),
        }
    }
}

/// Positive per-field deltas between two [`PlayerStats`] snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStatsDelta {
    pub goals: u32,
    pub saves: u32,
    pub stuns: u32,
    pub passes: u32,
    pub catches: u32,
    pub steals: u32,
    pub blocks: u32,
    pub interceptions: u32,
    pub assists: u32,
    pub shots_taken: u32,
    pub points: u32,
}
