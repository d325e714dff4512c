use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Team-side classification derived from the slot-range heuristic in
/// [`crate::sensors::roster`]. See spec §9: this is a known-approximate
/// inherited heuristic, reproduced verbatim, not a bug to fix here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TeamSide {
    Blue,
    Orange,
    Spectator,
}

/// Tagged union of every event this crate can emit. Represented as a plain
/// Rust enum (not a trait object) so downstream consumers get exhaustive
/// `match` ergonomics instead of dynamic dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind")]
pub enum Event {
    RoundStarted,
    RoundEnded {
        round: Option<i32>,
        winner: Option<TeamSide>,
    },
    MatchEnded {
        winner: Option<TeamSide>,
    },
    RoundPaused,
    RoundUnpaused,
    ScoreboardUpdated {
        blue_points: i32,
        orange_points: i32,
        blue_round_score: i32,
        orange_round_score: i32,
        game_clock_display: String,
    },
    GoalScored {
        person_scored: String,
        disc_speed: f32,
        distance_thrown: f32,
        point_amount: i32,
    },
    PlayerJoined {
        slot_number: i32,
        display_name: String,
    },
    PlayerLeft {
        slot_number: i32,
    },
    PlayerSwitchedTeam {
        slot_number: i32,
        new_role: TeamSide,
    },
    EmotePlayed {
        slot_number: i32,
    },
    DiscPossessionChanged {
        from: i32,
        to: i32,
    },
    DiscThrown {
        slot_number: i32,
        arm_speed: f32,
        total_speed: f32,
        rot_per_sec: f32,
    },
    DiscCaught {
        slot_number: i32,
    },
    PlayerGoal {
        slot_number: i32,
        point_amount: i32,
    },
    PlayerSave {
        slot_number: i32,
        total: u32,
    },
    PlayerStun {
        slot_number: i32,
        total: u32,
    },
    PlayerPass {
        slot_number: i32,
        total: u32,
    },
    PlayerSteal {
        slot_number: i32,
        victim_slot: i32,
        total: u32,
    },
    PlayerBlock {
        slot_number: i32,
        total: u32,
    },
    PlayerInterception {
        slot_number: i32,
        total: u32,
    },
    PlayerAssist {
        slot_number: i32,
        total: u32,
    },
    PlayerShotTaken {
        slot_number: i32,
        total: u32,
    },
}

impl Event {
    /// A short, stable discriminant name, useful for consumer-side
    /// deduplication (see spec §9 on sensor/built-in-detector overlap).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::RoundStarted => "RoundStarted",
            Event::RoundEnded { .. } => "RoundEnded",
            Event::MatchEnded { .. } => "MatchEnded",
            Event::RoundPaused => "RoundPaused",
            Event::RoundUnpaused => "RoundUnpaused",
            Event::ScoreboardUpdated { .. } => "ScoreboardUpdated",
            Event::GoalScored { .. } => "GoalScored",
            Event::PlayerJoined { .. } => "PlayerJoined",
            Event::PlayerLeft { .. } => "PlayerLeft",
            Event::PlayerSwitchedTeam { .. } => "PlayerSwitchedTeam",
            Event::EmotePlayed { .. } => "EmotePlayed",
            Event::DiscPossessionChanged { .. } => "DiscPossessionChanged",
            Event::DiscThrown { .. } => "DiscThrown",
            Event::DiscCaught { .. } => "DiscCaught",
            Event::PlayerGoal { .. } => "PlayerGoal",
            Event::PlayerSave { .. } => "PlayerSave",
            Event::PlayerStun { .. } => "PlayerStun",
            Event::PlayerPass { .. } => "PlayerPass",
            Event::PlayerSteal { .. } => "PlayerSteal",
            Event::PlayerBlock { .. } => "PlayerBlock",
            Event::PlayerInterception { .. } => "PlayerInterception",
            Event::PlayerAssist { .. } => "PlayerAssist",
            Event::PlayerShotTaken { .. } => "PlayerShotTaken",
        }
    }
}
