use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::PlayerStats;

/// Known vocabulary for `game_status`. The field itself is stored as a plain
/// `String` on [`SessionSnapshot`] (see module docs) — these are the values
/// the built-in transition detector and game-state sensors compare against.
pub mod game_status {
    pub const PRE_MATCH: &str = "pre_match";
    pub const ROUND_START: &str = "round_start";
    pub const PLAYING: &str = "playing";
    pub const SCORE: &str = "score";
    pub const ROUND_OVER: &str = "round_over";
    pub const POST_MATCH: &str = "post_match";
    pub const PAUSED: &str = "paused";
    pub const UNPAUSING: &str = "unpausing";
}

/// A string from `{none, paused, paused_requested, unpausing}`.
pub mod pause_state {
    pub const NONE: &str = "none";
    pub const PAUSED: &str = "paused";
    pub const PAUSED_REQUESTED: &str = "paused_requested";
    pub const UNPAUSING: &str = "unpausing";
}

/// Value object whose float/string equality decides whether a new throw
/// event is emitted (see `DiscThrownSensor`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ThrowInfo {
    pub arm_speed: f32,
    pub total_speed: f32,
    pub rot_per_sec: f32,
}

/// Value object whose equality decides whether a new goal event is emitted
/// (see `GoalScoredSensor`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LastScoreInfo {
    pub person_scored: String,
    pub disc_speed: f32,
    pub distance_thrown: f32,
    pub point_amount: i32,
}

/// A single roster member within a [`Team`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamMember {
    /// Unique per-session key.
    pub slot_number: i32,
    pub display_name: String,
    /// `-1` denotes a spectator.
    pub jersey_number: i32,
    /// At most one `true` across all teams in a session.
    pub has_possession: bool,
    pub is_emote_playing: bool,
    #[serde(default)]
    pub stats: Option<PlayerStats>,
}

/// An ordered roster of [`TeamMember`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Team {
    pub members: Vec<TeamMember>,
}

/// The game-engine-native view of one lobby session at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionSnapshot {
    /// Preserved verbatim; never reformatted or re-parsed as a UUID.
    pub session_id: String,
    pub game_status: String,
    pub blue_points: i32,
    pub orange_points: i32,
    pub blue_round_score: i32,
    pub orange_round_score: i32,
    pub teams: Vec<Team>,
    pub game_clock_display: String,
    pub pause: String,
    #[serde(default)]
    pub last_throw: Option<ThrowInfo>,
    #[serde(default)]
    pub last_score: Option<LastScoreInfo>,
    /// Bare-number in the legacy dialect but large enough to warrant u64.
    #[serde(default)]
    pub userid: Option<u64>,
    #[serde(default)]
    pub rules_changed_at: Option<u64>,
}

impl SessionSnapshot {
    /// Iterates all members across all teams in team order.
    pub fn members(&self) -> impl Iterator<Item = &TeamMember> {
        self.teams.iter().flat_map(|t| t.members.iter())
    }

    /// The slot of the unique member with `has_possession == true`, or `-1`
    /// if no one currently holds the disc.
    pub fn possessor_slot(&self) -> i32 {
        self.members()
            .find(|m| m.has_possession)
            .map(|m| m.slot_number)
            .unwrap_or(-1)
    }
}
