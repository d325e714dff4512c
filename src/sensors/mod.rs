//! Concrete stateful observers that each map a frame stream to an event
//! stream. See the module docs on [`Sensor`] for the contract every
//! implementation must uphold.

pub mod disc;
pub mod emote;
pub mod game_state;
pub mod goal;
pub mod roster;
pub mod scoreboard;
pub mod stats;

pub use disc::{DiscCaughtSensor, DiscPossessionSensor, DiscThrownSensor};
pub use emote::EmoteSensor;
pub use game_state::{MatchEndSensor, PauseSensor, RoundEndSensor, RoundStartSensor};
pub use goal::GoalScoredSensor;
pub use roster::RosterSensor;
pub use scoreboard::ScoreboardSensor;
pub use stats::StatEventSensor;

use crate::schema::{Event, SessionFrame};

/// A stateful observer that maps an arriving frame to at most one event.
///
/// Implementations:
/// - see frames serially, in arrival order, and may keep internal state;
/// - must be robust to absent nested fields, returning `None` rather than
///   panicking or erroring — a sensor is expected to be infallible;
/// - may emit at most one event per call. Sensors that need to emit more
///   than one per frame (e.g. stat bursts) must buffer internally and
///   drain the queue across subsequent calls, including calls where the
///   frame itself yields nothing new;
/// - must be deterministic in the frame sequence they have observed.
pub trait Sensor: Send {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event>;
}

/// Classifies a slot's role from its jersey number and slot index. This is
/// an inherited approximation (see spec §9): `jersey_number == -1` is a
/// spectator, otherwise `slot_number < 4` is blue and everything else is
/// orange. It is known to misclassify in 4v4+ modes and is reproduced
/// verbatim rather than "fixed".
pub fn derive_role(slot_number: i32, jersey_number: i32) -> crate::schema::TeamSide {
    use crate::schema::TeamSide;
    if jersey_number == -1 {
        TeamSide::Spectator
    } else if slot_number < 4 {
        TeamSide::Blue
    } else {
        TeamSide::Orange
    }
}
