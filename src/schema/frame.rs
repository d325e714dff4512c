use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{Event, SessionSnapshot};

/// UTC timestamp with millisecond-precision round-trip guaranteed by the
/// legacy codec's positional encoder. Stored as seconds-since-epoch plus
/// nanosecond remainder rather than a `chrono` type directly, so the
/// bincode wire form is stable across `chrono` upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FrameTimestamp {
    pub secs: i64,
    pub nanos: u32,
}

impl FrameTimestamp {
    pub fn new(secs: i64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    pub fn from_utc(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            secs: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }

    pub fn to_utc(self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp(self.secs, self.nanos).unwrap_or_default()
    }

    pub fn now() -> Self {
        Self::from_utc(chrono::Utc::now())
    }

    /// Millisecond-truncated value, used for round-trip comparisons since
    /// the legacy codec's on-disk resolution is milliseconds.
    pub fn to_millis(self) -> i64 {
        self.secs * 1000 + (self.nanos / 1_000_000) as i64
    }
}

/// A single bone's pose within a player's skeleton for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BonePose {
    pub name: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

/// Per-player skeletal data for one frame, keyed by `slot_number` rendered
/// as a string (the game engine's JSON dialect uses string object keys).
/// An empty map is the wire-level equivalent of "no bones data" for this
/// frame; the legacy codec collapses it to the two-field line form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BonesFrame(pub BTreeMap<String, Vec<BonePose>>);

impl BonesFrame {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn player_count(&self) -> usize {
        self.0.len()
    }
}

/// One atomic sample of lobby-session state: the normalized unit the rest of
/// this crate is built around.
///
/// Invariant: within a single stream, `frame_index` is strictly increasing
/// starting at 0, and `timestamp` is non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionFrame {
    pub frame_index: u32,
    pub timestamp: FrameTimestamp,
    pub session: SessionSnapshot,
    pub player_bones: Option<BonesFrame>,
    pub events: Vec<Event>,
}

impl SessionFrame {
    pub fn new(
        frame_index: u32,
        timestamp: FrameTimestamp,
        session: SessionSnapshot,
        player_bones: Option<BonesFrame>,
    ) -> Self {
        Self {
            frame_index,
            timestamp,
            session,
            player_bones,
            events: Vec::new(),
        }
    }
}
