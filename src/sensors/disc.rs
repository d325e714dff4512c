use crate::schema::{Event, SessionFrame, ThrowInfo};
use crate::sensors::Sensor;

/// Fires `DiscPossessionChanged` whenever the possessor slot changes, after
/// a one-frame initialization.
#[derive(Debug, Default)]
pub struct DiscPossessionSensor {
    previous: Option<i32>,
}

impl DiscPossessionSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for DiscPossessionSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let current = frame.session.possessor_slot();

        match self.previous.replace(current) {
            None => None,
            Some(prev) if prev != current => Some(Event::DiscPossessionChanged {
                from: prev,
                to: current,
            }),
            Some(_) => None,
        }
    }
}

/// Fires when the possessor transitions to a non-negative slot distinct
/// from the previous holder, after a one-frame initialization (mirroring
/// `DiscPossessionSensor`, so the very first observed frame never reads as
/// a "transition"). Per spec §9, the source's tautological branch
/// collapses to exactly this rule: no other cases are invented.
#[derive(Debug, Default)]
pub struct DiscCaughtSensor {
    previous: Option<i32>,
    initialized: bool,
}

impl DiscCaughtSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for DiscCaughtSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let current = frame.session.possessor_slot();
        let prev = self.previous.replace(current);
        let was_initialized = self.initialized;
        self.initialized = true;

        if was_initialized && current >= 0 && prev != Some(current) {
            Some(Event::DiscCaught {
                slot_number: current,
            })
        } else {
            None
        }
    }
}

/// Tracks the previous `last_throw` by float-tuple equality; on change,
/// emits `DiscThrown` attributed to the *previous* possessor (or the
/// current possessor if there was no prior holder).
#[derive(Debug, Default)]
pub struct DiscThrownSensor {
    previous_throw: Option<ThrowInfo>,
    previous_possessor: Option<i32>,
}

impl DiscThrownSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for DiscThrownSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let session = &frame.session;
        let current_possessor = session.possessor_slot();
        let current_throw = session.last_throw;

        let changed = self.previous_throw != current_throw;
        let attributed_slot = self.previous_possessor.unwrap_or(current_possessor);
        self.previous_possessor = Some(current_possessor);

        let throw = current_throw?;
        self.previous_throw = Some(throw);

        if !changed {
            return None;
        }

        Some(Event::DiscThrown {
            slot_number: attributed_slot,
            arm_speed: throw.arm_speed,
            total_speed: throw.total_speed,
            rot_per_sec: throw.rot_per_sec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FrameTimestamp, SessionSnapshot, Team, TeamMember};

    fn frame(index: u32, possessor: Option<i32>) -> SessionFrame {
        let members = [1, 2]
            .iter()
            .map(|slot| TeamMember {
                slot_number: *slot,
                display_name: format!("p{slot}"),
                jersey_number: *slot,
                has_possession: possessor == Some(*slot),
                is_emote_playing: false,
                stats: None,
            })
            .collect();
        SessionFrame::new(
            index,
            FrameTimestamp::new(index as i64, 0),
            SessionSnapshot {
                session_id: "s".into(),
                game_status: "playing".into(),
                blue_points: 0,
                orange_points: 0,
                blue_round_score: 0,
                orange_round_score: 0,
                teams: vec![Team { members }],
                game_clock_display: "".into(),
                pause: "none".into(),
                last_throw: None,
                last_score: None,
                userid: None,
                rules_changed_at: None,
            },
            None,
        )
    }

    #[test]
    fn possession_flip_and_catch() {
        let mut possession = DiscPossessionSensor::new();
        let mut caught = DiscCaughtSensor::new();

        let a = frame(0, Some(1));
        assert_eq!(possession.add_frame(Some(&a)), None);
        assert_eq!(caught.add_frame(Some(&a)), None);

        let b = frame(1, Some(2));
        assert_eq!(
            possession.add_frame(Some(&b)),
            Some(Event::DiscPossessionChanged { from: 1, to: 2 })
        );
        assert_eq!(
            caught.add_frame(Some(&b)),
            Some(Event::DiscCaught { slot_number: 2 })
        );
    }
}
