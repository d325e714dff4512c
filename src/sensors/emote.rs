use std::collections::{HashMap, VecDeque};

use crate::schema::{Event, SessionFrame};
use crate::sensors::Sensor;

/// Fires `EmotePlayed` on the rising edge of a slot's `is_emote_playing`.
/// If more than one slot rises in the same frame, the extras are queued and
/// drained on subsequent calls, per the one-event-per-call sensor contract.
#[derive(Debug, Default)]
pub struct EmoteSensor {
    previous: HashMap<i32, bool>,
    pending: VecDeque<Event>,
}

impl EmoteSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for EmoteSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let frame = frame?;
        for member in frame.session.members() {
            let was_playing = self
                .previous
                .insert(member.slot_number, member.is_emote_playing)
                .unwrap_or(false);
            if member.is_emote_playing && !was_playing {
                self.pending.push_back(Event::EmotePlayed {
                    slot_number: member.slot_number,
                });
            }
        }
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FrameTimestamp, SessionSnapshot, Team, TeamMember};

    fn frame(index: u32, emoting: &[i32]) -> SessionFrame {
        let members = (0..4)
            .map(|slot| TeamMember {
                slot_number: slot,
                display_name: format!("p{slot}"),
                jersey_number: slot,
                has_possession: false,
                is_emote_playing: emoting.contains(&slot),
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
    fn rising_edge_fires_once_per_slot() {
        let mut sensor = EmoteSensor::new();
        assert_eq!(sensor.add_frame(Some(&frame(0, &[]))), None);
        assert_eq!(
            sensor.add_frame(Some(&frame(1, &[2]))),
            Some(Event::EmotePlayed { slot_number: 2 })
        );
        assert_eq!(sensor.add_frame(Some(&frame(2, &[2]))), None);
    }
}
