use crate::schema::{Event, LastScoreInfo, SessionFrame};
use crate::sensors::Sensor;

/// Tracks the previous `last_score`. Emits `GoalScored` when the current
/// `last_score` is present and either the previous was absent or the
/// four-field tuple differs.
#[derive(Debug, Default)]
pub struct GoalScoredSensor {
    previous: Option<LastScoreInfo>,
}

impl GoalScoredSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for GoalScoredSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let current = frame.session.last_score.clone()?;

        let changed = match &self.previous {
            None => true,
            Some(prev) => prev != &current,
        };
        self.previous = Some(current.clone());

        if !changed {
            return None;
        }

        Some(Event::GoalScored {
            person_scored: current.person_scored,
            disc_speed: current.disc_speed,
            distance_thrown: current.distance_thrown,
            point_amount: current.point_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FrameTimestamp, SessionSnapshot};

    fn frame(index: u32, last_score: Option<LastScoreInfo>) -> SessionFrame {
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
                teams: vec![],
                game_clock_display: "".into(),
                pause: "none".into(),
                last_throw: None,
                last_score,
                userid: None,
                rules_changed_at: None,
            },
            None,
        )
    }

    #[test]
    fn fires_on_new_and_changed_score() {
        let mut sensor = GoalScoredSensor::new();
        assert_eq!(sensor.add_frame(Some(&frame(0, None))), None);
        let score = LastScoreInfo {
            person_scored: "blue".into(),
            disc_speed: 10.0,
            distance_thrown: 5.0,
            point_amount: 2,
        };
        assert!(sensor
            .add_frame(Some(&frame(1, Some(score.clone()))))
            .is_some());
        // unchanged: no event
        assert_eq!(
            sensor.add_frame(Some(&frame(2, Some(score.clone())))),
            None
        );
    }
}
