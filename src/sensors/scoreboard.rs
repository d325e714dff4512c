use crate::schema::{Event, SessionFrame};
use crate::sensors::Sensor;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Scores {
    blue_points: i32,
    orange_points: i32,
    blue_round_score: i32,
    orange_round_score: i32,
}

/// Initializes on the first frame (no event). On each subsequent frame,
/// emits `ScoreboardUpdated` if any of the four score fields changed.
#[derive(Debug, Default)]
pub struct ScoreboardSensor {
    previous: Option<Scores>,
}

impl ScoreboardSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for ScoreboardSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let session = &frame.session;
        let current = Scores {
            blue_points: session.blue_points,
            orange_points: session.orange_points,
            blue_round_score: session.blue_round_score,
            orange_round_score: session.orange_round_score,
        };

        let changed = match self.previous {
            None => false,
            Some(prev) => prev != current,
        };
        let was_uninitialized = self.previous.is_none();
        self.previous = Some(current);

        if was_uninitialized || !changed {
            return None;
        }

        Some(Event::ScoreboardUpdated {
            blue_points: current.blue_points,
            orange_points: current.orange_points,
            blue_round_score: current.blue_round_score,
            orange_round_score: current.orange_round_score,
            game_clock_display: session.game_clock_display.clone(),
        })
    }
}
