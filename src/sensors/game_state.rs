use crate::schema::session::{game_status, pause_state};
use crate::schema::{Event, SessionFrame, TeamSide};
use crate::sensors::Sensor;

/// Fires on transition into `playing`/`round_start` from any other state,
/// excluding the very first frame observed.
#[derive(Debug, Default)]
pub struct RoundStartSensor {
    previous_status: Option<String>,
}

impl RoundStartSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for RoundStartSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let current = frame.session.game_status.as_str();
        let previous = self.previous_status.replace(current.to_string());

        let entering_round = current == game_status::PLAYING || current == game_status::ROUND_START;
        match previous {
            None => None,
            Some(prev) if entering_round && prev != current => Some(Event::RoundStarted),
            _ => None,
        }
    }
}

/// Fires on transition into `round_over`, or on a round-score change while
/// still `playing`; attributes the winner to whichever team's round score
/// advanced.
#[derive(Debug, Default)]
pub struct RoundEndSensor {
    previous_status: Option<String>,
    previous_blue_round: Option<i32>,
    previous_orange_round: Option<i32>,
}

impl RoundEndSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for RoundEndSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let session = &frame.session;
        let current_status = session.game_status.clone();

        let prev_status = self.previous_status.replace(current_status.clone());
        let prev_blue = self
            .previous_blue_round
            .replace(session.blue_round_score);
        let prev_orange = self
            .previous_orange_round
            .replace(session.orange_round_score);

        let (Some(prev_status), Some(prev_blue), Some(prev_orange)) =
            (prev_status, prev_blue, prev_orange)
        else {
            return None;
        };

        if current_status == game_status::ROUND_OVER && prev_status != current_status {
            let winner = if session.blue_round_score > prev_blue {
                Some(TeamSide::Blue)
            } else if session.orange_round_score > prev_orange {
                Some(TeamSide::Orange)
            } else {
                None
            };
            return Some(Event::RoundEnded {
                round: Some(session.blue_round_score + session.orange_round_score),
                winner,
            });
        }

        if current_status == game_status::PLAYING {
            if session.blue_round_score > prev_blue {
                return Some(Event::RoundEnded {
                    round: Some(session.blue_round_score),
                    winner: Some(TeamSide::Blue),
                });
            }
            if session.orange_round_score > prev_orange {
                return Some(Event::RoundEnded {
                    round: Some(session.orange_round_score),
                    winner: Some(TeamSide::Orange),
                });
            }
        }

        None
    }
}

/// Fires on transition into `post_match`, attributing the winner by
/// comparing total points (a tie leaves the winner unspecified).
///
/// Unlike `RoundStartSensor`/`RoundEndSensor`, the "previous status" starts
/// as the empty string rather than `None`: per spec §9/scenario 1, a
/// session whose very first observed frame is already `post_match` must
/// still fire here (it also fires, separately, on the built-in transition
/// detector — the duplication is intentional, see §9).
#[derive(Debug)]
pub struct MatchEndSensor {
    previous_status: String,
}

impl Default for MatchEndSensor {
    fn default() -> Self {
        Self {
            previous_status: String::new(),
        }
    }
}

impl MatchEndSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for MatchEndSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let session = &frame.session;
        let current = session.game_status.as_str();
        let previous = std::mem::replace(&mut self.previous_status, current.to_string());

        if current == game_status::POST_MATCH && previous != current {
            let winner = if session.blue_points > session.orange_points {
                Some(TeamSide::Blue)
            } else if session.orange_points > session.blue_points {
                Some(TeamSide::Orange)
            } else {
                None
            };
            Some(Event::MatchEnded { winner })
        } else {
            None
        }
    }
}

/// Fires `RoundPaused` on the edge into a "paused" state and
/// `RoundUnpaused` on the edge out.
#[derive(Debug, Default)]
pub struct PauseSensor {
    previous_pause: Option<String>,
}

impl PauseSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_paused(pause: &str) -> bool {
    pause == pause_state::PAUSED || pause == pause_state::PAUSED_REQUESTED
}

impl Sensor for PauseSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        let frame = frame?;
        let current = frame.session.pause.clone();
        let previous = self.previous_pause.replace(current.clone())?;

        match (is_paused(&previous), is_paused(&current)) {
            (false, true) => Some(Event::RoundPaused),
            (true, false) => Some(Event::RoundUnpaused),
            _ => None,
        }
    }
}
