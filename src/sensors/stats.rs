use std::collections::{HashMap, VecDeque};

use crate::schema::{Event, PlayerStats, SessionFrame};
use crate::sensors::Sensor;

/// Per-slot stat snapshot plus the previous frame's possessor, needed to
/// attribute steal victims.
#[derive(Debug, Default)]
pub struct StatEventSensor {
    previous_stats: HashMap<i32, PlayerStats>,
    previous_possessor: Option<i32>,
    initialized: bool,
    pending: VecDeque<Event>,
}

impl StatEventSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `count` copies of a per-unit event, built by `build`, which
    /// receives the running total (1-indexed) for that unit.
    fn enqueue_units<F: Fn(u32) -> Event>(
        pending: &mut VecDeque<Event>,
        base_total: u32,
        delta: u32,
        build: F,
    ) {
        for i in 1..=delta {
            pending.push_back(build(base_total + i));
        }
    }
}

impl Sensor for StatEventSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let Some(frame) = frame else {
            // No new frame, but the pending queue may still have been
            // drained above; nothing further to produce this call.
            return None;
        };

        let victim_slot = self.previous_possessor.unwrap_or(-1);
        let mut current_stats: HashMap<i32, PlayerStats> = HashMap::new();

        if self.initialized {
            for member in frame.session.members() {
                let stats = member.stats.unwrap_or_default();
                current_stats.insert(member.slot_number, stats);
                let previous = self
                    .previous_stats
                    .get(&member.slot_number)
                    .copied()
                    .unwrap_or_default();
                let delta = stats.deltas_from(&previous);
                let slot = member.slot_number;

                Self::enqueue_units(&mut self.pending, previous.saves, delta.saves, move |total| {
                    Event::PlayerSave {
                        slot_number: slot,
                        total,
                    }
                });
                Self::enqueue_units(&mut self.pending, previous.stuns, delta.stuns, move |total| {
                    Event::PlayerStun {
                        slot_number: slot,
                        total,
                    }
                });
                Self::enqueue_units(
                    &mut self.pending,
                    previous.passes,
                    delta.passes,
                    move |total| Event::PlayerPass {
                        slot_number: slot,
                        total,
                    },
                );
                Self::enqueue_units(
                    &mut self.pending,
                    previous.steals,
                    delta.steals,
                    move |total| Event::PlayerSteal {
                        slot_number: slot,
                        victim_slot,
                        total,
                    },
                );
                Self::enqueue_units(
                    &mut self.pending,
                    previous.blocks,
                    delta.blocks,
                    move |total| Event::PlayerBlock {
                        slot_number: slot,
                        total,
                    },
                );
                Self::enqueue_units(
                    &mut self.pending,
                    previous.interceptions,
                    delta.interceptions,
                    move |total| Event::PlayerInterception {
                        slot_number: slot,
                        total,
                    },
                );
                Self::enqueue_units(
                    &mut self.pending,
                    previous.assists,
                    delta.assists,
                    move |total| Event::PlayerAssist {
                        slot_number: slot,
                        total,
                    },
                );
                Self::enqueue_units(
                    &mut self.pending,
                    previous.shots_taken,
                    delta.shots_taken,
                    move |total| Event::PlayerShotTaken {
                        slot_number: slot,
                        total,
                    },
                );
                // Goal events carry the point-delta, defaulting to 2 per
                // goal if the derivation from total points fails (e.g. the
                // points counter didn't move in lockstep with goals).
                let point_delta_per_goal = if delta.points == 0 {
                    2
                } else {
                    (delta.points / delta.goals).max(1)
                };
                for _ in 0..delta.goals {
                    self.pending.push_back(Event::PlayerGoal {
                        slot_number: slot,
                        point_amount: point_delta_per_goal,
                    });
                }
            }
        } else {
            for member in frame.session.members() {
                current_stats.insert(member.slot_number, member.stats.unwrap_or_default());
            }
        }

        self.initialized = true;
        self.previous_stats = current_stats;
        self.previous_possessor = Some(frame.session.possessor_slot());

        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FrameTimestamp, SessionSnapshot, Team, TeamMember};

    fn frame(index: u32, slot: i32, stats: PlayerStats) -> SessionFrame {
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
                teams: vec![Team {
                    members: vec![TeamMember {
                        slot_number: slot,
                        display_name: "p".into(),
                        jersey_number: slot,
                        has_possession: false,
                        is_emote_playing: false,
                        stats: Some(stats),
                    }],
                }],
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
    fn stat_burst_emits_one_event_per_unit_in_order() {
        let mut sensor = StatEventSensor::new();
        assert_eq!(
            sensor.add_frame(Some(&frame(0, 1, PlayerStats::default()))),
            None
        );

        let bumped = PlayerStats {
            stuns: 2,
            passes: 1,
            ..Default::default()
        };
        let mut events = vec![sensor.add_frame(Some(&frame(1, 1, bumped))).unwrap()];
        while let Some(event) = sensor.add_frame(None) {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                Event::PlayerStun {
                    slot_number: 1,
                    total: 1
                },
                Event::PlayerStun {
                    slot_number: 1,
                    total: 2
                },
                Event::PlayerPass {
                    slot_number: 1,
                    total: 1
                },
            ]
        );
    }

    #[test]
    fn goal_without_matching_point_delta_defaults_to_two_points() {
        let mut sensor = StatEventSensor::new();
        assert_eq!(
            sensor.add_frame(Some(&frame(0, 1, PlayerStats::default()))),
            None
        );

        // Goals counter moved but the points counter didn't follow —
        // derivation fails and the fallback of 2 points per goal applies.
        let bumped = PlayerStats {
            goals: 1,
            ..Default::default()
        };
        assert_eq!(
            sensor.add_frame(Some(&frame(1, 1, bumped))),
            Some(Event::PlayerGoal {
                slot_number: 1,
                point_amount: 2,
            })
        );
    }
}
