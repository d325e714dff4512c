use std::collections::HashMap;
use std::collections::VecDeque;

use crate::schema::{Event, SessionFrame, TeamSide};
use crate::sensors::{derive_role, Sensor};

#[derive(Debug, Clone)]
struct Membership {
    display_name: String,
    role: TeamSide,
}

/// Tracks the last-observed roster, keyed by `slot_number`, and derives
/// `PlayerJoined`, `PlayerLeft`, and `PlayerSwitchedTeam` from the diff
/// against the previous frame. Because the `Sensor` contract allows only
/// one event per call, extra transitions observed in a single frame are
/// queued and drained on subsequent calls.
#[derive(Debug, Default)]
pub struct RosterSensor {
    previous: HashMap<i32, Membership>,
    initialized: bool,
    pending: VecDeque<Event>,
}

impl RosterSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for RosterSensor {
    fn add_frame(&mut self, frame: Option<&SessionFrame>) -> Option<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let Some(frame) = frame else { return None };
        let session = &frame.session;

        let mut current: HashMap<i32, Membership> = HashMap::new();
        for member in session.members() {
            current.insert(
                member.slot_number,
                Membership {
                    display_name: member.display_name.clone(),
                    role: derive_role(member.slot_number, member.jersey_number),
                },
            );
        }

        if !self.initialized {
            self.initialized = true;
            self.previous = current;
            return None;
        }

        let mut joined_or_switched: Vec<i32> = current
            .iter()
            .filter(|(slot, membership)| match self.previous.get(slot) {
                None => true,
                Some(prev) => prev.role != membership.role,
            })
            .map(|(slot, _)| *slot)
            .collect();
        joined_or_switched.sort_unstable();

        for slot in joined_or_switched {
            let membership = &current[&slot];
            match self.previous.get(&slot) {
                None => self.pending.push_back(Event::PlayerJoined {
                    slot_number: slot,
                    display_name: membership.display_name.clone(),
                }),
                Some(_) => self.pending.push_back(Event::PlayerSwitchedTeam {
                    slot_number: slot,
                    new_role: membership.role,
                }),
            }
        }

        let mut left: Vec<i32> = self
            .previous
            .keys()
            .filter(|slot| !current.contains_key(slot))
            .copied()
            .collect();
        left.sort_unstable();
        for slot in left {
            self.pending.push_back(Event::PlayerLeft { slot_number: slot });
        }

        self.previous = current;
        self.pending.pop_front()
    }
}
