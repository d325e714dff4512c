//! Fixed-capacity, wraparound frame history. Exclusively owned by the event
//! detector; no locking, single-owner access only.

use crate::schema::SessionFrame;

/// Bounded store of recent frames backed by a fixed-size `Vec` (allocated
/// once at construction, never resized afterward) plus a write cursor and a
/// populated count.
#[derive(Debug)]
pub struct FrameRing {
    slots: Vec<Option<SessionFrame>>,
    cursor: usize,
    count: usize,
}

impl FrameRing {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "FrameRing capacity must be non-zero");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            cursor: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Writes at the cursor, advances it modulo capacity, and grows `count`
    /// until the ring saturates.
    pub fn push(&mut self, frame: SessionFrame) {
        let capacity = self.slots.len();
        self.slots[self.cursor] = Some(frame);
        self.cursor = (self.cursor + 1) % capacity;
        if self.count < capacity {
            self.count += 1;
        }
    }

    /// Frame at `offset` positions before the most recent (0 = newest,
    /// `count - 1` = oldest). `None` if `offset >= len()`.
    pub fn get(&self, offset: usize) -> Option<&SessionFrame> {
        if offset >= self.count {
            return None;
        }
        let capacity = self.slots.len();
        // `cursor` points one past the newest write; walk back `offset + 1`
        // slots, wrapping through capacity to stay non-negative.
        let index = (self.cursor + capacity - 1 - offset) % capacity;
        self.slots[index].as_ref()
    }

    pub fn last(&self) -> Option<&SessionFrame> {
        self.get(0)
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.cursor = 0;
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FrameTimestamp, SessionSnapshot};

    fn frame(index: u32) -> SessionFrame {
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
                last_score: None,
                userid: None,
                rules_changed_at: None,
            },
            None,
        )
    }

    #[test]
    fn last_and_get_follow_saturation() {
        let mut ring = FrameRing::new(4);
        for i in 0..10u32 {
            ring.push(frame(i));
        }
        // len M=10 >= capacity N=4: last() is the Mth frame (index 9),
        // get(N-1) is the (M-N+1)th frame, i.e. index 6.
        assert_eq!(ring.last().unwrap().frame_index, 9);
        assert_eq!(ring.get(3).unwrap().frame_index, 6);
        assert!(ring.get(4).is_none());
    }

    #[test]
    fn empty_ring_has_no_last() {
        let ring = FrameRing::new(3);
        assert!(ring.last().is_none());
        assert!(ring.get(0).is_none());
    }

    #[test]
    fn reset_clears_state() {
        let mut ring = FrameRing::new(2);
        ring.push(frame(0));
        ring.push(frame(1));
        ring.reset();
        assert_eq!(ring.len(), 0);
        assert!(ring.last().is_none());
    }
}
