//! Parses raw engine-dialect JSON payloads into frames and feeds them to an
//! [`EventDetector`].

use crate::detector::{EventDetector, EventDetectorOptions};
use crate::error::{NevrcapError, NevrcapErrorKind, NevrcapResult};
use crate::schema::{BonesFrame, FrameTimestamp, SessionFrame, SessionSnapshot};

/// Holds the monotonic frame-index counter and the detector that consumes
/// every frame it builds.
pub struct FrameProcessor {
    next_index: u32,
    detector: EventDetector,
}

impl FrameProcessor {
    pub fn new(options: EventDetectorOptions) -> Self {
        Self {
            next_index: 0,
            detector: EventDetector::new(options),
        }
    }

    /// Builds a processor whose detector never spawns a background worker.
    pub fn new_synchronous(options: EventDetectorOptions) -> Self {
        Self {
            next_index: 0,
            detector: EventDetector::new_synchronous(options),
        }
    }

    /// Parses `session_bytes` (required) and `bones_bytes` (optional) as
    /// engine-dialect JSON, builds a frame with the next monotonic index and
    /// the supplied timestamp, and forwards it to the detector. Returns the
    /// constructed frame; its `events` field may still be empty since
    /// detection can complete after this call returns (async mode).
    pub fn process_frame(
        &mut self,
        session_bytes: &[u8],
        bones_bytes: Option<&[u8]>,
        timestamp: FrameTimestamp,
    ) -> NevrcapResult<SessionFrame> {
        let session: SessionSnapshot = serde_json::from_slice(session_bytes)
            .map_err(|source| NevrcapError::new(NevrcapErrorKind::SessionJson(source)))?;

        let bones = match bones_bytes {
            Some(bytes) if !bytes.is_empty() => {
                let bones: BonesFrame = serde_json::from_slice(bytes)
                    .map_err(|source| NevrcapError::new(NevrcapErrorKind::BonesJson(source)))?;
                Some(bones)
            }
            _ => None,
        };

        let frame = SessionFrame::new(self.next_index, timestamp, session, bones);
        self.next_index += 1;
        self.detector.process_frame(frame.clone());
        Ok(frame)
    }

    /// Polls for the next published event batch without blocking.
    pub fn try_recv_events(&self) -> Option<Vec<crate::schema::Event>> {
        self.detector.try_recv_events()
    }

    /// Awaits the next published event batch.
    pub async fn recv_events(&self) -> Option<Vec<crate::schema::Event>> {
        self.detector.recv_events().await
    }

    /// Zeros the frame-index counter and resets the detector's ring and
    /// transition state.
    pub fn reset(&mut self) {
        self.next_index = 0;
        self.detector.reset();
    }

    pub async fn stop(&self) {
        self.detector.stop().await;
    }
}
