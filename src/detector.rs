//! Orchestrates the sensor set and the built-in game-status transition
//! detector, delivering batches of events either synchronously (inline) or
//! asynchronously (via a single background worker task).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::schema::session::game_status;
use crate::schema::{Event, SessionFrame};
use crate::sensors::Sensor;
use crate::ring::FrameRing;

const DEFAULT_RING_CAPACITY: usize = 10;
const DEFAULT_INPUT_QUEUE: usize = 100;
const DEFAULT_OUTPUT_QUEUE: usize = 10;

/// Configuration for [`EventDetector::new`]. `Default` reflects the spec's
/// stated defaults.
pub struct EventDetectorOptions {
    pub ring_capacity: usize,
    pub input_queue_capacity: usize,
    pub output_queue_capacity: usize,
    pub sensors: Vec<Box<dyn Sensor>>,
    pub synchronous: bool,
}

impl Default for EventDetectorOptions {
    fn default() -> Self {
        Self {
            ring_capacity: DEFAULT_RING_CAPACITY,
            input_queue_capacity: DEFAULT_INPUT_QUEUE,
            output_queue_capacity: DEFAULT_OUTPUT_QUEUE,
            sensors: default_sensors(),
            synchronous: false,
        }
    }
}

/// The 14 stock sensors, in the registration order used when a caller
/// doesn't supply their own set.
pub fn default_sensors() -> Vec<Box<dyn Sensor>> {
    use crate::sensors::*;
    vec![
        Box::new(RosterSensor::new()),
        Box::new(EmoteSensor::new()),
        Box::new(ScoreboardSensor::new()),
        Box::new(GoalScoredSensor::new()),
        Box::new(DiscPossessionSensor::new()),
        Box::new(DiscCaughtSensor::new()),
        Box::new(DiscThrownSensor::new()),
        Box::new(StatEventSensor::new()),
        Box::new(RoundStartSensor::new()),
        Box::new(RoundEndSensor::new()),
        Box::new(MatchEndSensor::new()),
        Box::new(PauseSensor::new()),
    ]
}

/// Compares `game_status` of the newest frame against a single
/// previous-status slot. Coexists with `RoundEndSensor`/`MatchEndSensor`;
/// duplicate emission across the two is an accepted, documented contract
/// (spec §9), not a bug — consumers are expected to dedupe by event kind.
#[derive(Debug, Default)]
struct BuiltinTransitionDetector {
    previous_status: Option<String>,
}

impl BuiltinTransitionDetector {
    fn observe(&mut self, frame: &SessionFrame) -> Option<Event> {
        let current = frame.session.game_status.as_str();
        let previous = self.previous_status.replace(current.to_string());

        match previous {
            None if current == game_status::POST_MATCH => Some(Event::MatchEnded { winner: None }),
            None => None,
            Some(prev) if prev == current => None,
            Some(_) if current == game_status::ROUND_OVER => {
                Some(Event::RoundEnded { round: None, winner: None })
            }
            Some(_) if current == game_status::POST_MATCH => Some(Event::MatchEnded { winner: None }),
            Some(_) => None,
        }
    }

    fn reset(&mut self) {
        self.previous_status = None;
    }
}

/// The core of the event-detection pipeline: owns the frame ring, the
/// previous-status slot, the sensor list, and a reusable event-accumulation
/// buffer so the 600 Hz steady-state path allocates O(1) per frame.
struct DetectorCore {
    ring: FrameRing,
    sensors: Vec<Box<dyn Sensor>>,
    builtin: BuiltinTransitionDetector,
    scratch: Vec<Event>,
}

impl DetectorCore {
    fn new(options: &mut EventDetectorOptions) -> Self {
        Self {
            ring: FrameRing::new(options.ring_capacity),
            sensors: std::mem::take(&mut options.sensors),
            builtin: BuiltinTransitionDetector::default(),
            scratch: Vec::new(),
        }
    }

    /// Pushes `frame` into the ring, runs every sensor in registration
    /// order followed by the built-in transition detector, and returns the
    /// accumulated batch (borrowed; caller drains before the next call).
    fn process_frame(&mut self, frame: SessionFrame) -> &[Event] {
        self.ring.push(frame);
        self.scratch.clear();

        let newest = self.ring.last().expect("frame was just pushed");
        for sensor in &mut self.sensors {
            if let Some(event) = sensor.add_frame(Some(newest)) {
                self.scratch.push(event);
                // Burst sensors (roster, emote, stats) queue extra events
                // internally and return them one per call; drain the queue
                // now so the whole burst lands in this frame's batch.
                while let Some(event) = sensor.add_frame(None) {
                    self.scratch.push(event);
                }
            }
        }
        if let Some(event) = self.builtin.observe(newest) {
            self.scratch.push(event);
        }
        &self.scratch
    }

    fn reset(&mut self) {
        self.ring.reset();
        self.builtin.reset();
        for sensor in &mut self.sensors {
            // Sensors have no explicit reset hook (spec §4.3): a driver
            // that wants a clean slate reconstructs the sensor set, which
            // is exactly what happens when a caller calls
            // `EventDetector::new` again. `reset()` here only clears the
            // shared ring/transition state that this detector owns.
            let _ = sensor;
        }
    }
}

/// Batches of events delivered in frame-arrival order, either inline
/// (synchronous mode) or via a background worker (asynchronous mode).
pub struct EventDetector {
    inner: Inner,
    output_rx: std::sync::Mutex<tokio::sync::mpsc::Receiver<Vec<Event>>>,
    output_tx: tokio::sync::mpsc::Sender<Vec<Event>>,
    stopped: Arc<AtomicBool>,
}

enum Inner {
    Sync(std::sync::Mutex<DetectorCore>),
    Async(AsyncInner),
}

struct AsyncInner {
    input_tx: std::sync::Mutex<Option<tokio::sync::mpsc::Sender<SessionFrame>>>,
    worker: std::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl EventDetector {
    pub fn new(mut options: EventDetectorOptions) -> Self {
        let synchronous = options.synchronous;
        let output_capacity = options.output_queue_capacity.max(1);
        let (output_tx, output_rx) = tokio::sync::mpsc::channel(output_capacity);
        let stopped = Arc::new(AtomicBool::new(false));

        let core = DetectorCore::new(&mut options);

        let inner = if synchronous {
            Inner::Sync(std::sync::Mutex::new(core))
        } else {
            let input_capacity = options.input_queue_capacity.max(1);
            let (input_tx, mut input_rx) =
                tokio::sync::mpsc::channel::<SessionFrame>(input_capacity);
            let worker_output_tx = output_tx.clone();
            let mut core = core;
            let handle = tokio::spawn(async move {
                while let Some(frame) = input_rx.recv().await {
                    let batch = core.process_frame(frame).to_vec();
                    // Publication blocks in async mode so downstream
                    // backpressure reaches the worker, never the producer.
                    if worker_output_tx.send(batch).await.is_err() {
                        break;
                    }
                }
            });
            Inner::Async(AsyncInner {
                input_tx: std::sync::Mutex::new(Some(input_tx)),
                worker: std::sync::Mutex::new(Some(handle)),
            })
        };

        Self {
            inner,
            output_rx: std::sync::Mutex::new(output_rx),
            output_tx,
            stopped,
        }
    }

    /// Synchronous constructor convenience: builds a detector that never
    /// spawns a worker, suitable for use without a tokio runtime (e.g. the
    /// converter, where detection must complete before the next frame is
    /// written).
    pub fn new_synchronous(mut options: EventDetectorOptions) -> Self {
        options.synchronous = true;
        Self::new(options)
    }

    /// Feeds one frame to the detector. In synchronous mode, detection
    /// runs inline and the resulting batch is published with a
    /// non-blocking send (dropped on a full output queue). In asynchronous
    /// mode, the frame is enqueued on the bounded input queue with a
    /// non-blocking send; if full, the frame is dropped.
    pub fn process_frame(&self, frame: SessionFrame) {
        match &self.inner {
            Inner::Sync(core) => {
                let mut core = core.lock().expect("detector core mutex poisoned");
                let batch = core.process_frame(frame).to_vec();
                drop(core);
                if let Err(tokio::sync::mpsc::error::TrySendError::Full(_)) =
                    self.output_tx.try_send(batch)
                {
                    log::warn!("synchronous event batch dropped: output queue full");
                }
            }
            Inner::Async(inner) => {
                let guard = inner.input_tx.lock().expect("input sender mutex poisoned");
                if let Some(tx) = guard.as_ref() {
                    if let Err(tokio::sync::mpsc::error::TrySendError::Full(_)) = tx.try_send(frame)
                    {
                        log::warn!("frame dropped: async detector input queue full");
                    }
                }
            }
        }
    }

    /// Receives the next published event batch, if any is currently
    /// available, without blocking.
    pub fn try_recv_events(&self) -> Option<Vec<Event>> {
        self.output_rx
            .lock()
            .expect("output receiver mutex poisoned")
            .try_recv()
            .ok()
    }

    /// Awaits the next published event batch, or `None` once the output
    /// queue has been closed (post-`stop`).
    pub async fn recv_events(&self) -> Option<Vec<Event>> {
        self.output_rx
            .lock()
            .expect("output receiver mutex poisoned")
            .recv()
            .await
    }

    /// Clears the ring, the previous-status slot, and (for the async mode)
    /// leaves sensor state untouched, per spec §4.3 — a caller wanting
    /// fully reconstructed sensors should build a new `EventDetector`.
    pub fn reset(&self) {
        if let Inner::Sync(core) = &self.inner {
            core.lock().expect("detector core mutex poisoned").reset();
        }
        // Resetting an async detector's in-flight core isn't observable
        // from outside the worker task; callers needing a hard reset in
        // async mode should `stop()` and construct a fresh detector.
    }

    /// Idempotent: signals the worker (async mode only), awaits its exit,
    /// and closes the output queue.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Inner::Async(inner) = &self.inner {
            // Dropping the real sender (not just a reference) closes the
            // channel, which unblocks the worker's `recv` loop so it can
            // drain remaining input and exit.
            inner.input_tx.lock().expect("input sender mutex poisoned").take();
            let handle = inner.worker.lock().expect("worker mutex poisoned").take();
            if let Some(handle) = handle {
                let _ = handle.await;
            }
        }
    }
}
