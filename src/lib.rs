#![allow(clippy::result_large_err)]

//! # nevrcap
//!
//! [`nevrcap`](crate) ingests raw lobby-session telemetry from a VR sports
//! game, derives semantic events by diffing consecutive frames, and
//! persists the resulting frame stream in two on-disk codecs.
//!
//! ## Overview of key components
//!
//! - **[`processor::FrameProcessor`]**: parses raw engine-dialect JSON
//!   payloads into [`schema::SessionFrame`]s, assigns each a monotonic
//!   index, and forwards it to an [`detector::EventDetector`].
//! - **[`detector::EventDetector`]**: orchestrates the frame ring
//!   ([`ring::FrameRing`]), the 14 stock sensors in [`sensors`], and the
//!   built-in game-status transition detector, publishing event batches
//!   either synchronously or from a background worker task.
//! - **[`sensors::Sensor`]**: the single-method contract every concrete
//!   sensor implements — roster, emote, scoreboard, goal, disc possession,
//!   stat bursts, and round/match/pause transitions.
//! - **[`codec::native`]**: the Zstd-compressed, varint-length-delimited
//!   `.nevrcap` binary format.
//! - **[`codec::legacy`]**: the ZIP+TSV+JSON `.echoreplay` format, with its
//!   byte-exact compatibility rewrites.
//! - **[`convert`]**: streaming transcoders between the two codecs.
//!
//! ## Example
//!
//! ```no_run
//! use nevrcap::processor::FrameProcessor;
//! use nevrcap::detector::EventDetectorOptions;
//! use nevrcap::schema::FrameTimestamp;
//!
//! # fn main() -> nevrcap::error::NevrcapResult<()> {
//! let mut processor = FrameProcessor::new_synchronous(EventDetectorOptions::default());
//! let session = br#"{"session_id":"s","game_status":"playing","blue_points":0,
//!     "orange_points":0,"blue_round_score":0,"orange_round_score":0,"teams":[],
//!     "game_clock_display":"","pause":"none"}"#;
//! let frame = processor.process_frame(session, None, FrameTimestamp::now())?;
//! assert_eq!(frame.frame_index, 0);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod convert;
pub mod detector;
pub mod error;
pub mod processor;
pub mod ring;
pub mod schema;
pub mod sensors;

pub use crate::detector::{EventDetector, EventDetectorOptions};
pub use crate::error::{NevrcapError, NevrcapErrorKind, NevrcapResult};
pub use crate::processor::FrameProcessor;
pub use crate::ring::FrameRing;
pub use crate::schema::{Event, Header, SessionFrame, SessionSnapshot};
