//! Strongly typed records for lobby-session telemetry.
//!
//! Every type here is the schema-defined shape that both streaming codecs
//! (native and legacy) serialize. They derive [`serde::Serialize`] /
//! [`serde::Deserialize`] for the legacy JSON dialect and general interop,
//! and [`ts_rs::TS`] so the schema can be exported for consumers written in
//! other languages without hand-maintaining a parallel definition.

pub mod event;
pub mod frame;
pub mod header;
pub mod session;
pub mod stats;

pub use event::*;
pub use frame::*;
pub use header::*;
pub use session::*;
pub use stats::*;
