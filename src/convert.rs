//! Streaming transcoders between the native and legacy codecs, re-running
//! event detection on frames whose `events` arrived empty.

use std::path::Path;

use crate::codec::legacy::{EchoReplayReader, EchoReplayWriter};
use crate::codec::native::{NevrcapReader, NevrcapWriter};
use crate::detector::EventDetectorOptions;
use crate::error::NevrcapResult;
use crate::processor::FrameProcessor;
use crate::schema::{FrameTimestamp, Header};

/// Options governing a single conversion run. `capture_id` overrides the
/// synthesized `converted-<unix-seconds>` identifier used when converting
/// legacy captures to native.
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    pub capture_id: Option<String>,
}

/// Opens `source` as a legacy `.echoreplay` capture and writes it to `dest`
/// as a native `.nevrcap` stream, synthesizing a header and regenerating
/// events for any frame whose `events` arrived empty.
pub fn convert_legacy_to_native(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &ConversionOptions,
) -> NevrcapResult<()> {
    let source = source.as_ref();
    let mut reader = EchoReplayReader::open(source)?;
    let mut writer = NevrcapWriter::create(dest.as_ref())?;

    let capture_id = options
        .capture_id
        .clone()
        .unwrap_or_else(|| format!("converted-{}", chrono::Utc::now().timestamp()));
    let header = Header::new(capture_id, FrameTimestamp::now())
        .with_metadata("source", "echoreplay")
        .with_metadata("source_file", source.display().to_string())
        .with_metadata("converted", "true");
    writer.write_header(&header)?;

    // One processor for the whole stream: event detection is inherently
    // sequential (diffing consecutive frames), so its sensors need to see
    // every frame in order, not just the one currently missing events.
    let mut processor = FrameProcessor::new_synchronous(EventDetectorOptions::default());

    while let Some(mut frame) = reader.read_frame()? {
        if frame.events.is_empty() {
            let session_bytes = serde_json::to_vec(&frame.session)?;
            let bones_bytes = frame
                .player_bones
                .as_ref()
                .map(serde_json::to_vec)
                .transpose()?;
            processor.process_frame(&session_bytes, bones_bytes.as_deref(), frame.timestamp)?;

            let mut regenerated = Vec::new();
            while let Some(batch) = processor.try_recv_events() {
                regenerated.extend(batch);
            }
            frame.events = regenerated;
        }
        writer.write_frame(&frame)?;
    }

    writer.close()?;
    Ok(())
}

/// Opens `source` as a native `.nevrcap` stream and writes it to `dest` as
/// a legacy `.echoreplay` capture. The native header's metadata is logged
/// but has no equivalent field in the legacy format.
pub fn convert_native_to_legacy(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    _options: &ConversionOptions,
) -> NevrcapResult<()> {
    let mut reader = NevrcapReader::open(source.as_ref())?;
    let header = reader.read_header()?;
    log::info!(
        "converting native capture {:?} (created {:?}, {} metadata entries) to legacy format",
        header.capture_id,
        header.created_at,
        header.metadata.len(),
    );

    let mut writer = EchoReplayWriter::create(dest.as_ref())?;
    while let Some(frame) = reader.read_frame()? {
        writer.write_frame(&frame)?;
    }
    writer.finalize()?;
    Ok(())
}
