//! The `.nevrcap` binary codec: a Zstd-compressed stream of varint-prefixed,
//! bincode-encoded records — one `Header` followed by any number of
//! `SessionFrame`s.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::codec::varint::{read_length_prefixed, write_length_prefixed};
use crate::error::{NevrcapError, NevrcapErrorKind, NevrcapResult};
use crate::schema::{Header, SessionFrame};

const ZSTD_FASTEST_LEVEL: i32 = 1;

/// Writes a `.nevrcap` stream: `write_header` must be called exactly once,
/// before any `write_frame` call. `close` finalizes the Zstd stream and the
/// underlying file; it is idempotent.
pub struct NevrcapWriter {
    encoder: Option<zstd::stream::write::Encoder<'static, BufWriter<File>>>,
    header_written: bool,
    scratch: Vec<u8>,
    length_scratch: Vec<u8>,
}

impl NevrcapWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> NevrcapResult<Self> {
        let file = File::create(path)?;
        let encoder = zstd::stream::write::Encoder::new(BufWriter::new(file), ZSTD_FASTEST_LEVEL)?;
        Ok(Self {
            encoder: Some(encoder),
            header_written: false,
            scratch: Vec::new(),
            length_scratch: Vec::new(),
        })
    }

    pub fn write_header(&mut self, header: &Header) -> NevrcapResult<()> {
        if self.header_written {
            return Err(NevrcapError::new(NevrcapErrorKind::HeaderAlreadyWritten));
        }
        self.write_record(header)?;
        self.header_written = true;
        Ok(())
    }

    pub fn write_frame(&mut self, frame: &SessionFrame) -> NevrcapResult<()> {
        if !self.header_written {
            return Err(NevrcapError::new(NevrcapErrorKind::HeaderNotWritten));
        }
        self.write_record(frame)
    }

    fn write_record<T: serde::Serialize>(&mut self, record: &T) -> NevrcapResult<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| NevrcapError::new(NevrcapErrorKind::FinalizeAfterClose))?;

        self.scratch.clear();
        bincode::serialize_into(&mut self.scratch, record)?;
        write_length_prefixed(encoder, &self.scratch, &mut self.length_scratch)
    }

    /// Finalizes the Zstd stream then the file. Safe to call more than
    /// once; subsequent calls are a no-op.
    pub fn close(&mut self) -> NevrcapResult<()> {
        if let Some(encoder) = self.encoder.take() {
            let mut writer = encoder.finish()?;
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for NevrcapWriter {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("error closing nevrcap writer during drop: {err}");
        }
    }
}

/// Reads a `.nevrcap` stream. `read_header` must be called before the
/// first `read_frame`.
pub struct NevrcapReader {
    decoder: Option<zstd::stream::read::Decoder<'static, BufReader<File>>>,
    header_read: bool,
    scratch: Vec<u8>,
}

impl NevrcapReader {
    pub fn open<P: AsRef<Path>>(path: P) -> NevrcapResult<Self> {
        let file = File::open(path)?;
        let decoder = zstd::stream::read::Decoder::new(BufReader::new(file))?;
        Ok(Self {
            decoder: Some(decoder),
            header_read: false,
            scratch: Vec::new(),
        })
    }

    pub fn read_header(&mut self) -> NevrcapResult<Header> {
        if self.header_read {
            return Err(NevrcapError::new(NevrcapErrorKind::HeaderAlreadyRead));
        }
        let header = self.read_record::<Header>()?.ok_or_else(|| {
            NevrcapError::new(NevrcapErrorKind::ExhaustedStream)
        })?;
        self.header_read = true;
        Ok(header)
    }

    /// Returns the next frame, or `Ok(None)` on a clean end-of-stream.
    pub fn read_frame(&mut self) -> NevrcapResult<Option<SessionFrame>> {
        if !self.header_read {
            return Err(NevrcapError::new(NevrcapErrorKind::HeaderNotRead));
        }
        self.read_record()
    }

    /// Allocation-free variant of `read_frame`: overwrites `existing`
    /// in place and returns whether a frame was read.
    pub fn read_frame_into(&mut self, existing: &mut SessionFrame) -> NevrcapResult<bool> {
        if !self.header_read {
            return Err(NevrcapError::new(NevrcapErrorKind::HeaderNotRead));
        }
        match self.read_frame()? {
            Some(frame) => {
                *existing = frame;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read_record<T: serde::de::DeserializeOwned>(&mut self) -> NevrcapResult<Option<T>> {
        let decoder = self
            .decoder
            .as_mut()
            .ok_or_else(|| NevrcapError::new(NevrcapErrorKind::ExhaustedStream))?;

        if !read_length_prefixed(decoder, &mut self.scratch)? {
            return Ok(None);
        }
        let record = bincode::deserialize(&self.scratch)?;
        Ok(Some(record))
    }

    pub fn close(&mut self) -> NevrcapResult<()> {
        self.decoder.take();
        Ok(())
    }
}

impl Drop for NevrcapReader {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FrameTimestamp, SessionSnapshot};

    fn sample_frame(index: u32) -> SessionFrame {
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
    fn round_trips_header_and_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.nevrcap");

        let header = Header::new("cap-1", FrameTimestamp::new(1000, 0));
        {
            let mut writer = NevrcapWriter::create(&path).unwrap();
            writer.write_header(&header).unwrap();
            writer.write_frame(&sample_frame(0)).unwrap();
            writer.write_frame(&sample_frame(1)).unwrap();
            writer.close().unwrap();
        }

        let mut reader = NevrcapReader::open(&path).unwrap();
        let read_header = reader.read_header().unwrap();
        assert_eq!(read_header.capture_id, "cap-1");

        let first = reader.read_frame().unwrap().unwrap();
        let second = reader.read_frame().unwrap().unwrap();
        assert_eq!(first.frame_index, 0);
        assert_eq!(second.frame_index, 1);
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn writing_frame_before_header_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.nevrcap");
        let mut writer = NevrcapWriter::create(&path).unwrap();
        let err = writer.write_frame(&sample_frame(0)).unwrap_err();
        assert!(matches!(err.kind, NevrcapErrorKind::HeaderNotWritten));
    }

    #[test]
    fn double_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.nevrcap");
        let mut writer = NevrcapWriter::create(&path).unwrap();
        writer
            .write_header(&Header::new("cap", FrameTimestamp::new(0, 0)))
            .unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
    }
}
