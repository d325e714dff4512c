//! The `.echoreplay` legacy codec: a ZIP archive containing one CRLF-line,
//! tab-separated text entry whose payloads are schema-JSON rewritten to the
//! game engine's idiosyncratic dialect (bare uint64s, decimal-only floats).

mod rewrite;
mod timestamp;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;

use crate::error::{NevrcapError, NevrcapErrorKind, NevrcapResult};
use crate::schema::{BonesFrame, FrameTimestamp, SessionFrame, SessionSnapshot};

pub use timestamp::{format_timestamp, parse_timestamp};

/// Minimum per-line scanner buffer, large enough to accommodate the
/// largest observed frame payload.
const MIN_LINE_BUFFER: usize = 10 * 1024 * 1024;

fn entry_base_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("capture")
        .to_string()
}

fn entry_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("capture.echoreplay")
        .to_string()
}

/// Renders one frame as a TSV line (without the trailing `\r\n`): two
/// fields when bones is absent or empty, three when present.
fn render_line(frame: &SessionFrame) -> NevrcapResult<String> {
    let session_json = serde_json::to_vec(&frame.session)?;
    let session_json = rewrite::eliminate_exponents(&rewrite::unquote_uint64_fields(&session_json));
    let ts = format_timestamp(frame.timestamp);

    let bones_is_empty = frame
        .player_bones
        .as_ref()
        .map(BonesFrame::is_empty)
        .unwrap_or(true);

    if bones_is_empty {
        Ok(format!(
            "{ts}\t{}",
            String::from_utf8_lossy(&session_json)
        ))
    } else {
        let bones_json = serde_json::to_vec(frame.player_bones.as_ref().unwrap())?;
        let bones_json = rewrite::eliminate_exponents(&rewrite::unquote_uint64_fields(&bones_json));
        Ok(format!(
            "{ts}\t{}\t {}",
            String::from_utf8_lossy(&session_json),
            String::from_utf8_lossy(&bones_json)
        ))
    }
}

/// Parses one TSV line into a `(timestamp, session, bones)` triple.
/// Returns `None` for any line that fails to parse — the resilient-reader
/// contract: malformed lines are silently skipped, not errors. A line at or
/// beyond the scanner buffer capacity is treated the same way rather than
/// attempting to parse a payload the streaming reader was never sized for.
fn parse_line(line: &str) -> Option<(FrameTimestamp, SessionSnapshot, Option<BonesFrame>)> {
    if line.len() > MIN_LINE_BUFFER {
        return None;
    }
    let mut fields = line.splitn(3, '\t');
    let ts_field = fields.next()?;
    let session_field = fields.next()?;
    let bones_field = fields.next();

    let timestamp = parse_timestamp(ts_field).ok()?;
    let session: SessionSnapshot = serde_json::from_str(session_field).ok()?;
    let bones = match bones_field {
        Some(raw) => {
            let raw = raw.strip_prefix(' ').unwrap_or(raw);
            serde_json::from_str::<BonesFrame>(raw).ok()
        }
        None => None,
    };

    Some((timestamp, session, bones))
}

/// Buffers frames in memory and writes the single ZIP entry on
/// `finalize`/`close`.
pub struct EchoReplayWriter {
    path: PathBuf,
    lines: Vec<String>,
    finalized: bool,
}

impl EchoReplayWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> NevrcapResult<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            lines: Vec::new(),
            finalized: false,
        })
    }

    pub fn write_frame(&mut self, frame: &SessionFrame) -> NevrcapResult<()> {
        if self.finalized {
            return Err(NevrcapError::new(NevrcapErrorKind::FinalizeAfterClose));
        }
        self.lines.push(render_line(frame)?);
        Ok(())
    }

    /// Writes the accumulated buffer to the ZIP entry in one pass.
    /// Idempotent: a second call is a no-op.
    pub fn finalize(&mut self) -> NevrcapResult<()> {
        if self.finalized {
            return Ok(());
        }
        let file = File::create(&self.path)?;
        let mut zip = zip::ZipWriter::new(BufWriter::new(file));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(entry_file_name(&self.path), options)?;
        for line in &self.lines {
            zip.write_all(line.as_bytes())?;
            zip.write_all(b"\r\n")?;
        }
        zip.finish()?;
        self.finalized = true;
        Ok(())
    }

    pub fn close(&mut self) -> NevrcapResult<()> {
        self.finalize()
    }
}

impl Drop for EchoReplayWriter {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("error closing echoreplay writer during drop: {err}");
        }
    }
}

/// Reads `.echoreplay` frames one line at a time, decompressing the ZIP
/// entry incrementally instead of loading it whole. At most one line's
/// worth of bytes, capped at `MIN_LINE_BUFFER`, plus the decompressor's own
/// small internal buffer, is ever held in memory regardless of capture
/// size. Malformed lines are skipped silently while still advancing the
/// index only for accepted frames.
pub struct EchoReplayReader {
    // Borrows `*archive`'s underlying reader; must drop before `archive`.
    // Struct fields drop in declaration order, so `entry` is listed first.
    entry: BufReader<zip::read::ZipFile<'static>>,
    // Kept alive only to back `entry`'s borrow — never accessed directly.
    archive: Box<zip::ZipArchive<BufReader<File>>>,
    scratch: Vec<u8>,
    eof: bool,
    next_index: u32,
}

impl EchoReplayReader {
    pub fn open<P: AsRef<Path>>(path: P) -> NevrcapResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut archive = Box::new(zip::ZipArchive::new(BufReader::new(file))?);

        let base_name = entry_base_name(path);
        let entry_name = (0..archive.len())
            .map(|i| archive.by_index(i).map(|f| f.name().to_string()))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .find(|name| name == &base_name)
            .or_else(|| {
                (0..archive.len())
                    .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
                    .find(|name| name.ends_with(".echoreplay"))
            })
            .ok_or_else(|| {
                NevrcapError::new(NevrcapErrorKind::ZipEntryMissing {
                    archive_base: base_name.clone(),
                })
            })?;

        // SAFETY: `entry` borrows `*archive` via the `&mut` that `by_name`
        // takes. `archive` lives behind a stable heap allocation and is
        // never touched again after this point, so extending the borrow to
        // `'static` is sound provided `entry` drops before `archive` —
        // guaranteed by field declaration order above.
        let entry: zip::read::ZipFile<'static> = unsafe {
            std::mem::transmute::<zip::read::ZipFile<'_>, zip::read::ZipFile<'static>>(
                archive.by_name(&entry_name)?,
            )
        };

        Ok(Self {
            entry: BufReader::new(entry),
            archive,
            scratch: Vec::with_capacity(4096),
            eof: false,
            next_index: 0,
        })
    }

    /// Scans forward for the next `\n`-terminated line (a trailing `\r` is
    /// trimmed), capping the accumulated buffer at `MIN_LINE_BUFFER`. A line
    /// that exceeds the cap before a terminator is found is discarded up to
    /// the next terminator or EOF and treated as unparseable, mirroring
    /// `parse_line`'s own length check.
    fn next_line(&mut self) -> NevrcapResult<Option<String>> {
        loop {
            if self.eof {
                return Ok(None);
            }
            self.scratch.clear();
            let mut oversized = false;
            loop {
                let buf = self.entry.fill_buf()?;
                if buf.is_empty() {
                    self.eof = true;
                    break;
                }
                match buf.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        if !oversized {
                            self.scratch.extend_from_slice(&buf[..pos]);
                        }
                        self.entry.consume(pos + 1);
                        break;
                    }
                    None => {
                        if !oversized && self.scratch.len() + buf.len() <= MIN_LINE_BUFFER {
                            self.scratch.extend_from_slice(buf);
                        } else {
                            oversized = true;
                        }
                        let consumed = buf.len();
                        self.entry.consume(consumed);
                    }
                }
            }

            if oversized {
                log::warn!("skipping echoreplay line exceeding {MIN_LINE_BUFFER} bytes");
                continue;
            }
            if self.scratch.last() == Some(&b'\r') {
                self.scratch.pop();
            }
            if self.scratch.is_empty() {
                continue;
            }
            return Ok(Some(String::from_utf8_lossy(&self.scratch).into_owned()));
        }
    }

    /// Returns the next accepted frame, or `None` once all lines have been
    /// consumed. Unparseable lines are skipped without incrementing the
    /// returned frame's index.
    pub fn read_frame(&mut self) -> NevrcapResult<Option<SessionFrame>> {
        while let Some(line) = self.next_line()? {
            let Some((timestamp, session, bones)) = parse_line(&line) else {
                log::warn!("skipping unparseable echoreplay line");
                continue;
            };
            let frame = SessionFrame::new(self.next_index, timestamp, session, bones);
            self.next_index += 1;
            return Ok(Some(frame));
        }
        Ok(None)
    }

    pub fn read_frame_into(&mut self, existing: &mut SessionFrame) -> NevrcapResult<bool> {
        match self.read_frame()? {
            Some(frame) => {
                *existing = frame;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reads up to `slice.len()` frames, returning how many were filled.
    pub fn read_into(&mut self, slice: &mut [SessionFrame]) -> NevrcapResult<usize> {
        let mut filled = 0;
        for entry in slice.iter_mut() {
            match self.read_frame()? {
                Some(frame) => {
                    *entry = frame;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }

    pub fn read_all(&mut self) -> NevrcapResult<Vec<SessionFrame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.read_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    pub fn close(&mut self) -> NevrcapResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BonePose, Team, TeamMember};
    use std::collections::BTreeMap;

    fn sample_session(session_id: &str) -> SessionSnapshot {
        SessionSnapshot {
            session_id: session_id.into(),
            game_status: "playing".into(),
            blue_points: 1,
            orange_points: 2,
            blue_round_score: 0,
            orange_round_score: 0,
            teams: vec![Team {
                members: vec![TeamMember {
                    slot_number: 0,
                    display_name: "p".into(),
                    jersey_number: 0,
                    has_possession: false,
                    is_emote_playing: false,
                    stats: None,
                }],
            }],
            game_clock_display: "05:00".into(),
            pause: "none".into(),
            last_throw: None,
            last_score: None,
            userid: Some(4355631379520676917),
            rules_changed_at: None,
        }
    }

    #[test]
    fn round_trips_timestamp_and_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.echoreplay");

        let ts = parse_timestamp("2026/01/20 04:50:55.024").unwrap();
        let frame = SessionFrame::new(0, ts, sample_session("s-1"), None);

        {
            let mut writer = EchoReplayWriter::create(&path).unwrap();
            writer.write_frame(&frame).unwrap();
            writer.finalize().unwrap();
        }

        let mut reader = EchoReplayReader::open(&path).unwrap();
        let read_back = reader.read_frame().unwrap().unwrap();
        assert_eq!(read_back.timestamp.to_millis(), ts.to_millis());
        assert_eq!(read_back.session.session_id, "s-1");
        assert_eq!(read_back.session.userid, Some(4355631379520676917));
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn empty_bones_collapses_to_two_field_line() {
        let ts = parse_timestamp("2026/01/20 04:50:55.024").unwrap();
        let mut frame = SessionFrame::new(0, ts, sample_session("s-2"), None);
        frame.player_bones = Some(BonesFrame::default());
        let line = render_line(&frame).unwrap();
        assert_eq!(line.matches('\t').count(), 1);
    }

    #[test]
    fn non_empty_bones_produces_three_field_line_with_leading_space() {
        let ts = parse_timestamp("2026/01/20 04:50:55.024").unwrap();
        let mut bones = BTreeMap::new();
        bones.insert(
            "0".to_string(),
            vec![BonePose {
                name: "hand".into(),
                position: [0.0, 1.0, 2.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
            }],
        );
        let mut frame = SessionFrame::new(0, ts, sample_session("s-3"), None);
        frame.player_bones = Some(BonesFrame(bones));
        let line = render_line(&frame).unwrap();
        assert_eq!(line.matches('\t').count(), 2);
        assert!(line.split('\t').nth(2).unwrap().starts_with(' '));
    }

    #[test]
    fn malformed_line_is_silently_skipped_and_does_not_consume_an_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.echoreplay");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(BufWriter::new(file));
            let options = SimpleFileOptions::default();
            zip.start_file("capture", options).unwrap();
            zip.write_all(b"not a valid timestamp\tgarbage\r\n").unwrap();
            let ts = "2026/01/20 04:50:55.024";
            let session = serde_json::to_string(&sample_session("s-4")).unwrap();
            zip.write_all(format!("{ts}\t{session}\r\n").as_bytes())
                .unwrap();
            zip.finish().unwrap();
        }

        let mut reader = EchoReplayReader::open(&path).unwrap();
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.frame_index, 0);
        assert_eq!(frame.session.session_id, "s-4");
    }

    #[test]
    fn line_exceeding_scanner_cap_is_skipped_without_consuming_an_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.echoreplay");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(BufWriter::new(file));
            let options = SimpleFileOptions::default();
            zip.start_file("capture", options).unwrap();
            // Deflate-compresses to almost nothing, but decompresses to well
            // past the per-line scanner cap before its terminator.
            let oversized = "a".repeat(MIN_LINE_BUFFER + 1024);
            zip.write_all(format!("{oversized}\r\n").as_bytes())
                .unwrap();
            let ts = "2026/01/20 04:50:55.024";
            let session = serde_json::to_string(&sample_session("s-5")).unwrap();
            zip.write_all(format!("{ts}\t{session}\r\n").as_bytes())
                .unwrap();
            zip.finish().unwrap();
        }

        let mut reader = EchoReplayReader::open(&path).unwrap();
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.frame_index, 0);
        assert_eq!(frame.session.session_id, "s-5");
        assert!(reader.read_frame().unwrap().is_none());
    }
}
