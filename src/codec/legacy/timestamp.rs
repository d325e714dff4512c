//! Positional byte-index encoder/decoder for the legacy codec's 23-byte
//! `YYYY/MM/DD HH:MM:SS.mmm` timestamp, always UTC.
//!
//! Hand-rolled rather than parsed with a format string: at 600 Hz this is
//! the hottest single conversion in the legacy read/write path, and a
//! positional decoder avoids both locale lookups and the allocation a
//! general-purpose date parser would perform per call.

use crate::error::{NevrcapError, NevrcapErrorKind, NevrcapResult};
use crate::schema::FrameTimestamp;

/// Exact on-disk width: `YYYY/MM/DD HH:MM:SS.mmm`.
pub const TIMESTAMP_WIDTH: usize = 23;

fn reject(raw: &str, reason: &'static str) -> NevrcapError {
    NevrcapError::new(NevrcapErrorKind::Timestamp {
        raw: raw.to_string(),
        reason,
    })
}

fn digits(bytes: &[u8], range: std::ops::Range<usize>, raw: &str) -> NevrcapResult<i64> {
    let slice = &bytes[range];
    if !slice.iter().all(u8::is_ascii_digit) {
        return Err(reject(raw, "non-digit byte in timestamp field"));
    }
    // SAFETY-free: already verified ASCII digits above.
    let text = std::str::from_utf8(slice).expect("ascii digits are valid utf8");
    text.parse::<i64>()
        .map_err(|_| reject(raw, "timestamp field overflowed i64"))
}

/// Parses a 23-byte `YYYY/MM/DD HH:MM:SS.mmm` string as UTC.
pub fn parse_timestamp(raw: &str) -> NevrcapResult<FrameTimestamp> {
    let bytes = raw.as_bytes();
    if bytes.len() != TIMESTAMP_WIDTH {
        return Err(reject(raw, "timestamp is not exactly 23 bytes"));
    }
    if bytes[4] != b'/' || bytes[7] != b'/' || bytes[10] != b' ' {
        return Err(reject(raw, "unexpected separator in date portion"));
    }
    if bytes[13] != b':' || bytes[16] != b':' || bytes[19] != b'.' {
        return Err(reject(raw, "unexpected separator in time portion"));
    }

    let year = digits(bytes, 0..4, raw)?;
    let month = digits(bytes, 5..7, raw)?;
    let day = digits(bytes, 8..10, raw)?;
    let hour = digits(bytes, 11..13, raw)?;
    let minute = digits(bytes, 14..16, raw)?;
    let second = digits(bytes, 17..19, raw)?;
    let millis = digits(bytes, 20..23, raw)?;

    let date = chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .ok_or_else(|| reject(raw, "invalid calendar date"))?;
    let time =
        chrono::NaiveTime::from_hms_milli_opt(hour as u32, minute as u32, second as u32, millis as u32)
            .ok_or_else(|| reject(raw, "invalid time of day"))?;

    let naive = chrono::NaiveDateTime::new(date, time);
    let utc = chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(naive, chrono::Utc);
    Ok(FrameTimestamp::from_utc(utc))
}

/// Formats `timestamp` back into the fixed 23-byte layout, always UTC. The
/// previous `time.Local` vs. UTC drift bug in the source is closed here by
/// never consulting the local timezone.
pub fn format_timestamp(timestamp: FrameTimestamp) -> String {
    use chrono::{Datelike, Timelike};
    let utc = timestamp.to_utc();
    format!(
        "{:04}/{:02}/{:02} {:02}:{:02}:{:02}.{:03}",
        utc.year(),
        utc.month(),
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second(),
        utc.timestamp_subsec_millis(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_to_millisecond_precision() {
        let raw = "2026/01/20 04:50:55.024";
        let parsed = parse_timestamp(raw).unwrap();
        assert_eq!(format_timestamp(parsed), raw);
    }

    #[test]
    fn rejects_wrong_width() {
        assert!(parse_timestamp("2026/01/20 04:50:55.0245").is_err());
        assert!(parse_timestamp("2026/01/20 04:50:55.02").is_err());
    }

    #[test]
    fn rejects_non_digit_fields() {
        assert!(parse_timestamp("202X/01/20 04:50:55.024").is_err());
    }

    #[test]
    fn rejects_malformed_separators() {
        assert!(parse_timestamp("2026-01/20 04:50:55.024").is_err());
    }

    #[test]
    fn parse_is_always_utc_regardless_of_process_timezone() {
        let raw = "2026/06/15 23:59:59.999";
        let parsed = parse_timestamp(raw).unwrap();
        assert_eq!(parsed.secs, parsed.to_utc().timestamp());
    }
}
