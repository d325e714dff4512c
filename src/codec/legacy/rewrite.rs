//! The two byte-level compatibility rewrites applied to schema-JSON before
//! it is written into a `.echoreplay` entry: unquoting `userid`/
//! `rules_changed_at` and eliminating scientific notation. Both operate on
//! the serialized bytes directly rather than re-walking a `serde_json::Value`
//! tree, since the rewrites are purely textual and the source they were
//! inherited from defines them at the byte level.

const USERID_KEY: &[u8] = b"\"userid\":\"";
const RULES_CHANGED_KEY: &[u8] = b"\"rules_changed_at\":\"";

/// Unquotes bare-digit runs immediately following `"userid":"` or
/// `"rules_changed_at":"`, leaving everything else untouched.
///
/// Anchored strictly on the key-colon-quote prefix, and requires every
/// following byte up to the closing quote to be an ASCII digit: this is the
/// fix for the reported session-id corruption bug, where a looser match
/// over-rewrote unrelated quoted digit runs (e.g. inside `session_id`).
pub fn unquote_uint64_fields(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if let Some(rewritten) = try_unquote_at(input, i, USERID_KEY)
            .or_else(|| try_unquote_at(input, i, RULES_CHANGED_KEY))
        {
            let (key_and_digits, consumed) = rewritten;
            out.extend_from_slice(&key_and_digits);
            i += consumed;
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    out
}

/// If `input[pos..]` starts with `key` followed by a run of one or more
/// ASCII digits and a closing `"`, returns the rewritten bytes (key sans
/// trailing quote, plus the bare digits) and how many input bytes were
/// consumed (key + digits + closing quote).
fn try_unquote_at(input: &[u8], pos: usize, key: &[u8]) -> Option<(Vec<u8>, usize)> {
    if !input[pos..].starts_with(key) {
        return None;
    }
    let digits_start = pos + key.len();
    let mut end = digits_start;
    while end < input.len() && input[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    if input.get(end) != Some(&b'"') {
        return None;
    }

    let mut rewritten = Vec::with_capacity(key.len() + (end - digits_start));
    // Drop the trailing `"` from the key so the digits are emitted bare.
    rewritten.extend_from_slice(&key[..key.len() - 1]);
    rewritten.extend_from_slice(&input[digits_start..end]);
    Some((rewritten, end + 1 - pos))
}

/// Replaces scientific-notation numeric tokens (`[-]digits[.digits](e|E)[+-]digits`)
/// outside string literals with their full-precision decimal expansion.
/// Tokens inside string literals (tracked via a simple in-string flag that
/// honors backslash escapes) are left untouched.
pub fn eliminate_exponents(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    let mut in_string = false;
    let mut escaped = false;

    while i < input.len() {
        let byte = input[i];

        if in_string {
            out.push(byte);
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if byte == b'"' {
            in_string = true;
            out.push(byte);
            i += 1;
            continue;
        }

        if let Some((token_len, expanded)) = try_match_exponent_token(&input[i..]) {
            out.extend_from_slice(expanded.as_bytes());
            i += token_len;
            continue;
        }

        out.push(byte);
        i += 1;
    }

    out
}

/// Attempts to match a scientific-notation token at the start of `input`.
/// Returns the token's byte length and its decimal expansion.
fn try_match_exponent_token(input: &[u8]) -> Option<(usize, String)> {
    let mut i = 0;
    if input.get(i) == Some(&b'-') {
        i += 1;
    }
    let digits_start = i;
    while input.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if input.get(i) == Some(&b'.') {
        i += 1;
        let frac_start = i;
        while input.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    }

    let exponent_marker = i;
    match input.get(exponent_marker) {
        Some(b'e') | Some(b'E') => {}
        _ => return None,
    }
    let mut j = exponent_marker + 1;
    if matches!(input.get(j), Some(b'+') | Some(b'-')) {
        j += 1;
    }
    let exp_digits_start = j;
    while input.get(j).is_some_and(u8::is_ascii_digit) {
        j += 1;
    }
    if j == exp_digits_start {
        return None;
    }

    let token = std::str::from_utf8(&input[..j]).ok()?;
    let value: f64 = token.parse().ok()?;
    Some((j, format_decimal(value)))
}

/// Formats `value` as a decimal-only string. Rust's default `f64` `Display`
/// never emits scientific notation and uses the shortest digit sequence
/// that round-trips back to the same double, which is exactly the
/// "decimal-only expansion at full double precision" the rewrite calls for.
fn format_decimal(value: f64) -> String {
    format!("{value}")
}
