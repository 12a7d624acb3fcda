//! Shared line-oriented parsing helpers used by both the request and
//! response codecs (spec §4.2). A "line" here always ends in `\r\n`; the
//! declared length of a parameter payload is authoritative, so payload
//! bytes are sliced by length, never by scanning for `\r\n` (spec §4.2
//! "Note").

use crate::error::{Error, Result};

/// Find the end of the next `\r\n`-terminated line starting at `pos`,
/// returning the byte range of the line's content (excluding the
/// terminator) and the offset just past the terminator.
fn next_line(buf: &[u8], pos: usize) -> Result<(std::ops::Range<usize>, usize)> {
    let rest = &buf[pos..];
    let line_end = find(rest, b"\r\n").ok_or(Error::Codec("missing line terminator"))?;
    Ok((pos..pos + line_end, pos + line_end + 2))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse a `Key:<decimal>\r\n` header line at `pos`, verifying the key
/// matches `expected_key`. Returns the parsed value and the offset just
/// past the line.
pub fn parse_keyed_int(buf: &[u8], pos: usize, expected_key: &str) -> Result<(i64, usize)> {
    let (range, next_pos) = next_line(buf, pos)?;
    let line = &buf[range];

    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(Error::Codec("missing colon in header line"))?;

    if &line[..colon] != expected_key.as_bytes() {
        return Err(Error::Codec("unexpected header key"));
    }

    let value_str =
        std::str::from_utf8(&line[colon + 1..]).map_err(|_| Error::Codec("non-utf8 header value"))?;
    let value: i64 = value_str
        .parse()
        .map_err(|_| Error::Codec("non-numeric header value"))?;

    Ok((value, next_pos))
}

/// Emit a `Key:<decimal>\r\n` header line.
pub fn write_keyed_int(out: &mut Vec<u8>, key: &str, value: i64) {
    out.extend_from_slice(key.as_bytes());
    out.push(b':');
    out.extend_from_slice(value.to_string().as_bytes());
    out.extend_from_slice(b"\r\n");
}

/// Parse one `<size>\r\n<bytes>\r\n` parameter block at `pos`. Returns the
/// payload bytes and the offset just past the trailing delimiter.
pub fn parse_param(buf: &[u8], pos: usize) -> Result<(Vec<u8>, usize)> {
    let (size_range, payload_start) = next_line(buf, pos)?;
    let size_str =
        std::str::from_utf8(&buf[size_range]).map_err(|_| Error::Codec("non-utf8 param size"))?;
    let size: usize = size_str
        .parse()
        .map_err(|_| Error::Codec("non-numeric param size"))?;

    let payload_end = payload_start
        .checked_add(size)
        .ok_or(Error::Codec("param size overflow"))?;
    if payload_end + 2 > buf.len() {
        return Err(Error::Codec("declared param size exceeds buffer"));
    }

    let payload = buf[payload_start..payload_end].to_vec();
    // Skip the decorative trailing `\r\n` without relying on it being present
    // verbatim in the payload (the length prefix is authoritative).
    Ok((payload, payload_end + 2))
}

/// Emit one `<size>\r\n<bytes>\r\n` parameter block.
pub fn write_param(out: &mut Vec<u8>, payload: &[u8]) {
    out.extend_from_slice(payload.len().to_string().as_bytes());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(payload);
    out.extend_from_slice(b"\r\n");
}

/// Parse a signed decimal ASCII integral parameter payload (spec §4.2
/// "Packing helpers").
pub fn parse_integral(payload: &[u8]) -> Result<i64> {
    std::str::from_utf8(payload)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::Codec("non-numeric integral parameter"))
}
