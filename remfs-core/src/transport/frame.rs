//! Framing: `Message-Length:<decimal>\r\n\r\n<payload>` (spec §4.1, §6).

use crate::error::{Error, Result};
use crate::transport::io::robust_write;
use std::io::Write;

const HEADER_PREFIX: &str = "Message-Length:";
const HEADER_DELIMITER: &str = "\r\n\r\n";

/// Prepend the length header to `payload` and write the whole frame in one
/// `robust_write` call. Returns the number of bytes actually sent; a short
/// return (less than the full frame) means the connection is dead.
pub fn send_message<W: Write>(writer: &mut W, payload: &[u8]) -> usize {
    let mut framed = Vec::with_capacity(HEADER_PREFIX.len() + 20 + HEADER_DELIMITER.len() + payload.len());
    framed.extend_from_slice(HEADER_PREFIX.as_bytes());
    framed.extend_from_slice(payload.len().to_string().as_bytes());
    framed.extend_from_slice(HEADER_DELIMITER.as_bytes());
    framed.extend_from_slice(payload);

    robust_write(writer, &framed)
}

/// A growing byte queue that reassembles framed messages out of an
/// arbitrary stream of reads. Owns its storage; `ingest` appends newly read
/// bytes and `next_message` extracts complete frames, compacting the
/// remaining unconsumed suffix in place (spec §4.1 "Framing").
#[derive(Default)]
pub struct ReassemblyBuffer {
    data: Vec<u8>,
}

impl ReassemblyBuffer {
    pub fn new() -> ReassemblyBuffer {
        ReassemblyBuffer { data: Vec::new() }
    }

    /// Append freshly read bytes to the tail of the buffer.
    pub fn ingest(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Try to extract the next complete frame's payload. Returns `Ok(None)`
    /// when the buffer doesn't yet hold a full frame (not an error — the
    /// caller should read more and retry). A malformed header is a protocol
    /// error: missing delimiter before some sane bound is not an error by
    /// itself (still "not yet"), but a present delimiter with a
    /// non-numeric or absent length is.
    pub fn next_message(&mut self) -> Result<Option<Vec<u8>>> {
        let delimiter_pos = match find(&self.data, HEADER_DELIMITER.as_bytes()) {
            Some(pos) => pos,
            None => return Ok(None),
        };

        let header = &self.data[..delimiter_pos];
        let colon_pos = header
            .iter()
            .position(|&b| b == b':')
            .ok_or(Error::Framing("missing colon in Message-Length header"))?;

        if &header[..colon_pos] != HEADER_PREFIX[..HEADER_PREFIX.len() - 1].as_bytes() {
            return Err(Error::Framing("unexpected frame header"));
        }

        let length_str = std::str::from_utf8(&header[colon_pos + 1..])
            .map_err(|_| Error::Framing("non-utf8 length field"))?;
        let length: usize = length_str
            .parse()
            .map_err(|_| Error::Framing("non-numeric Message-Length value"))?;

        let header_len = delimiter_pos + HEADER_DELIMITER.len();
        let total_len = header_len + length;

        if self.data.len() < total_len {
            return Ok(None);
        }

        let payload = self.data[header_len..total_len].to_vec();

        // Compact: shift the unconsumed suffix left and drop the consumed prefix.
        self.data.drain(..total_len);

        Ok(Some(payload))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn framed_bytes(payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        send_message(&mut Cursor::new(&mut buf), payload);
        buf
    }

    #[test]
    fn round_trips_a_single_message() {
        let payload = b"hello, world\n".to_vec();
        let framed = framed_bytes(&payload);

        let mut buffer = ReassemblyBuffer::new();
        buffer.ingest(&framed);
        buffer.ingest(b"leftover-suffix");

        let message = buffer.next_message().unwrap().unwrap();
        assert_eq!(message, payload);
        assert_eq!(buffer.len(), b"leftover-suffix".len());
    }

    #[test]
    fn reassembles_under_arbitrary_fragmentation() {
        let payload: Vec<u8> = (0..500u16).map(|i| (i % 251) as u8).collect();
        let framed = framed_bytes(&payload);

        let mut buffer = ReassemblyBuffer::new();
        let mut out = None;

        for chunk in framed.chunks(7) {
            buffer.ingest(chunk);
            if let Some(message) = buffer.next_message().unwrap() {
                out = Some(message);
            }
        }

        assert_eq!(out.unwrap(), payload);
    }

    #[test]
    fn decodes_multiple_concatenated_frames_in_order() {
        let p1 = b"first".to_vec();
        let p2 = b"second".to_vec();
        let mut stream = framed_bytes(&p1);
        stream.extend(framed_bytes(&p2));

        let mut buffer = ReassemblyBuffer::new();
        buffer.ingest(&stream);

        assert_eq!(buffer.next_message().unwrap().unwrap(), p1);
        assert_eq!(buffer.next_message().unwrap().unwrap(), p2);
        assert_eq!(buffer.next_message().unwrap(), None);
    }

    #[test]
    fn embedded_delimiter_does_not_confuse_the_length_prefixed_parser() {
        // Scenario S6: a payload containing a literal framing header.
        let tricky_payload = b"Message-Length:9\r\n\r\nabcdefghi".to_vec();
        let p2 = b"second-message".to_vec();

        let mut stream = framed_bytes(&tricky_payload);
        stream.extend(framed_bytes(&p2));

        let mut buffer = ReassemblyBuffer::new();
        buffer.ingest(&stream);

        assert_eq!(buffer.next_message().unwrap().unwrap(), tricky_payload);
        assert_eq!(buffer.next_message().unwrap().unwrap(), p2);
    }

    #[test]
    fn partial_frame_yields_not_yet() {
        let framed = framed_bytes(b"0123456789");

        let mut buffer = ReassemblyBuffer::new();
        buffer.ingest(&framed[..framed.len() - 3]);

        assert_eq!(buffer.next_message().unwrap(), None);

        buffer.ingest(&framed[framed.len() - 3..]);
        assert_eq!(buffer.next_message().unwrap().unwrap(), b"0123456789");
    }

    #[test]
    fn malformed_header_is_a_framing_error() {
        let mut buffer = ReassemblyBuffer::new();
        buffer.ingest(b"Message-Length:notanumber\r\n\r\n");

        assert!(matches!(buffer.next_message(), Err(Error::Framing(_))));
    }
}
