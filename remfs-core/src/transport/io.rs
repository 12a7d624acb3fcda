//! Robust write and greedy read over an arbitrary byte stream (spec §4.1).

use std::io::{self, ErrorKind, Read, Write};

/// Write exactly `buf.len()` bytes, retrying on `Interrupted` and
/// `WouldBlock`/`EAGAIN`. Returns the number of bytes actually written,
/// which is less than `buf.len()` only when a non-transient error
/// intervened — the caller must treat a short return as fatal for the
/// current message.
///
/// The C ancestor this is modeled on (`original_source/rpc/socket.c`)
/// retries on `errno != EINTR || errno != EAGAIN`, which is always true and
/// so never actually distinguishes a fatal error from a transient one. This
/// retries on `Interrupted` *or* `WouldBlock` and only gives up otherwise.
pub fn robust_write<W: Write>(writer: &mut W, buf: &[u8]) -> usize {
    let mut written = 0usize;

    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => return written,
            Ok(n) => written += n,
            Err(ref err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(ref err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(_) => return written,
        }
    }

    written
}

/// Drain `reader` into `buf` in a single invocation: reads repeatedly until
/// the buffer is full, the stream has no more data ready right now
/// (`WouldBlock`), or the peer is gone. Assumes `reader` is in non-blocking
/// mode. Returns the number of bytes read and whether the peer has closed.
pub fn greedy_read<R: Read>(reader: &mut R, buf: &mut [u8]) -> (usize, bool) {
    let mut total = 0usize;

    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return (total, true),
            Ok(n) => total += n,
            Err(ref err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(ref err) if err.kind() == ErrorKind::WouldBlock => return (total, false),
            Err(_) => return (total, true),
        }
    }

    (total, false)
}

/// Helper mirroring `greedy_read`'s contract but surfacing hard I/O errors
/// instead of folding them into `peer_closed`. Used by the codec's higher
/// level callers that want to distinguish the two.
pub fn try_greedy_read<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<(usize, bool)> {
    let mut total = 0usize;

    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok((total, true)),
            Ok(n) => total += n,
            Err(ref err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(ref err) if err.kind() == ErrorKind::WouldBlock => return Ok((total, false)),
            Err(err) => return Err(err),
        }
    }

    Ok((total, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// A reader/writer stand-in that can simulate WouldBlock and peer-close,
    /// in the style of the teacher's `MockChannel` (`t51core::net::buffer`).
    struct MockStream {
        inbound: VecDeque<u8>,
        outbound: Vec<u8>,
        chunk: usize,
        closed: bool,
    }

    impl MockStream {
        fn new(inbound: Vec<u8>, chunk: usize) -> Self {
            MockStream {
                inbound: inbound.into(),
                outbound: Vec::new(),
                chunk,
                closed: false,
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.inbound.is_empty() {
                if self.closed {
                    return Ok(0);
                }
                return Err(ErrorKind::WouldBlock.into());
            }
            let n = self.chunk.min(buf.len()).min(self.inbound.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.inbound.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = self.chunk.min(buf.len());
            self.outbound.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn robust_write_sends_everything_across_short_writes() {
        let mut stream = MockStream::new(Vec::new(), 3);
        let payload: Vec<u8> = (0..20u8).collect();

        let n = robust_write(&mut stream, &payload);

        assert_eq!(n, payload.len());
        assert_eq!(stream.outbound, payload);
    }

    #[test]
    fn greedy_read_stops_at_would_block_without_signalling_close() {
        let mut stream = MockStream::new(vec![1, 2, 3], 2);
        let mut buf = [0u8; 16];

        let (n, closed) = greedy_read(&mut stream, &mut buf);

        assert_eq!(n, 3);
        assert!(!closed);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn greedy_read_reports_peer_closed_on_eof() {
        let mut stream = MockStream::new(vec![1, 2], 2);
        stream.closed = true;
        let mut buf = [0u8; 16];

        let (n, closed) = greedy_read(&mut stream, &mut buf);

        assert_eq!(n, 2);
        assert!(closed);
    }

    #[test]
    fn greedy_read_fills_a_full_buffer_without_blocking_call() {
        let mut stream = MockStream::new(vec![9, 9, 9, 9], 4);
        let mut buf = [0u8; 4];

        let (n, closed) = greedy_read(&mut stream, &mut buf);

        assert_eq!(n, 4);
        assert!(!closed);
    }
}
