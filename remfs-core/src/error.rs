use std::io;

/// Errors that can arise anywhere in the transport/codec/dispatch path.
///
/// Transport and framing failures are always fatal to the connection that
/// produced them; codec failures on the server are turned into a protocol
/// error response rather than propagated (see `wire::response::Response::protocol_error`).
#[derive(Debug)]
pub enum Error {
    /// The underlying stream reported a short write, an unexpected close, or
    /// an I/O error that isn't a transient would-block condition.
    Transport(io::Error),
    /// The framing header was missing, malformed, or declared a length the
    /// caller cannot hold.
    Framing(&'static str),
    /// The record payload didn't parse into a well-formed request/response:
    /// unknown op code, arity mismatch, non-numeric integral.
    Codec(&'static str),
    /// The peer closed the connection before a complete frame arrived.
    PeerClosed,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Transport(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "transport error: {}", err),
            Error::Framing(msg) => write!(f, "framing error: {}", msg),
            Error::Codec(msg) => write!(f, "codec error: {}", msg),
            Error::PeerClosed => write!(f, "peer closed connection"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = ::std::result::Result<T, Error>;
