//! Shared runtime for the remote file-operation RPC protocol: the wire
//! codec, the framing/transport primitives, the descriptor namespace, the
//! portable stat projection, and logging setup common to both the client
//! shim and the server dispatcher.

pub mod config;
pub mod error;
pub mod logging;
pub mod offset;
pub mod op;
pub mod stat;
pub mod transport;
pub mod wire;

pub use error::{Error, Result};
pub use op::OpCode;

/// Size of the receive-reassembly and send-serialization buffers on both
/// sides of the connection; the largest payload a single message can carry
/// (spec §5 "Resource sizing").
pub const STORAGE_SIZE: usize = 1024 * 1024;
