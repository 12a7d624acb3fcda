//! Process-scoped global state (spec §9 "Global process state"): the
//! persistent connection to the server and its reassembly buffer, created
//! once at library load and living for the process's lifetime. Realized as
//! a `ctor`-driven initializer populating a `OnceLock`, mirroring the
//! teacher's `ctor` dependency and the C ancestor's `_init()` constructor
//! (`original_source/rpc/mylib.c`).

use remfs_core::logging::{self, Logger, Verbosity};
use remfs_core::transport::endpoint;
use remfs_core::transport::ReassemblyBuffer;
use std::net::TcpStream;
use std::sync::{Mutex, OnceLock};

pub(crate) struct Connection {
    pub stream: TcpStream,
    pub reassembly: ReassemblyBuffer,
    pub log: Logger,
}

static CONNECTION: OnceLock<Mutex<Connection>> = OnceLock::new();

#[ctor::ctor]
fn init() {
    let log = logging::init(Verbosity::default());

    match endpoint::build_client() {
        Ok(stream) => {
            if let Err(err) = stream.set_nonblocking(true) {
                logging::error!(log, "could not switch the server connection to non-blocking mode";
                                 "error" => %err);
                return;
            }
            logging::info!(log, "remfs-client connected to remote file server");
            let _ = CONNECTION.set(Mutex::new(Connection {
                stream,
                reassembly: ReassemblyBuffer::new(),
                log,
            }));
        }
        Err(err) => {
            // Every remote primitive fails until a connection exists; the
            // purely-local primitives (descriptor < OFFSET) are unaffected.
            logging::error!(log, "remfs-client could not reach the remote file server at load time";
                             "error" => %err);
        }
    }
}

/// Runs `f` against the live connection, or returns `None` if the library
/// constructor never managed to connect.
pub(crate) fn with_connection<T>(f: impl FnOnce(&mut Connection) -> T) -> Option<T> {
    let mutex = CONNECTION.get()?;
    let mut guard = mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    Some(f(&mut guard))
}
