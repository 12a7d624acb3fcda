//! Connection establishment: active (client) and passive (server) endpoints
//! (spec §4.1, §6). Grounded on `original_source/rpc/socket.c`'s
//! `build_client`/`build_server`/`accept_client`, translated to
//! `std::net` instead of raw `libc` socket calls.

use std::net::{TcpListener, TcpStream};

use crate::config;

/// Listen backlog for the passive endpoint (spec §4.1: "backlog of 64").
pub const LISTEN_BACKLOG: i32 = 64;

/// Build a client TCP connection to the server, reading the address and
/// port from the environment (or the documented defaults).
pub fn build_client() -> std::io::Result<TcpStream> {
    let address = config::address();
    let port = config::port();
    TcpStream::connect((address.as_str(), port))
}

/// Build the listening server socket, bound to all interfaces on the
/// configured (or default) port, with a fixed backlog.
pub fn build_server() -> std::io::Result<TcpListener> {
    build_server_on_port(config::port())
}

/// Same as [`build_server`] but with an explicit port override — used by
/// the server binary's `--bind-port` CLI flag.
pub fn build_server_on_port(port: u16) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(("0.0.0.0", port))?;
    set_reuseaddr(&listener);
    Ok(listener)
}

/// Accept a single incoming connection, yielding a per-connection stream.
pub fn accept_client(listener: &TcpListener) -> std::io::Result<TcpStream> {
    let (stream, _addr) = listener.accept()?;
    Ok(stream)
}

#[cfg(unix)]
fn set_reuseaddr(listener: &TcpListener) {
    use std::os::unix::io::AsRawFd;

    let fd = listener.as_raw_fd();
    let enable: libc::c_int = 1;
    unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &enable as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        );
    }
}

#[cfg(not(unix))]
fn set_reuseaddr(_listener: &TcpListener) {}
