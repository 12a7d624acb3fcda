//! The shared per-call engine behind every intercepted primitive (spec
//! §4.4 "Client stub engine", steps 3-4): serialize and send the request,
//! then block until a complete response frame has arrived and decode it.
//! The remaining steps (routing, building the request, interpreting
//! returns, setting errno) are specific to each primitive and live in
//! `intercept.rs`.

use remfs_core::logging;
use remfs_core::transport::{greedy_read, send_message};
use remfs_core::wire::{Request, Response};

use crate::connection::{self, Connection};

/// Round-trip one request against the persistent server connection.
///
/// On any transport or framing failure this returns a synthetic
/// [`Response::protocol_error`] rather than panicking — the call site
/// still needs *something* to interpret, and spec §4.4 treats an early
/// close as "a fatal error for the current call", not for the process.
pub fn call(request: Request) -> Response {
    match connection::with_connection(|conn| call_on(conn, request)) {
        Some(response) => response,
        None => Response::protocol_error(),
    }
}

fn call_on(conn: &mut Connection, request: Request) -> Response {
    let encoded = request.encode();
    let sent = send_message(&mut conn.stream, &encoded);
    if sent < encoded.len() {
        logging::error!(conn.log, "short write sending request, connection considered dead";
                         "op" => ?request.op, "sent" => sent, "expected" => encoded.len());
        return Response::protocol_error();
    }

    await_response(conn)
}

fn await_response(conn: &mut Connection) -> Response {
    let mut chunk = vec![0u8; 64 * 1024];

    loop {
        match conn.reassembly.next_message() {
            Ok(Some(payload)) => {
                return Response::decode(&payload).unwrap_or_else(|err| {
                    logging::error!(conn.log, "malformed response frame"; "error" => %err);
                    Response::protocol_error()
                });
            }
            Ok(None) => {}
            Err(err) => {
                logging::error!(conn.log, "framing error awaiting response"; "error" => %err);
                return Response::protocol_error();
            }
        }

        let (received, peer_closed) = greedy_read(&mut conn.stream, &mut chunk);
        if received > 0 {
            conn.reassembly.ingest(&chunk[..received]);
        }

        if received == 0 && peer_closed {
            logging::error!(conn.log, "server closed connection while awaiting response");
            return Response::protocol_error();
        }
    }
}
