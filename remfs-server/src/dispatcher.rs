//! Per-connection service loop (spec §4.5 "Per-connection loop"). Runs
//! entirely inside one forked worker, which services exactly one client and
//! exits when it disconnects.

use remfs_core::logging::{self, Logger};
use remfs_core::transport::{greedy_read, send_message, ReassemblyBuffer};
use remfs_core::wire::{Request, Response};
use std::net::TcpStream;

use crate::handlers;

/// Drive one client connection to completion: non-blocking receive, frame
/// reassembly, request decode/dispatch, response send. Returns once the
/// peer has closed and every already-buffered frame has been serviced.
pub fn run(mut stream: TcpStream, log: Logger) {
    if let Err(err) = stream.set_nonblocking(true) {
        logging::error!(log, "failed to switch connection to non-blocking"; "error" => %err);
        return;
    }

    let mut reassembly = ReassemblyBuffer::new();
    let mut recv_buf = vec![0u8; remfs_core::STORAGE_SIZE];

    loop {
        let (received, peer_closed) = greedy_read(&mut stream, &mut recv_buf);
        if received > 0 {
            reassembly.ingest(&recv_buf[..received]);
        }

        loop {
            match reassembly.next_message() {
                Ok(Some(payload)) => service_one(&mut stream, &payload, &log),
                Ok(None) => break,
                Err(err) => {
                    logging::debug!(log, "framing error, tearing down connection"; "error" => %err);
                    return;
                }
            }
        }

        if peer_closed {
            logging::debug!(log, "peer closed connection");
            return;
        }
    }
}

fn service_one(stream: &mut TcpStream, payload: &[u8], log: &Logger) {
    let response = match Request::decode(payload) {
        Ok(request) => {
            logging::trace!(log, "dispatching request"; "op" => ?request.op);
            handlers::dispatch(&request, log)
        }
        Err(err) => {
            logging::debug!(log, "request decode failed"; "error" => %err);
            Response::protocol_error()
        }
    };

    let encoded = response.encode();
    if send_message(stream, &encoded) < encoded.len() {
        logging::debug!(log, "short write sending response, connection likely dead");
    }
}
