//! Forking per-client dispatcher binary (spec §4.5 "Lifecycle"). Binds the
//! passive endpoint, then for each accepted connection forks an isolated
//! worker that services exactly that client and exits when it disconnects.

mod dirtree;
mod dispatcher;
mod getdirentries;
mod handlers;

use clap::{App, Arg};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, ForkResult};
use remfs_core::logging::{self, Logger, Verbosity};
use remfs_core::transport::endpoint;

fn main() {
    let matches = App::new("remfs-server")
        .version("1.0")
        .author("Bush Hammer Industries")
        .about("Forking per-client dispatcher for the remote file-operation RPC protocol")
        .arg(
            Arg::with_name("bind-port")
                .long("bind-port")
                .takes_value(true)
                .help("TCP port to bind, overriding serverport15440 (default 15440)"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Increase logging verbosity (-v debug, -vv trace)"),
        )
        .get_matches();

    let verbosity = match matches.occurrences_of("v") {
        0 => Verbosity::Info,
        1 => Verbosity::Debug,
        _ => Verbosity::Trace,
    };
    let log = logging::init(verbosity);

    let bind_port: Option<u16> = matches.value_of("bind-port").map(|value| {
        value
            .parse()
            .unwrap_or_else(|_| panic!("--bind-port must be a valid port number, got {}", value))
    });

    let listener = match bind_port {
        Some(port) => endpoint::build_server_on_port(port),
        None => endpoint::build_server(),
    }
    .unwrap_or_else(|err| {
        logging::error!(log, "failed to bind listening socket"; "error" => %err);
        std::process::exit(1);
    });

    logging::info!(log, "listening for connections"; "local_addr" => ?listener.local_addr());

    loop {
        reap_workers(&log);

        let stream = match endpoint::accept_client(&listener) {
            Ok(stream) => stream,
            Err(err) => {
                logging::debug!(log, "accept failed"; "error" => %err);
                continue;
            }
        };

        // Safety: the child path only calls async-signal-safe operations
        // (drop of a socket fd, dispatcher's own I/O, and `std::process::exit`)
        // before replacing its one job with something sequential.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child, .. }) => {
                logging::debug!(log, "spawned worker"; "pid" => child.as_raw());
                drop(stream);
            }
            Ok(ForkResult::Child) => {
                drop(listener);
                let worker_log = log.new(logging::o!("pid" => std::process::id()));
                dispatcher::run(stream, worker_log);
                std::process::exit(0);
            }
            Err(err) => {
                logging::error!(log, "fork failed"; "error" => %err);
                drop(stream);
            }
        }
    }
}

/// Reap every worker that has already exited, non-blockingly, before the
/// next accept (spec §4.5: "reaps exited workers non-blockingly").
fn reap_workers(log: &Logger) {
    loop {
        match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => logging::trace!(log, "reaped worker"; "status" => ?status),
            Err(nix::errno::Errno::ECHILD) => break,
            Err(err) => {
                logging::debug!(log, "waitpid failed"; "error" => %err);
                break;
            }
        }
    }
}
