//! Per-op handlers (spec §4.5 "Handler contract"). Each handler subtracts
//! `OFFSET` from any remote descriptor parameter, performs the local
//! primitive under the server's own identity, captures the errno the call
//! produced, and builds the typed response §4.2's table prescribes.
//!
//! Unlike the C ancestor this never reads or writes the process's ambient
//! errno slot outside the call itself: the captured value flows through
//! `Response::errno` directly, so there is nothing left to restore
//! afterwards (see DESIGN.md).

use remfs_core::logging::{self, Logger};
use remfs_core::offset;
use remfs_core::stat::StatBlock;
use remfs_core::wire::{Request, Response};
use std::ffi::CString;
use std::io;
use std::path::Path;

use crate::dirtree;
use crate::getdirentries;

const MAX_PAYLOAD: usize = remfs_core::STORAGE_SIZE;

/// Dispatch a decoded request to its handler, keyed on op code.
pub fn dispatch(request: &Request, log: &Logger) -> Response {
    use remfs_core::op::OpCode::*;

    let response = match request.op {
        Open => open(request),
        Close => close(request),
        Read => read(request),
        Write => write(request),
        Lseek => lseek(request),
        Stat => stat(request),
        Unlink => unlink(request),
        GetDirEntries => getdirentries_handler(request),
        GetDirTree => getdirtree(request),
        FreeDirTree => Ok(Response::new(0)),
    };

    match response {
        Ok(response) => response,
        Err(err) => {
            logging::debug!(log, "handler failed"; "op" => ?request.op, "error" => %err);
            Response::protocol_error()
        }
    }
}

fn path_param(request: &Request, index: usize) -> remfs_core::Result<CString> {
    let bytes = request.param_opaque(index)?;
    CString::new(bytes).map_err(|_| remfs_core::Error::Codec("path contains an embedded NUL"))
}

fn open(request: &Request) -> remfs_core::Result<Response> {
    let path = path_param(request, 0)?;
    let flags = request.param_integral(1)? as libc::c_int;
    let mode = request.param_integral(2)? as libc::mode_t;

    let fd = unsafe { libc::open(path.as_ptr(), flags, mode) };

    let mut response = Response::new(0);
    if fd < 0 {
        response.errno = io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
        response.push_integral(-1);
    } else {
        response.push_integral(offset::to_client_remote(fd as i64));
    }
    Ok(response)
}

fn close(request: &Request) -> remfs_core::Result<Response> {
    let fd = offset::to_server_local(request.param_integral(0)?) as libc::c_int;
    let status = unsafe { libc::close(fd) };

    let mut response = Response::new(0);
    if status < 0 {
        response.errno = io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
    }
    response.push_integral(status as i64);
    Ok(response)
}

fn read(request: &Request) -> remfs_core::Result<Response> {
    let fd = offset::to_server_local(request.param_integral(0)?) as libc::c_int;
    let count = (request.param_integral(1)? as usize).min(MAX_PAYLOAD);

    let mut buf = vec![0u8; count];
    let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, count) };

    let mut response = Response::new(0);
    if n < 0 {
        response.errno = io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
        response.push_integral(-1);
        response.push_opaque(Vec::new());
    } else {
        buf.truncate(n as usize);
        response.push_integral(n as i64);
        response.push_opaque(buf);
    }
    Ok(response)
}

fn write(request: &Request) -> remfs_core::Result<Response> {
    let fd = offset::to_server_local(request.param_integral(0)?) as libc::c_int;
    let data = request.param_opaque(1)?;
    let count = (request.param_integral(2)? as usize).min(data.len());

    let n = unsafe { libc::write(fd, data.as_ptr() as *const libc::c_void, count) };

    let mut response = Response::new(0);
    if n < 0 {
        response.errno = io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
    }
    response.push_integral(n as i64);
    Ok(response)
}

fn lseek(request: &Request) -> remfs_core::Result<Response> {
    let fd = offset::to_server_local(request.param_integral(0)?) as libc::c_int;
    let off = request.param_integral(1)? as libc::off_t;
    let whence = request.param_integral(2)? as libc::c_int;

    let new_offset = unsafe { libc::lseek(fd, off, whence) };

    let mut response = Response::new(0);
    if new_offset < 0 {
        response.errno = io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
    }
    response.push_integral(new_offset as i64);
    Ok(response)
}

fn stat(request: &Request) -> remfs_core::Result<Response> {
    let path = request.param_opaque(0)?;
    let path = Path::new(std::str::from_utf8(path).map_err(|_| remfs_core::Error::Codec("non-utf8 path"))?);

    let mut response = Response::new(0);
    match std::fs::metadata(path) {
        Ok(metadata) => {
            response.push_integral(0);
            response.push_opaque(StatBlock::from_metadata(&metadata).encode());
        }
        Err(err) => {
            response.errno = err.raw_os_error().unwrap_or(libc::EIO);
            response.push_integral(-1);
            response.push_opaque(Vec::new());
        }
    }
    Ok(response)
}

fn unlink(request: &Request) -> remfs_core::Result<Response> {
    let path = path_param(request, 0)?;
    let status = unsafe { libc::unlink(path.as_ptr()) };

    let mut response = Response::new(0);
    if status < 0 {
        response.errno = io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
    }
    response.push_integral(status as i64);
    Ok(response)
}

fn getdirentries_handler(request: &Request) -> remfs_core::Result<Response> {
    let fd = offset::to_server_local(request.param_integral(0)?) as libc::c_int;
    let nbytes = (request.param_integral(1)? as usize).min(MAX_PAYLOAD);
    let basep = request.param_integral(2)?;

    let mut buf = vec![0u8; nbytes];
    let mut response = Response::new(0);

    match getdirentries::call(fd, &mut buf, basep) {
        Ok((n, new_basep)) => {
            buf.truncate(n.max(0) as usize);
            response.push_integral(n as i64);
            response.push_opaque(buf);
            response.push_integral(new_basep);
        }
        Err(err) => {
            response.errno = err.raw_os_error().unwrap_or(libc::EIO);
            response.push_integral(-1);
            response.push_opaque(Vec::new());
            response.push_integral(basep);
        }
    }
    Ok(response)
}

fn getdirtree(request: &Request) -> remfs_core::Result<Response> {
    let path = request.param_opaque(0)?;
    let path = Path::new(std::str::from_utf8(path).map_err(|_| remfs_core::Error::Codec("non-utf8 path"))?);

    let mut response = Response::new(0);
    match dirtree::build(path) {
        Ok(tree) => response.push_opaque(tree.encode()),
        Err(err) => {
            response.errno = err.raw_os_error().unwrap_or(libc::EIO);
            response.push_opaque(Vec::new());
        }
    }
    Ok(response)
}
