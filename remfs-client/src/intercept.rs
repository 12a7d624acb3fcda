//! The `extern "C"` function surface this crate presents in place of the
//! libc primitives it replaces (spec §1, §4.3, §4.4). Each function follows
//! the six-step stub pattern: route locally by descriptor where applicable,
//! build the request, round-trip it through [`crate::stub::call`], unpack
//! the response, set the ambient errno on failure, and return exactly what
//! the primitive it replaces would have returned.
//!
//! `open`'s real libc signature is variadic (`mode` only matters when
//! `O_CREAT` is set); Rust can't export a variadic `extern "C" fn` on
//! stable, so this always accepts the third argument and simply ignores it
//! when the kernel would have too.

use libc::{c_char, c_int, c_void, off_t};
use remfs_core::offset::{self, Route};
use remfs_core::op::OpCode;
use remfs_core::stat::StatBlock;
use remfs_core::wire::{DirTree, Request};
use std::ffi::CStr;

use crate::dirtree::{self, DirTreeNode};
use crate::errno;
use crate::local;
use crate::stub;

unsafe fn path_bytes(path: *const c_char) -> Vec<u8> {
    CStr::from_ptr(path).to_bytes().to_vec()
}

#[no_mangle]
pub unsafe extern "C" fn open(path: *const c_char, flags: c_int, mode: libc::mode_t) -> c_int {
    let mut request = Request::new(OpCode::Open);
    request.pack_opaque(path_bytes(path));
    request.pack_integral(flags as i64);
    request.pack_integral(mode as i64);

    let response = stub::call(request);
    let remote_fd = response.return_integral(0).unwrap_or(-1);

    if remote_fd < 0 {
        errno::set(response.errno);
        return -1;
    }
    remote_fd as c_int
}

#[no_mangle]
pub unsafe extern "C" fn close(fd: c_int) -> c_int {
    if offset::classify(fd as i64) == Route::Local {
        return local::close(fd);
    }

    let mut request = Request::new(OpCode::Close);
    request.pack_integral(fd as i64);

    let response = stub::call(request);
    let status = response.return_integral(0).unwrap_or(-1);
    if status < 0 {
        errno::set(response.errno);
    }
    status as c_int
}

#[no_mangle]
pub unsafe extern "C" fn read(fd: c_int, buf: *mut c_void, count: usize) -> isize {
    if offset::classify(fd as i64) == Route::Local {
        return local::read(fd, buf, count);
    }

    let mut request = Request::new(OpCode::Read);
    request.pack_integral(fd as i64);
    request.pack_integral(count as i64);

    let response = stub::call(request);
    let n = response.return_integral(0).unwrap_or(-1);

    if n < 0 {
        errno::set(response.errno);
        return -1;
    }

    if let Ok(payload) = response.return_opaque(1) {
        let copy_len = (n as usize).min(payload.len()).min(count);
        std::ptr::copy_nonoverlapping(payload.as_ptr(), buf as *mut u8, copy_len);
    }

    n as isize
}

#[no_mangle]
pub unsafe extern "C" fn write(fd: c_int, buf: *const c_void, count: usize) -> isize {
    if offset::classify(fd as i64) == Route::Local {
        return local::write(fd, buf, count);
    }

    let data = std::slice::from_raw_parts(buf as *const u8, count).to_vec();

    let mut request = Request::new(OpCode::Write);
    request.pack_integral(fd as i64);
    request.pack_opaque(data);
    request.pack_integral(count as i64);

    let response = stub::call(request);
    let n = response.return_integral(0).unwrap_or(-1);
    if n < 0 {
        errno::set(response.errno);
    }
    n as isize
}

#[no_mangle]
pub unsafe extern "C" fn lseek(fd: c_int, offset_arg: off_t, whence: c_int) -> off_t {
    if offset::classify(fd as i64) == Route::Local {
        return local::lseek(fd, offset_arg, whence);
    }

    let mut request = Request::new(OpCode::Lseek);
    request.pack_integral(fd as i64);
    request.pack_integral(offset_arg as i64);
    request.pack_integral(whence as i64);

    let response = stub::call(request);
    let new_offset = response.return_integral(0).unwrap_or(-1);
    if new_offset < 0 {
        errno::set(response.errno);
    }
    new_offset as off_t
}

#[no_mangle]
pub unsafe extern "C" fn stat(path: *const c_char, buf: *mut libc::stat) -> c_int {
    let mut request = Request::new(OpCode::Stat);
    request.pack_opaque(path_bytes(path));

    let response = stub::call(request);
    let status = response.return_integral(0).unwrap_or(-1);

    if status < 0 {
        errno::set(response.errno);
        return -1;
    }

    match response
        .return_opaque(1)
        .ok()
        .and_then(|bytes| StatBlock::decode(bytes).ok())
    {
        Some(block) => {
            fill_stat(buf, &block);
            0
        }
        None => {
            errno::set(libc::EPROTO);
            -1
        }
    }
}

unsafe fn fill_stat(buf: *mut libc::stat, block: &StatBlock) {
    std::ptr::write_bytes(buf, 0, 1);
    (*buf).st_dev = block.device as _;
    (*buf).st_ino = block.inode as _;
    (*buf).st_mode = block.mode as _;
    (*buf).st_nlink = block.nlink as _;
    (*buf).st_uid = block.uid;
    (*buf).st_gid = block.gid;
    (*buf).st_rdev = block.rdev as _;
    (*buf).st_size = block.size as _;
    (*buf).st_blksize = block.blksize as _;
    (*buf).st_blocks = block.blocks as _;
    (*buf).st_atime = block.atime_sec as _;
    (*buf).st_atime_nsec = block.atime_nsec as _;
    (*buf).st_mtime = block.mtime_sec as _;
    (*buf).st_mtime_nsec = block.mtime_nsec as _;
    (*buf).st_ctime = block.ctime_sec as _;
    (*buf).st_ctime_nsec = block.ctime_nsec as _;
}

#[no_mangle]
pub unsafe extern "C" fn unlink(path: *const c_char) -> c_int {
    let mut request = Request::new(OpCode::Unlink);
    request.pack_opaque(path_bytes(path));

    let response = stub::call(request);
    let status = response.return_integral(0).unwrap_or(-1);
    if status < 0 {
        errno::set(response.errno);
    }
    status as c_int
}

#[no_mangle]
pub unsafe extern "C" fn getdirentries(fd: c_int, buf: *mut c_char, nbytes: usize, basep: *mut off_t) -> isize {
    if offset::classify(fd as i64) == Route::Local {
        return local::getdirentries(fd, buf, nbytes, basep);
    }

    let mut request = Request::new(OpCode::GetDirEntries);
    request.pack_integral(fd as i64);
    request.pack_integral(nbytes as i64);
    request.pack_integral(*basep as i64);

    let response = stub::call(request);
    let n = response.return_integral(0).unwrap_or(-1);

    if n < 0 {
        errno::set(response.errno);
        return -1;
    }

    if let Ok(payload) = response.return_opaque(1) {
        let copy_len = (n as usize).min(payload.len()).min(nbytes);
        std::ptr::copy_nonoverlapping(payload.as_ptr(), buf as *mut u8, copy_len);
    }
    if let Ok(new_basep) = response.return_integral(2) {
        *basep = new_basep as off_t;
    }

    n as isize
}

#[no_mangle]
pub unsafe extern "C" fn getdirtree(path: *const c_char) -> *mut DirTreeNode {
    let mut request = Request::new(OpCode::GetDirTree);
    request.pack_opaque(path_bytes(path));

    let response = stub::call(request);
    let tree_bytes = match response.return_opaque(0) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => {
            errno::set(response.errno);
            return std::ptr::null_mut();
        }
    };

    match DirTree::decode(tree_bytes) {
        Ok(tree) => dirtree::into_raw(tree),
        Err(_) => {
            errno::set(libc::EPROTO);
            std::ptr::null_mut()
        }
    }
}

/// Purely local: releases the tree this process already decoded. No RPC is
/// involved — `freedirtree` has no wire contract (spec §4.2's table omits
/// it entirely).
#[no_mangle]
pub unsafe extern "C" fn freedirtree(dt: *mut DirTreeNode) {
    dirtree::free_raw(dt);
}
