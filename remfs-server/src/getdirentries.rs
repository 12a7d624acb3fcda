//! Platform shim for the GETDIRENTRIES primitive. The call originates from
//! BSD/Darwin (`original_source/rpc/mylib.c` declares the classic
//! `getdirentries(fd, buf, nbytes, basep)` signature); Linux has no such
//! libc entry point, so this dispatches to the native call where it exists
//! and to the raw `getdents64` syscall otherwise.

use std::io;

#[cfg(target_os = "macos")]
pub fn call(fd: i32, buf: &mut [u8], basep: i64) -> io::Result<(isize, i64)> {
    let mut cookie = basep as libc::off_t;
    let n = unsafe { libc::getdirentries(fd, buf.as_mut_ptr() as *mut libc::c_char, buf.len(), &mut cookie) };

    if n < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok((n as isize, cookie as i64))
}

/// Linux has no seek-cookie semantics for directory streams; `basep` is
/// honored as a byte offset into the underlying directory fd (via `lseek`)
/// and `new_basep` reports the fd's resulting position, which is the closest
/// analogue available.
#[cfg(target_os = "linux")]
pub fn call(fd: i32, buf: &mut [u8], basep: i64) -> io::Result<(isize, i64)> {
    if basep != 0 {
        let seeked = unsafe { libc::lseek(fd, basep, libc::SEEK_SET) };
        if seeked < 0 {
            return Err(io::Error::last_os_error());
        }
    }

    let n = unsafe { libc::syscall(libc::SYS_getdents64, fd, buf.as_mut_ptr(), buf.len()) };
    if n < 0 {
        return Err(io::Error::last_os_error());
    }

    let new_basep = unsafe { libc::lseek(fd, 0, libc::SEEK_CUR) };
    if new_basep < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok((n as isize, new_basep))
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn call(_fd: i32, _buf: &mut [u8], _basep: i64) -> io::Result<(isize, i64)> {
    Err(io::Error::from_raw_os_error(libc::ENOSYS))
}
