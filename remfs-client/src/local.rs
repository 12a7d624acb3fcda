//! Resolves the real, un-intercepted libc primitives via `dlsym(RTLD_NEXT,
//! ...)`, exactly as `original_source/rpc/mylib.c`'s `orig_open` /
//! `orig_read` / ... function pointers do. Needed because this crate's own
//! `extern "C" fn open` (etc.) occupies the symbol the dynamic linker would
//! otherwise resolve `libc::open` to, so a plain call to `libc::open` from
//! inside this crate would simply call back into ourselves.

use libc::{c_char, c_int, c_void, off_t};
use std::sync::OnceLock;

macro_rules! resolve_next {
    ($name:expr, $ty:ty) => {{
        static CACHED: OnceLock<$ty> = OnceLock::new();
        *CACHED.get_or_init(|| unsafe {
            let sym = libc::dlsym(libc::RTLD_NEXT, concat!($name, "\0").as_ptr() as *const c_char);
            assert!(!sym.is_null(), concat!("could not resolve the real ", $name));
            std::mem::transmute::<*mut c_void, $ty>(sym)
        })
    }};
}

pub fn open(path: *const c_char, flags: c_int, mode: libc::mode_t) -> c_int {
    type F = unsafe extern "C" fn(*const c_char, c_int, libc::mode_t) -> c_int;
    unsafe { resolve_next!("open", F)(path, flags, mode) }
}

pub fn close(fd: c_int) -> c_int {
    type F = unsafe extern "C" fn(c_int) -> c_int;
    unsafe { resolve_next!("close", F)(fd) }
}

pub fn read(fd: c_int, buf: *mut c_void, count: usize) -> isize {
    type F = unsafe extern "C" fn(c_int, *mut c_void, usize) -> isize;
    unsafe { resolve_next!("read", F)(fd, buf, count) }
}

pub fn write(fd: c_int, buf: *const c_void, count: usize) -> isize {
    type F = unsafe extern "C" fn(c_int, *const c_void, usize) -> isize;
    unsafe { resolve_next!("write", F)(fd, buf, count) }
}

pub fn lseek(fd: c_int, offset: off_t, whence: c_int) -> off_t {
    type F = unsafe extern "C" fn(c_int, off_t, c_int) -> off_t;
    unsafe { resolve_next!("lseek", F)(fd, offset, whence) }
}

pub fn getdirentries(fd: c_int, buf: *mut c_char, nbytes: usize, basep: *mut off_t) -> isize {
    type F = unsafe extern "C" fn(c_int, *mut c_char, usize, *mut off_t) -> isize;
    unsafe { resolve_next!("getdirentries", F)(fd, buf, nbytes, basep) }
}
