//! Response record: `(errno_value, return_count, [(size, bytes)...])`
//! (spec §3, §4.2).

use crate::error::{Error, Result};
use crate::wire::lines::{parse_integral, parse_keyed_int, parse_param, write_keyed_int, write_param};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub errno: i32,
    returns: Vec<Vec<u8>>,
}

impl Response {
    pub fn new(errno: i32) -> Response {
        Response {
            errno,
            returns: Vec::new(),
        }
    }

    /// A response for a decode failure on the server: carries `EPROTO` and
    /// no return values, so the client's blocking `await_response` doesn't
    /// hang forever on a frame it couldn't make sense of (SPEC_FULL.md's
    /// resolution of spec.md §9's "decode failures... can hang the
    /// client").
    pub fn protocol_error() -> Response {
        Response::new(libc::EPROTO)
    }

    pub fn return_count(&self) -> usize {
        self.returns.len()
    }

    pub fn push_integral(&mut self, value: i64) {
        self.returns.push(value.to_string().into_bytes());
    }

    pub fn push_opaque(&mut self, bytes: impl Into<Vec<u8>>) {
        self.returns.push(bytes.into());
    }

    pub fn return_opaque(&self, index: usize) -> Result<&[u8]> {
        self.returns
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::Codec("response return index out of range"))
    }

    pub fn return_integral(&self, index: usize) -> Result<i64> {
        parse_integral(self.return_opaque(index)?)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_keyed_int(&mut out, "Errno", self.errno as i64);
        write_keyed_int(&mut out, "ReturnNum", self.returns.len() as i64);

        for value in &self.returns {
            write_param(&mut out, value);
        }

        out
    }

    pub fn decode(buf: &[u8]) -> Result<Response> {
        let (errno, pos) = parse_keyed_int(buf, 0, "Errno")?;
        let errno = i32::try_from(errno).map_err(|_| Error::Codec("errno out of range"))?;

        let (return_count, mut pos) = parse_keyed_int(buf, pos, "ReturnNum")?;
        let return_count =
            usize::try_from(return_count).map_err(|_| Error::Codec("negative ReturnNum"))?;

        let mut returns = Vec::with_capacity(return_count);
        for _ in 0..return_count {
            let (payload, next_pos) = parse_param(buf, pos)?;
            returns.push(payload);
            pos = next_pos;
        }

        Ok(Response { errno, returns })
    }
}
