//! Request record: `(op_code, param_count, [(size, bytes)...])` (spec §3,
//! §4.2). Mirrors `original_source/rpc/marshall.c`'s `rpc_request` /
//! `pack_integral` / `pack_pointer`, generalized to Rust ownership.

use crate::error::{Error, Result};
use crate::op::OpCode;
use crate::wire::lines::{parse_integral, parse_keyed_int, parse_param, write_keyed_int, write_param};

/// An owning request record: the op code plus its parameter payloads, each
/// either the raw bytes of an opaque parameter or the ASCII-decimal
/// encoding of an integral one (the two are indistinguishable on the wire;
/// callers must read each position with the accessor matching §4.2's table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub op: OpCode,
    params: Vec<Vec<u8>>,
}

impl Request {
    pub fn new(op: OpCode) -> Request {
        Request {
            op,
            params: Vec::with_capacity(op.param_count()),
        }
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn pack_integral(&mut self, value: i64) {
        self.params.push(value.to_string().into_bytes());
    }

    pub fn pack_opaque(&mut self, bytes: impl Into<Vec<u8>>) {
        self.params.push(bytes.into());
    }

    pub fn param_opaque(&self, index: usize) -> Result<&[u8]> {
        self.params
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::Codec("request parameter index out of range"))
    }

    pub fn param_integral(&self, index: usize) -> Result<i64> {
        parse_integral(self.param_opaque(index)?)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_keyed_int(&mut out, "Command", self.op.as_i64());
        write_keyed_int(&mut out, "ParamNum", self.params.len() as i64);

        for param in &self.params {
            write_param(&mut out, param);
        }

        out
    }

    pub fn decode(buf: &[u8]) -> Result<Request> {
        let (op_code, pos) = parse_keyed_int(buf, 0, "Command")?;
        let op = OpCode::from_i64(op_code).ok_or(Error::Codec("unknown op code"))?;

        let (param_count, mut pos) = parse_keyed_int(buf, pos, "ParamNum")?;
        let param_count = usize::try_from(param_count).map_err(|_| Error::Codec("negative ParamNum"))?;

        if param_count != op.param_count() {
            return Err(Error::Codec("parameter count does not match op arity"));
        }

        let mut params = Vec::with_capacity(param_count);
        for _ in 0..param_count {
            let (payload, next_pos) = parse_param(buf, pos)?;
            params.push(payload);
            pos = next_pos;
        }

        Ok(Request { op, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_mixed_integral_and_opaque_request() {
        let mut request = Request::new(OpCode::Open);
        request.pack_opaque(b"/tmp/file.txt".to_vec());
        request.pack_integral(-1);
        request.pack_integral(0o644);

        let encoded = request.encode();
        let decoded = Request::decode(&encoded).unwrap();

        assert_eq!(decoded, request);
        assert_eq!(decoded.param_opaque(0).unwrap(), b"/tmp/file.txt");
        assert_eq!(decoded.param_integral(1).unwrap(), -1);
        assert_eq!(decoded.param_integral(2).unwrap(), 0o644);
    }

    #[test]
    fn round_trips_a_write_request_with_embedded_crlf_payload() {
        let mut request = Request::new(OpCode::Write);
        request.pack_integral(12345);
        request.pack_opaque(b"line1\r\nline2\r\n\r\nmore".to_vec());
        request.pack_integral(20);

        let decoded = Request::decode(&request.encode()).unwrap();

        assert_eq!(decoded.param_opaque(1).unwrap(), b"line1\r\nline2\r\n\r\nmore");
    }

    #[test]
    fn rejects_an_unknown_op_code() {
        let mut buf = Vec::new();
        write_keyed_int(&mut buf, "Command", 99);
        write_keyed_int(&mut buf, "ParamNum", 0);

        assert!(matches!(Request::decode(&buf), Err(Error::Codec(_))));
    }

    #[test]
    fn rejects_a_param_count_mismatched_with_the_op_arity() {
        let mut buf = Vec::new();
        write_keyed_int(&mut buf, "Command", OpCode::Close.as_i64());
        write_keyed_int(&mut buf, "ParamNum", 2);
        write_param(&mut buf, b"1");
        write_param(&mut buf, b"2");

        assert!(matches!(Request::decode(&buf), Err(Error::Codec(_))));
    }
}
