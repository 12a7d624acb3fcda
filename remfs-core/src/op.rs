//! The closed set of operation codes the wire protocol carries (spec §3).

/// A request's op code selects which parameter arity and payload
/// interpretation are legal for the record (spec §3 "Operation code").
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpCode {
    Open = 0,
    Close = 1,
    Read = 2,
    Write = 3,
    Lseek = 4,
    Stat = 5,
    Unlink = 6,
    GetDirEntries = 7,
    GetDirTree = 8,
    FreeDirTree = 9,
}

impl OpCode {
    /// Number of request parameters this op carries, per spec §4.2's table.
    /// READ carries `(remote_fd, count)` only — see SPEC_FULL.md's
    /// resolution of the "wasted bandwidth" open question; the pre-call
    /// buffer contents are not transmitted.
    pub const fn param_count(self) -> usize {
        match self {
            OpCode::Open => 3,
            OpCode::Close => 1,
            OpCode::Read => 2,
            OpCode::Write => 3,
            OpCode::Lseek => 3,
            OpCode::Stat => 1,
            OpCode::Unlink => 1,
            OpCode::GetDirEntries => 3,
            OpCode::GetDirTree => 1,
            OpCode::FreeDirTree => 1,
        }
    }

    pub const fn from_i64(value: i64) -> Option<OpCode> {
        match value {
            0 => Some(OpCode::Open),
            1 => Some(OpCode::Close),
            2 => Some(OpCode::Read),
            3 => Some(OpCode::Write),
            4 => Some(OpCode::Lseek),
            5 => Some(OpCode::Stat),
            6 => Some(OpCode::Unlink),
            7 => Some(OpCode::GetDirEntries),
            8 => Some(OpCode::GetDirTree),
            9 => Some(OpCode::FreeDirTree),
            _ => None,
        }
    }

    pub const fn as_i64(self) -> i64 {
        self as i64
    }
}
