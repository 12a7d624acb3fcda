//! Directory-tree codec: pre-order `(name, child_count, children...)`
//! (spec §3 "Directory-tree node", §4.2 "Directory-tree codec").

use crate::error::{Error, Result};

/// An owning directory-tree node. Acyclic, no sharing — each node owns its
/// children outright (spec §9 "Recursive directory tree").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTree {
    pub name: Vec<u8>,
    pub children: Vec<DirTree>,
}

impl DirTree {
    pub fn leaf(name: impl Into<Vec<u8>>) -> DirTree {
        DirTree {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<Vec<u8>>, children: Vec<DirTree>) -> DirTree {
        DirTree {
            name: name.into(),
            children,
        }
    }

    /// Pre-order serialize: this node, then each child left-to-right.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"TreeName:");
        out.extend_from_slice(&self.name);
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(b"TreeChildNum:");
        out.extend_from_slice(self.children.len().to_string().as_bytes());
        out.extend_from_slice(b"\r\n");

        for child in &self.children {
            child.encode_into(out);
        }
    }

    pub fn decode(buf: &[u8]) -> Result<DirTree> {
        let mut cursor = Cursor { buf, pos: 0 };
        cursor.decode_node()
    }
}

/// Explicit read cursor over the serialized tree bytes (spec §9: "model the
/// cursor as an explicit in/out parameter... not shared mutable state").
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn decode_node(&mut self) -> Result<DirTree> {
        let name = self.read_keyed_line(b"TreeName:")?;
        let child_count = self.read_keyed_int(b"TreeChildNum:")?;

        let mut children = Vec::with_capacity(child_count);
        for _ in 0..child_count {
            children.push(self.decode_node()?);
        }

        Ok(DirTree { name, children })
    }

    fn read_keyed_line(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        let rest = &self.buf[self.pos..];
        if !rest.starts_with(key) {
            return Err(Error::Codec("expected TreeName key"));
        }
        let value_start = self.pos + key.len();
        let line_end = find(&self.buf[value_start..], b"\r\n")
            .ok_or(Error::Codec("missing line terminator in tree node"))?;
        let value = self.buf[value_start..value_start + line_end].to_vec();
        self.pos = value_start + line_end + 2;
        Ok(value)
    }

    fn read_keyed_int(&mut self, key: &[u8]) -> Result<usize> {
        let raw = self.read_keyed_line(key)?;
        std::str::from_utf8(&raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(Error::Codec("non-numeric TreeChildNum"))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
