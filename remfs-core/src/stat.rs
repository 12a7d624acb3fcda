//! Portable stat projection carried as the STAT opaque return (spec §3, §4.2
//! "STAT"; SPEC_FULL.md §3 resolves the "raw server stat block" open
//! question from spec.md §9).
//!
//! Rather than transmitting the server's native `struct stat` byte-for-byte
//! (layout-dependent, per spec.md's own caveat), this packs a fixed-width,
//! explicitly little-endian subset of fields common to every POSIX target —
//! the same idea as `mirrord-protocol`'s `MetadataInternal` projection
//! (`other_examples/`), adapted to this crate's length-prefixed wire format
//! instead of `bincode`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io;
use std::os::unix::fs::MetadataExt;

/// Wire size of an encoded [`StatBlock`] in bytes.
pub const SIZE: usize = 8 * 13 + 4 * 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatBlock {
    pub device: u64,
    pub inode: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: u64,
    pub blksize: u64,
    pub blocks: u64,
    pub atime_sec: i64,
    pub atime_nsec: i64,
    pub mtime_sec: i64,
    pub mtime_nsec: i64,
    pub ctime_sec: i64,
    pub ctime_nsec: i64,
}

impl StatBlock {
    pub fn from_metadata(metadata: &std::fs::Metadata) -> StatBlock {
        StatBlock {
            device: metadata.dev(),
            inode: metadata.ino(),
            mode: metadata.mode(),
            nlink: metadata.nlink(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            rdev: metadata.rdev(),
            size: metadata.size(),
            blksize: metadata.blksize(),
            blocks: metadata.blocks(),
            atime_sec: metadata.atime(),
            atime_nsec: metadata.atime_nsec(),
            mtime_sec: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            ctime_sec: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIZE);
        out.write_u64::<LittleEndian>(self.device).unwrap();
        out.write_u64::<LittleEndian>(self.inode).unwrap();
        out.write_u32::<LittleEndian>(self.mode).unwrap();
        out.write_u64::<LittleEndian>(self.nlink).unwrap();
        out.write_u32::<LittleEndian>(self.uid).unwrap();
        out.write_u32::<LittleEndian>(self.gid).unwrap();
        out.write_u64::<LittleEndian>(self.rdev).unwrap();
        out.write_u64::<LittleEndian>(self.size).unwrap();
        out.write_u64::<LittleEndian>(self.blksize).unwrap();
        out.write_u64::<LittleEndian>(self.blocks).unwrap();
        out.write_i64::<LittleEndian>(self.atime_sec).unwrap();
        out.write_i64::<LittleEndian>(self.atime_nsec).unwrap();
        out.write_i64::<LittleEndian>(self.mtime_sec).unwrap();
        out.write_i64::<LittleEndian>(self.mtime_nsec).unwrap();
        out.write_i64::<LittleEndian>(self.ctime_sec).unwrap();
        out.write_i64::<LittleEndian>(self.ctime_nsec).unwrap();
        out
    }

    pub fn decode(mut buf: &[u8]) -> io::Result<StatBlock> {
        Ok(StatBlock {
            device: buf.read_u64::<LittleEndian>()?,
            inode: buf.read_u64::<LittleEndian>()?,
            mode: buf.read_u32::<LittleEndian>()?,
            nlink: buf.read_u64::<LittleEndian>()?,
            uid: buf.read_u32::<LittleEndian>()?,
            gid: buf.read_u32::<LittleEndian>()?,
            rdev: buf.read_u64::<LittleEndian>()?,
            size: buf.read_u64::<LittleEndian>()?,
            blksize: buf.read_u64::<LittleEndian>()?,
            blocks: buf.read_u64::<LittleEndian>()?,
            atime_sec: buf.read_i64::<LittleEndian>()?,
            atime_nsec: buf.read_i64::<LittleEndian>()?,
            mtime_sec: buf.read_i64::<LittleEndian>()?,
            mtime_nsec: buf.read_i64::<LittleEndian>()?,
            ctime_sec: buf.read_i64::<LittleEndian>()?,
            ctime_nsec: buf.read_i64::<LittleEndian>()?,
        })
    }
}
