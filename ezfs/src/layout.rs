//! On-disk record shapes, little-endian, block-aligned.
//!
//! Every record here is `#[repr(C)]` and derives `bytemuck::Pod`, parsed and
//! serialized with `bytemuck::from_bytes`/`bytemuck::bytes_of` directly over
//! a raw block buffer — the same approach this codebase's ext2 block-group
//! descriptor parsing uses instead of a hand-rolled field-by-field codec.
//! Field order in each struct is chosen so there is no compiler-inserted
//! padding: widest-aligned fields first, and trailing byte arrays sized to a
//! multiple of the struct's alignment.

use bytemuck::{Pod, Zeroable};

use crate::geometry::{BLOCK_SIZE, MAX_DATA_BLKS, MAX_FILENAME_LENGTH, MAX_INODES};

/// A single inode table entry.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct InodeRecord {
    pub file_size: u64,
    pub atime_sec: u64,
    pub atime_nsec: u64,
    pub mtime_sec: u64,
    pub mtime_nsec: u64,
    pub ctime_sec: u64,
    pub ctime_nsec: u64,
    /// Physical start block of the extent, or [`crate::geometry::NO_BLOCK`].
    pub dbn: i64,
    pub nblocks: u64,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub mode: u16,
    _pad: u16,
}

/// Mode bit marking a directory inode (mirrors the POSIX `S_IFDIR` convention
/// this corpus's own ext2 module uses for `i_mode`).
pub const S_IFDIR: u16 = 0x4000;
/// Mode bit marking a regular file inode (`S_IFREG`).
pub const S_IFREG: u16 = 0x8000;

impl InodeRecord {
    pub fn is_directory(&self) -> bool {
        self.mode & S_IFDIR != 0
    }
}

const NAME_FIELD_LEN: usize = MAX_FILENAME_LENGTH + 1;

/// A single directory entry slot.
///
/// `active` is nonzero iff the slot names a live child. The deactivate
/// operation zeroes the whole record (not just `active`) so a stale name
/// never lingers for iteration to observe.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RawDirEntry {
    pub inode_no: u64,
    pub active: u64,
    pub name: [u8; NAME_FIELD_LEN],
}

impl RawDirEntry {
    pub const EMPTY: RawDirEntry = RawDirEntry {
        inode_no: 0,
        active: 0,
        name: [0; NAME_FIELD_LEN],
    };

    pub fn is_active(&self) -> bool {
        self.active != 0
    }

    /// The entry's name, up to (and not including) the first NUL byte.
    pub fn name_str(&self) -> &[u8] {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        &self.name[..len]
    }
}

const INODE_BITMAP_LEN: usize = MAX_INODES / 8;
const DATA_BITMAP_LEN: usize = MAX_DATA_BLKS / 8;
const SUPERBLOCK_HEADER_LEN: usize = 4 + 4 + INODE_BITMAP_LEN + DATA_BITMAP_LEN;
const SUPERBLOCK_RESERVED_LEN: usize = BLOCK_SIZE - SUPERBLOCK_HEADER_LEN;

/// The on-disk superblock: magic, version, and the two allocation bitmaps,
/// packed little-endian and padded to fill a whole block.
///
/// Carries no runtime handle — in particular, no mutex. The original
/// source's superblock embeds a pointer to its own mount mutex; this
/// redesign keeps the mutex entirely in the in-memory [`crate::mount::Mount`]
/// and never serializes it.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct RawSuperblock {
    pub magic: u32,
    pub version: u32,
    pub free_inodes: [u8; INODE_BITMAP_LEN],
    pub free_data_blocks: [u8; DATA_BITMAP_LEN],
    reserved: [u8; SUPERBLOCK_RESERVED_LEN],
}

impl core::fmt::Debug for RawSuperblock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawSuperblock")
            .field("magic", &self.magic)
            .field("version", &self.version)
            .field("free_inodes", &self.free_inodes)
            .field("free_data_blocks", &self.free_data_blocks)
            .finish()
    }
}

impl RawSuperblock {
    pub fn new(version: u32) -> Self {
        RawSuperblock {
            magic: crate::geometry::MAGIC_NUMBER,
            version,
            free_inodes: [0; INODE_BITMAP_LEN],
            free_data_blocks: [0; DATA_BITMAP_LEN],
            reserved: [0; SUPERBLOCK_RESERVED_LEN],
        }
    }
}
