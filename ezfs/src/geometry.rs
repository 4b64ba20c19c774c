//! Fixed, compile-time geometry of an EZFS volume.
//!
//! None of these values are runtime-configurable: the original on-disk
//! format fixes them at format time, and this core only ever mounts a
//! volume whose bytes already match them.

use crate::layout::{InodeRecord, RawDirEntry};

/// Size of one device block, in bytes.
pub const BLOCK_SIZE: usize = 4096;

/// Upper bound on live inodes. Chosen well above the formatter fixture's six
/// live inodes so the fixture is a small subset of a mountable volume.
pub const MAX_INODES: usize = 64;

/// Upper bound on live data blocks. Chosen well above the formatter
/// fixture's fourteen live blocks.
pub const MAX_DATA_BLKS: usize = 256;

/// Fixed fan-out of a single directory block.
pub const MAX_CHILDREN: usize = BLOCK_SIZE / core::mem::size_of::<RawDirEntry>();

/// Longest filename this volume can store, NUL exclusive.
pub const MAX_FILENAME_LENGTH: usize = 111;

/// Lowest valid inode number; 0 is reserved to mean "no inode".
pub const ROOT_INODE_NUMBER: u64 = 1;

/// Block holding the superblock.
pub const SUPERBLOCK_DATABLOCK_NUMBER: u64 = 0;

/// First block of the inode table.
pub const INODE_STORE_DATABLOCK_NUMBER: u64 = 1;

/// Volume identification magic; mount refuses any image that doesn't carry it.
pub const MAGIC_NUMBER: u32 = 0x455A_4653;

/// Sentinel `dbn` value for a regular file with no allocated extent yet.
pub const NO_BLOCK: i64 = -1;

const INODE_RECORD_SIZE: usize = core::mem::size_of::<InodeRecord>();

/// Number of blocks needed to hold `MAX_INODES` fixed-size records.
pub const fn inode_store_blocks() -> u64 {
    let bytes = MAX_INODES * INODE_RECORD_SIZE;
    ((bytes + BLOCK_SIZE - 1) / BLOCK_SIZE) as u64
}

/// First block of the data area: the root directory's block, and the first
/// block a file or sub-directory may be allocated in.
pub const ROOT_DATABLOCK_NUMBER: u64 = INODE_STORE_DATABLOCK_NUMBER + inode_store_blocks();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_block_is_fully_packed() {
        assert_eq!(MAX_CHILDREN * core::mem::size_of::<RawDirEntry>(), BLOCK_SIZE);
    }

    #[test]
    fn inode_store_does_not_overlap_root_block() {
        assert!(ROOT_DATABLOCK_NUMBER > INODE_STORE_DATABLOCK_NUMBER);
        assert!(inode_store_blocks() * BLOCK_SIZE as u64 >= (MAX_INODES * INODE_RECORD_SIZE) as u64);
    }
}
