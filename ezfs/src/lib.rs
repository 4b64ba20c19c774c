//! EZFS: a single-volume, block-addressed filesystem core.
//!
//! This crate is the on-disk engine only — fixed layout, allocation
//! bitmaps, the contiguous-extent block allocator, the directory entry
//! table, and the namespace operations built over them. It does not own a
//! VFS layer, a page cache, or a buffer cache; callers provide block I/O
//! through [`BlockDevice`] and are expected to layer their own
//! address-space and inode-cache machinery above [`Mount::get_block`].
//!
//! ```no_run
//! use ezfs::{BlockDevice, Mount};
//! # struct MyDevice;
//! # impl BlockDevice for MyDevice {
//! #     fn block_count(&self) -> u64 { 0 }
//! #     fn read_block(&self, _: u64, _: &mut [u8; ezfs::BLOCK_SIZE]) -> ezfs::EResult<()> { Ok(()) }
//! #     fn write_block(&self, _: u64, _: &[u8; ezfs::BLOCK_SIZE]) -> ezfs::EResult<()> { Ok(()) }
//! # }
//! let mount = Mount::mount(MyDevice)?;
//! let root = ezfs::ROOT_INODE_NUMBER;
//! let _ = mount.lookup(root, b"hello.txt")?;
//! # Ok::<(), ezfs::EzfsError>(())
//! ```

mod bitmap;
pub mod device;
pub mod dirent;
pub mod error;
mod extent;
pub mod geometry;
mod inode;
pub mod layout;
mod mount;
mod namespace;

#[cfg(test)]
mod test_support;

pub use device::BlockDevice;
pub use dirent::DirIterItem;
pub use error::{EResult, EzfsError};
pub use geometry::{
    BLOCK_SIZE, INODE_STORE_DATABLOCK_NUMBER, MAGIC_NUMBER, MAX_CHILDREN, MAX_DATA_BLKS,
    MAX_FILENAME_LENGTH, MAX_INODES, NO_BLOCK, ROOT_DATABLOCK_NUMBER, ROOT_INODE_NUMBER,
    SUPERBLOCK_DATABLOCK_NUMBER,
};
pub use inode::InodeHandle;
pub use layout::{InodeRecord, RawDirEntry, RawSuperblock, S_IFDIR, S_IFREG};
pub use mount::Mount;
