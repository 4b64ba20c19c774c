//! The host collaborator boundary.
//!
//! The core never assumes a specific page cache or buffer cache; it only
//! asks its host for whole-block reads and writes. A `write_block` call
//! *is* the host's dirty-mark: whether the host flushes synchronously or
//! defers to its own writeback policy is entirely its business, matching
//! this specification's framing of the VFS/page-cache layer as an external
//! collaborator the core merely consumes.

use crate::error::EResult;
use crate::geometry::BLOCK_SIZE;

pub trait BlockDevice {
    /// Total number of addressable blocks on the device.
    fn block_count(&self) -> u64;

    /// Reads block `block_no` in full into `buf`.
    fn read_block(&self, block_no: u64, buf: &mut [u8; BLOCK_SIZE]) -> EResult<()>;

    /// Writes `buf` in full to block `block_no`.
    fn write_block(&self, block_no: u64, buf: &[u8; BLOCK_SIZE]) -> EResult<()>;
}
