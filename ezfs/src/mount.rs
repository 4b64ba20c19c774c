//! Mount lifecycle and the low-level block I/O every other component rides
//! on top of.
//!
//! The on-disk superblock carries no runtime handle — no mutex pointer
//! embedded in its bytes, unlike the source this specification was
//! distilled from. The mutex lives here, in the in-memory [`Mount`], owning
//! a cached copy of the superblock; the on-disk image is write-through on
//! every mutation rather than held dirty behind a separate flush step,
//! since this core has no buffer cache of its own to defer into (that layer
//! is the host's, via [`crate::device::BlockDevice`]).

use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::device::BlockDevice;
use crate::error::{EResult, EzfsError};
use crate::geometry::{
    BLOCK_SIZE, INODE_STORE_DATABLOCK_NUMBER, MAGIC_NUMBER, MAX_CHILDREN, ROOT_INODE_NUMBER,
    SUPERBLOCK_DATABLOCK_NUMBER,
};
use crate::layout::{InodeRecord, RawDirEntry, RawSuperblock};

pub(crate) struct MountState {
    pub(crate) superblock: RawSuperblock,
}

/// An open EZFS volume.
///
/// Every mutating operation acquires [`Mount::lock_state`] once for its
/// whole duration and releases it only after every affected buffer has been
/// written through to the device — matching this specification's mutex
/// discipline (held across I/O, never released mid-operation).
pub struct Mount<D: BlockDevice> {
    pub(crate) device: D,
    state: Mutex<MountState>,
}

impl<D: BlockDevice> Mount<D> {
    /// Reads the superblock block, validates its magic, and materializes
    /// the mount state. Does not read the root inode eagerly; callers
    /// address it directly with [`crate::geometry::ROOT_INODE_NUMBER`].
    pub fn mount(device: D) -> EResult<Self> {
        let mut buf = [0u8; BLOCK_SIZE];
        device.read_block(SUPERBLOCK_DATABLOCK_NUMBER, &mut buf)?;
        let superblock: RawSuperblock = *bytemuck::from_bytes(&buf);
        if superblock.magic != MAGIC_NUMBER {
            return Err(EzfsError::BadMagic);
        }
        log::debug!("ezfs: mounted volume (version {})", superblock.version);
        Ok(Mount {
            device,
            state: Mutex::new(MountState { superblock }),
        })
    }

    /// Flushes the superblock and releases the device. Buffers owned by the
    /// mount (here: just the cached superblock) do not outlive this call.
    pub fn unmount(self) -> EResult<()> {
        let state = self.state.into_inner().unwrap_or_else(|e| e.into_inner());
        self.flush_superblock(&state.superblock)?;
        log::debug!("ezfs: unmounted");
        Ok(())
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, MountState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn flush_superblock(&self, sb: &RawSuperblock) -> EResult<()> {
        let buf: [u8; BLOCK_SIZE] = bytemuck::cast(*sb);
        self.device.write_block(SUPERBLOCK_DATABLOCK_NUMBER, &buf)
    }

    fn inode_location(inode_no: u64) -> (u64, usize) {
        let record_size = core::mem::size_of::<InodeRecord>();
        let idx = (inode_no - ROOT_INODE_NUMBER) as usize;
        let byte_off = idx * record_size;
        let block = INODE_STORE_DATABLOCK_NUMBER + (byte_off / BLOCK_SIZE) as u64;
        (block, byte_off % BLOCK_SIZE)
    }

    pub(crate) fn read_inode_record(&self, inode_no: u64) -> EResult<InodeRecord> {
        let (block, off) = Self::inode_location(inode_no);
        let mut buf = [0u8; BLOCK_SIZE];
        self.device.read_block(block, &mut buf)?;
        let record_size = core::mem::size_of::<InodeRecord>();
        Ok(*bytemuck::from_bytes(&buf[off..off + record_size]))
    }

    pub(crate) fn write_inode_record(&self, inode_no: u64, record: &InodeRecord) -> EResult<()> {
        let (block, off) = Self::inode_location(inode_no);
        let record_size = core::mem::size_of::<InodeRecord>();
        let mut buf = [0u8; BLOCK_SIZE];
        self.device.read_block(block, &mut buf)?;
        buf[off..off + record_size].copy_from_slice(bytemuck::bytes_of(record));
        self.device.write_block(block, &buf)?;
        // Synchronous writeback: confirm what landed matches what we asked for.
        let mut verify = [0u8; BLOCK_SIZE];
        self.device.read_block(block, &mut verify)?;
        if verify[off..off + record_size] != buf[off..off + record_size] {
            return Err(EzfsError::Io);
        }
        Ok(())
    }

    pub(crate) fn read_dir_block(&self, dbn: u64) -> EResult<[RawDirEntry; MAX_CHILDREN]> {
        let mut buf = [0u8; BLOCK_SIZE];
        self.device.read_block(dbn, &mut buf)?;
        Ok(bytemuck::cast(buf))
    }

    pub(crate) fn write_dir_block(&self, dbn: u64, entries: &[RawDirEntry; MAX_CHILDREN]) -> EResult<()> {
        let buf: [u8; BLOCK_SIZE] = bytemuck::cast(*entries);
        self.device.write_block(dbn, &buf)
    }
}

/// Current time as (seconds, nanoseconds) since the epoch, for populating
/// inode timestamps. Falls back to zero if the system clock is somehow
/// before the epoch, rather than panicking an otherwise-successful operation.
pub(crate) fn now() -> (u64, u64) {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (d.as_secs(), d.subsec_nanos() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryBlockDevice;

    #[test]
    fn mount_rejects_bad_magic() {
        let device = MemoryBlockDevice::formatted_empty();
        // Corrupt the magic.
        device.with_block(SUPERBLOCK_DATABLOCK_NUMBER, |buf| buf[0] ^= 0xff);
        assert_eq!(Mount::mount(device).unwrap_err(), EzfsError::BadMagic);
    }

    #[test]
    fn mount_accepts_freshly_formatted_image() {
        let device = MemoryBlockDevice::formatted_empty();
        assert!(Mount::mount(device).is_ok());
    }
}
