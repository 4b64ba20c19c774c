//! Inode engine: the read/modify/write-back cycle around a single
//! [`InodeRecord`], and eviction.
//!
//! Distinct from [`crate::layout::InodeRecord`] (the raw on-disk shape) the
//! way this codebase keeps its `managers::GroupManager` separate from the
//! raw group descriptor it reads and writes.

use crate::bitmap;
use crate::device::BlockDevice;
use crate::error::EResult;
use crate::geometry::{MAX_INODES, NO_BLOCK, ROOT_DATABLOCK_NUMBER};
use crate::layout::InodeRecord;
use crate::mount::{now, Mount};

/// An inode record paired with the inode number that addresses it.
#[derive(Debug, Clone, Copy)]
pub struct InodeHandle {
    pub inode_no: u64,
    pub record: InodeRecord,
}

impl<D: BlockDevice> Mount<D> {
    pub fn get_inode(&self, inode_no: u64) -> EResult<InodeHandle> {
        let record = self.read_inode_record(inode_no)?;
        Ok(InodeHandle { inode_no, record })
    }

    /// Writes a handle's record back, verified synchronously by
    /// [`Mount::write_inode_record`].
    pub fn write_back(&self, handle: &InodeHandle) -> EResult<()> {
        self.write_inode_record(handle.inode_no, &handle.record)
    }

    /// Updates `file_size` and `mtime`/`ctime`, for a host whose own
    /// page-cache write path just extended or truncated file content.
    pub fn update_size(&self, inode_no: u64, new_size: u64) -> EResult<()> {
        let mut record = self.read_inode_record(inode_no)?;
        record.file_size = new_size;
        let (sec, nsec) = now();
        record.mtime_sec = sec;
        record.mtime_nsec = nsec;
        record.ctime_sec = sec;
        record.ctime_nsec = nsec;
        self.write_inode_record(inode_no, &record)
    }

    /// Frees an inode's bitmap bit and its whole data extent once its link
    /// count has reached zero. A no-op if the inode still has links — the
    /// host is expected to call this once per `release`-style hand-back,
    /// mirroring the open question that regular files (and, here
    /// uniformly, directories) free storage at eviction rather than at
    /// `unlink`/`rmdir` time.
    pub fn evict_inode(&self, inode_no: u64) -> EResult<()> {
        let mut state = self.lock_state();
        let record = self.read_inode_record(inode_no)?;
        if record.nlink != 0 {
            return Ok(());
        }

        bitmap::clear(&mut state.superblock.free_inodes, (inode_no - crate::geometry::ROOT_INODE_NUMBER) as usize);
        if record.dbn != NO_BLOCK {
            let base = (record.dbn as u64 - ROOT_DATABLOCK_NUMBER) as usize;
            for i in 0..record.nblocks as usize {
                bitmap::clear(&mut state.superblock.free_data_blocks, base + i);
            }
        }
        self.flush_superblock(&state.superblock)?;
        log::debug!("ezfs: evicted inode {inode_no}");
        Ok(())
    }

    /// A fresh record for a would-be inode of the given `mode`, not yet
    /// written anywhere or tied to a bitmap bit. Split out from
    /// [`Mount::allocate_inode`] so [`crate::namespace`] can build this
    /// before committing any bitmap mutation — letting it check every
    /// resource a `create()` needs before setting a single bit.
    pub(crate) fn new_inode_record(&self, mode: u16) -> InodeRecord {
        let (sec, nsec) = now();
        InodeRecord {
            file_size: 0,
            atime_sec: sec,
            atime_nsec: nsec,
            mtime_sec: sec,
            mtime_nsec: nsec,
            ctime_sec: sec,
            ctime_nsec: nsec,
            dbn: NO_BLOCK,
            nblocks: 0,
            nlink: 1,
            uid: 0,
            gid: 0,
            mode,
            ..bytemuck::Zeroable::zeroed()
        }
    }

    /// Allocates a fresh inode number and writes an initial record for it.
    /// Used directly by callers (tests, simple hosts) that don't need
    /// [`Mount::new_inode_record`]'s check-before-commit split.
    pub(crate) fn allocate_inode(
        &self,
        state: &mut crate::mount::MountState,
        mode: u16,
    ) -> EResult<u64> {
        let idx = bitmap::find_first_zero(&state.superblock.free_inodes, MAX_INODES)
            .ok_or(crate::error::EzfsError::NoSpace)?;
        bitmap::set(&mut state.superblock.free_inodes, idx);
        let inode_no = crate::geometry::ROOT_INODE_NUMBER + idx as u64;
        let record = self.new_inode_record(mode);
        self.write_inode_record(inode_no, &record)?;
        Ok(inode_no)
    }
}
