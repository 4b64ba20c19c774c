//! Contiguous-extent allocation: `get_block` and the relocation it sometimes
//! triggers.
//!
//! Mirrors this codebase's `drivers::fs::ext2::allocator::BlockAllocator`
//! in spirit — a single entry point that either hands back an already-live
//! mapping or grows one — but specialized to a single-extent-per-file
//! layout instead of ext2's indirect block trees.

use crate::bitmap;
use crate::device::BlockDevice;
use crate::error::{EResult, EzfsError};
use crate::geometry::{MAX_DATA_BLKS, NO_BLOCK, ROOT_DATABLOCK_NUMBER};
use crate::mount::Mount;

impl<D: BlockDevice> Mount<D> {
    /// Resolves `logical_block` of inode `inode_no` to a physical block
    /// number.
    ///
    /// With `create = false`, a block past the current extent yields
    /// `Ok(None)` (the host fills the logical hole with zeros) and no lock
    /// is taken. With `create = true`, a hole is grown: by one block in
    /// place when the block immediately past the extent is free, or by
    /// relocating the whole extent to a fresh run otherwise. Either growth
    /// path acquires the mount lock for its full duration.
    pub fn get_block(&self, inode_no: u64, logical_block: u64, create: bool) -> EResult<Option<u64>> {
        let record = self.read_inode_record(inode_no)?;
        if record.dbn != NO_BLOCK && logical_block < record.nblocks {
            return Ok(Some(record.dbn as u64 + logical_block));
        }
        if !create {
            return Ok(None);
        }
        if logical_block != record.nblocks {
            // Only sequential, one-block-at-a-time growth is supported;
            // this core has no sparse-file support.
            return Ok(None);
        }

        let mut state = self.lock_state();
        // Re-read under the lock: another writer may have grown the file
        // since our lock-free read above.
        let mut record = self.read_inode_record(inode_no)?;
        if record.dbn != NO_BLOCK && logical_block < record.nblocks {
            return Ok(Some(record.dbn as u64 + logical_block));
        }

        if record.dbn == NO_BLOCK {
            let free_idx = bitmap::find_first_zero(&state.superblock.free_data_blocks, MAX_DATA_BLKS)
                .ok_or(EzfsError::NoSpace)?;
            bitmap::set(&mut state.superblock.free_data_blocks, free_idx);
            record.dbn = ROOT_DATABLOCK_NUMBER as i64 + free_idx as i64;
            record.nblocks = 1;
            self.write_inode_record(inode_no, &record)?;
            self.flush_superblock(&state.superblock)?;
            log::debug!("ezfs: inode {inode_no} allocated first block {}", record.dbn);
            return Ok(Some(record.dbn as u64));
        }

        let candidate_idx = (record.dbn as u64 - ROOT_DATABLOCK_NUMBER + record.nblocks) as usize;
        if candidate_idx < MAX_DATA_BLKS && !bitmap::is_set(&state.superblock.free_data_blocks, candidate_idx) {
            bitmap::set(&mut state.superblock.free_data_blocks, candidate_idx);
            self.flush_superblock(&state.superblock)?;
            record.nblocks += 1;
            self.write_inode_record(inode_no, &record)?;
            log::debug!(
                "ezfs: inode {inode_no} extended in place to {} blocks",
                record.nblocks
            );
            return Ok(Some(record.dbn as u64 + logical_block));
        }

        log::debug!(
            "ezfs: inode {inode_no} cannot extend in place, relocating {} blocks",
            record.nblocks
        );
        self.relocate_extent(&mut state, inode_no, &mut record)?;
        Ok(Some(record.dbn as u64 + logical_block))
    }

    /// Moves a file's whole extent to a fresh, larger contiguous run.
    ///
    /// Ordering matters: every block is copied to its new home, then every
    /// new bit is set, then every old bit is cleared, then the inode record
    /// is updated to point at the new extent — in that order — so a reader
    /// observing any intermediate on-disk state either sees the old extent
    /// fully intact or the new one fully populated, never a partial mix.
    fn relocate_extent(
        &self,
        state: &mut crate::mount::MountState,
        inode_no: u64,
        record: &mut crate::layout::InodeRecord,
    ) -> EResult<()> {
        let old_start = record.dbn as u64;
        let old_nblocks = record.nblocks;
        let new_nblocks = old_nblocks + 1;
        if new_nblocks as usize > MAX_DATA_BLKS {
            return Err(EzfsError::NoSpace);
        }

        let new_idx = bitmap::find_free_run(&state.superblock.free_data_blocks, MAX_DATA_BLKS, new_nblocks as usize)
            .ok_or(EzfsError::NoSpace)?;
        let new_start = ROOT_DATABLOCK_NUMBER + new_idx as u64;
        log::warn!(
            "ezfs: relocating inode {inode_no} extent [{old_start}, {}) -> [{new_start}, {})",
            old_start + old_nblocks,
            new_start + new_nblocks
        );

        let mut buf = [0u8; crate::geometry::BLOCK_SIZE];
        for i in 0..old_nblocks {
            self.device.read_block(old_start + i, &mut buf)?;
            self.device.write_block(new_start + i, &buf)?;
        }

        for i in 0..new_nblocks as usize {
            bitmap::set(&mut state.superblock.free_data_blocks, new_idx + i);
        }
        for i in 0..old_nblocks as usize {
            let old_idx = (old_start - ROOT_DATABLOCK_NUMBER) as usize + i;
            bitmap::clear(&mut state.superblock.free_data_blocks, old_idx);
        }

        record.dbn = new_start as i64;
        record.nblocks = new_nblocks;
        self.write_inode_record(inode_no, record)?;
        self.flush_superblock(&state.superblock)?;
        log::debug!("ezfs: inode {inode_no} relocation complete, now at block {new_start}");
        Ok(())
    }
}
