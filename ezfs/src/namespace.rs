//! Namespace operations: `lookup`, `create`, `mkdir`, `unlink`, `rmdir`,
//! `iterate`. Composed over [`crate::inode`] and [`crate::dirent`] the way
//! this codebase's `dirs::add_dir_entry` and `delete::delete_file` sit above
//! its own inode and block layers rather than touching raw bytes directly.

use crate::bitmap;
use crate::device::BlockDevice;
use crate::dirent::{self, DirIterItem};
use crate::error::{EResult, EzfsError};
use crate::geometry::{MAX_FILENAME_LENGTH, MAX_INODES, ROOT_DATABLOCK_NUMBER};
use crate::layout::S_IFDIR;
use crate::mount::{now, Mount};

impl<D: BlockDevice> Mount<D> {
    /// Resolves `name` within `parent_inode`'s directory block. Read-only:
    /// no lock is taken, matching the spec's framing that lookups may
    /// proceed concurrently with mutating operations elsewhere in the tree.
    pub fn lookup(&self, parent_inode: u64, name: &[u8]) -> EResult<Option<u64>> {
        let parent = self.read_inode_record(parent_inode)?;
        let dbn = parent.dbn as u64;
        let entries = self.read_dir_block(dbn)?;
        Ok(dirent::lookup(&entries, name))
    }

    /// Creates a directory entry named `name` under `parent_inode`, backed
    /// by a freshly allocated inode of the given `mode`. For a subdirectory
    /// (`mode & S_IFDIR != 0`) a data block for its own `.`/`..`-bearing
    /// entries is allocated too.
    pub fn create(&self, parent_inode: u64, name: &[u8], mode: u16) -> EResult<u64> {
        if name.len() > MAX_FILENAME_LENGTH {
            return Err(EzfsError::NameTooLong);
        }

        let mut state = self.lock_state();
        let mut parent = self.read_inode_record(parent_inode)?;
        let parent_dbn = parent.dbn as u64;
        let mut entries = self.read_dir_block(parent_dbn)?;

        // No existing-name check: the host is expected to `lookup` first,
        // matching this specification's literal create() description.
        //
        // Every resource this call might need is found *before* any bitmap
        // bit is actually set, so a NO_SPACE failure partway through (e.g. a
        // directory needing a data block once no inode bit is left) leaves
        // the bitmaps exactly as they were — nothing to roll back.
        let slot = dirent::find_free_slot(&entries).ok_or(EzfsError::NoSpace)?;
        let inode_idx = bitmap::find_first_zero(&state.superblock.free_inodes, MAX_INODES)
            .ok_or(EzfsError::NoSpace)?;
        let data_idx = if mode & S_IFDIR != 0 {
            Some(
                bitmap::find_first_zero(&state.superblock.free_data_blocks, crate::geometry::MAX_DATA_BLKS)
                    .ok_or(EzfsError::NoSpace)?,
            )
        } else {
            None
        };

        bitmap::set(&mut state.superblock.free_inodes, inode_idx);
        let child_inode = crate::geometry::ROOT_INODE_NUMBER + inode_idx as u64;
        let mut child_record = self.new_inode_record(mode);

        if let Some(data_idx) = data_idx {
            bitmap::set(&mut state.superblock.free_data_blocks, data_idx);
            let child_dbn = ROOT_DATABLOCK_NUMBER + data_idx as u64;
            child_record.dbn = child_dbn as i64;
            child_record.nblocks = 1;
            child_record.file_size = crate::geometry::BLOCK_SIZE as u64;
            child_record.nlink = 2;
            self.write_inode_record(child_inode, &child_record)?;
            let empty_children = [crate::layout::RawDirEntry::EMPTY; crate::geometry::MAX_CHILDREN];
            self.write_dir_block(child_dbn, &empty_children)?;
            parent.nlink += 1;
        } else {
            self.write_inode_record(child_inode, &child_record)?;
        }

        entries[slot] = dirent::make_entry(child_inode, name)?;
        self.write_dir_block(parent_dbn, &entries)?;

        let (sec, nsec) = now();
        parent.mtime_sec = sec;
        parent.mtime_nsec = nsec;
        parent.ctime_sec = sec;
        parent.ctime_nsec = nsec;
        self.write_inode_record(parent_inode, &parent)?;
        self.flush_superblock(&state.superblock)?;
        Ok(child_inode)
    }

    pub fn mkdir(&self, parent_inode: u64, name: &[u8]) -> EResult<u64> {
        self.create(parent_inode, name, S_IFDIR)
    }

    /// Removes `name` from `parent_inode`'s directory, decrementing the
    /// target's link count. Does not free the target's storage — that
    /// happens only once [`Mount::evict_inode`] observes a zero link count.
    pub fn unlink(&self, parent_inode: u64, name: &[u8]) -> EResult<()> {
        let _state = self.lock_state();
        let mut parent = self.read_inode_record(parent_inode)?;
        let parent_dbn = parent.dbn as u64;
        let mut entries = self.read_dir_block(parent_dbn)?;

        let target_inode = dirent::deactivate(&mut entries, name).ok_or(EzfsError::NotFound)?;
        self.write_dir_block(parent_dbn, &entries)?;

        let mut target = self.read_inode_record(target_inode)?;
        target.nlink = target.nlink.saturating_sub(1);
        let (sec, nsec) = now();
        target.ctime_sec = sec;
        target.ctime_nsec = nsec;
        self.write_inode_record(target_inode, &target)?;

        parent.mtime_sec = sec;
        parent.mtime_nsec = nsec;
        parent.ctime_sec = sec;
        parent.ctime_nsec = nsec;
        self.write_inode_record(parent_inode, &parent)?;
        Ok(())
    }

    /// Removes an empty subdirectory. Inlines the deactivate/link-drop
    /// sequence from [`Mount::unlink`] rather than calling it, since
    /// `std::sync::Mutex` is not reentrant and this operation must hold the
    /// lock across both the emptiness check and the removal.
    pub fn rmdir(&self, parent_inode: u64, name: &[u8]) -> EResult<()> {
        let _state = self.lock_state();
        let mut parent = self.read_inode_record(parent_inode)?;
        let parent_dbn = parent.dbn as u64;
        let mut entries = self.read_dir_block(parent_dbn)?;

        let target_inode = dirent::lookup(&entries, name).ok_or(EzfsError::NotFound)?;
        let mut target = self.read_inode_record(target_inode)?;
        let target_entries = self.read_dir_block(target.dbn as u64)?;
        if !dirent::is_empty(&target_entries) {
            return Err(EzfsError::NotEmpty);
        }

        dirent::deactivate(&mut entries, name);
        self.write_dir_block(parent_dbn, &entries)?;

        target.nlink = target.nlink.saturating_sub(1);
        let (sec, nsec) = now();
        target.ctime_sec = sec;
        target.ctime_nsec = nsec;
        self.write_inode_record(target_inode, &target)?;

        parent.nlink = parent.nlink.saturating_sub(1);
        parent.mtime_sec = sec;
        parent.mtime_nsec = nsec;
        parent.ctime_sec = sec;
        parent.ctime_nsec = nsec;
        self.write_inode_record(parent_inode, &parent)?;
        Ok(())
    }

    /// Yields the next directory entry past `position`, advancing it.
    /// Read-only and lock-free, like [`Mount::lookup`].
    pub fn iterate(&self, dir_inode: u64, position: &mut u64) -> EResult<Option<DirIterItem>> {
        let dir = self.read_inode_record(dir_inode)?;
        let entries = self.read_dir_block(dir.dbn as u64)?;
        Ok(dirent::iterate(&entries, position))
    }
}
