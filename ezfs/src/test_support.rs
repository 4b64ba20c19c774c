//! In-memory [`BlockDevice`] used by this crate's own unit tests. The
//! integration suite under `tests/` keeps an equivalent of its own, since it
//! compiles against the crate from the outside and cannot see this
//! `#[cfg(test)]`-only module.

use std::cell::RefCell;

use crate::device::BlockDevice;
use crate::error::{EResult, EzfsError};
use crate::geometry::{BLOCK_SIZE, MAGIC_NUMBER, MAX_DATA_BLKS, ROOT_DATABLOCK_NUMBER};
use crate::layout::RawSuperblock;

pub(crate) struct MemoryBlockDevice {
    blocks: RefCell<Vec<[u8; BLOCK_SIZE]>>,
}

impl MemoryBlockDevice {
    pub(crate) fn new(block_count: usize) -> Self {
        MemoryBlockDevice {
            blocks: RefCell::new(vec![[0u8; BLOCK_SIZE]; block_count]),
        }
    }

    /// A minimal valid image: superblock with a correct magic and an empty
    /// root directory, nothing else allocated.
    pub(crate) fn formatted_empty() -> Self {
        let total = ROOT_DATABLOCK_NUMBER as usize + MAX_DATA_BLKS;
        let device = Self::new(total);
        let mut sb = RawSuperblock::new(1);
        sb.magic = MAGIC_NUMBER;
        crate::bitmap::set(&mut sb.free_inodes, 0);
        crate::bitmap::set(&mut sb.free_data_blocks, 0);
        let buf: [u8; BLOCK_SIZE] = bytemuck::cast(sb);
        device.with_block(0, |b| b.copy_from_slice(&buf));
        device
    }

    pub(crate) fn with_block(&self, block_no: u64, f: impl FnOnce(&mut [u8; BLOCK_SIZE])) {
        f(&mut self.blocks.borrow_mut()[block_no as usize]);
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn block_count(&self) -> u64 {
        self.blocks.borrow().len() as u64
    }

    fn read_block(&self, block_no: u64, buf: &mut [u8; BLOCK_SIZE]) -> EResult<()> {
        let blocks = self.blocks.borrow();
        let src = blocks.get(block_no as usize).ok_or(EzfsError::Io)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write_block(&self, block_no: u64, buf: &[u8; BLOCK_SIZE]) -> EResult<()> {
        let mut blocks = self.blocks.borrow_mut();
        let dst = blocks.get_mut(block_no as usize).ok_or(EzfsError::Io)?;
        dst.copy_from_slice(buf);
        Ok(())
    }
}
