//! Error taxonomy, mapped to the POSIX-ish error surface a host (VFS
//! binding, FUSE daemon, or test) expects to translate back into.
//!
//! Modeled on this codebase's own device-level error enums
//! (`hal::storage::IoErr`), which attach a `#[error("...")]` message per
//! variant via `thiserror` rather than propagating bare integers.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EzfsError {
    #[error("I/O error accessing the backing device")]
    Io,
    #[error("no space left on device")]
    NoSpace,
    #[error("file name exceeds the maximum length")]
    NameTooLong,
    #[error("no such file or directory")]
    NotFound,
    #[error("directory not empty")]
    NotEmpty,
    #[error("out of memory")]
    OutOfMemory,
    #[error("bad superblock magic number")]
    BadMagic,
}

impl EzfsError {
    /// Translates this error into a negative `errno` value, for hosts that
    /// need to cross back into a POSIX-shaped return convention.
    pub fn as_errno(&self) -> i32 {
        match self {
            EzfsError::Io => -5,          // EIO
            EzfsError::NoSpace => -28,    // ENOSPC
            EzfsError::NameTooLong => -36, // ENAMETOOLONG
            EzfsError::NotFound => -2,    // ENOENT
            EzfsError::NotEmpty => -39,   // ENOTEMPTY
            EzfsError::OutOfMemory => -12, // ENOMEM
            EzfsError::BadMagic => -5,    // EIO: fatal at mount time only
        }
    }
}

pub type EResult<T> = Result<T, EzfsError>;
