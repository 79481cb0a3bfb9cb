use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{description::DescriptionId, file::AccessMode, file_descriptor::FileDescriptor, lseek::Whence};

#[derive(Debug, Error)]
pub enum VfsError {
    #[error("failed to open {}: {source}", .path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown file description {0}")]
    UnknownDescription(DescriptionId),
    #[error("handle to file description {0} is closed")]
    HandleClosed(DescriptionId),
    #[error("seek by {offset} from {whence:?} is out of range")]
    InvalidOffset { offset: i64, whence: Whence },
    #[error("invalid whence {0}")]
    InvalidWhence(i32),
    #[error("invalid open flags {0:#o}")]
    InvalidFlags(u32),
    #[error("file description {id} is {mode} and cannot {operation}")]
    AccessDenied {
        id: DescriptionId,
        mode: AccessMode,
        operation: &'static str,
    },
    #[error("table is full ({0} entries)")]
    TableFull(usize),
    #[error("bad file descriptor {0}")]
    BadDescriptor(FileDescriptor),
    #[error("i/o error on file description {id}: {source}")]
    Io {
        id: DescriptionId,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = core::result::Result<T, VfsError>;
