//! The resource API descriptions sit on. Each description owns exactly one
//! host file, so the host never sees two descriptions sharing state.

use core::fmt::Debug;
use std::{
    io::{self, SeekFrom},
    path::Path,
};

use crate::file::OpenFlags;

pub mod std_fs;
pub mod tmpfs;

pub use std_fs::StdFileSystem;
pub use tmpfs::TmpFs;

pub trait HostFileSystem: Debug + Send + Sync {
    fn open(&self, path: &Path, flags: OpenFlags) -> io::Result<Box<dyn HostFile>>;
}

pub trait HostFile: Debug + Send {
    fn seek(&mut self, position: SeekFrom) -> io::Result<u64>;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn size(&self) -> io::Result<u64>;

    fn close(self: Box<Self>) -> io::Result<()>;
}
