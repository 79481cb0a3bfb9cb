use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::Path,
};

use crate::file::OpenFlags;

use super::{HostFile, HostFileSystem};

/// Files on the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl StdFileSystem {
    pub const fn new() -> Self {
        Self
    }
}

impl HostFileSystem for StdFileSystem {
    fn open(&self, path: &Path, flags: OpenFlags) -> io::Result<Box<dyn HostFile>> {
        let mode = flags
            .access_mode()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid access mode"))?;
        let file = OpenOptions::new()
            .read(mode.readable())
            .write(mode.writable())
            .create(flags.create())
            .truncate(flags.truncate())
            .open(path)?;
        Ok(Box::new(StdFile { file }))
    }
}

#[derive(Debug)]
struct StdFile {
    file: File,
}

impl HostFile for StdFile {
    fn seek(&mut self, position: SeekFrom) -> io::Result<u64> {
        self.file.seek(position)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.file.flush()
    }
}
