use core::fmt;
use std::{path::Path, sync::Arc};

use library::collections::fixed_size_table::{FixedSizeTable, TableError};
use log::{debug, warn};

use crate::{
    description::DescriptionInfo,
    error::{Result, VfsError},
    file::OpenFlags,
    handle::Handle,
    lseek::Whence,
    registry::DescriptionRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileDescriptor(usize);

impl FileDescriptor {
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorInfo {
    pub fd: FileDescriptor,
    pub description: DescriptionInfo,
}

/// Numbered handles, handed out lowest number first like a process's file
/// descriptor table.
#[derive(Debug)]
pub struct DescriptorTable {
    registry: Arc<DescriptionRegistry>,
    table: FixedSizeTable<Handle>,
}

impl DescriptorTable {
    pub const DEFAULT_MAX_DESCRIPTORS: usize = 1024;

    pub fn new(registry: Arc<DescriptionRegistry>) -> Self {
        Self::with_capacity(registry, Self::DEFAULT_MAX_DESCRIPTORS)
    }

    pub fn with_capacity(registry: Arc<DescriptionRegistry>, size: usize) -> Self {
        Self {
            registry,
            table: FixedSizeTable::new(size),
        }
    }

    pub fn registry(&self) -> &Arc<DescriptionRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn open(&mut self, path: impl AsRef<Path>, flags: OpenFlags) -> Result<FileDescriptor> {
        let handle = Handle::open(&self.registry, path, flags)?;
        self.install(handle)
    }

    /// Duplicates `fd` into the lowest free descriptor.
    pub fn dup(&mut self, fd: FileDescriptor) -> Result<FileDescriptor> {
        let handle = self.get(fd)?.duplicate()?;
        self.install(handle)
    }

    /// Duplicates `old` into exactly `new`, closing whatever `new` held.
    pub fn dup2(&mut self, old: FileDescriptor, new: FileDescriptor) -> Result<FileDescriptor> {
        let handle = self.get(old)?;
        if old == new {
            return Ok(new);
        }
        let handle = handle.duplicate()?;
        // The duplicate is released on drop if the slot does not exist.
        let replaced = self
            .table
            .insert(new.raw(), handle)
            .map_err(|(_, _)| VfsError::BadDescriptor(new))?;
        if let Some(mut previous) = replaced {
            if let Err(err) = previous.close() {
                warn!("closing fd {} replaced by dup2 failed: {}", new, err);
            }
        }
        debug!("dup2 fd {} -> fd {}", old, new);
        Ok(new)
    }

    pub fn close(&mut self, fd: FileDescriptor) -> Result<()> {
        let mut handle = self
            .table
            .remove(fd.raw())
            .map_err(|_| VfsError::BadDescriptor(fd))?;
        debug!("closed fd {}", fd);
        handle.close()
    }

    /// Closes every descriptor, reporting the first failure.
    pub fn close_all(&mut self) -> Result<()> {
        let mut result = Ok(());
        for (_, mut handle) in self.table.drain() {
            let closed = handle.close();
            if result.is_ok() {
                result = closed;
            }
        }
        result
    }

    pub fn get(&self, fd: FileDescriptor) -> Result<&Handle> {
        self.table
            .get(fd.raw())
            .map_err(|_| VfsError::BadDescriptor(fd))
    }

    pub fn seek(&self, fd: FileDescriptor, offset: i64, whence: Whence) -> Result<u64> {
        self.get(fd)?.seek(offset, whence)
    }

    pub fn tell(&self, fd: FileDescriptor) -> Result<u64> {
        self.get(fd)?.tell()
    }

    pub fn read(&self, fd: FileDescriptor, buf: &mut [u8]) -> Result<usize> {
        self.get(fd)?.read(buf)
    }

    pub fn write(&self, fd: FileDescriptor, buf: &[u8]) -> Result<usize> {
        self.get(fd)?.write(buf)
    }

    pub fn snapshot(&self) -> Result<Vec<DescriptorInfo>> {
        self.table
            .iter()
            .map(|(index, handle)| {
                Ok(DescriptorInfo {
                    fd: FileDescriptor::new(index),
                    description: handle.info()?,
                })
            })
            .collect()
    }

    fn install(&mut self, handle: Handle) -> Result<FileDescriptor> {
        // A handle that does not fit is dropped here, which releases it.
        match self.table.add(handle) {
            Ok(index) => {
                let fd = FileDescriptor::new(index);
                debug!("installed fd {}", fd);
                Ok(fd)
            }
            Err((TableError::Full(size), _)) => Err(VfsError::TableFull(size)),
            Err((_, _)) => Err(VfsError::TableFull(self.table.size())),
        }
    }
}
