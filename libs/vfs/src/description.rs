use core::fmt;
use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
};

use log::trace;
use parking_lot::Mutex;

use crate::{
    error::{Result, VfsError},
    file::{AccessMode, OpenFlags},
    host::HostFile,
    lseek::{self, Whence},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptionId(u64);

impl DescriptionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DescriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Point-in-time view of a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionInfo {
    pub id: DescriptionId,
    pub path: PathBuf,
    pub mode: AccessMode,
    pub offset: u64,
    pub references: usize,
}

#[derive(Debug)]
struct DescriptionState {
    offset: u64,
    references: usize,
    // Taken when the last reference is released.
    file: Option<Box<dyn HostFile>>,
}

/// One open file description: the offset and mode every handle duplicated
/// from the same open shares.
#[derive(Debug)]
pub struct Description {
    id: DescriptionId,
    path: PathBuf,
    flags: OpenFlags,
    mode: AccessMode,
    state: Mutex<DescriptionState>,
}

impl Description {
    pub(crate) fn new(
        id: DescriptionId,
        path: PathBuf,
        flags: OpenFlags,
        mode: AccessMode,
        file: Box<dyn HostFile>,
    ) -> Self {
        Self {
            id,
            path,
            flags,
            mode,
            state: Mutex::new(DescriptionState {
                offset: 0,
                references: 1,
                file: Some(file),
            }),
        }
    }

    pub fn id(&self) -> DescriptionId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn offset(&self) -> u64 {
        self.state.lock().offset
    }

    pub fn references(&self) -> usize {
        self.state.lock().references
    }

    pub fn info(&self) -> DescriptionInfo {
        let state = self.state.lock();
        DescriptionInfo {
            id: self.id,
            path: self.path.clone(),
            mode: self.mode,
            offset: state.offset,
            references: state.references,
        }
    }

    pub(crate) fn acquire(&self) -> usize {
        let mut state = self.state.lock();
        state.references += 1;
        state.references
    }

    /// Drops one reference. Once none remain the host file is handed back so
    /// the caller can close it.
    pub(crate) fn release(&self) -> Result<Option<Box<dyn HostFile>>> {
        let mut state = self.state.lock();
        if state.references == 0 {
            return Err(VfsError::UnknownDescription(self.id));
        }
        state.references -= 1;
        if state.references == 0 {
            Ok(state.file.take())
        } else {
            Ok(None)
        }
    }

    pub(crate) fn seek(&self, offset: i64, whence: Whence) -> Result<u64> {
        let mut state = self.state.lock();
        let current = state.offset;
        let file = self.live_file(&mut state.file)?;
        let size = file.size().map_err(|source| self.io_error(source))?;
        let target = lseek::resolve(offset, whence, current, size)
            .ok_or(VfsError::InvalidOffset { offset, whence })?;
        state.offset = target;
        trace!("description {} seek {} {:?} -> {}", self.id, offset, whence, target);
        Ok(target)
    }

    pub(crate) fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if !self.mode.readable() {
            return Err(self.access_denied("read"));
        }
        let mut state = self.state.lock();
        let offset = state.offset;
        let file = self.live_file(&mut state.file)?;
        let n = file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| file.read(buf))
            .map_err(|source| self.io_error(source))?;
        state.offset = offset + n as u64;
        trace!("description {} read {} bytes at {}", self.id, n, offset);
        Ok(n)
    }

    pub(crate) fn write(&self, buf: &[u8]) -> Result<usize> {
        if !self.mode.writable() {
            return Err(self.access_denied("write"));
        }
        let mut state = self.state.lock();
        let current = state.offset;
        let append = self.flags.append();
        let file = self.live_file(&mut state.file)?;
        let position = if append { SeekFrom::End(0) } else { SeekFrom::Start(current) };
        let (offset, n) = file
            .seek(position)
            .and_then(|offset| file.write(buf).map(|n| (offset, n)))
            .map_err(|source| self.io_error(source))?;
        state.offset = offset + n as u64;
        trace!("description {} wrote {} bytes at {}", self.id, n, offset);
        Ok(n)
    }

    fn live_file<'a>(
        &self,
        file: &'a mut Option<Box<dyn HostFile>>,
    ) -> Result<&'a mut Box<dyn HostFile>> {
        file.as_mut().ok_or(VfsError::UnknownDescription(self.id))
    }

    fn access_denied(&self, operation: &'static str) -> VfsError {
        VfsError::AccessDenied {
            id: self.id,
            mode: self.mode,
            operation,
        }
    }

    fn io_error(&self, source: std::io::Error) -> VfsError {
        VfsError::Io { id: self.id, source }
    }
}
