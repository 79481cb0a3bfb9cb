use std::{
    io::{self, SeekFrom},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::file::OpenFlags;

use super::{HostFile, HostFileSystem};

type Contents = Arc<Mutex<Vec<u8>>>;

/// An in-memory filesystem. Keeps count of the host files currently open on
/// it so callers can observe when a description lets go of its file.
#[derive(Debug, Default)]
pub struct TmpFs {
    files: Mutex<HashMap<PathBuf, Contents>>,
    open_files: Arc<AtomicUsize>,
}

impl TmpFs {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates or replaces the file at `path`.
    pub fn create_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files.lock().insert(
            path.as_ref().to_path_buf(),
            Arc::new(Mutex::new(contents.into())),
        );
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files
            .lock()
            .get(path.as_ref())
            .map(|contents| contents.lock().clone())
    }

    pub fn open_files(&self) -> usize {
        self.open_files.load(Ordering::SeqCst)
    }
}

impl HostFileSystem for TmpFs {
    fn open(&self, path: &Path, flags: OpenFlags) -> io::Result<Box<dyn HostFile>> {
        let mode = flags
            .access_mode()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid access mode"))?;
        if (flags.create() || flags.truncate()) && !mode.writable() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "create and truncate need write access",
            ));
        }

        let contents = {
            let mut files = self.files.lock();
            let existing = files.get(path).cloned();
            match existing {
                Some(contents) => contents,
                None if flags.create() => files
                    .entry(path.to_path_buf())
                    .or_insert_with(Default::default)
                    .clone(),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        "no such file or directory",
                    ))
                }
            }
        };
        if flags.truncate() {
            contents.lock().clear();
        }

        self.open_files.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TmpFile {
            contents,
            position: 0,
            readable: mode.readable(),
            writable: mode.writable(),
            open_files: self.open_files.clone(),
        }))
    }
}

#[derive(Debug)]
struct TmpFile {
    contents: Contents,
    position: u64,
    readable: bool,
    writable: bool,
    open_files: Arc<AtomicUsize>,
}

fn bad_descriptor(message: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, message)
}

impl HostFile for TmpFile {
    fn seek(&mut self, position: SeekFrom) -> io::Result<u64> {
        let size = self.size()?;
        let target = match position {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(offset) => i128::from(self.position) + i128::from(offset),
            SeekFrom::End(offset) => i128::from(size) + i128::from(offset),
        };
        self.position = u64::try_from(target)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "negative seek"))?;
        Ok(self.position)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.readable {
            return Err(bad_descriptor("file is not open for reading"));
        }
        let contents = self.contents.lock();
        let start = usize::try_from(self.position)
            .unwrap_or(usize::MAX)
            .min(contents.len());
        let n = buf.len().min(contents.len() - start);
        buf[..n].copy_from_slice(&contents[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(bad_descriptor("file is not open for writing"));
        }
        let mut contents = self.contents.lock();
        let start = usize::try_from(self.position)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "position out of range"))?;
        let end = start + buf.len();
        if contents.len() < end {
            contents.resize(end, 0);
        }
        contents[start..end].copy_from_slice(buf);
        self.position = end as u64;
        Ok(buf.len())
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.contents.lock().len() as u64)
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for TmpFile {
    fn drop(&mut self) {
        self.open_files.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_counts_live_files() {
        let fs = TmpFs::new();
        fs.create_file("/tmp/foo", "abcdef\n");

        let first = fs.open(Path::new("/tmp/foo"), OpenFlags::read_only()).unwrap();
        let second = fs.open(Path::new("/tmp/foo"), OpenFlags::read_only()).unwrap();
        assert_eq!(fs.open_files(), 2);
        first.close().unwrap();
        assert_eq!(fs.open_files(), 1);
        drop(second);
        assert_eq!(fs.open_files(), 0);
    }

    #[test]
    fn missing_file_is_not_found() {
        let fs = TmpFs::new();
        let err = fs.open(Path::new("/nope"), OpenFlags::read_only()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(fs.open_files(), 0);
    }

    #[test]
    fn writes_are_visible_to_other_opens() {
        let fs = TmpFs::new();
        let flags = OpenFlags::from(u32::from(OpenFlags::read_write()) | 0o100);
        let mut writer = fs.open(Path::new("/log"), flags).unwrap();
        writer.write(b"hello").unwrap();
        writer.seek(SeekFrom::Start(7)).unwrap();
        writer.write(b"!").unwrap();

        let mut reader = fs.open(Path::new("/log"), OpenFlags::read_only()).unwrap();
        let mut buf = [0xff; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 8);
        assert_eq!(&buf[..8], b"hello\0\0!");
        assert_eq!(fs.contents("/log").unwrap(), b"hello\0\0!");
    }

    #[test]
    fn access_mode_is_enforced() {
        let fs = TmpFs::new();
        fs.create_file("/ro", "x");
        let mut file = fs.open(Path::new("/ro"), OpenFlags::read_only()).unwrap();
        assert!(file.write(b"y").is_err());
        let err = fs
            .open(Path::new("/ro"), OpenFlags::from(u32::from(OpenFlags::read_only()) | 0o1000))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
