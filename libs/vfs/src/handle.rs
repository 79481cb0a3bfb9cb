use std::{path::Path, sync::Arc};

use log::warn;

use crate::{
    description::{DescriptionId, DescriptionInfo},
    error::{Result, VfsError},
    file::OpenFlags,
    lseek::Whence,
    registry::DescriptionRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Open,
    Closed,
}

/// A caller's reference to one description in a registry.
///
/// The description a handle points at is fixed for its whole life. Dropping
/// a handle that is still open releases its reference.
#[derive(Debug)]
pub struct Handle {
    registry: Arc<DescriptionRegistry>,
    description: DescriptionId,
    state: HandleState,
}

impl Handle {
    /// Opens `path` as a new description, unshared with any existing handle.
    pub fn open(
        registry: &Arc<DescriptionRegistry>,
        path: impl AsRef<Path>,
        flags: OpenFlags,
    ) -> Result<Self> {
        let description = registry.create(path, flags)?;
        Ok(Self {
            registry: registry.clone(),
            description,
            state: HandleState::Open,
        })
    }

    /// A second handle on the same description.
    pub fn duplicate(&self) -> Result<Self> {
        let description = self.registry.duplicate(self.live_description()?)?;
        Ok(Self {
            registry: self.registry.clone(),
            description,
            state: HandleState::Open,
        })
    }

    /// Gives up this handle's reference. The handle is closed afterwards even
    /// if closing the underlying resource reported an error.
    pub fn close(&mut self) -> Result<()> {
        let description = self.live_description()?;
        self.state = HandleState::Closed;
        self.registry.release(description)
    }

    pub fn seek(&self, offset: i64, whence: Whence) -> Result<u64> {
        self.registry.seek(self.live_description()?, offset, whence)
    }

    pub fn tell(&self) -> Result<u64> {
        self.registry.tell(self.live_description()?)
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.registry.read(self.live_description()?, buf)
    }

    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        self.registry.write(self.live_description()?, buf)
    }

    pub fn info(&self) -> Result<DescriptionInfo> {
        self.registry.info(self.live_description()?)
    }

    pub fn description_id(&self) -> DescriptionId {
        self.description
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == HandleState::Open
    }

    pub fn shares_description_with(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry) && self.description == other.description
    }

    fn live_description(&self) -> Result<DescriptionId> {
        match self.state {
            HandleState::Open => Ok(self.description),
            HandleState::Closed => Err(VfsError::HandleClosed(self.description)),
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(err) = self.close() {
                warn!("releasing dropped handle failed: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TmpFs;
    use assert_matches::assert_matches;

    fn setup() -> (Arc<TmpFs>, Arc<DescriptionRegistry>) {
        let fs = Arc::new(TmpFs::new());
        fs.create_file("/tmp/foo", "abcdef\n");
        let registry = Arc::new(DescriptionRegistry::new(fs.clone()));
        (fs, registry)
    }

    #[test]
    fn duplicates_observe_each_others_seeks() {
        let (_fs, registry) = setup();
        let h1 = Handle::open(&registry, "/tmp/foo", OpenFlags::read_only()).unwrap();
        let h2 = h1.duplicate().unwrap();

        h1.seek(2, Whence::Set).unwrap();
        assert_eq!(h2.tell().unwrap(), 2);
        h2.seek(3, Whence::Current).unwrap();
        assert_eq!(h1.tell().unwrap(), 5);
        assert!(h1.shares_description_with(&h2));
    }

    #[test]
    fn independent_opens_do_not_share() {
        let (_fs, registry) = setup();
        let h1 = Handle::open(&registry, "/tmp/foo", OpenFlags::read_only()).unwrap();
        let h3 = Handle::open(&registry, "/tmp/foo", OpenFlags::read_only()).unwrap();

        h1.seek(2, Whence::Set).unwrap();
        assert_eq!(h3.tell().unwrap(), 0);
        assert!(!h1.shares_description_with(&h3));
    }

    #[test]
    fn closing_one_duplicate_keeps_the_description() {
        let (fs, registry) = setup();
        let mut h1 = Handle::open(&registry, "/tmp/foo", OpenFlags::read_only()).unwrap();
        let h2 = h1.duplicate().unwrap();
        h1.seek(4, Whence::Set).unwrap();

        h1.close().unwrap();
        assert_eq!(h1.state(), HandleState::Closed);
        assert_eq!(h2.tell().unwrap(), 4);
        assert_eq!(fs.open_files(), 1);
    }

    #[test]
    fn closed_handle_reports_handle_closed() {
        let (fs, registry) = setup();
        let mut h = Handle::open(&registry, "/tmp/foo", OpenFlags::read_only()).unwrap();
        let id = h.description_id();
        h.close().unwrap();

        assert_eq!(fs.open_files(), 0);
        assert!(registry.is_empty());
        assert_matches!(h.tell(), Err(VfsError::HandleClosed(closed)) if closed == id);
        assert_matches!(h.seek(0, Whence::Set), Err(VfsError::HandleClosed(_)));
        assert_matches!(h.duplicate(), Err(VfsError::HandleClosed(_)));
        assert_matches!(h.close(), Err(VfsError::HandleClosed(_)));
    }

    #[test]
    fn dropping_open_handles_releases_them() {
        let (fs, registry) = setup();
        {
            let h1 = Handle::open(&registry, "/tmp/foo", OpenFlags::read_only()).unwrap();
            let _h2 = h1.duplicate().unwrap();
            assert_eq!(registry.reference_count(h1.description_id()).unwrap(), 2);
        }
        assert!(registry.is_empty());
        assert_eq!(fs.open_files(), 0);
    }

    #[test]
    fn seek_then_tell_round_trips() {
        let (_fs, registry) = setup();
        let h = Handle::open(&registry, "/tmp/foo", OpenFlags::read_only()).unwrap();
        for offset in 0..=7 {
            assert_eq!(h.seek(offset, Whence::Set).unwrap(), offset as u64);
            assert_eq!(h.tell().unwrap(), offset as u64);
        }
    }

    #[test]
    fn read_through_one_duplicate_moves_the_other() {
        let (_fs, registry) = setup();
        let h1 = Handle::open(&registry, "/tmp/foo", OpenFlags::read_only()).unwrap();
        let h2 = h1.duplicate().unwrap();

        let mut buf = [0; 2];
        h1.read(&mut buf).unwrap();
        h2.read(&mut buf).unwrap();
        assert_eq!(&buf, b"cd");
        assert_eq!(h1.info().unwrap().offset, 4);
    }
}
