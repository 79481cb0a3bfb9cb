use std::{
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use hashbrown::HashMap;
use log::{debug, warn};
use parking_lot::RwLock;

use crate::{
    description::{Description, DescriptionId, DescriptionInfo},
    error::{Result, VfsError},
    file::OpenFlags,
    host::HostFileSystem,
    lseek::Whence,
};

/// Owns every open file description and hands out their ids.
///
/// The id map and each description are locked separately: opening and
/// closing change the key set under the map lock, while seeks, reads and
/// writes only take the lock of the description they touch.
#[derive(Debug)]
pub struct DescriptionRegistry {
    host: Arc<dyn HostFileSystem>,
    descriptions: RwLock<HashMap<DescriptionId, Arc<Description>>>,
    next_id: AtomicU64,
    max_open_files: usize,
}

impl DescriptionRegistry {
    pub const DEFAULT_MAX_OPEN_FILES: usize = 1024;

    pub fn new(host: Arc<dyn HostFileSystem>) -> Self {
        Self::with_capacity(host, Self::DEFAULT_MAX_OPEN_FILES)
    }

    pub fn with_capacity(host: Arc<dyn HostFileSystem>, max_open_files: usize) -> Self {
        Self {
            host,
            descriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            max_open_files,
        }
    }

    pub fn host(&self) -> &Arc<dyn HostFileSystem> {
        &self.host
    }

    pub fn max_open_files(&self) -> usize {
        self.max_open_files
    }

    pub fn len(&self) -> usize {
        self.descriptions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.read().is_empty()
    }

    /// Opens `path` on the host and registers a new description for it with
    /// offset 0 and a single reference.
    pub fn create(&self, path: impl AsRef<Path>, flags: OpenFlags) -> Result<DescriptionId> {
        let path = path.as_ref();
        let mode = flags
            .access_mode()
            .ok_or(VfsError::InvalidFlags(flags.bits()))?;
        let file = self
            .host
            .open(path, flags)
            .map_err(|source| VfsError::ResourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let mut descriptions = self.descriptions.write();
        if descriptions.len() >= self.max_open_files {
            drop(descriptions);
            if let Err(err) = file.close() {
                warn!("closing {} after a full table failed: {}", path.display(), err);
            }
            return Err(VfsError::TableFull(self.max_open_files));
        }
        let id = DescriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        descriptions.insert(
            id,
            Arc::new(Description::new(id, path.to_path_buf(), flags, mode, file)),
        );
        debug!("opened {} as description {} ({})", path.display(), id, mode);
        Ok(id)
    }

    pub fn duplicate(&self, id: DescriptionId) -> Result<DescriptionId> {
        // Holding the map lock keeps a concurrent release from destroying the
        // description between the lookup and the increment.
        let descriptions = self.descriptions.read();
        let description = descriptions
            .get(&id)
            .ok_or(VfsError::UnknownDescription(id))?;
        let references = description.acquire();
        debug!("duplicated description {} ({} references)", id, references);
        Ok(id)
    }

    pub fn seek(&self, id: DescriptionId, offset: i64, whence: Whence) -> Result<u64> {
        self.lookup(id)?.seek(offset, whence)
    }

    pub fn tell(&self, id: DescriptionId) -> Result<u64> {
        Ok(self.lookup(id)?.offset())
    }

    pub fn read(&self, id: DescriptionId, buf: &mut [u8]) -> Result<usize> {
        self.lookup(id)?.read(buf)
    }

    pub fn write(&self, id: DescriptionId, buf: &[u8]) -> Result<usize> {
        self.lookup(id)?.write(buf)
    }

    pub fn info(&self, id: DescriptionId) -> Result<DescriptionInfo> {
        Ok(self.lookup(id)?.info())
    }

    pub fn reference_count(&self, id: DescriptionId) -> Result<usize> {
        Ok(self.lookup(id)?.references())
    }

    /// Drops one reference to `id`. The last release removes the description
    /// and closes its host file.
    pub fn release(&self, id: DescriptionId) -> Result<()> {
        let file = {
            let mut descriptions = self.descriptions.write();
            let description = descriptions
                .get(&id)
                .ok_or(VfsError::UnknownDescription(id))?;
            let file = description.release()?;
            if description.references() == 0 {
                descriptions.remove(&id);
                debug!("destroyed description {}", id);
            } else {
                debug!("released description {}", id);
            }
            file
        };
        match file {
            Some(file) => file.close().map_err(|source| VfsError::Io { id, source }),
            None => Ok(()),
        }
    }

    fn lookup(&self, id: DescriptionId) -> Result<Arc<Description>> {
        self.descriptions
            .read()
            .get(&id)
            .cloned()
            .ok_or(VfsError::UnknownDescription(id))
    }
}
