use core::fmt;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::info;
use thiserror::Error;
use vfs::{DescriptorInfo, DescriptorTable, FileDescriptor, OpenFlags, VfsError, Whence};

pub const CONTENTS: &str = "abcdef\n";

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to create {}: {source}", .path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Vfs(#[from] VfsError),
    #[error("expected fd1 and fd2 to share an offset (fd2 is at {observed}, wanted {expected}).")]
    NotShared { expected: u64, observed: u64 },
    #[error("expected fd3 and fd1 to NOT share an offset (fd3 is at {observed}).")]
    UnexpectedlyShared { observed: u64 },
}

#[derive(Debug)]
pub struct Report {
    pub fd1: FileDescriptor,
    pub fd2: FileDescriptor,
    pub fd3: FileDescriptor,
    pub descriptors: Vec<DescriptorInfo>,
}

/// Writes the resource, then opens it twice and duplicates the first
/// descriptor. Seeking fd1 must move fd2 and leave fd3 where it was.
pub fn run(table: &mut DescriptorTable, path: &Path, offset: i64) -> Result<Report, ScenarioError> {
    fs::write(path, CONTENTS).map_err(|source| ScenarioError::Setup {
        path: path.to_path_buf(),
        source,
    })?;

    let fd1 = table.open(path, OpenFlags::read_only())?;
    let fd2 = table.dup(fd1)?;
    let fd3 = table.open(path, OpenFlags::read_only())?;
    info!("fd1 = {}, fd2 = dup(fd1) = {}, fd3 = {}", fd1, fd2, fd3);

    let expected = table.seek(fd1, offset, Whence::Set)?;
    info!("seeked fd1 to {}", expected);

    let observed = table.tell(fd2)?;
    if observed != expected {
        return Err(ScenarioError::NotShared { expected, observed });
    }
    let observed = table.tell(fd3)?;
    if observed != 0 {
        return Err(ScenarioError::UnexpectedlyShared { observed });
    }

    Ok(Report {
        fd1,
        fd2,
        fd3,
        descriptors: table.snapshot()?,
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for descriptor in &self.descriptors {
            let name = match descriptor.fd {
                fd if fd == self.fd1 => "fd1",
                fd if fd == self.fd2 => "fd2",
                fd if fd == self.fd3 => "fd3",
                _ => "fd",
            };
            let description = &descriptor.description;
            writeln!(
                f,
                "{} ({}) -> description {}  offset: {}  perm: {}  references: {}",
                name,
                descriptor.fd,
                description.id,
                description.offset,
                description.mode,
                description.references,
            )?;
        }
        Ok(())
    }
}
