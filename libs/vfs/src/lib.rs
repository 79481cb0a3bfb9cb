//! Open file descriptions and the descriptors that share them.
//!
//! A [`Description`] holds the state of one `open`: the offset and the
//! access mode. [`Handle`]s point at a description; duplicating a handle
//! shares its description, opening the same path again does not.
//!
//! This is a model built on top of the host file API. Each description owns
//! its own host file, and offset sharing is done by the [`DescriptionRegistry`]
//! rather than by the operating system's open file table.

pub mod description;
pub mod error;
pub mod file;
pub mod file_descriptor;
pub mod handle;
pub mod host;
pub mod lseek;
pub mod registry;

pub use description::{Description, DescriptionId, DescriptionInfo};
pub use error::{Result, VfsError};
pub use file::{AccessMode, OpenFlags, OPEN_FLAG};
pub use file_descriptor::{DescriptorInfo, DescriptorTable, FileDescriptor};
pub use handle::{Handle, HandleState};
pub use host::{HostFile, HostFileSystem, StdFileSystem, TmpFs};
pub use lseek::Whence;
pub use registry::DescriptionRegistry;
