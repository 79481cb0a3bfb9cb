use std::{fs, sync::Arc};

use assert_matches::assert_matches;
use tempfile::TempDir;
use vfs::{
    DescriptionRegistry, DescriptorTable, Handle, OpenFlags, StdFileSystem, VfsError, Whence,
    OPEN_FLAG,
};

fn foo() -> (TempDir, std::path::PathBuf, Arc<DescriptionRegistry>) {
    let dir = tempfile::tempdir().expect("temp directory");
    let path = dir.path().join("foo");
    fs::write(&path, "abcdef\n").expect("write foo");
    let registry = Arc::new(DescriptionRegistry::new(Arc::new(StdFileSystem::new())));
    (dir, path, registry)
}

#[test]
fn dup_shares_offset_and_second_open_does_not() {
    let (_dir, path, registry) = foo();
    let h1 = Handle::open(&registry, &path, OpenFlags::read_only()).unwrap();
    let h2 = h1.duplicate().unwrap();
    let h3 = Handle::open(&registry, &path, OpenFlags::read_only()).unwrap();

    h1.seek(2, Whence::Set).unwrap();
    assert_eq!(h2.tell().unwrap(), 2);
    assert_eq!(h3.tell().unwrap(), 0);
}

#[test]
fn reads_on_real_files_follow_the_shared_offset() {
    let (_dir, path, registry) = foo();
    let mut table = DescriptorTable::new(registry);
    let fd1 = table.open(&path, OpenFlags::read_only()).unwrap();
    let fd2 = table.dup(fd1).unwrap();
    let fd3 = table.open(&path, OpenFlags::read_only()).unwrap();

    let mut buf = [0; 2];
    table.read(fd1, &mut buf).unwrap();
    assert_eq!(&buf, b"ab");
    table.read(fd2, &mut buf).unwrap();
    assert_eq!(&buf, b"cd");
    table.read(fd3, &mut buf).unwrap();
    assert_eq!(&buf, b"ab");
}

#[test]
fn writes_through_duplicates_do_not_overwrite_each_other() {
    let (_dir, path, registry) = foo();
    let flags = OpenFlags::new(
        OPEN_FLAG::ACCESS_MODE::WriteOnly + OPEN_FLAG::TRUNCATE::SET,
    );
    let h1 = Handle::open(&registry, &path, flags).unwrap();
    let h2 = h1.duplicate().unwrap();

    h1.write(b"one ").unwrap();
    h2.write(b"two").unwrap();
    drop((h1, h2));
    assert_eq!(fs::read_to_string(&path).unwrap(), "one two");
}

#[test]
fn missing_path_is_resource_unavailable() {
    let (dir, _path, registry) = foo();
    let err = Handle::open(&registry, dir.path().join("bar"), OpenFlags::read_only()).unwrap_err();
    assert_matches!(err, VfsError::ResourceUnavailable { .. });
    assert!(registry.is_empty());
}

#[test]
fn last_close_invalidates_handle() {
    let (_dir, path, registry) = foo();
    let mut h1 = Handle::open(&registry, &path, OpenFlags::read_only()).unwrap();
    let mut h2 = h1.duplicate().unwrap();

    h1.close().unwrap();
    assert_eq!(h2.tell().unwrap(), 0);
    h2.close().unwrap();
    assert!(registry.is_empty());
    assert_matches!(h2.tell(), Err(VfsError::HandleClosed(_)));
}
