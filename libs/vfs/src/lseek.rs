use crate::error::VfsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set = 0,
    Current = 1,
    End = 2,
}

impl TryFrom<i32> for Whence {
    type Error = VfsError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Whence::Set),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            _ => Err(VfsError::InvalidWhence(value)),
        }
    }
}

/// Computes the position a seek would land on, or `None` if it would fall
/// before the start or past the end of a resource of `size` bytes.
///
/// A zero-length seek from the current position only reports where the
/// description already is, so it succeeds even if the resource has since
/// shrunk below that position.
pub fn resolve(offset: i64, whence: Whence, current: u64, size: u64) -> Option<u64> {
    let base = match whence {
        Whence::Set => 0,
        Whence::Current => {
            if offset == 0 {
                return Some(current);
            }
            current
        }
        Whence::End => size,
    };
    let target = i128::from(base) + i128::from(offset);
    if target < 0 || target > i128::from(size) {
        return None;
    }
    u64::try_from(target).ok()
}
