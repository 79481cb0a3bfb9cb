use core::fmt;

use tock_registers::{
    fields::FieldValue, interfaces::Readable, register_bitfields, registers::InMemoryRegister,
};

register_bitfields! [
    u32,
    pub OPEN_FLAG [
        ACCESS_MODE OFFSET(0) NUMBITS(2) [
            ReadOnly = 0,
            WriteOnly = 1,
            ReadWrite = 2
        ],
        CREATE OFFSET(6) NUMBITS(1) [],
        TRUNCATE OFFSET(9) NUMBITS(1) [],
        APPEND OFFSET(10) NUMBITS(1) [],
    ]
];

/// Flags a description is opened with. Bit positions follow Linux `open(2)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags(u32);

impl OpenFlags {
    pub fn new(val: FieldValue<u32, OPEN_FLAG::Register>) -> Self {
        Self(val.value)
    }

    pub fn read_only() -> Self {
        Self::new(OPEN_FLAG::ACCESS_MODE::ReadOnly)
    }

    pub fn write_only() -> Self {
        Self::new(OPEN_FLAG::ACCESS_MODE::WriteOnly)
    }

    pub fn read_write() -> Self {
        Self::new(OPEN_FLAG::ACCESS_MODE::ReadWrite)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    fn register(&self) -> InMemoryRegister<u32, OPEN_FLAG::Register> {
        InMemoryRegister::new(self.0)
    }

    /// `None` when the access mode bits hold the reserved value 3.
    pub fn access_mode(&self) -> Option<AccessMode> {
        match self.register().read_as_enum(OPEN_FLAG::ACCESS_MODE) {
            Some(OPEN_FLAG::ACCESS_MODE::Value::ReadOnly) => Some(AccessMode::ReadOnly),
            Some(OPEN_FLAG::ACCESS_MODE::Value::WriteOnly) => Some(AccessMode::WriteOnly),
            Some(OPEN_FLAG::ACCESS_MODE::Value::ReadWrite) => Some(AccessMode::ReadWrite),
            None => None,
        }
    }

    pub fn create(&self) -> bool {
        self.register().is_set(OPEN_FLAG::CREATE)
    }

    pub fn truncate(&self) -> bool {
        self.register().is_set(OPEN_FLAG::TRUNCATE)
    }

    pub fn append(&self) -> bool {
        self.register().is_set(OPEN_FLAG::APPEND)
    }
}

impl From<u32> for OpenFlags {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<OpenFlags> for u32 {
    fn from(flags: OpenFlags) -> Self {
        flags.0
    }
}

impl fmt::Debug for OpenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#o}", self.0)
    }
}

/// How a description may be used. Fixed when the description is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn readable(&self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    pub fn writable(&self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessMode::ReadOnly => "R/O",
            AccessMode::WriteOnly => "W/O",
            AccessMode::ReadWrite => "R/W",
        };
        f.write_str(name)
    }
}
