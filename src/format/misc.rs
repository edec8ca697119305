//! Small format kinds that don't warrant their own module: swap space,
//! dm-integrity metadata, and BitLocker-encrypted payloads (recognized so
//! the populator can label them; unlocking is out of scope).

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwapFormat {
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityAlgorithm {
    Crc32c,
    Sha256,
    Hmac,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityFormat {
    pub algorithm: IntegrityAlgorithm,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitlkFormat {
    pub recognized_not_supported: bool,
}
