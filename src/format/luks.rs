//! LUKS encrypted payload format.
//!
//! Grounded on `original_source/blivet/static_data/luks_data.py` (header
//! version / cipher bookkeeping kept without touching real key material)
//! and the teacher's `encrypted.rs` naming.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuksVersion {
    Luks1,
    Luks2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuksFormat {
    pub version: LuksVersion,
    pub cipher: String,
    /// Name the mapped clear-text device should be registered under, once
    /// opened; the open operation itself is a [`crate::ops::CryptoOps`]
    /// tool boundary.
    pub map_name: Option<String>,
    /// `true` once a passphrase/key has been successfully supplied for this
    /// device in this process (never the passphrase itself).
    pub unlocked: bool,
}

impl LuksFormat {
    pub fn new(version: LuksVersion) -> Self {
        LuksFormat {
            version,
            cipher: "aes-xts-plain64".to_string(),
            map_name: None,
            unlocked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_luks_format_is_locked() {
        let luks = LuksFormat::new(LuksVersion::Luks2);
        assert!(!luks.unlocked);
        assert!(luks.map_name.is_none());
    }
}
