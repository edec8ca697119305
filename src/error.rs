//! Error taxonomy for the device graph and populator.
//!
//! Advisory problems encountered while scanning (a missing udev field, a
//! transient `examine` failure) are recovered from locally by the populator
//! and never reach this type — see the module docs on [`crate::populator`].
//! Only structural failures propagate as [`Error`].

use std::path::PathBuf;

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Structural reasons a [`crate::tree::DeviceTree`] refused an operation.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum TreeError {
    /// A container (array, VG, BTRFS volume) is missing one or more of its
    /// recorded members.
    #[error("missing member devices for {0}")]
    NoSlaves(String),
    /// Two distinct LVM volume groups were discovered under the same name
    /// with incompatible membership.
    #[error("duplicate volume group name {0}")]
    DuplicateVg(String),
    /// The tree cannot be reconciled into a usable configuration (e.g. a
    /// cycle, or a device whose declared parent does not exist).
    #[error("unusable configuration: {0}")]
    UnusableConfiguration(String),
}

/// The error type for this crate.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Invalid operation on a device: already exists, not created, invalid
    /// name, resize bounds violated.
    #[error("device error: {0}")]
    Device(String),
    /// Structural tree violation.
    #[error("device tree error: {0}")]
    Tree(#[from] TreeError),
    /// A disklabel could not be read at all (I/O, missing device).
    #[error("disklabel scan failed for {device}: {reason}")]
    DiskLabelScan { device: PathBuf, reason: String },
    /// A GPT header/backup table failed its checksum.
    #[error("corrupt GPT on {0}")]
    CorruptGpt(PathBuf),
    /// A disklabel was read but its contents are not self-consistent.
    #[error("invalid disklabel on {0}: {1}")]
    InvalidDiskLabel(PathBuf, String),
    /// Generic filesystem operation failure.
    #[error("filesystem error on {device}: {reason}")]
    Fs { device: PathBuf, reason: String },
    /// A filesystem resize failed or was rejected (out of bounds, fs does
    /// not support it).
    #[error("filesystem resize error on {device}: {reason}")]
    FsResize { device: PathBuf, reason: String },
    /// `mkfs`-equivalent failed or was rejected.
    #[error("filesystem format error on {device}: {reason}")]
    FsFormat { device: PathBuf, reason: String },
    /// LUKS header or mapping operation failed.
    #[error("LUKS error on {device}: {reason}")]
    Luks { device: PathBuf, reason: String },
    /// Passphrase/key material was rejected or unavailable.
    #[error("crypto error: {0}")]
    Crypto(String),
    /// mdadm-equivalent tooling failure.
    #[error("MD RAID error on {0}: {1}")]
    MdRaid(PathBuf, String),
    /// Invalid RAID level / member-count combination.
    #[error("invalid RAID configuration: {0}")]
    Raid(String),
    /// multipath tooling failure.
    #[error("multipath error: {0}")]
    MPath(String),
    /// device-mapper tooling failure.
    #[error("device-mapper error: {0}")]
    Dm(String),
    /// Invalid BTRFS configuration (e.g. `data_level=raid1` with one
    /// member).
    #[error("invalid BTRFS configuration: {0}")]
    BtrfsValue(String),
}

impl Error {
    pub fn device(msg: impl Into<String>) -> Self {
        Error::Device(msg.into())
    }
}
