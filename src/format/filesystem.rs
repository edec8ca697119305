//! Mountable filesystems.
//!
//! Grounded on the teacher's `filesystem.rs` (mountpoint/options properties)
//! and on `original_source/blivet/fstab.py` for the fstab-shape bookkeeping
//! this crate keeps without ever touching a real `/etc/fstab` (spec §B:
//! shape only, no file I/O).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsType {
    Ext2,
    Ext3,
    Ext4,
    Xfs,
    Btrfs,
    Vfat,
    Ntfs,
    /// EFI System Partition content, which is a `vfat` filesystem but is
    /// tracked as its own type so the populator/weight table can special
    /// case it without string-matching a label.
    EfiSystemPartition,
    BiosBoot,
    PrepBoot,
    AppleBoot,
}

impl FsType {
    pub fn type_name(&self) -> &'static str {
        match self {
            FsType::Ext2 => "ext2",
            FsType::Ext3 => "ext3",
            FsType::Ext4 => "ext4",
            FsType::Xfs => "xfs",
            FsType::Btrfs => "btrfs",
            FsType::Vfat => "vfat",
            FsType::Ntfs => "ntfs",
            FsType::EfiSystemPartition => "efi",
            FsType::BiosBoot => "biosboot",
            FsType::PrepBoot => "prepboot",
            FsType::AppleBoot => "appleboot",
        }
    }

    /// `true` for filesystems this crate models as resizable in principle
    /// (the actual resize operation is a tool boundary, spec §4.5 / Non-goals).
    pub fn supports_resize(&self) -> bool {
        matches!(self, FsType::Ext2 | FsType::Ext3 | FsType::Ext4 | FsType::Xfs | FsType::Btrfs | FsType::Ntfs)
    }

    /// `true` for filesystems xfs-like in that they only support growing,
    /// never shrinking.
    pub fn grow_only(&self) -> bool {
        matches!(self, FsType::Xfs)
    }
}

/// An fstab row's shape, kept without ever reading or writing a real file
/// (spec §B). Lets the populator and tree reconstruct mount intent from
/// discovered descriptors the same way blivet's `FSTabManager` does from a
/// parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FstabEntry {
    pub mountpoint: Option<String>,
    pub options: Vec<String>,
    pub dump: u8,
    pub fsck_order: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemFormat {
    pub fstype: FsType,
    pub fstab: FstabEntry,
    /// `true` once this filesystem has been grown/shrunk at least once
    /// (informational; resize itself is a tool boundary).
    pub was_resized: bool,
}

impl FilesystemFormat {
    pub fn new(fstype: FsType) -> Self {
        FilesystemFormat { fstype, fstab: FstabEntry::default(), was_resized: false }
    }

    pub fn mountpoint(&self) -> Option<&str> {
        self.fstab.mountpoint.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xfs_is_grow_only() {
        assert!(FsType::Xfs.grow_only());
        assert!(!FsType::Ext4.grow_only());
    }

    #[test]
    fn fstab_shape_carries_mountpoint_without_file_io() {
        let mut fs = FilesystemFormat::new(FsType::Ext4);
        fs.fstab.mountpoint = Some("/home".to_string());
        assert_eq!(fs.mountpoint(), Some("/home"));
    }
}
