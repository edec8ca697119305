//! The populator's unit of input: one kernel/udev view of a block device.
//!
//! A real binary crate builds these from `udevadm info` / libudev /
//! `/sys/class/block` walks; this crate only consumes the struct, so its own
//! tests and [`crate::ops::fake::FakeUdevOps`] construct `Descriptor`s by
//! hand. Field names follow udev property names loosely (`ID_FS_TYPE`,
//! `DM_UUID`...) since that's what a real implementation will be filling
//! these from.

use crate::size::Size;

/// The broad shape of device a [`Descriptor`] describes, enough to route it
/// to the right device-populator helper (spec §4.3) before any detailed
/// parsing happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    Disk,
    Partition,
    DmDevice,
    MdDevice,
    Loop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub sysfs_path: String,
    pub name: String,
    pub kind: DescriptorKind,
    pub size: Size,
    pub sector_size: u64,

    /// Sysfs path of the parent this descriptor's device is subordinate to
    /// (a partition's disk, a dm device's slave), if any. The populator
    /// resolves this into a [`crate::device::DeviceId`] once the parent has
    /// itself been handled.
    pub parent_sysfs_path: Option<String>,

    /// `ID_FS_TYPE`-equivalent: what the populator's format helpers dispatch
    /// on. `None` means udev saw no recognizable signature.
    pub fs_type: Option<String>,
    pub fs_uuid: Option<uuid::Uuid>,
    pub fs_label: Option<String>,

    /// `DM_UUID`-equivalent prefix (`CRYPT-...`, `LVM-...`, `mpath-...`),
    /// present only for `DescriptorKind::DmDevice`.
    pub dm_uuid: Option<String>,
    /// `MD_LEVEL`-equivalent, present only for `DescriptorKind::MdDevice`.
    pub md_level: Option<String>,
    pub md_uuid: Option<String>,

    pub vendor: Option<String>,
    pub model: Option<String>,
    pub removable: bool,
    pub rotational: bool,
    pub bus: Option<String>,

    /// `true` if the kernel/udev marked this device read-only, informing
    /// `partitionable`/format-eligibility checks.
    pub read_only: bool,

    /// `DEVLINKS`-equivalent: `/dev/disk/by-*` symlinks udev records for this
    /// device, carried onto the [`Device`](crate::device::Device) it resolves
    /// into (spec §3).
    pub symlinks: Vec<String>,
}

impl Descriptor {
    pub fn disk(name: impl Into<String>, size: Size) -> Self {
        let name = name.into();
        Descriptor {
            sysfs_path: format!("/sys/block/{name}"),
            name,
            kind: DescriptorKind::Disk,
            size,
            sector_size: 512,
            parent_sysfs_path: None,
            fs_type: None,
            fs_uuid: None,
            fs_label: None,
            dm_uuid: None,
            md_level: None,
            md_uuid: None,
            vendor: None,
            model: None,
            removable: false,
            rotational: true,
            bus: Some("ata".to_string()),
            read_only: false,
            symlinks: Vec::new(),
        }
    }

    pub fn partition(name: impl Into<String>, parent_sysfs_path: impl Into<String>, size: Size) -> Self {
        let name = name.into();
        Descriptor {
            sysfs_path: format!("/sys/class/block/{name}"),
            name,
            kind: DescriptorKind::Partition,
            size,
            sector_size: 512,
            parent_sysfs_path: Some(parent_sysfs_path.into()),
            fs_type: None,
            fs_uuid: None,
            fs_label: None,
            dm_uuid: None,
            md_level: None,
            md_uuid: None,
            vendor: None,
            model: None,
            removable: false,
            rotational: true,
            bus: None,
            read_only: false,
            symlinks: Vec::new(),
        }
    }

    pub fn with_fs(mut self, fs_type: impl Into<String>) -> Self {
        self.fs_type = Some(fs_type.into());
        self
    }

    pub fn with_fs_uuid(mut self, uuid: uuid::Uuid) -> Self {
        self.fs_uuid = Some(uuid);
        self
    }

    pub fn with_symlinks(mut self, symlinks: Vec<String>) -> Self {
        self.symlinks = symlinks;
        self
    }
}
