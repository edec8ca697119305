//! The device graph's node type.
//!
//! Python blivet models devices as a deep class hierarchy (`StorageDevice` ->
//! `DMDevice` -> `DMCryptDevice` -> `LUKSDevice`, etc.) and relies on virtual
//! dispatch for almost everything. Here a [`Device`] is one concrete struct
//! holding the fields every device shares (name, size, parents, format,
//! tags...), plus a [`DeviceKind`] payload enum holding the fields specific
//! to one subtype (spec §9's composition-over-inheritance note). Common
//! behaviour that in Python lived in base-class methods is a plain function
//! here, usually taking `&Device` and matching on `.kind`.
//!
//! Devices never hold a reference to their parents or children; they hold
//! [`DeviceId`] handles, and the graph itself lives in
//! [`crate::tree::DeviceTree`]. This sidesteps the reference cycles the
//! Python implementation manages with weak references.

pub mod btrfs;
pub mod disk;
pub mod dm;
pub mod loop_device;
pub mod lvm;
pub mod md;
pub mod misc;
pub mod partition;

use std::fmt;

use crate::format::Format;
use crate::parentlist::ParentList;
use crate::size::Size;
use crate::tags::Tags;

/// A handle identifying a device within a [`crate::tree::DeviceTree`].
///
/// `DeviceId` is an opaque arena index, not a kernel or udev identifier;
/// compare devices by id, not by name (names can collide transiently during
/// rename/resize actions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(u64);

impl DeviceId {
    /// Constructs a handle from a raw value. Used by [`crate::tree::DeviceTree`]
    /// when allocating new ids and by tests; callers outside the tree should
    /// treat the value as opaque.
    pub fn from_raw(raw: u64) -> Self {
        DeviceId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a device currently stands in the create/setup lifecycle (spec
/// §4.5). Actions and populator helpers consult this before deciding whether
/// an operation is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Exists only as a pending configuration, not yet created.
    Planned,
    /// Exists on disk/in the kernel.
    Created,
    /// Created and currently active (mapped, assembled, mounted-capable).
    Active,
}

/// A node in the device graph: the fields every device kind shares.
///
/// Invariants (spec §3): `protected` implies `controllable == false` --
/// enforced by [`Device::set_protected`], not by field privacy, matching
/// this crate's general style of validating at the narrow entry point
/// rather than hiding fields. `original_format` is captured at most once,
/// by [`Device::snapshot_original_format`], and never refreshed afterward
/// even if `format` changes later.
#[derive(Debug, Clone)]
pub struct Device {
    pub name: String,
    /// Stable identity for persistence (spec §6), e.g. a kickstart
    /// reference surviving a later populate. Computed per subtype by
    /// [`Device::recompute_device_id`]; [`crate::tree::DeviceTree::add_device`]
    /// refreshes it on every insert so callers never hand-maintain it.
    pub device_id: String,
    pub size: Size,
    /// Size actually observed for an existing device. Distinct from `size`
    /// once a resize has been scheduled but not yet applied.
    pub current_size: Option<Size>,
    pub target_size: Option<Size>,
    pub min_size: Option<Size>,
    pub max_size: Option<Size>,
    pub resizable: bool,
    pub sysfs_path: Option<String>,
    /// Devnode path (`/dev/sda1`), distinct from `sysfs_path`.
    pub path: Option<String>,
    /// Stable `/dev/...` aliases (`/dev/disk/by-uuid/...`) besides `path`.
    pub symlinks: Vec<String>,
    pub uuid: Option<uuid::Uuid>,
    pub parents: ParentList,
    pub format: Format,
    /// One-time snapshot of `format`, taken by [`Device::snapshot_original_format`]
    /// the first time this device's format is known.
    pub original_format: Option<Format>,
    pub tags: Tags,
    pub lifecycle: Lifecycle,
    /// `true` once the populator (or a caller) has established this device
    /// reflects on-disk/kernel state rather than being a pending action.
    pub exists: bool,
    protected: bool,
    pub controllable: bool,
    pub kind: DeviceKind,
}

impl Device {
    pub fn new(name: impl Into<String>, size: Size, kind: DeviceKind) -> Self {
        let name = name.into();
        let mut device = Device {
            device_id: name.clone(),
            name,
            size,
            current_size: None,
            target_size: None,
            min_size: None,
            max_size: None,
            resizable: false,
            sysfs_path: None,
            path: None,
            symlinks: Vec::new(),
            uuid: None,
            parents: ParentList::new(),
            format: Format::unformatted(),
            original_format: None,
            tags: Tags::new(),
            lifecycle: Lifecycle::Planned,
            exists: false,
            protected: false,
            controllable: true,
            kind,
        };
        device.recompute_device_id();
        device
    }

    /// `true` for devices that can themselves hold a partition table or
    /// filesystem directly (disks, whole MD arrays, LVM LVs, DM devices) as
    /// opposed to devices that exist purely to describe membership (an LVM
    /// PV format is on a device, not a device itself).
    pub fn is_disk_like(&self) -> bool {
        matches!(
            self.kind,
            DeviceKind::Disk(_)
                | DeviceKind::LvmLogicalVolume(_)
                | DeviceKind::MdArray(_)
                | DeviceKind::Dm(_)
                | DeviceKind::Loop(_)
                | DeviceKind::File(_)
                | DeviceKind::Partition(_)
        )
    }

    /// `true` if this device directly contains other devices (a partition
    /// table, a VG's LVs, an array's members are the *parents* here, not
    /// children -- this is about children, e.g. a partitioned disk).
    pub fn is_partitionable(&self) -> bool {
        matches!(&self.kind, DeviceKind::Disk(d) if d.partitionable)
    }

    pub fn protected(&self) -> bool {
        self.protected
    }

    /// Sets `protected`, forcing `controllable` to `false` alongside it --
    /// the only way this crate flips `protected` on, so the invariant can't
    /// be violated through a direct field write.
    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
        if protected {
            self.controllable = false;
        }
    }

    /// Records the current `current_size`/`min_size`/`max_size` as the size
    /// observed for an existing device, called once a populator helper has
    /// established `exists`.
    pub fn observe_current_size(&mut self) {
        self.current_size = Some(self.size);
        self.min_size = Some(self.size);
        self.max_size = Some(self.size);
    }

    /// Takes the `original_format` snapshot if one hasn't been taken yet.
    pub fn snapshot_original_format(&mut self) {
        if self.original_format.is_none() {
            self.original_format = Some(self.format.clone());
        }
    }

    /// Recomputes `device_id` from `kind`/`uuid`/`name` (spec §6). Most
    /// kinds just use their kernel name; LVM LVs and BTRFS volumes/
    /// subvolumes have a uuid-keyed formula so the id survives a rename.
    pub fn recompute_device_id(&mut self) {
        self.device_id = match &self.kind {
            DeviceKind::LvmLogicalVolume(_) => match self.uuid {
                Some(uuid) => format!("LVM-{uuid}"),
                None => self.name.clone(),
            },
            DeviceKind::BtrfsVolume(_) => match self.uuid {
                Some(uuid) => format!("BTRFS-{uuid}"),
                None => self.name.clone(),
            },
            DeviceKind::BtrfsSubVolume(sub) => match sub.volume_uuid {
                Some(volume_uuid) => format!("BTRFS-{volume_uuid}-{}", self.name),
                None => self.name.clone(),
            },
            _ => self.name.clone(),
        };
    }
}

/// The subtype-specific payload of a [`Device`]. Each variant's inner struct
/// holds only the fields that particular kind adds; shared state lives on
/// [`Device`] itself.
#[derive(Debug, Clone)]
pub enum DeviceKind {
    Disk(disk::DiskDevice),
    Partition(partition::PartitionDevice),
    Dm(dm::DmDevice),
    MdArray(md::MdArrayDevice),
    LvmVolumeGroup(lvm::LvmVolumeGroupDevice),
    LvmLogicalVolume(lvm::LvmLogicalVolumeDevice),
    BtrfsVolume(btrfs::BtrfsVolumeDevice),
    BtrfsSubVolume(btrfs::BtrfsSubVolumeDevice),
    Loop(loop_device::LoopDevice),
    File(misc::FileDevice),
    Optical(misc::OpticalDevice),
    Tmpfs(misc::TmpfsDevice),
    NoDevice(misc::NoDevice),
}

impl DeviceKind {
    /// Short machine-stable name used in log lines and error messages, e.g.
    /// `"disk"`, `"lvmlv"`. Mirrors blivet's `type` attribute.
    pub fn type_name(&self) -> &'static str {
        match self {
            DeviceKind::Disk(_) => "disk",
            DeviceKind::Partition(_) => "partition",
            DeviceKind::Dm(inner) => inner.type_name(),
            DeviceKind::MdArray(_) => "mdarray",
            DeviceKind::LvmVolumeGroup(_) => "lvmvg",
            DeviceKind::LvmLogicalVolume(inner) => inner.type_name(),
            DeviceKind::BtrfsVolume(_) => "btrfs volume",
            DeviceKind::BtrfsSubVolume(_) => "btrfs subvolume",
            DeviceKind::Loop(_) => "loop",
            DeviceKind::File(_) => "file",
            DeviceKind::Optical(_) => "cdrom",
            DeviceKind::Tmpfs(_) => "tmpfs",
            DeviceKind::NoDevice(_) => "nodev",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_reports_its_kind_name() {
        let dev = Device::new(
            "sda",
            Size::from_gib(10),
            DeviceKind::Disk(disk::DiskDevice::new(disk::DiskKind::Local)),
        );
        assert_eq!(dev.kind.type_name(), "disk");
        assert!(dev.is_disk_like());
    }

    #[test]
    fn protecting_a_device_forces_it_uncontrollable() {
        let mut dev = Device::new("sda", Size::from_gib(10), DeviceKind::Disk(disk::DiskDevice::new(disk::DiskKind::Local)));
        assert!(dev.controllable);
        dev.set_protected(true);
        assert!(dev.protected());
        assert!(!dev.controllable);
    }

    #[test]
    fn original_format_snapshot_is_taken_only_once() {
        use crate::format::{filesystem::FilesystemFormat, FormatKind};

        let mut dev = Device::new("sda1", Size::from_gib(1), DeviceKind::Partition(partition::PartitionDevice::new(
            partition::PartitionType::Primary,
            0,
            2047,
        )));
        dev.format = Format::new(FormatKind::Filesystem(FilesystemFormat::new(crate::format::filesystem::FsType::Ext4)));
        dev.snapshot_original_format();
        let snapshot_type = dev.original_format.as_ref().unwrap().kind.type_name();
        assert_eq!(snapshot_type, "ext4");

        dev.format = Format::new(FormatKind::Filesystem(FilesystemFormat::new(crate::format::filesystem::FsType::Xfs)));
        dev.snapshot_original_format();
        assert_eq!(dev.original_format.as_ref().unwrap().kind.type_name(), "ext4");
    }

    #[test]
    fn lvm_lv_device_id_is_keyed_on_its_own_uuid() {
        let mut dev = Device::new(
            "root",
            Size::from_gib(1),
            DeviceKind::LvmLogicalVolume(lvm::LvmLogicalVolumeDevice::new(lvm::LvSubtype::Linear)),
        );
        let lv_uuid = uuid::Uuid::from_u128(0xfeed);
        dev.uuid = Some(lv_uuid);
        dev.recompute_device_id();
        assert_eq!(dev.device_id, format!("LVM-{lv_uuid}"));
    }
}
