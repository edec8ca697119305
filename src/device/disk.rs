//! Disks: directly-attached, file-backed, and network-attached block storage
//! that can carry a disklabel.
//!
//! Grounded on `original_source/blivet/devices/disk.py`'s `DiskDevice` and
//! its protocol-specific subclasses (`iScsiDiskDevice`, `FcoeDiskDevice`,
//! `ZFCPDiskDevice`, `DASDDevice`). Rather than a subclass per protocol, the
//! protocol-specific fields live in [`DiskKind`] payload variants -- the
//! struct otherwise stays identical across transports, since the tree and
//! populator treat all of them as disks.

/// Distinguishes a disk's attachment so `tags` and `description` can be
/// derived without downcasting, and so protocol-specific identity fields
/// (initiator name, WWPN, busid...) have somewhere to live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskKind {
    /// Directly attached (ATA, SCSI, SATA, USB) local disk.
    Local,
    /// A flat file treated as a disk, e.g. a disk image (`losetup`-free; see
    /// [`crate::device::loop_device`] for the loop-mapped case).
    File { path: String },
    /// dm-raid BIOS RAID member set presented as one disk.
    DmRaid,
    /// `device-mapper-multipath` device aggregating redundant paths to one
    /// LUN.
    Multipath { wwid: String },
    iScsi {
        node_name: String,
        address: String,
        port: u16,
        /// `true` if this session was established by firmware iBFT rather
        /// than userspace iscsiadm.
        offload_ibft: bool,
        initiator: String,
    },
    Fcoe {
        nic: String,
        identifier: String,
    },
    ZFcp {
        hba_id: String,
        wwpn: String,
        fcp_lun: String,
    },
    Dasd {
        busid: String,
        opts: String,
    },
    NvmeNamespace {
        nsid: u32,
        eui64: Option<String>,
    },
    NvmeFabricsNamespace {
        nsid: u32,
        subsys_nqn: String,
        transport: String,
    },
}

impl DiskKind {
    /// `true` for any kind reachable only over a network transport -- drives
    /// the `remote`/`local` built-in tag (spec §B).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            DiskKind::iScsi { .. }
                | DiskKind::Fcoe { .. }
                | DiskKind::ZFcp { .. }
                | DiskKind::NvmeFabricsNamespace { .. }
        )
    }
}

/// A disk device: something a disklabel can be written to directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskDevice {
    pub kind: DiskKind,
    /// `false` for disks blivet would call non-partitionable (e.g. a
    /// multipath member exposed only as a passthrough, or read-only media).
    pub partitionable: bool,
    pub vendor: Option<String>,
    pub model: Option<String>,
    /// `true` if the kernel currently reports removable media present
    /// (optical, some USB). Disks that are not removable report `true`
    /// unconditionally.
    pub media_present: bool,
}

impl DiskDevice {
    pub fn new(kind: DiskKind) -> Self {
        DiskDevice {
            kind,
            partitionable: true,
            vendor: None,
            model: None,
            media_present: true,
        }
    }

    /// Human-readable summary, e.g. `"ATA VBOX HARDDISK"`, falling back to
    /// the disk's transport description when vendor/model are unknown (as
    /// `DiskDevice.description` does for `DiskFile` in the original).
    pub fn description(&self) -> String {
        match (&self.vendor, &self.model) {
            (Some(v), Some(m)) => format!("{v} {m}"),
            (Some(v), None) => v.clone(),
            (None, Some(m)) => m.clone(),
            (None, None) => match &self.kind {
                DiskKind::File { path } => format!("disk image {path}"),
                DiskKind::Multipath { wwid } => format!("multipath device {wwid}"),
                DiskKind::iScsi { node_name, .. } => format!("iSCSI disk {node_name}"),
                DiskKind::Fcoe { identifier, .. } => format!("FCoE disk {identifier}"),
                DiskKind::ZFcp { fcp_lun, .. } => format!("zFCP disk {fcp_lun}"),
                DiskKind::Dasd { busid, .. } => format!("DASD {busid}"),
                DiskKind::NvmeNamespace { nsid, .. } => format!("NVMe namespace {nsid}"),
                DiskKind::NvmeFabricsNamespace { nsid, subsys_nqn, .. } => {
                    format!("NVMe-oF namespace {nsid} on {subsys_nqn}")
                }
                DiskKind::Local | DiskKind::DmRaid => "disk".to_string(),
            },
        }
    }
}
