//! Populator configuration and the per-run scratch state it threads through
//! the discovery loop.

use std::collections::HashMap;

use crate::device::DeviceId;
use crate::ops::{CryptoOps, DiskLabelOps, DmOps, FsOps, LvmOps, MdOps, UdevOps};

/// Tunables for one populate run. Never read from a config file (spec §A.3
/// -- configuration here is a builder struct a caller fills in, not an
/// on-disk format this crate parses).
#[derive(Debug, Clone)]
pub struct PopulatorConfig {
    /// Upper bound on discovery passes before giving up on quiescence (spec
    /// §4.3): guards against a helper bug that keeps making progress appear
    /// possible without actually converging.
    pub max_passes: usize,
    /// `true` to run the exclusion/hiding pass that removes internal LVM LVs
    /// and subsumed BTRFS members from the visible device list once
    /// discovery quiesces.
    pub hide_internal_devices: bool,
    /// Sysfs paths to skip entirely, e.g. a live ISO's squashfs loop device.
    pub exclude_paths: Vec<String>,
}

impl Default for PopulatorConfig {
    fn default() -> Self {
        PopulatorConfig {
            max_passes: 32,
            hide_internal_devices: true,
            exclude_paths: Vec::new(),
        }
    }
}

/// Snapshot caches a populate run accumulates as it resolves descriptors
/// into devices, so later passes over the same descriptor list can find
/// devices an earlier pass already created (spec §4.3).
#[derive(Debug, Default)]
pub struct Caches {
    pub sysfs_to_device: HashMap<String, DeviceId>,
    /// Descriptors a helper declined to handle this pass because a
    /// dependency (its parent, its VG) wasn't resolved yet. Re-offered on
    /// the next pass.
    pub deferred: Vec<String>,
}

/// Everything a populator helper needs: the tool boundary trait objects plus
/// the run's caches. A downstream binary wires real `ops` implementations;
/// this crate's own tests use [`crate::ops::fake`].
pub struct Context<'a> {
    pub config: PopulatorConfig,
    pub caches: Caches,
    pub disklabel_ops: &'a dyn DiskLabelOps,
    pub lvm_ops: &'a dyn LvmOps,
    pub md_ops: &'a dyn MdOps,
    pub dm_ops: &'a dyn DmOps,
    pub crypto_ops: &'a dyn CryptoOps,
    pub udev_ops: &'a dyn UdevOps,
    pub fs_ops: &'a dyn FsOps,
}

impl<'a> Context<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PopulatorConfig,
        disklabel_ops: &'a dyn DiskLabelOps,
        lvm_ops: &'a dyn LvmOps,
        md_ops: &'a dyn MdOps,
        dm_ops: &'a dyn DmOps,
        crypto_ops: &'a dyn CryptoOps,
        udev_ops: &'a dyn UdevOps,
        fs_ops: &'a dyn FsOps,
    ) -> Self {
        Context {
            config,
            caches: Caches::default(),
            disklabel_ops,
            lvm_ops,
            md_ops,
            dm_ops,
            crypto_ops,
            udev_ops,
            fs_ops,
        }
    }
}
