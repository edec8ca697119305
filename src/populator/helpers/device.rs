//! Device-populator helpers.
//!
//! Each helper claims a [`Descriptor`] shape and turns it into a
//! [`crate::device::Device`]. `device_helpers()` returns them in the
//! priority order the populator's main loop walks (spec §4.3): protocol-
//! specific disk variants before the generic disk fallback, DM/MD/LVM
//! container devices before plain partitions, so a more specific helper
//! never loses a descriptor to a more generic one that happens to match too.

use crate::device::disk::{DiskDevice, DiskKind};
use crate::device::dm::{DmDevice, DmKind};
use crate::device::loop_device::LoopDevice;
use crate::device::md::{MdArrayDevice, MdLevel};
use crate::device::partition::{PartitionDevice, PartitionType};
use crate::device::{Device, DeviceId, DeviceKind};
use crate::error::Result;
use crate::populator::descriptor::{Descriptor, DescriptorKind};
use crate::tree::DeviceTree;

/// A device-populator helper: claims descriptors of one shape and builds the
/// [`Device`] for them. Implementations never touch the format layer --
/// that's [`super::format::FormatPopulator`]'s job, run afterward on the
/// same descriptor.
pub trait DevicePopulator {
    fn matches(&self, descriptor: &Descriptor) -> bool;

    /// Builds and registers the device in `tree`. Returns `Ok(None)` instead
    /// of erroring when a dependency (the parent device) hasn't been
    /// resolved yet -- the populator re-offers this descriptor on the next
    /// pass rather than treating it as a failure (spec §4.3).
    fn handle(&self, descriptor: &Descriptor, tree: &mut DeviceTree) -> Result<Option<DeviceId>>;
}

fn resolve_parent(tree: &DeviceTree, descriptor: &Descriptor) -> Option<DeviceId> {
    let parent_path = descriptor.parent_sysfs_path.as_deref()?;
    // A hidden parent (an internal LV that later became this device's
    // slave, say) should still resolve -- discovery doesn't care whether
    // the populator's later hiding pass has acted on it yet.
    tree.get_by_sysfs_path(parent_path, true).map(|(id, _)| id)
}

struct DiskHelper;

impl DevicePopulator for DiskHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.kind == DescriptorKind::Disk && descriptor.dm_uuid.is_none()
    }

    fn handle(&self, descriptor: &Descriptor, tree: &mut DeviceTree) -> Result<Option<DeviceId>> {
        let mut disk = DiskDevice::new(DiskKind::Local);
        disk.vendor = descriptor.vendor.clone();
        disk.model = descriptor.model.clone();
        disk.media_present = !descriptor.removable || descriptor.size.bytes() > 0;

        let mut device = Device::new(descriptor.name.clone(), descriptor.size, DeviceKind::Disk(disk));
        device.sysfs_path = Some(descriptor.sysfs_path.clone());
        device.path = Some(format!("/dev/{}", descriptor.name));
        device.symlinks = descriptor.symlinks.clone();
        device.exists = true;
        device.lifecycle = crate::device::Lifecycle::Active;
        device.observe_current_size();
        device.tags.set_builtin(crate::tags::BuiltinTag::Ssd, !descriptor.rotational);
        if descriptor.bus.as_deref() == Some("usb") {
            device.tags.set_builtin(crate::tags::BuiltinTag::Usb, true);
        }
        device.tags.set_builtin(crate::tags::BuiltinTag::Local, true);

        let id = tree.add_device(device)?;
        Ok(Some(id))
    }
}

struct PartitionHelper;

impl DevicePopulator for PartitionHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.kind == DescriptorKind::Partition
    }

    fn handle(&self, descriptor: &Descriptor, tree: &mut DeviceTree) -> Result<Option<DeviceId>> {
        let Some(parent_id) = resolve_parent(tree, descriptor) else {
            return Ok(None);
        };

        let sectors = descriptor.size.sectors(descriptor.sector_size);
        let mut partition = PartitionDevice::new(PartitionType::Primary, 0, sectors.saturating_sub(1));
        partition.bootable = false;

        let mut device = Device::new(descriptor.name.clone(), descriptor.size, DeviceKind::Partition(partition));
        device.sysfs_path = Some(descriptor.sysfs_path.clone());
        device.path = Some(format!("/dev/{}", descriptor.name));
        device.symlinks = descriptor.symlinks.clone();
        device.exists = true;
        device.lifecycle = crate::device::Lifecycle::Active;
        device.observe_current_size();
        device.parents.append(parent_id, |_| Ok(()))?;

        let id = tree.add_device(device)?;
        Ok(Some(id))
    }
}

struct LoopHelper;

impl DevicePopulator for LoopHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.kind == DescriptorKind::Loop
    }

    fn handle(&self, descriptor: &Descriptor, tree: &mut DeviceTree) -> Result<Option<DeviceId>> {
        let mut loop_dev = LoopDevice::new(descriptor.sysfs_path.clone());
        loop_dev.loop_path = Some(format!("/dev/{}", descriptor.name));

        let mut device = Device::new(descriptor.name.clone(), descriptor.size, DeviceKind::Loop(loop_dev));
        device.sysfs_path = Some(descriptor.sysfs_path.clone());
        device.path = Some(format!("/dev/{}", descriptor.name));
        device.symlinks = descriptor.symlinks.clone();
        device.exists = true;
        device.lifecycle = crate::device::Lifecycle::Active;
        device.observe_current_size();

        let id = tree.add_device(device)?;
        Ok(Some(id))
    }
}

struct MultipathHelper;

impl DevicePopulator for MultipathHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.dm_uuid.as_deref().map(|u| u.starts_with("mpath-")).unwrap_or(false)
    }

    fn handle(&self, descriptor: &Descriptor, tree: &mut DeviceTree) -> Result<Option<DeviceId>> {
        let wwid = descriptor.dm_uuid.clone().unwrap_or_default();
        let dm = DmDevice::new(DmKind::Multipath { wwid: wwid.clone(), active_paths: Vec::new() });

        let mut device = Device::new(descriptor.name.clone(), descriptor.size, DeviceKind::Dm(dm));
        device.sysfs_path = Some(descriptor.sysfs_path.clone());
        device.path = Some(format!("/dev/{}", descriptor.name));
        device.symlinks = descriptor.symlinks.clone();
        device.exists = true;
        device.lifecycle = crate::device::Lifecycle::Active;
        device.tags.set_builtin(crate::tags::BuiltinTag::Local, true);
        device.observe_current_size();

        if let Some(parent_id) = resolve_parent(tree, descriptor) {
            device.parents.append(parent_id, |_| Ok(()))?;
        }

        let id = tree.add_device(device)?;
        Ok(Some(id))
    }
}

struct LuksMappedHelper;

impl DevicePopulator for LuksMappedHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.dm_uuid.as_deref().map(|u| u.starts_with("CRYPT-LUKS")).unwrap_or(false)
    }

    fn handle(&self, descriptor: &Descriptor, tree: &mut DeviceTree) -> Result<Option<DeviceId>> {
        let Some(parent_id) = resolve_parent(tree, descriptor) else {
            return Ok(None);
        };
        let dm = DmDevice::new(DmKind::Luks { map_name: descriptor.name.clone() });

        let mut device = Device::new(descriptor.name.clone(), descriptor.size, DeviceKind::Dm(dm));
        device.sysfs_path = Some(descriptor.sysfs_path.clone());
        device.path = Some(format!("/dev/{}", descriptor.name));
        device.symlinks = descriptor.symlinks.clone();
        device.exists = true;
        device.lifecycle = crate::device::Lifecycle::Active;
        device.observe_current_size();
        device.parents.append(parent_id, |_| Ok(()))?;

        let id = tree.add_device(device)?;
        Ok(Some(id))
    }
}

struct MdArrayHelper;

impl DevicePopulator for MdArrayHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.kind == DescriptorKind::MdDevice
    }

    fn handle(&self, descriptor: &Descriptor, tree: &mut DeviceTree) -> Result<Option<DeviceId>> {
        let level = match descriptor.md_level.as_deref() {
            Some("raid0") => MdLevel::Raid0,
            Some("raid1") => MdLevel::Raid1,
            Some("raid4") => MdLevel::Raid4,
            Some("raid5") => MdLevel::Raid5,
            Some("raid6") => MdLevel::Raid6,
            Some("raid10") => MdLevel::Raid10,
            Some("container") => MdLevel::Container,
            _ => MdLevel::Raid1,
        };
        let mut array = MdArrayDevice::new(level);
        array.uuid = descriptor.md_uuid.clone();

        let mut device = Device::new(descriptor.name.clone(), descriptor.size, DeviceKind::MdArray(array));
        device.sysfs_path = Some(descriptor.sysfs_path.clone());
        device.path = Some(format!("/dev/{}", descriptor.name));
        device.symlinks = descriptor.symlinks.clone();
        device.exists = true;
        device.lifecycle = crate::device::Lifecycle::Active;
        device.observe_current_size();

        let id = tree.add_device(device)?;
        Ok(Some(id))
    }
}

/// Returns helpers in priority order: the first whose `matches` returns
/// `true` for a descriptor handles it.
pub fn device_helpers() -> Vec<Box<dyn DevicePopulator>> {
    vec![
        Box::new(MultipathHelper),
        Box::new(LuksMappedHelper),
        Box::new(MdArrayHelper),
        Box::new(LoopHelper),
        Box::new(PartitionHelper),
        Box::new(DiskHelper),
    ]
}
