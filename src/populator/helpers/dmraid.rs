//! dm-raid (BIOS/firmware RAID) cascade: groups disks whose disklabel
//! exposes a shared RAID-set name into one [`DmDevice`](crate::device::dm::DmDevice)
//! with [`DmKind::DmRaid`](crate::device::dm::DmKind::DmRaid), the device-mapper
//! counterpart of an MD container (spec §B; grounded on
//! `original_source/blivet/devices/disk.py`'s `DMRaidArrayDevice`).

use std::collections::HashMap;

use crate::device::dm::{DmDevice, DmKind};
use crate::device::{Device, DeviceId, DeviceKind};
use crate::error::Result;
use crate::size::Size;
use crate::tree::DeviceTree;

/// Groups `members` by `raid_set_name` (as discovered by a downstream
/// binary crate parsing `dmraid`/firmware metadata this crate does not
/// parse itself) and creates one dm-raid device per group not already
/// present.
pub fn assemble_raid_sets(tree: &mut DeviceTree, sets: &HashMap<String, Vec<DeviceId>>) -> Result<Vec<DeviceId>> {
    let mut created = Vec::new();
    for (raid_set_name, members) in sets {
        if tree.get_by_name(raid_set_name, false).is_some() {
            continue;
        }
        let dm = DmDevice::new(DmKind::DmRaid { raid_set_name: raid_set_name.clone() });
        let total_size = members.iter().filter_map(|id| tree.get(*id)).fold(Size::from_bytes(0), |acc, d| acc + d.size);
        let mut device = Device::new(raid_set_name.clone(), total_size, DeviceKind::Dm(dm));
        device.exists = true;
        device.lifecycle = crate::device::Lifecycle::Active;
        device.observe_current_size();
        for member in members {
            device.parents.append(*member, |_| Ok(()))?;
        }
        let id = tree.add_device(device)?;
        created.push(id);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::disk::{DiskDevice, DiskKind};

    #[test]
    fn creates_one_device_per_raid_set() {
        let mut tree = DeviceTree::new();
        let a = tree
            .add_device(Device::new("sda", Size::from_gib(5), DeviceKind::Disk(DiskDevice::new(DiskKind::Local))))
            .unwrap();
        let b = tree
            .add_device(Device::new("sdb", Size::from_gib(5), DeviceKind::Disk(DiskDevice::new(DiskKind::Local))))
            .unwrap();

        let mut sets = HashMap::new();
        sets.insert("isw_raidset0".to_string(), vec![a, b]);

        let created = assemble_raid_sets(&mut tree, &sets).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(tree.get(created[0]).unwrap().parents.len(), 2);
    }
}
