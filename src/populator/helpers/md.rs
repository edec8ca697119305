//! MD cascade: assembles an [`MdArrayDevice`](crate::device::md::MdArrayDevice)
//! once enough members sharing an array UUID have been discovered, the same
//! shape as [`super::lvm::assemble_volume_groups`] but keyed on array UUID
//! rather than VG name (grounded on
//! `original_source/blivet/populator/helpers/mdraid.py`).

use std::collections::{HashMap, HashSet};

use crate::device::md::{MdArrayDevice, MdLevel};
use crate::device::{Device, DeviceId, DeviceKind};
use crate::error::Result;
use crate::format::FormatKind;
use crate::size::Size;
use crate::tree::DeviceTree;

pub fn assemble_arrays(tree: &mut DeviceTree) -> Result<Vec<DeviceId>> {
    let mut by_array: HashMap<String, Vec<DeviceId>> = HashMap::new();
    let existing: HashSet<String> = tree
        .names(false)
        .iter()
        .filter(|name| tree.get_by_name(name, false).map(|(_, d)| matches!(d.kind, DeviceKind::MdArray(_))).unwrap_or(false))
        .map(|n| n.to_string())
        .collect();

    for name in tree.names(false) {
        let Some((id, device)) = tree.get_by_name(name, false) else { continue };
        if let FormatKind::MdMember(member) = &device.format.kind {
            if let Some(array_uuid) = &member.array_uuid {
                if !existing.contains(array_uuid) && !member.is_spare() {
                    by_array.entry(array_uuid.clone()).or_default().push(id);
                }
            }
        }
    }

    let mut created = Vec::new();
    for (array_uuid, members) in by_array {
        let level = members
            .first()
            .and_then(|id| tree.get(*id))
            .and_then(|d| match &d.format.kind {
                FormatKind::MdMember(m) => m.level,
                _ => None,
            })
            .unwrap_or(MdLevel::Raid1);

        if members.len() < level.min_members() {
            // Not enough members discovered yet; wait for a later pass.
            continue;
        }

        let mut array = MdArrayDevice::new(level);
        array.uuid = Some(array_uuid.clone());

        let total_size = members.iter().filter_map(|id| tree.get(*id)).fold(Size::from_bytes(0), |acc, d| acc + d.size);
        let name = format!("md-{}", &array_uuid[..array_uuid.len().min(8)]);
        let mut device = Device::new(name, total_size, DeviceKind::MdArray(array));
        device.exists = true;
        device.lifecycle = crate::device::Lifecycle::Active;
        device.observe_current_size();
        for member in &members {
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
    use crate::format::{mdmember::MdMemberFormat, Format, FormatKind};

    fn member_device(name: &str, array_uuid: &str, slot: u32) -> Device {
        let mut device = Device::new(name, Size::from_gib(5), DeviceKind::Disk(DiskDevice::new(DiskKind::Local)));
        let mut member = MdMemberFormat::new();
        member.array_uuid = Some(array_uuid.to_string());
        member.level = Some(MdLevel::Raid1);
        member.slot = Some(slot);
        device.format = Format::new(FormatKind::MdMember(member));
        device
    }

    #[test]
    fn waits_for_enough_members() {
        let mut tree = DeviceTree::new();
        tree.add_device(member_device("sda1", "uuid-a", 0)).unwrap();
        let created = assemble_arrays(&mut tree).unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn assembles_raid1_from_two_members() {
        let mut tree = DeviceTree::new();
        tree.add_device(member_device("sda1", "uuid-a", 0)).unwrap();
        tree.add_device(member_device("sdb1", "uuid-a", 1)).unwrap();
        let created = assemble_arrays(&mut tree).unwrap();
        assert_eq!(created.len(), 1);
        let array = tree.get(created[0]).unwrap();
        assert_eq!(array.parents.len(), 2);
    }
}
