//! BTRFS cascade: assembles a [`BtrfsVolumeDevice`] once enough devices
//! formatted as BTRFS members sharing a volume UUID have been discovered,
//! mirroring [`super::md::assemble_arrays`], then -- once that volume is
//! freshly complete -- synthesizes its subvolumes/snapshots from a
//! `subvolumes` listing the same shape spec §4.3 describes a real binary
//! crate filling in from `btrfs subvolume list` (this crate never invokes
//! `btrfs` itself, per the tool-boundary Non-goal).

use std::collections::{HashMap, HashSet};

use crate::device::btrfs::{BtrfsRaidLevel, BtrfsSubVolumeDevice, BtrfsVolumeDevice};
use crate::device::{Device, DeviceId, DeviceKind, Lifecycle};
use crate::error::Result;
use crate::format::FormatKind;
use crate::size::Size;
use crate::tree::DeviceTree;

/// The id `btrfs subvolume list` uses for the volume's top-level subvolume
/// (subvolume id 5 is a BTRFS-filesystem constant, not something this crate
/// invents): a subvolume whose `parent_id` is this one is a direct child of
/// the volume itself rather than of another subvolume.
pub const TOP_LEVEL_SUBVOL_ID: u64 = 5;

/// One `btrfs subvolume list`-equivalent row.
#[derive(Debug, Clone)]
pub struct SubvolumeInfo {
    pub id: u64,
    pub path: String,
    pub parent_id: u64,
    /// Subvolume id this one is a snapshot of, if any (spec §3's
    /// `BTRFSSnapShotDevice.source`).
    pub snapshot_source: Option<u64>,
}

/// Creates one [`BtrfsSubVolumeDevice`] per entry in `subvols`, resolving
/// parent pointers by `vol_id`: an entry whose `parent_id` is
/// [`TOP_LEVEL_SUBVOL_ID`] is parented directly on the volume device; any
/// other `parent_id` must match another entry's `id` already created this
/// pass. Entries whose parent never resolves are discarded (spec §4.3),
/// logged rather than erroring.
fn synthesize_subvolumes(
    tree: &mut DeviceTree,
    volume_id: DeviceId,
    volume_uuid: uuid::Uuid,
    subvols: &[SubvolumeInfo],
) -> Result<Vec<DeviceId>> {
    let mut by_subvol_id: HashMap<u64, DeviceId> = HashMap::new();
    let mut pending: Vec<&SubvolumeInfo> = subvols.iter().collect();
    let mut created = Vec::new();

    while !pending.is_empty() {
        let mut next_pending = Vec::new();
        let mut progressed = false;

        for info in pending {
            let parent_id = if info.parent_id == TOP_LEVEL_SUBVOL_ID {
                Some(volume_id)
            } else {
                by_subvol_id.get(&info.parent_id).copied()
            };
            let Some(parent_id) = parent_id else {
                next_pending.push(info);
                continue;
            };

            let mut subvol = BtrfsSubVolumeDevice::new();
            subvol.subvol_id = Some(info.id);
            subvol.is_snapshot = info.snapshot_source.is_some();
            subvol.snapshot_source = info.snapshot_source;
            subvol.volume_uuid = Some(volume_uuid);

            let name = info.path.rsplit('/').next().unwrap_or(&info.path).to_string();
            let mut device = Device::new(name, Size::from_bytes(0), DeviceKind::BtrfsSubVolume(subvol));
            device.exists = true;
            device.lifecycle = Lifecycle::Active;
            device.parents.append(parent_id, |_| Ok(()))?;

            let id = tree.add_device(device)?;
            by_subvol_id.insert(info.id, id);
            created.push(id);
            progressed = true;
        }

        if !progressed {
            log::warn!("{} subvolume(s) reference an unresolved parent id, discarding", next_pending.len());
            break;
        }
        pending = next_pending;
    }

    Ok(created)
}

pub fn assemble_volumes(tree: &mut DeviceTree, subvolumes: &HashMap<uuid::Uuid, Vec<SubvolumeInfo>>) -> Result<Vec<DeviceId>> {
    let mut by_volume: HashMap<uuid::Uuid, Vec<DeviceId>> = HashMap::new();
    let existing: HashSet<String> = tree
        .names(false)
        .iter()
        .filter(|name| tree.get_by_name(name, false).map(|(_, d)| matches!(d.kind, DeviceKind::BtrfsVolume(_))).unwrap_or(false))
        .map(|n| n.to_string())
        .collect();
    let _ = existing;

    for name in tree.names(false) {
        let Some((id, device)) = tree.get_by_name(name, false) else { continue };
        if let FormatKind::BtrfsMember(member) = &device.format.kind {
            if let Some(volume_uuid) = member.volume_uuid {
                by_volume.entry(volume_uuid).or_default().push(id);
            }
        }
    }

    let mut created = Vec::new();
    for (volume_uuid, members) in by_volume {
        // Already assembled? Skip if a volume device already claims exactly
        // this member set as parents -- subvolumes are synthesized only
        // once, "if volume is freshly complete" (spec §4.3).
        let already_assembled = members
            .first()
            .map(|first| tree.get_children(*first).iter().any(|child| {
                tree.get(*child).map(|d| matches!(d.kind, DeviceKind::BtrfsVolume(_))).unwrap_or(false)
            }))
            .unwrap_or(false);
        if already_assembled {
            continue;
        }

        let level = if members.len() > 1 { BtrfsRaidLevel::Raid1 } else { BtrfsRaidLevel::Single };
        let volume = BtrfsVolumeDevice::new(level, level);
        if !volume.has_enough_members(members.len()) {
            continue;
        }

        let total_size = members.iter().filter_map(|id| tree.get(*id)).fold(Size::from_bytes(0), |acc, d| acc + d.size);
        let name = format!("btrfs-{}", &volume_uuid.to_string()[..8]);
        let mut device = Device::new(name, total_size, DeviceKind::BtrfsVolume(volume));
        device.uuid = Some(volume_uuid);
        device.exists = true;
        device.lifecycle = Lifecycle::Active;
        device.observe_current_size();
        for member in &members {
            device.parents.append(*member, |_| Ok(()))?;
        }
        let volume_id = tree.add_device(device)?;
        created.push(volume_id);

        if let Some(subvols) = subvolumes.get(&volume_uuid) {
            created.extend(synthesize_subvolumes(tree, volume_id, volume_uuid, subvols)?);
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::disk::{DiskDevice, DiskKind};
    use crate::format::{btrfsmember::BtrfsMemberFormat, Format, FormatKind};

    fn member_device(name: &str, volume_uuid: uuid::Uuid) -> Device {
        let mut device = Device::new(name, Size::from_gib(5), DeviceKind::Disk(DiskDevice::new(DiskKind::Local)));
        let mut member = BtrfsMemberFormat::new();
        member.volume_uuid = Some(volume_uuid);
        device.format = Format::new(FormatKind::BtrfsMember(member));
        device
    }

    #[test]
    fn assembles_two_member_raid1_volume() {
        let volume_uuid = uuid::Uuid::from_u128(1);
        let mut tree = DeviceTree::new();
        tree.add_device(member_device("sda1", volume_uuid)).unwrap();
        tree.add_device(member_device("sdb1", volume_uuid)).unwrap();

        let created = assemble_volumes(&mut tree, &HashMap::new()).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(tree.get(created[0]).unwrap().parents.len(), 2);
    }

    #[test]
    fn synthesizes_subvolume_from_listing() {
        let volume_uuid = uuid::Uuid::from_u128(2);
        let mut tree = DeviceTree::new();
        tree.add_device(member_device("sdc1", volume_uuid)).unwrap();
        tree.add_device(member_device("sdd1", volume_uuid)).unwrap();

        let mut subvols = HashMap::new();
        subvols.insert(
            volume_uuid,
            vec![SubvolumeInfo { id: 256, path: "home".to_string(), parent_id: TOP_LEVEL_SUBVOL_ID, snapshot_source: None }],
        );

        let created = assemble_volumes(&mut tree, &subvols).unwrap();
        assert_eq!(created.len(), 2);
        let volume_id = created[0];
        let subvol_id = created[1];

        assert_eq!(tree.get_children(volume_id), vec![subvol_id]);
        let subvol = tree.get(subvol_id).unwrap();
        assert_eq!(subvol.name, "home");
        assert!(matches!(&subvol.kind, DeviceKind::BtrfsSubVolume(s) if s.subvol_id == Some(256)));
        assert_eq!(subvol.device_id, format!("BTRFS-{volume_uuid}-home"));
    }

    #[test]
    fn nested_subvolume_resolves_through_its_parent_subvolume() {
        let volume_uuid = uuid::Uuid::from_u128(3);
        let mut tree = DeviceTree::new();
        tree.add_device(member_device("sde1", volume_uuid)).unwrap();

        let mut subvols = HashMap::new();
        subvols.insert(
            volume_uuid,
            vec![
                SubvolumeInfo { id: 300, path: "data/nested".to_string(), parent_id: 257, snapshot_source: None },
                SubvolumeInfo { id: 257, path: "data".to_string(), parent_id: TOP_LEVEL_SUBVOL_ID, snapshot_source: None },
            ],
        );

        let created = assemble_volumes(&mut tree, &subvols).unwrap();
        assert_eq!(created.len(), 3);
        let volume_id = created[0];
        let data_id = tree.get_by_name("data", false).unwrap().0;
        let nested_id = tree.get_by_name("nested", false).unwrap().0;

        assert_eq!(tree.get_children(volume_id), vec![data_id]);
        assert_eq!(tree.get_children(data_id), vec![nested_id]);
    }
}
